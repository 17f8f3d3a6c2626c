use serde::{Deserialize, Serialize};

/// Processing lifecycle of an attachment.
///
/// `created -> classified -> validated -> styling -> complete`, with `failed`
/// reachable from any non-terminal state. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingState {
    Created,
    Classified,
    Validated,
    Styling,
    Complete,
    Failed,
}

impl ProcessingState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ProcessingState::Complete | ProcessingState::Failed)
    }

    pub fn can_advance_to(self, next: ProcessingState) -> bool {
        use ProcessingState::*;

        match (self, next) {
            (Complete, _) | (Failed, _) => false,
            (_, Failed) => true,
            (Created, Classified)
            | (Classified, Validated)
            | (Validated, Styling)
            | (Styling, Complete) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ProcessingState::*;

    #[test]
    fn test_happy_path_transitions() {
        assert!(Created.can_advance_to(Classified));
        assert!(Classified.can_advance_to(Validated));
        assert!(Validated.can_advance_to(Styling));
        assert!(Styling.can_advance_to(Complete));
    }

    #[test]
    fn test_any_open_state_can_fail() {
        for state in [Created, Classified, Validated, Styling] {
            assert!(state.can_advance_to(Failed));
        }
    }

    #[test]
    fn test_terminal_states_are_absorbing() {
        for next in [Created, Classified, Validated, Styling, Complete, Failed] {
            assert!(!Complete.can_advance_to(next));
            assert!(!Failed.can_advance_to(next));
        }
    }

    #[test]
    fn test_no_skipping_or_going_back() {
        assert!(!Created.can_advance_to(Styling));
        assert!(!Created.can_advance_to(Complete));
        assert!(!Styling.can_advance_to(Validated));
    }
}
