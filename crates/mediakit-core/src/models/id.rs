use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Opaque attachment identifier.
///
/// Generated ids are time-ordered: milliseconds since the Unix epoch in the
/// high bits and 16 random bits below, so ids created concurrently on
/// independent workers do not collide in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentId(pub i64);

impl AttachmentId {
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let sequence: u16 = rand::random();
        Self((millis << 16) | i64::from(sequence))
    }

    /// Storage path partition: the id zero-padded to 18 digits, split into
    /// groups of three (`000/000/000/000/000/123`).
    pub fn partition(&self) -> String {
        let padded = format!("{:018}", self.0);
        padded
            .as_bytes()
            .chunks(3)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl From<i64> for AttachmentId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AttachmentId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(Self)
    }
}
