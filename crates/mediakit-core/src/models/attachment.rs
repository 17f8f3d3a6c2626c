use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::AttachmentId;
use super::media_kind::MediaKind;
use super::metadata::AttachmentMetadata;
use super::state::ProcessingState;
use super::style::{StyleName, StyleOutput};
use crate::error::AttachmentError;

/// Where an attachment's source bytes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Local,
    Remote,
}

impl Origin {
    /// Remote iff a non-blank remote URL is present.
    pub fn from_remote_url(remote_url: Option<&str>) -> Self {
        match remote_url {
            Some(url) if !url.trim().is_empty() => Origin::Remote,
            _ => Origin::Local,
        }
    }
}

/// Media attachment record
///
/// Origin, remote URL and id are fixed at construction. The processing state
/// only moves forward through [`Attachment::advance`]. The kind is set once on
/// classification and the styles once on completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    id: AttachmentId,
    origin: Origin,
    remote_url: Option<String>,
    pub shortcode: Option<String>,
    kind: MediaKind,
    /// Produced styles in pipeline order
    styles: Vec<StyleOutput>,
    pub metadata: AttachmentMetadata,
    pub blurhash: Option<String>,
    pub description: Option<String>,
    state: ProcessingState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Attachment {
    pub fn new(remote_url: Option<String>, shortcode: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: AttachmentId::generate(),
            origin: Origin::from_remote_url(remote_url.as_deref()),
            remote_url,
            shortcode,
            kind: MediaKind::Unknown,
            styles: Vec::new(),
            metadata: AttachmentMetadata::default(),
            blurhash: None,
            description: None,
            state: ProcessingState::Created,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> AttachmentId {
        self.id
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn remote_url(&self) -> Option<&str> {
        self.remote_url.as_deref()
    }

    pub fn state(&self) -> ProcessingState {
        self.state
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Produced styles in pipeline order
    pub fn styles(&self) -> &[StyleOutput] {
        &self.styles
    }

    /// Record the sniffed kind and move to `Classified`.
    pub fn classify_as(&mut self, kind: MediaKind) -> Result<(), AttachmentError> {
        self.advance(ProcessingState::Classified)?;
        self.kind = kind;
        Ok(())
    }

    /// Record the stored styles and move to `Complete`.
    pub fn complete(&mut self, styles: Vec<StyleOutput>) -> Result<(), AttachmentError> {
        self.advance(ProcessingState::Complete)?;
        self.styles = styles;
        Ok(())
    }

    /// Move to `next`, rejecting backwards or skipping transitions.
    pub fn advance(&mut self, next: ProcessingState) -> Result<(), AttachmentError> {
        if !self.state.can_advance_to(next) {
            return Err(AttachmentError::InvalidState {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!(
            attachment_id = %self.id,
            from = ?self.state,
            to = ?next,
            "Attachment state transition"
        );
        self.state = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// True iff the remote URL is blank.
    pub fn local(&self) -> bool {
        self.origin == Origin::Local
    }

    /// Remote attachments with no stored output must be fetched again.
    pub fn needs_redownload(&self) -> bool {
        self.origin == Origin::Remote && self.styles.is_empty()
    }

    pub fn processing_complete(&self) -> bool {
        self.state == ProcessingState::Complete
    }

    /// Public identifier: the shortcode when set, otherwise the id.
    pub fn to_param(&self) -> String {
        match self.shortcode.as_deref() {
            Some(shortcode) if !shortcode.trim().is_empty() => shortcode.to_string(),
            _ => self.id.to_string(),
        }
    }

    pub fn style(&self, name: StyleName) -> Option<&StyleOutput> {
        self.styles.iter().find(|style| style.name == name)
    }

    pub fn original(&self) -> Option<&StyleOutput> {
        self.style(StyleName::Original)
    }

    /// Raster thumbnail, if the kind produced one.
    pub fn thumbnail(&self) -> Option<&StyleOutput> {
        self.style(StyleName::Small)
    }

    pub fn file_name(&self) -> Option<&str> {
        self.original().map(|style| style.file_name.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.original().map(|style| style.content_type.as_str())
    }
}
