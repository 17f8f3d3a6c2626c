//! Data models for attachments
//!
//! The `Attachment` record ties together the classified media kind, the
//! produced styles and the assembled metadata document.

mod attachment;
mod id;
mod media_kind;
mod metadata;
mod state;
mod style;

pub use attachment::{Attachment, Origin};
pub use id::AttachmentId;
pub use media_kind::MediaKind;
pub use metadata::{round_aspect, AttachmentMetadata, Colors, Focus, StyleMeta};
pub use state::ProcessingState;
pub use style::{BlobRef, StyleName, StyleOutput};
