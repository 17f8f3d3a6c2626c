//! Shared key generation for storage backends.
//!
//! Key format: `media_attachments/files/{id partition}/{style}/{file name}`.

use mediakit_core::constants::STORAGE_PREFIX;
use mediakit_core::{AttachmentId, StyleName};

/// Generate the storage key for one style of an attachment.
///
/// All backends must use this format for consistency.
pub fn style_key(id: AttachmentId, style: StyleName, file_name: &str) -> String {
    format!(
        "{}/{}/{}/{}",
        STORAGE_PREFIX,
        id.partition(),
        style.as_str(),
        file_name
    )
}
