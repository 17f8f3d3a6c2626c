//! Serving MIME table check
//!
//! The file server maps extensions to content types on its own. Every
//! extension the pipeline can emit must map back to the content type the
//! pipeline sniffed, otherwise files would be served with the wrong type.

use std::collections::HashMap;

use mediakit_core::AttachmentError;

use crate::codec::Container;

#[derive(Debug, Clone, Default)]
pub struct MimeTable {
    /// Deployment-specific entries that take precedence over `mime_guess`
    overrides: HashMap<String, String>,
}

impl MimeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(mut self, extension: &str, content_type: &str) -> Self {
        self.overrides
            .insert(extension.to_ascii_lowercase(), content_type.to_string());
        self
    }

    pub fn lookup(&self, extension: &str) -> Option<String> {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        self.overrides.get(&extension).cloned().or_else(|| {
            mime_guess::from_ext(&extension)
                .first_raw()
                .map(str::to_string)
        })
    }

    /// Fails with a configuration error on the first emitted extension that
    /// resolves to a different (or no) content type.
    pub fn verify(&self) -> Result<(), AttachmentError> {
        for container in Container::ALL {
            let extension = container.extension();
            match self.lookup(extension) {
                Some(content_type) if content_type == container.content_type() => {}
                found => {
                    return Err(AttachmentError::Configuration(format!(
                        "serving MIME table maps .{} to {:?}, expected {}",
                        extension,
                        found,
                        container.content_type()
                    )));
                }
            }
        }
        Ok(())
    }
}
