//! mediakit core library
//!
//! Domain models, error taxonomy and configuration shared by the storage,
//! processing and CLI crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::ProcessingConfig;
pub use error::{
    AttachmentError, CodecError, ErrorMetadata, LogLevel, ValidationError, ValidationErrorKind,
};
pub use models::{
    Attachment, AttachmentId, AttachmentMetadata, BlobRef, Colors, Focus, MediaKind, Origin,
    ProcessingState, StyleMeta, StyleName, StyleOutput,
};
pub use storage_types::StorageBackend;
