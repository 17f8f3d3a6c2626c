//! mediakit Processing Library
//!
//! The attachment pipeline: type classification, validation, per-type style
//! rendering through a codec adapter, metadata assembly, blurhash, naming and
//! the orchestrating [`AttachmentService`].

pub mod blurhash;
pub mod classifier;
pub mod codec;
pub mod input;
pub mod metadata;
pub mod mime;
pub mod naming;
pub mod service;
pub mod styles;
pub mod validator;

// Re-export commonly used types
pub use classifier::{classify, sniff_mime};
pub use codec::{CodecAdapter, Container, Geometry, Probe, SystemCodec};
pub use input::{RawInput, SourceBlob};
pub use mime::MimeTable;
pub use service::{AttachmentService, NewAttachment};
pub use validator::AttachmentValidator;
