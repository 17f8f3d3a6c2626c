//! mediakit Storage Library
//!
//! Storage abstraction for produced attachment styles, with a local
//! filesystem backend and an in-process memory backend.
//!
//! # Storage key format
//!
//! `media_attachments/files/{id partition}/{style}/{file name}`, where the id
//! partition is the attachment id zero-padded to 18 digits in groups of three.
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::style_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use mediakit_core::StorageBackend;
pub use memory::MemoryStorage;
pub use traits::{Storage, StorageError, StorageResult};
