//! Error types module
//!
//! Every attachment pipeline run ends in exactly one outcome: a complete
//! record or one `AttachmentError`. The variants follow the failure classes
//! the pipeline distinguishes:
//!
//! - `Validation`: rejected input (missing, oversized, unknown type, bad
//!   description or focus). Surfaced synchronously, never persisted.
//! - `Codec`: probe/resize/transcode failure, including timeouts. Aborts the
//!   whole attachment.
//! - `Configuration`: an emitted extension the serving MIME table does not
//!   recognise. Fatal at deployment or test time.
//! - `Storage`: the storage backend failed while committing or destroying.

use std::time::Duration;

use crate::models::ProcessingState;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Describes how an error should be presented to collaborators (API layer,
/// job scheduler) without them matching on every variant.
pub trait ErrorMetadata {
    /// HTTP-class status code the API collaborator should map this to
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "VALIDATION_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether re-running the pipeline on the same input may succeed
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// A rejected attachment field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field} {kind}")]
pub struct ValidationError {
    pub field: &'static str,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(field: &'static str, kind: ValidationErrorKind) -> Self {
        Self { field, kind }
    }

    /// Validation failure on the `file` field.
    pub fn file(kind: ValidationErrorKind) -> Self {
        Self::new("file", kind)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationErrorKind {
    #[error("can't be blank")]
    Blank,

    #[error("must be less than {limit} bytes (got {size} bytes)")]
    TooLarge { size: u64, limit: u64 },

    #[error("has an unsupported media type")]
    UnsupportedType,

    #[error("exceeds the maximum video matrix of {limit} pixels ({width}x{height})")]
    VideoMatrixTooLarge { width: u32, height: u32, limit: u64 },

    #[error("exceeds the maximum frame rate of {limit} fps ({frame_rate} fps)")]
    FrameRateTooHigh { frame_rate: f64, limit: f64 },

    #[error("is too long (maximum is {max} characters, got {length})")]
    TooLong { length: usize, max: usize },

    #[error("must be two comma-separated coordinates between -1.0 and 1.0")]
    InvalidFocus,

    #[error("is not a valid base64 data URI")]
    MalformedDataUri,
}

/// Failure of the external codec capability.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Failed to decode media: {0}")]
    Decode(String),

    #[error("Failed to encode media: {0}")]
    Encode(String),

    #[error("{program} failed: {stderr}")]
    CommandFailed { program: String, stderr: String },

    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Unexpected codec output: {0}")]
    UnexpectedOutput(String),

    #[error("Codec IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Media processing failed: {0}")]
    Codec(#[from] CodecError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidState {
        from: ProcessingState,
        to: ProcessingState,
    },
}

impl AttachmentError {
    /// Field a validation failure is attached to, if this is one.
    pub fn validation_field(&self) -> Option<&'static str> {
        match self {
            AttachmentError::Validation(err) => Some(err.field),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AttachmentError::Validation(_))
    }

    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &'static str {
        match self {
            AttachmentError::Validation(_) => "Validation",
            AttachmentError::Codec(_) => "Codec",
            AttachmentError::Configuration(_) => "Configuration",
            AttachmentError::Storage(_) => "Storage",
            AttachmentError::InvalidState { .. } => "InvalidState",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, log_level).
fn attachment_error_static_metadata(err: &AttachmentError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AttachmentError::Validation(_) => (422, "VALIDATION_FAILED", false, LogLevel::Debug),
        AttachmentError::Codec(CodecError::Timeout { .. }) => {
            (422, "PROCESSING_TIMEOUT", false, LogLevel::Warn)
        }
        AttachmentError::Codec(_) => (422, "PROCESSING_FAILED", false, LogLevel::Warn),
        AttachmentError::Configuration(_) => (500, "CONFIGURATION_ERROR", false, LogLevel::Error),
        AttachmentError::Storage(_) => (500, "STORAGE_ERROR", true, LogLevel::Error),
        AttachmentError::InvalidState { .. } => (500, "INVALID_STATE", false, LogLevel::Error),
    }
}

impl ErrorMetadata for AttachmentError {
    fn http_status_code(&self) -> u16 {
        attachment_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        attachment_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        attachment_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        attachment_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AttachmentError::Validation(err) => err.to_string(),
            AttachmentError::Codec(_) => "Failed to process media file".to_string(),
            AttachmentError::Configuration(_) => "Internal server error".to_string(),
            AttachmentError::Storage(_) => "Failed to access storage".to_string(),
            AttachmentError::InvalidState { .. } => "Internal server error".to_string(),
        }
    }
}
