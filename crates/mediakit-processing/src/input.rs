//! Raw attachment input
//!
//! Input arrives as uploaded bytes, a base64 `data:` URI, or a marker that
//! the bytes still have to be fetched from the remote URL.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use mediakit_core::{ValidationError, ValidationErrorKind};

#[derive(Debug, Clone)]
pub enum RawInput {
    /// Uploaded or fetched bytes. Both hints are untrusted.
    Bytes {
        data: Bytes,
        declared_content_type: Option<String>,
        file_name: Option<String>,
    },
    /// `data:<mime>;base64,<payload>`; the payload may contain line breaks
    DataUri(String),
    /// Bytes will be supplied later by the remote fetch collaborator
    PendingDownload,
}

impl RawInput {
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        RawInput::Bytes {
            data: data.into(),
            declared_content_type: None,
            file_name: None,
        }
    }

    pub fn upload(
        data: impl Into<Bytes>,
        declared_content_type: Option<String>,
        file_name: Option<String>,
    ) -> Self {
        RawInput::Bytes {
            data: data.into(),
            declared_content_type,
            file_name,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, RawInput::PendingDownload)
    }

    /// Resolve to the bytes to process. `None` for a pending download.
    pub fn into_source(self) -> Result<Option<SourceBlob>, ValidationError> {
        match self {
            RawInput::Bytes {
                data,
                declared_content_type,
                file_name,
            } => Ok(Some(SourceBlob {
                data,
                declared_content_type,
                file_name,
            })),
            RawInput::DataUri(uri) => decode_data_uri(&uri).map(Some),
            RawInput::PendingDownload => Ok(None),
        }
    }
}

/// Input bytes plus the caller's hints.
#[derive(Debug, Clone)]
pub struct SourceBlob {
    pub data: Bytes,
    pub declared_content_type: Option<String>,
    pub file_name: Option<String>,
}

impl SourceBlob {
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn decode_data_uri(uri: &str) -> Result<SourceBlob, ValidationError> {
    let malformed = || ValidationError::file(ValidationErrorKind::MalformedDataUri);

    let rest = uri.trim_start().strip_prefix("data:").ok_or_else(malformed)?;
    let (header, payload) = rest.split_once(',').ok_or_else(malformed)?;
    let mime = header.strip_suffix(";base64").ok_or_else(malformed)?;

    let payload: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let data = STANDARD.decode(payload.as_bytes()).map_err(|_| malformed())?;

    Ok(SourceBlob {
        data: Bytes::from(data),
        declared_content_type: if mime.is_empty() {
            None
        } else {
            Some(mime.to_string())
        },
        file_name: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_with_line_breaks() {
        let encoded = STANDARD.encode(b"hello attachment");
        let wrapped = format!("{}\n{}", &encoded[..8], &encoded[8..]);
        let input = RawInput::DataUri(format!("data:image/jpeg;base64,{}", wrapped));

        let source = input.into_source().unwrap().unwrap();
        assert_eq!(&source.data[..], b"hello attachment");
        assert_eq!(source.declared_content_type.as_deref(), Some("image/jpeg"));
        assert!(source.file_name.is_none());
    }

    #[test]
    fn test_data_uri_without_mime() {
        let uri = format!("data:;base64,{}", STANDARD.encode(b"x"));
        let source = RawInput::DataUri(uri).into_source().unwrap().unwrap();
        assert!(source.declared_content_type.is_none());
    }

    #[test]
    fn test_malformed_data_uri() {
        for uri in [
            "data:image/png,notbase64",
            "image/png;base64,AAAA",
            "data:image/png;base64,@@@@",
            "data:image/png;base64",
        ] {
            let err = RawInput::DataUri(uri.to_string()).into_source().unwrap_err();
            assert_eq!(err.field, "file");
            assert_eq!(err.kind, ValidationErrorKind::MalformedDataUri);
        }
    }

    #[test]
    fn test_pending_download_has_no_source() {
        assert!(RawInput::PendingDownload.into_source().unwrap().is_none());
    }
}
