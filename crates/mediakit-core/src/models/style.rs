use std::fmt;

use serde::{Deserialize, Serialize};

/// Named derivative produced from a single input.
///
/// Ordering follows the pipeline: `original` always precedes `small`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleName {
    Original,
    Small,
}

impl StyleName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleName::Original => "original",
            StyleName::Small => "small",
        }
    }
}

impl fmt::Display for StyleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage reference to a produced file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlobRef {
    /// Backend key (`media_attachments/files/...`)
    pub key: String,
    /// Public URL the serving layer exposes the blob under
    pub url: String,
}

/// One stored derivative of an attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleOutput {
    pub name: StyleName,
    pub blob: BlobRef,
    /// Generated storage name (`<token>.<extension>`)
    pub file_name: String,
    /// Sniffed from the produced bytes
    pub content_type: String,
    pub extension: String,
    pub size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub aspect: Option<f64>,
    /// Seconds, time-based media only
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub duration: Option<f64>,
    /// Rational string as reported by the prober (e.g. `"1/1"`)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub frame_rate: Option<String>,
}
