use std::fmt;

use serde::{Deserialize, Serialize};

/// Classified media type of an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    /// Animated raster image, served as a silent looping video
    Gifv,
    Video,
    Audio,
    Unknown,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Gifv => "gifv",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Unknown => "unknown",
        }
    }

    /// Kinds measured against `VIDEO_LIMIT` instead of `IMAGE_LIMIT`.
    pub fn is_larger_media(&self) -> bool {
        matches!(self, MediaKind::Gifv | MediaKind::Video | MediaKind::Audio)
    }

    pub fn is_time_based(&self) -> bool {
        self.is_larger_media()
    }

    /// Time-based kinds that carry a picture (probed for matrix and frame rate).
    pub fn is_moving_picture(&self) -> bool {
        matches!(self, MediaKind::Gifv | MediaKind::Video)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
