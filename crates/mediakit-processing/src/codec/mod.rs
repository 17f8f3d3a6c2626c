//! Codec adapter
//!
//! Thin capability interface over the decode/encode toolchain. The pipeline
//! only sequences these calls; it never touches pixels or streams itself.

mod ffmpeg;
mod image_ops;
mod system;

use async_trait::async_trait;
use bytes::Bytes;
use mediakit_core::CodecError;
use serde::{Deserialize, Serialize};

pub use ffmpeg::Ffmpeg;
pub use image_ops::{decode_rgba, dominant_color};
pub use system::SystemCodec;

/// Facts probed from a blob. Fields the blob does not carry stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Probe {
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Seconds
    pub duration: Option<f64>,
    /// Rational string as reported by the prober, e.g. `"30000/1001"`
    pub frame_rate: Option<String>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub pixel_format: Option<String>,
    pub bitrate: Option<u64>,
    /// Demuxer name(s), e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`
    pub container: Option<String>,
    /// Number of frames, when cheap to know
    pub frame_count: Option<u32>,
}

impl Probe {
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
            _ => None,
        }
    }

    /// Frame rate as a number; `None` for `"0/0"` or unparsable values.
    pub fn frame_rate_value(&self) -> Option<f64> {
        parse_rational(self.frame_rate.as_deref()?)
    }

    pub fn has_video(&self) -> bool {
        self.video_codec.is_some()
    }
}

pub(crate) fn parse_rational(value: &str) -> Option<f64> {
    match value.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                None
            } else {
                Some(num / den)
            }
        }
        None => value.trim().parse().ok(),
    }
}

/// Target size of a resize. Never upscales.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    /// Scale so that `width * height` fits the pixel budget, aspect preserved
    MaxPixels(u64),
    /// Scale to fit inside the box, aspect preserved
    Fit { width: u32, height: u32 },
}

impl Geometry {
    /// Output dimensions for a `width x height` source.
    pub fn apply(&self, width: u32, height: u32) -> (u32, u32) {
        if width == 0 || height == 0 {
            return (width, height);
        }

        let scale = match *self {
            Geometry::MaxPixels(max) => {
                let pixels = u64::from(width) * u64::from(height);
                if pixels <= max {
                    return (width, height);
                }
                (max as f64 / pixels as f64).sqrt()
            }
            Geometry::Fit {
                width: max_w,
                height: max_h,
            } => {
                if width <= max_w && height <= max_h {
                    return (width, height);
                }
                (f64::from(max_w) / f64::from(width)).min(f64::from(max_h) / f64::from(height))
            }
        };

        let scaled = |side: u32| ((f64::from(side) * scale).round() as u32).clamp(1, side);
        (scaled(width), scaled(height))
    }
}

/// Output container of a transcode. Every extension the pipeline emits comes
/// from this list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    Mp4,
    Mp3,
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl Container {
    pub const ALL: [Container; 6] = [
        Container::Mp4,
        Container::Mp3,
        Container::Png,
        Container::Jpeg,
        Container::Gif,
        Container::Webp,
    ];

    pub fn content_type(&self) -> &'static str {
        match self {
            Container::Mp4 => "video/mp4",
            Container::Mp3 => "audio/mpeg",
            Container::Png => "image/png",
            Container::Jpeg => "image/jpeg",
            Container::Gif => "image/gif",
            Container::Webp => "image/webp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Container::Mp4 => "mp4",
            Container::Mp3 => "mp3",
            Container::Png => "png",
            Container::Jpeg => "jpeg",
            Container::Gif => "gif",
            Container::Webp => "webp",
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        Container::ALL
            .into_iter()
            .find(|container| container.content_type() == mime)
    }

    /// Container of already-produced bytes, by magic bytes.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        crate::classifier::sniff_mime(data).and_then(Container::from_mime)
    }

    pub fn is_still_image(&self) -> bool {
        matches!(
            self,
            Container::Png | Container::Jpeg | Container::Gif | Container::Webp
        )
    }

    pub(crate) fn image_format(&self) -> Option<image::ImageFormat> {
        match self {
            Container::Png => Some(image::ImageFormat::Png),
            Container::Jpeg => Some(image::ImageFormat::Jpeg),
            Container::Gif => Some(image::ImageFormat::Gif),
            Container::Webp => Some(image::ImageFormat::WebP),
            Container::Mp4 | Container::Mp3 => None,
        }
    }
}

/// External decode/encode capability.
///
/// Implementations must be safe to call concurrently; any pooling or
/// serialisation of the underlying toolchain happens behind this trait.
#[async_trait]
pub trait CodecAdapter: Send + Sync {
    /// Dimensions, duration, frame rate and stream facts of a blob.
    async fn probe(&self, data: Bytes) -> Result<Probe, CodecError>;

    /// Re-encode a still image in its own format, scaled to `geometry`.
    async fn resize(&self, data: Bytes, geometry: Geometry) -> Result<Bytes, CodecError>;

    /// Convert a blob into `target`. Still targets take the first frame.
    async fn transcode(&self, data: Bytes, target: Container) -> Result<Bytes, CodecError>;

    /// `transcode` for a blob whose probe the caller already holds.
    async fn transcode_probed(
        &self,
        data: Bytes,
        target: Container,
        _probe: &Probe,
    ) -> Result<Bytes, CodecError> {
        self.transcode(data, target).await
    }

    /// Embedded cover art, if the blob carries any.
    async fn extract_embedded_image(&self, data: Bytes) -> Result<Option<Bytes>, CodecError>;

    /// Dominant color of a still image as `#rrggbb`.
    async fn dominant_color(&self, data: Bytes) -> Result<String, CodecError>;
}
