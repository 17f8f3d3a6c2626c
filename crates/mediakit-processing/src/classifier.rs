//! Type classifier
//!
//! Assigns a [`MediaKind`] from the bytes alone. The declared content type is
//! an untrusted hint and only ever shows up in logs.

use std::io::Cursor;

use image::codecs::gif::GifDecoder;
use image::codecs::png::PngDecoder;
use image::AnimationDecoder;
use mediakit_core::MediaKind;

/// Sniff the MIME type of `data` from its magic bytes.
pub fn sniff_mime(data: &[u8]) -> Option<&'static str> {
    infer::get(data).map(|kind| kind.mime_type())
}

/// Classify `data` into a media kind.
///
/// Pure and idempotent: the same bytes always yield the same kind.
pub fn classify(data: &[u8], declared_content_type: Option<&str>) -> MediaKind {
    let sniffed = sniff_mime(data);

    let kind = match sniffed {
        Some("image/gif") | Some("image/png") => {
            if is_animated(data) {
                MediaKind::Gifv
            } else {
                MediaKind::Image
            }
        }
        Some("image/jpeg") | Some("image/webp") | Some("image/avif") | Some("image/heif") => {
            MediaKind::Image
        }
        Some("video/mp4") | Some("video/quicktime") | Some("video/webm") | Some("video/x-m4v") => {
            MediaKind::Video
        }
        Some("audio/mpeg") | Some("audio/ogg") | Some("audio/x-flac") | Some("audio/x-wav")
        | Some("audio/m4a") | Some("audio/aac") | Some("audio/opus") => MediaKind::Audio,
        _ => MediaKind::Unknown,
    };

    if let Some(declared) = declared_content_type {
        if sniffed.is_some_and(|mime| !declared.eq_ignore_ascii_case(mime)) {
            tracing::debug!(
                declared_content_type = %declared,
                sniffed_content_type = ?sniffed,
                kind = %kind,
                "Declared content type does not match sniffed type"
            );
        }
    }

    kind
}

/// More than one frame in a GIF or APNG.
fn is_animated(data: &[u8]) -> bool {
    match sniff_mime(data) {
        Some("image/gif") => GifDecoder::new(Cursor::new(data))
            .map(|decoder| decoder.into_frames().take(2).count() > 1)
            .unwrap_or(false),
        Some("image/png") => {
            let Ok(decoder) = PngDecoder::new(Cursor::new(data)) else {
                return false;
            };
            if !decoder.is_apng().unwrap_or(false) {
                return false;
            }
            decoder
                .apng()
                .map(|apng| apng.into_frames().take(2).count() > 1)
                .unwrap_or(false)
        }
        _ => false,
    }
}
