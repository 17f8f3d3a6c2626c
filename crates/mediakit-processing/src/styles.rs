//! Style pipeline definitions
//!
//! One table keyed by media kind lists the styles each kind produces and the
//! codec steps that render each of them from the (prepared) source.

use bytes::Bytes;
use mediakit_core::constants::{
    AUDIO_THUMBNAIL_MAX_PIXELS, IMAGE_ORIGINAL_MAX_PIXELS, IMAGE_SMALL_MAX_PIXELS,
    VIDEO_THUMBNAIL_MAX_HEIGHT, VIDEO_THUMBNAIL_MAX_WIDTH,
};
use mediakit_core::{CodecError, MediaKind, StyleName};

use crate::codec::{CodecAdapter, Container, Geometry, Probe};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Transcode(Container),
    Resize(Geometry),
    /// Continue with the embedded cover art; no art means no style
    ExtractEmbeddedImage,
}

#[derive(Debug, Clone, Copy)]
pub struct StyleDefinition {
    pub name: StyleName,
    pub steps: &'static [Step],
    /// Raster thumbnail that feeds blurhash and the dominant color
    pub thumbnail: bool,
}

const IMAGE_STYLES: &[StyleDefinition] = &[
    StyleDefinition {
        name: StyleName::Original,
        steps: &[Step::Resize(Geometry::MaxPixels(IMAGE_ORIGINAL_MAX_PIXELS))],
        thumbnail: false,
    },
    StyleDefinition {
        name: StyleName::Small,
        steps: &[Step::Resize(Geometry::MaxPixels(IMAGE_SMALL_MAX_PIXELS))],
        thumbnail: true,
    },
];

const MOVING_PICTURE_STYLES: &[StyleDefinition] = &[
    StyleDefinition {
        name: StyleName::Original,
        steps: &[Step::Transcode(Container::Mp4)],
        thumbnail: false,
    },
    StyleDefinition {
        name: StyleName::Small,
        steps: &[
            Step::Transcode(Container::Png),
            Step::Resize(Geometry::Fit {
                width: VIDEO_THUMBNAIL_MAX_WIDTH,
                height: VIDEO_THUMBNAIL_MAX_HEIGHT,
            }),
        ],
        thumbnail: true,
    },
];

const AUDIO_STYLES: &[StyleDefinition] = &[
    StyleDefinition {
        name: StyleName::Original,
        steps: &[Step::Transcode(Container::Mp3)],
        thumbnail: false,
    },
    StyleDefinition {
        name: StyleName::Small,
        steps: &[
            Step::ExtractEmbeddedImage,
            Step::Transcode(Container::Png),
            Step::Resize(Geometry::MaxPixels(AUDIO_THUMBNAIL_MAX_PIXELS)),
        ],
        thumbnail: true,
    },
];

/// Styles produced for `kind`, in pipeline order. Empty for `Unknown`.
pub fn styles_for(kind: MediaKind) -> &'static [StyleDefinition] {
    match kind {
        MediaKind::Image => IMAGE_STYLES,
        MediaKind::Gifv | MediaKind::Video => MOVING_PICTURE_STYLES,
        MediaKind::Audio => AUDIO_STYLES,
        MediaKind::Unknown => &[],
    }
}

/// Container a still source must be normalised to before styling, for
/// formats browsers cannot be relied on to display (HEIF, AVIF).
pub fn normalization_target(kind: MediaKind, source: &[u8]) -> Option<Container> {
    if kind == MediaKind::Image && Container::sniff(source).is_none() {
        Some(Container::Jpeg)
    } else {
        None
    }
}

/// Run a style's steps. `Ok(None)` when an optional input (cover art) is absent.
///
/// `source_probe` describes `source` and is handed to a leading transcode so
/// the codec does not probe the same bytes again.
pub async fn render(
    codec: &dyn CodecAdapter,
    definition: &StyleDefinition,
    source: Bytes,
    source_probe: Option<&Probe>,
) -> Result<Option<Bytes>, CodecError> {
    let mut data = source;
    for (index, step) in definition.steps.iter().enumerate() {
        data = match *step {
            Step::Transcode(container) => match source_probe.filter(|_| index == 0) {
                Some(probe) => codec.transcode_probed(data, container, probe).await?,
                None => codec.transcode(data, container).await?,
            },
            Step::Resize(geometry) => codec.resize(data, geometry).await?,
            Step::ExtractEmbeddedImage => match codec.extract_embedded_image(data).await? {
                Some(image) => image,
                None => return Ok(None),
            },
        };
    }
    Ok(Some(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_starts_with_original() {
        for kind in [
            MediaKind::Image,
            MediaKind::Gifv,
            MediaKind::Video,
            MediaKind::Audio,
        ] {
            let styles = styles_for(kind);
            assert_eq!(styles[0].name, StyleName::Original);
            assert_eq!(styles.iter().filter(|s| s.thumbnail).count(), 1);
        }
        assert!(styles_for(MediaKind::Unknown).is_empty());
    }

    #[test]
    fn test_moving_picture_small_style_is_still_png() {
        let small = &styles_for(MediaKind::Gifv)[1];
        assert_eq!(small.steps[0], Step::Transcode(Container::Png));
    }

    #[test]
    fn test_normalization_only_for_non_web_stills() {
        let mut heif = vec![0, 0, 0, 0x18];
        heif.extend_from_slice(b"ftypheic");
        heif.extend_from_slice(&[0; 16]);
        assert_eq!(
            normalization_target(MediaKind::Image, &heif),
            Some(Container::Jpeg)
        );

        let png = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
        assert_eq!(normalization_target(MediaKind::Image, png), None);
        assert_eq!(normalization_target(MediaKind::Video, &heif), None);
    }
}
