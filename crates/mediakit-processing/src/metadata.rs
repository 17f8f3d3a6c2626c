//! Metadata assembler
//!
//! Builds one [`StyleMeta`] per produced style from the probe of that style's
//! output. Duration and frame rate fall back to the source probe when the
//! output does not report them.

use mediakit_core::{AttachmentMetadata, Colors, Focus, MediaKind, StyleMeta, StyleName};

use crate::codec::Probe;

pub fn style_meta(
    kind: MediaKind,
    name: StyleName,
    output: &Probe,
    source: Option<&Probe>,
) -> StyleMeta {
    let mut meta = match output.dimensions() {
        Some((width, height)) => StyleMeta::with_dimensions(width, height),
        None => StyleMeta::default(),
    };

    if kind.is_time_based() && name == StyleName::Original {
        meta.duration = output.duration.or_else(|| source.and_then(|s| s.duration));
        if kind.is_moving_picture() {
            meta.frame_rate = output
                .frame_rate
                .clone()
                .or_else(|| source.and_then(|s| s.frame_rate.clone()));
        }
        meta.bitrate = output.bitrate;
    }

    meta
}

pub fn assemble(
    styles: Vec<(StyleName, StyleMeta)>,
    background: Option<String>,
    focus: Option<Focus>,
) -> AttachmentMetadata {
    AttachmentMetadata {
        styles: styles.into_iter().collect(),
        colors: background.map(|background| Colors { background }),
        focus,
    }
}
