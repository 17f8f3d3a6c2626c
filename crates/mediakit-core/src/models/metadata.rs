use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::style::StyleName;

/// `width / height` rounded to one decimal place.
pub fn round_aspect(width: u32, height: u32) -> f64 {
    let ratio = f64::from(width) / f64::from(height);
    (ratio * 10.0).round() / 10.0
}

/// Probed facts about one style. Absent fields are omitted, never zeroed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StyleMeta {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub height: Option<u32>,
    /// `"WxH"`
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub aspect: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub frame_rate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bitrate: Option<u64>,
}

impl StyleMeta {
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            size: Some(format!("{}x{}", width, height)),
            aspect: Some(round_aspect(width, height)),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Colors {
    /// `#rrggbb`
    pub background: String,
}

/// Focal point for cropping, both coordinates in `[-1.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Focus {
    pub x: f64,
    pub y: f64,
}

impl Focus {
    /// Parse `"x,y"`. Returns `None` for anything malformed or out of range.
    pub fn parse(value: &str) -> Option<Self> {
        let (x, y) = value.split_once(',')?;
        let x: f64 = x.trim().parse().ok()?;
        let y: f64 = y.trim().parse().ok()?;

        let in_range = |v: f64| v.is_finite() && (-1.0..=1.0).contains(&v);
        if in_range(x) && in_range(y) {
            Some(Self { x, y })
        } else {
            None
        }
    }
}

/// Assembled metadata document.
///
/// Serialized flat: one key per style plus top-level `colors` and `focus`,
/// e.g. `{"original": {...}, "small": {...}, "colors": {"background": "#..."}}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AttachmentMetadata {
    #[serde(flatten)]
    pub styles: BTreeMap<StyleName, StyleMeta>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub colors: Option<Colors>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub focus: Option<Focus>,
}

impl AttachmentMetadata {
    pub fn style(&self, name: StyleName) -> Option<&StyleMeta> {
        self.styles.get(&name)
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty() && self.colors.is_none() && self.focus.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_aspect() {
        assert_eq!(round_aspect(600, 400), 1.5);
        assert_eq!(round_aspect(588, 392), 1.5);
        assert_eq!(round_aspect(640, 360), 1.8);
        assert_eq!(round_aspect(400, 600), 0.7);
    }

    #[test]
    fn test_style_meta_with_dimensions() {
        let meta = StyleMeta::with_dimensions(600, 400);
        assert_eq!(meta.size.as_deref(), Some("600x400"));
        assert_eq!(meta.aspect, Some(1.5));
        assert!(meta.duration.is_none());
    }

    #[test]
    fn test_focus_parse() {
        assert_eq!(Focus::parse("0.5,-0.25"), Some(Focus { x: 0.5, y: -0.25 }));
        assert_eq!(Focus::parse(" 1 , -1 "), Some(Focus { x: 1.0, y: -1.0 }));
        assert_eq!(Focus::parse("1.5,0"), None);
        assert_eq!(Focus::parse("0.5"), None);
        assert_eq!(Focus::parse("a,b"), None);
        assert_eq!(Focus::parse("NaN,0"), None);
    }

    #[test]
    fn test_metadata_serializes_flat_and_omits_absent_fields() {
        let mut metadata = AttachmentMetadata::default();
        metadata
            .styles
            .insert(StyleName::Original, StyleMeta::with_dimensions(600, 400));
        metadata
            .styles
            .insert(StyleName::Small, StyleMeta::with_dimensions(588, 392));
        metadata.colors = Some(Colors {
            background: "#0a0b0c".to_string(),
        });

        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(value["original"]["width"], 600);
        assert_eq!(value["small"]["size"], "588x392");
        assert_eq!(value["colors"]["background"], "#0a0b0c");
        assert!(value["original"].get("duration").is_none());
        assert!(value.get("focus").is_none());
    }

    #[test]
    fn test_metadata_deserializes_from_flat_document() {
        let json = r##"{
            "original": {"width": 640, "height": 360, "size": "640x360", "aspect": 1.8,
                         "duration": 3.0, "frame_rate": "1/1"},
            "colors": {"background": "#ffffff"}
        }"##;
        let metadata: AttachmentMetadata = serde_json::from_str(json).unwrap();
        let original = metadata.style(StyleName::Original).unwrap();
        assert_eq!(original.frame_rate.as_deref(), Some("1/1"));
        assert!(metadata.style(StyleName::Small).is_none());
        assert_eq!(metadata.colors.unwrap().background, "#ffffff");
    }
}
