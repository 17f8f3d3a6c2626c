//! Attachment validator
//!
//! Size ceilings come from configuration at construction; nothing here reads
//! global state. Every rejection is a [`ValidationError`] on a named field.

use mediakit_core::constants::{MAX_DESCRIPTION_LENGTH, MAX_VIDEO_FRAME_RATE, MAX_VIDEO_MATRIX_LIMIT};
use mediakit_core::{Focus, MediaKind, ProcessingConfig, ValidationError, ValidationErrorKind};

use crate::codec::Probe;

#[derive(Debug, Clone)]
pub struct AttachmentValidator {
    image_limit: u64,
    video_limit: u64,
}

impl AttachmentValidator {
    pub fn new(image_limit: u64, video_limit: u64) -> Self {
        Self {
            image_limit,
            video_limit,
        }
    }

    pub fn from_config(config: &ProcessingConfig) -> Self {
        Self::new(config.image_limit, config.video_limit)
    }

    /// Ceiling for raw inputs of `kind`.
    pub fn limit_for(&self, kind: MediaKind) -> u64 {
        if kind.is_larger_media() {
            self.video_limit
        } else {
            self.image_limit
        }
    }

    /// Kind and raw size check, before any codec work.
    ///
    /// `Unknown` is rejected regardless of size.
    pub fn validate_file(&self, kind: MediaKind, size: u64) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::file(ValidationErrorKind::Blank));
        }

        if kind == MediaKind::Unknown {
            return Err(ValidationError::file(ValidationErrorKind::UnsupportedType));
        }

        let limit = self.limit_for(kind);
        if size > limit {
            return Err(ValidationError::file(ValidationErrorKind::TooLarge { size, limit }));
        }

        Ok(())
    }

    /// Pixel matrix and frame rate limits of a probed gifv/video source.
    pub fn validate_source_probe(&self, kind: MediaKind, probe: &Probe) -> Result<(), ValidationError> {
        if !kind.is_moving_picture() {
            return Ok(());
        }

        if let Some((width, height)) = probe.dimensions() {
            if u64::from(width) * u64::from(height) > MAX_VIDEO_MATRIX_LIMIT {
                return Err(ValidationError::file(ValidationErrorKind::VideoMatrixTooLarge {
                    width,
                    height,
                    limit: MAX_VIDEO_MATRIX_LIMIT,
                }));
            }
        }

        if let Some(frame_rate) = probe.frame_rate_value() {
            if frame_rate > MAX_VIDEO_FRAME_RATE {
                return Err(ValidationError::file(ValidationErrorKind::FrameRateTooHigh {
                    frame_rate,
                    limit: MAX_VIDEO_FRAME_RATE,
                }));
            }
        }

        Ok(())
    }

    pub fn validate_description(&self, description: Option<&str>) -> Result<(), ValidationError> {
        let Some(description) = description else {
            return Ok(());
        };

        let length = description.chars().count();
        if length > MAX_DESCRIPTION_LENGTH {
            return Err(ValidationError::new(
                "description",
                ValidationErrorKind::TooLong {
                    length,
                    max: MAX_DESCRIPTION_LENGTH,
                },
            ));
        }
        Ok(())
    }

    /// Parse an optional `"x,y"` focal point. Blank means none.
    pub fn validate_focus(&self, focus: Option<&str>) -> Result<Option<Focus>, ValidationError> {
        match focus.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => Focus::parse(value)
                .map(Some)
                .ok_or_else(|| ValidationError::new("focus", ValidationErrorKind::InvalidFocus)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_validator() -> AttachmentValidator {
        AttachmentValidator::new(1024, 4096)
    }

    #[test]
    fn test_limits_per_kind() {
        let validator = test_validator();
        assert_eq!(validator.limit_for(MediaKind::Image), 1024);
        assert_eq!(validator.limit_for(MediaKind::Gifv), 4096);
        assert_eq!(validator.limit_for(MediaKind::Video), 4096);
        assert_eq!(validator.limit_for(MediaKind::Audio), 4096);
    }

    #[test]
    fn test_validate_file_size() {
        let validator = test_validator();
        assert!(validator.validate_file(MediaKind::Image, 1024).is_ok());
        assert!(validator.validate_file(MediaKind::Video, 4096).is_ok());

        let err = validator.validate_file(MediaKind::Image, 1025).unwrap_err();
        assert_eq!(err.field, "file");
        assert_eq!(
            err.kind,
            ValidationErrorKind::TooLarge {
                size: 1025,
                limit: 1024
            }
        );

        let err = validator.validate_file(MediaKind::Video, 4097).unwrap_err();
        assert_eq!(err.field, "file");
    }

    #[test]
    fn test_unknown_rejected_regardless_of_size() {
        let validator = test_validator();
        let err = validator.validate_file(MediaKind::Unknown, 1).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::UnsupportedType);
    }

    #[test]
    fn test_empty_input_is_blank() {
        let err = test_validator().validate_file(MediaKind::Image, 0).unwrap_err();
        assert_eq!(err, ValidationError::file(ValidationErrorKind::Blank));
    }

    #[test]
    fn test_source_probe_limits() {
        let validator = test_validator();
        let probe = |w, h, rate: &str| Probe {
            width: Some(w),
            height: Some(h),
            frame_rate: Some(rate.to_string()),
            ..Probe::default()
        };

        assert!(validator
            .validate_source_probe(MediaKind::Video, &probe(3840, 2160, "60/1"))
            .is_ok());
        assert!(matches!(
            validator
                .validate_source_probe(MediaKind::Video, &probe(7680, 4320, "30/1"))
                .unwrap_err()
                .kind,
            ValidationErrorKind::VideoMatrixTooLarge { .. }
        ));
        assert!(matches!(
            validator
                .validate_source_probe(MediaKind::Gifv, &probe(600, 400, "240/1"))
                .unwrap_err()
                .kind,
            ValidationErrorKind::FrameRateTooHigh { .. }
        ));
        assert!(validator
            .validate_source_probe(MediaKind::Audio, &probe(7680, 4320, "240/1"))
            .is_ok());
    }

    #[test]
    fn test_description_length() {
        let validator = test_validator();
        assert!(validator.validate_description(None).is_ok());
        assert!(validator
            .validate_description(Some(&"é".repeat(1500)))
            .is_ok());
        let err = validator
            .validate_description(Some(&"a".repeat(1501)))
            .unwrap_err();
        assert_eq!(err.field, "description");
    }

    #[test]
    fn test_focus() {
        let validator = test_validator();
        assert_eq!(validator.validate_focus(None).unwrap(), None);
        assert_eq!(validator.validate_focus(Some("  ")).unwrap(), None);
        assert_eq!(
            validator.validate_focus(Some("0.5,-0.5")).unwrap(),
            Some(Focus { x: 0.5, y: -0.5 })
        );
        assert_eq!(
            validator.validate_focus(Some("2,0")).unwrap_err().field,
            "focus"
        );
    }
}
