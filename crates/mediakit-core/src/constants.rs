//! Processing limits and geometry constants.

/// Default ceiling for still image inputs, in bytes.
pub const DEFAULT_IMAGE_LIMIT: u64 = 16 * 1024 * 1024;

/// Default ceiling for gifv, video and audio inputs, in bytes.
pub const DEFAULT_VIDEO_LIMIT: u64 = 99 * 1024 * 1024;

/// Largest pixel matrix accepted for a time-based visual source (3840x2160).
pub const MAX_VIDEO_MATRIX_LIMIT: u64 = 8_294_400;

/// Highest frame rate accepted for a time-based visual source.
pub const MAX_VIDEO_FRAME_RATE: f64 = 120.0;

pub const MAX_DESCRIPTION_LENGTH: usize = 1500;

/// Pixel budget of the `original` style of a still image.
pub const IMAGE_ORIGINAL_MAX_PIXELS: u64 = 8_294_400;

/// Pixel budget of the `small` style of a still image (640x360 class).
pub const IMAGE_SMALL_MAX_PIXELS: u64 = 230_400;

/// Bounding box of the still thumbnail extracted from gifv and video.
pub const VIDEO_THUMBNAIL_MAX_WIDTH: u32 = 640;
pub const VIDEO_THUMBNAIL_MAX_HEIGHT: u32 = 640;

/// Pixel budget of cover art extracted from audio (480x400 class).
pub const AUDIO_THUMBNAIL_MAX_PIXELS: u64 = 192_000;

/// Blurhash component counts; 4x4 yields a 36 character signature.
pub const BLURHASH_X_COMPONENTS: u32 = 4;
pub const BLURHASH_Y_COMPONENTS: u32 = 4;

/// Root of every storage key produced for attachment styles.
pub const STORAGE_PREFIX: &str = "media_attachments/files";
