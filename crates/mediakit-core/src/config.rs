//! Configuration module
//!
//! Processing configuration is built once (from the environment or in code)
//! and handed to the validator, codec and storage factory at construction.
//! Nothing reads limits from ambient global state, so tests override them by
//! building their own `ProcessingConfig`.

use std::env;
use std::time::Duration;

use crate::constants::{DEFAULT_IMAGE_LIMIT, DEFAULT_VIDEO_LIMIT};
use crate::storage_types::StorageBackend;

const CODEC_TIMEOUT_SECS: u64 = 120;
const MAX_CONCURRENT_TRANSCODES: usize = 2;

/// Media processing configuration
#[derive(Clone, Debug)]
pub struct ProcessingConfig {
    /// Ceiling in bytes for still images (`IMAGE_LIMIT`)
    pub image_limit: u64,
    /// Ceiling in bytes for gifv, video and audio (`VIDEO_LIMIT`)
    pub video_limit: u64,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// Upper bound for a single codec invocation
    pub codec_timeout: Duration,
    /// Number of ffmpeg/ffprobe processes allowed to run at once
    pub max_concurrent_transcodes: usize,
    pub storage_backend: StorageBackend,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            image_limit: DEFAULT_IMAGE_LIMIT,
            video_limit: DEFAULT_VIDEO_LIMIT,
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            codec_timeout: Duration::from_secs(CODEC_TIMEOUT_SECS),
            max_concurrent_transcodes: MAX_CONCURRENT_TRANSCODES,
            storage_backend: StorageBackend::Local,
            local_storage_path: None,
            local_storage_base_url: None,
        }
    }
}

impl ProcessingConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse::<StorageBackend>()?,
            Err(_) => StorageBackend::Local,
        };

        let config = ProcessingConfig {
            image_limit: env::var("IMAGE_LIMIT")
                .unwrap_or_else(|_| DEFAULT_IMAGE_LIMIT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("IMAGE_LIMIT must be a number of bytes"))?,
            video_limit: env::var("VIDEO_LIMIT")
                .unwrap_or_else(|_| DEFAULT_VIDEO_LIMIT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("VIDEO_LIMIT must be a number of bytes"))?,
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            codec_timeout: Duration::from_secs(parse_count(
                "CODEC_TIMEOUT_SECS",
                env::var("CODEC_TIMEOUT_SECS").ok(),
                CODEC_TIMEOUT_SECS,
            )?),
            max_concurrent_transcodes: parse_count(
                "MAX_CONCURRENT_TRANSCODES",
                env::var("MAX_CONCURRENT_TRANSCODES").ok(),
                MAX_CONCURRENT_TRANSCODES,
            )?,
            storage_backend,
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Same configuration with different size ceilings.
    pub fn with_limits(mut self, image_limit: u64, video_limit: u64) -> Self {
        self.image_limit = image_limit;
        self.video_limit = video_limit;
        self
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.image_limit == 0 || self.video_limit == 0 {
            return Err(anyhow::anyhow!(
                "IMAGE_LIMIT and VIDEO_LIMIT must be greater than zero"
            ));
        }

        if self.codec_timeout.is_zero() {
            return Err(anyhow::anyhow!("CODEC_TIMEOUT_SECS must be greater than zero"));
        }

        if self.max_concurrent_transcodes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_CONCURRENT_TRANSCODES must be greater than zero"
            ));
        }

        for (name, path) in [
            ("FFMPEG_PATH", &self.ffmpeg_path),
            ("FFPROBE_PATH", &self.ffprobe_path),
        ] {
            validate_executable_path(path)
                .map_err(|reason| anyhow::anyhow!("{} is invalid: {}", name, reason))?;
        }

        Ok(())
    }
}

/// Parse a numeric setting, falling back to `default` only when it is unset.
fn parse_count<T: std::str::FromStr>(
    name: &str,
    value: Option<String>,
    default: T,
) -> Result<T, anyhow::Error> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a whole number, got {:?}", name, raw)),
    }
}

/// Reject executable paths carrying shell metacharacters or traversal.
fn validate_executable_path(path: &str) -> Result<(), String> {
    if path.trim().is_empty() {
        return Err("path is empty".to_string());
    }

    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(format!("contains dangerous characters: {}", path));
    }

    if path.contains("..") {
        return Err(format!("contains directory traversal: {}", path));
    }

    Ok(())
}
