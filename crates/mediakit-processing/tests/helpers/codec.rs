use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use mediakit_core::{CodecError, ProcessingConfig};
use mediakit_processing::{CodecAdapter, Container, Geometry, Probe, SystemCodec};

use super::fixtures;

/// Codec that answers time-based work from a script and hands every still
/// operation to the real in-process image codec.
pub struct ScriptedCodec {
    stills: SystemCodec,
    pub video_probe: Probe,
    pub audio_probe: Probe,
    pub cover_art: Option<Bytes>,
    pub fail_transcode: AtomicBool,
    /// Fail frame extraction from video sources, after `thumbnail_delay`
    pub fail_thumbnail: bool,
    pub thumbnail_delay: Duration,
    /// Time an MP4 transcode takes
    pub mp4_delay: Duration,
    pub transcodes: AtomicUsize,
}

impl ScriptedCodec {
    pub fn new() -> Self {
        let config = ProcessingConfig {
            ffmpeg_path: "mediakit-test-no-ffmpeg".to_string(),
            ffprobe_path: "mediakit-test-no-ffprobe".to_string(),
            ..ProcessingConfig::default()
        };

        Self {
            stills: SystemCodec::new(&config),
            video_probe: Probe {
                width: Some(600),
                height: Some(400),
                duration: Some(3.0),
                frame_rate: Some("1/1".to_string()),
                video_codec: Some("h264".to_string()),
                pixel_format: Some("yuv420p".to_string()),
                container: Some("mov,mp4,m4a,3gp,3g2,mj2".to_string()),
                bitrate: Some(9_500),
                ..Probe::default()
            },
            audio_probe: Probe {
                duration: Some(0.235102),
                audio_codec: Some("mp3".to_string()),
                container: Some("mp3".to_string()),
                bitrate: Some(128_000),
                ..Probe::default()
            },
            cover_art: None,
            fail_transcode: AtomicBool::new(false),
            fail_thumbnail: false,
            thumbnail_delay: Duration::ZERO,
            mp4_delay: Duration::ZERO,
            transcodes: AtomicUsize::new(0),
        }
    }

    pub fn with_cover_art(mut self, cover: Bytes) -> Self {
        self.cover_art = Some(cover);
        self
    }

    pub fn with_video_probe(mut self, probe: Probe) -> Self {
        self.video_probe = probe;
        self
    }

    pub fn failing(self) -> Self {
        self.fail_transcode.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_thumbnail(mut self, after: Duration) -> Self {
        self.fail_thumbnail = true;
        self.thumbnail_delay = after;
        self
    }

    pub fn with_mp4_delay(mut self, delay: Duration) -> Self {
        self.mp4_delay = delay;
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl CodecAdapter for ScriptedCodec {
    async fn probe(&self, data: Bytes) -> Result<Probe, CodecError> {
        match Container::sniff(&data) {
            Some(Container::Mp4) => Ok(self.video_probe.clone()),
            Some(Container::Mp3) => Ok(self.audio_probe.clone()),
            _ => self.stills.probe(data).await,
        }
    }

    async fn resize(&self, data: Bytes, geometry: Geometry) -> Result<Bytes, CodecError> {
        self.stills.resize(data, geometry).await
    }

    async fn transcode(&self, data: Bytes, target: Container) -> Result<Bytes, CodecError> {
        self.transcodes.fetch_add(1, Ordering::SeqCst);

        if self.fail_transcode.load(Ordering::SeqCst) && !target.is_still_image() {
            return Err(CodecError::CommandFailed {
                program: "ffmpeg".to_string(),
                stderr: "Invalid data found when processing input".to_string(),
            });
        }

        match (Container::sniff(&data), target) {
            (_, Container::Mp4) => {
                tokio::time::sleep(self.mp4_delay).await;
                Ok(fixtures::mp4())
            }
            (_, Container::Mp3) => Ok(fixtures::mp3()),
            (Some(Container::Mp4), Container::Png) if self.fail_thumbnail => {
                tokio::time::sleep(self.thumbnail_delay).await;
                Err(CodecError::CommandFailed {
                    program: "ffmpeg".to_string(),
                    stderr: "Output file is empty, nothing was encoded".to_string(),
                })
            }
            (Some(Container::Mp4), Container::Png) => Ok(fixtures::png(
                self.video_probe.width.unwrap_or(600),
                self.video_probe.height.unwrap_or(400),
            )),
            _ => self.stills.transcode(data, target).await,
        }
    }

    async fn extract_embedded_image(&self, data: Bytes) -> Result<Option<Bytes>, CodecError> {
        match Container::sniff(&data) {
            Some(Container::Mp3) => Ok(self.cover_art.clone()),
            _ => Ok(None),
        }
    }

    async fn dominant_color(&self, data: Bytes) -> Result<String, CodecError> {
        self.stills.dominant_color(data).await
    }
}
