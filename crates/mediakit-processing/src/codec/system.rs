//! Codec adapter backed by the local toolchain
//!
//! Still rasters (JPEG, PNG, GIF, WebP) are handled in-process by the `image`
//! crate on blocking threads. Everything else, time-based media and HEIF/AVIF
//! stills, goes through ffmpeg/ffprobe. Both paths run under the configured
//! timeout and share one semaphore bounding concurrent codec work.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use mediakit_core::{CodecError, ProcessingConfig};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::ffmpeg::{mp3_args, mp4_args, still_frame_args, Ffmpeg};
use super::image_ops;
use super::{CodecAdapter, Container, Geometry, Probe};

#[derive(Clone)]
pub struct SystemCodec {
    ffmpeg: Ffmpeg,
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl SystemCodec {
    pub fn new(config: &ProcessingConfig) -> Self {
        Self {
            ffmpeg: Ffmpeg::new(
                config.ffmpeg_path.clone(),
                config.ffprobe_path.clone(),
                config.codec_timeout,
            ),
            permits: Arc::new(Semaphore::new(config.max_concurrent_transcodes)),
            timeout: config.codec_timeout,
        }
    }

    async fn permit(&self) -> Result<OwnedSemaphorePermit, CodecError> {
        self.permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| CodecError::UnexpectedOutput("codec semaphore closed".to_string()))
    }

    /// Run CPU-bound image work on a blocking thread under the timeout.
    async fn blocking<T, F>(&self, operation: &'static str, f: F) -> Result<T, CodecError>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, CodecError> + Send + 'static,
    {
        let permit = self.permit().await?;
        // The permit lives as long as the blocking work, even past a timeout.
        let task = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            f()
        });
        match tokio::time::timeout(self.timeout, task).await {
            Ok(joined) => joined
                .map_err(|e| CodecError::Decode(format!("{} task failed: {}", operation, e)))?,
            Err(_) => Err(CodecError::Timeout {
                operation,
                after: self.timeout,
            }),
        }
    }

    async fn ffprobe(&self, data: &Bytes) -> Result<(Probe, bool), CodecError> {
        let _permit = self.permit().await?;
        self.ffmpeg.probe(data).await
    }

    /// Remux or re-encode into MP4, deciding from the source probe.
    async fn transcode_mp4(&self, data: &Bytes, source: &Probe) -> Result<Bytes, CodecError> {
        let _permit = self.permit().await?;
        self.ffmpeg
            .convert("transcode_mp4", data, "mp4", |input, output| {
                mp4_args(input, output, source)
            })
            .await
    }
}

#[async_trait]
impl CodecAdapter for SystemCodec {
    async fn probe(&self, data: Bytes) -> Result<Probe, CodecError> {
        if image_ops::still_format(&data).is_some() {
            return self.blocking("probe", move || image_ops::probe(&data)).await;
        }
        self.ffprobe(&data).await.map(|(probe, _)| probe)
    }

    async fn resize(&self, data: Bytes, geometry: Geometry) -> Result<Bytes, CodecError> {
        if image_ops::still_format(&data).is_none() {
            return Err(CodecError::Decode(
                "resize needs a JPEG, PNG, GIF or WebP still".to_string(),
            ));
        }
        self.blocking("resize", move || image_ops::resize(&data, geometry))
            .await
            .map(Bytes::from)
    }

    async fn transcode(&self, data: Bytes, target: Container) -> Result<Bytes, CodecError> {
        if target.is_still_image() && image_ops::still_format(&data).is_some() {
            return self
                .blocking("transcode", move || image_ops::convert(&data, target))
                .await
                .map(Bytes::from);
        }

        match target {
            Container::Mp4 => {
                let (source, _) = self.ffprobe(&data).await?;
                self.transcode_mp4(&data, &source).await
            }
            Container::Mp3 => {
                let _permit = self.permit().await?;
                self.ffmpeg
                    .convert("transcode_mp3", &data, "mp3", mp3_args)
                    .await
            }
            Container::Png => {
                let _permit = self.permit().await?;
                self.ffmpeg
                    .convert("extract_frame", &data, "png", |input, output| {
                        still_frame_args(input, output, "png")
                    })
                    .await
            }
            Container::Jpeg => {
                let _permit = self.permit().await?;
                self.ffmpeg
                    .convert("normalize_jpeg", &data, "jpeg", |input, output| {
                        still_frame_args(input, output, "mjpeg")
                    })
                    .await
            }
            Container::Gif | Container::Webp => Err(CodecError::Encode(format!(
                "cannot produce {} from this source",
                target.extension()
            ))),
        }
    }

    async fn transcode_probed(
        &self,
        data: Bytes,
        target: Container,
        probe: &Probe,
    ) -> Result<Bytes, CodecError> {
        match target {
            Container::Mp4 => self.transcode_mp4(&data, probe).await,
            _ => self.transcode(data, target).await,
        }
    }

    async fn extract_embedded_image(&self, data: Bytes) -> Result<Option<Bytes>, CodecError> {
        let (_, has_cover_art) = self.ffprobe(&data).await?;
        if !has_cover_art {
            return Ok(None);
        }

        let _permit = self.permit().await?;
        self.ffmpeg
            .convert("extract_cover_art", &data, "png", |input, output| {
                still_frame_args(input, output, "png")
            })
            .await
            .map(Some)
    }

    async fn dominant_color(&self, data: Bytes) -> Result<String, CodecError> {
        self.blocking("dominant_color", move || image_ops::dominant_color(&data))
            .await
    }
}
