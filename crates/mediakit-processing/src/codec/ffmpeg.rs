//! ffmpeg / ffprobe subprocess plumbing
//!
//! Blobs are written to a private temp directory, the tool runs against the
//! file under a timeout, and the output file is read back. The child is
//! killed if the timeout fires or the future is dropped.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use bytes::Bytes;
use mediakit_core::CodecError;
use serde::Deserialize;
use tokio::process::Command;

use super::Probe;

#[derive(Debug, Deserialize)]
struct FFprobeOutput {
    format: Option<FFprobeFormat>,
    streams: Option<Vec<FFprobeStream>>,
}

#[derive(Debug, Deserialize)]
struct FFprobeFormat {
    format_name: Option<String>,
    duration: Option<String>,
    bit_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FFprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    pix_fmt: Option<String>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    nb_frames: Option<String>,
    disposition: Option<FFprobeDisposition>,
}

#[derive(Debug, Deserialize)]
struct FFprobeDisposition {
    #[serde(default)]
    attached_pic: u8,
}

impl FFprobeStream {
    fn is_attached_pic(&self) -> bool {
        self.disposition
            .as_ref()
            .is_some_and(|d| d.attached_pic == 1)
    }

    fn is_type(&self, codec_type: &str) -> bool {
        self.codec_type.as_deref() == Some(codec_type)
    }
}

/// Parse `ffprobe -print_format json -show_format -show_streams` output.
///
/// Cover art shows up as a video stream flagged `attached_pic`; it is not
/// counted as picture content of the blob.
pub(crate) fn parse_probe(stdout: &[u8]) -> Result<(Probe, bool), CodecError> {
    let output: FFprobeOutput = serde_json::from_slice(stdout)
        .map_err(|e| CodecError::UnexpectedOutput(format!("Failed to parse ffprobe output: {}", e)))?;

    let streams = output.streams.unwrap_or_default();
    let video = streams
        .iter()
        .find(|s| s.is_type("video") && !s.is_attached_pic());
    let audio = streams.iter().find(|s| s.is_type("audio"));
    let has_cover_art = streams
        .iter()
        .any(|s| s.is_type("video") && s.is_attached_pic());

    let frame_rate = video.and_then(|s| {
        s.avg_frame_rate
            .as_deref()
            .filter(|rate| *rate != "0/0")
            .or(s.r_frame_rate.as_deref().filter(|rate| *rate != "0/0"))
            .map(str::to_string)
    });

    let format = output.format.as_ref();

    let probe = Probe {
        width: video.and_then(|s| s.width),
        height: video.and_then(|s| s.height),
        duration: format
            .and_then(|f| f.duration.as_deref())
            .and_then(|d| d.parse::<f64>().ok()),
        frame_rate,
        video_codec: video.and_then(|s| s.codec_name.clone()),
        audio_codec: audio.and_then(|s| s.codec_name.clone()),
        pixel_format: video.and_then(|s| s.pix_fmt.clone()),
        bitrate: format
            .and_then(|f| f.bit_rate.as_deref())
            .and_then(|b| b.parse::<u64>().ok()),
        container: format.and_then(|f| f.format_name.clone()),
        frame_count: video
            .and_then(|s| s.nb_frames.as_deref())
            .and_then(|n| n.parse::<u32>().ok()),
    };

    Ok((probe, has_cover_art))
}

/// Sources that can be remuxed into MP4 without re-encoding.
pub(crate) fn is_passthrough_eligible(probe: &Probe) -> bool {
    let mp4_family = probe
        .container
        .as_deref()
        .is_some_and(|c| c.split(',').any(|name| name == "mp4" || name == "mov"));

    mp4_family
        && probe.video_codec.as_deref() == Some("h264")
        && probe.pixel_format.as_deref() == Some("yuv420p")
        && matches!(probe.audio_codec.as_deref(), None | Some("aac"))
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Arguments turning `input` into a web-safe MP4 at `output`.
pub(crate) fn mp4_args(input: &Path, output: &Path, probe: &Probe) -> Vec<String> {
    let mut args = vec![
        "-y".to_string(),
        "-i".to_string(),
        path_arg(input),
        "-map_metadata".to_string(),
        "-1".to_string(),
    ];

    if is_passthrough_eligible(probe) {
        args.extend_from_slice(&["-c".to_string(), "copy".to_string()]);
    } else {
        args.extend_from_slice(&[
            "-c:v".to_string(),
            "libx264".to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-vf".to_string(),
            "scale='trunc(iw/2)*2:trunc(ih/2)*2'".to_string(),
            "-preset".to_string(),
            "veryfast".to_string(),
            "-crf".to_string(),
            "23".to_string(),
        ]);
        if probe.audio_codec.is_some() {
            args.extend_from_slice(&[
                "-c:a".to_string(),
                "aac".to_string(),
                "-b:a".to_string(),
                "192k".to_string(),
            ]);
        } else {
            args.push("-an".to_string());
        }
    }

    args.extend_from_slice(&[
        "-movflags".to_string(),
        "+faststart".to_string(),
        "-f".to_string(),
        "mp4".to_string(),
        path_arg(output),
    ]);
    args
}

pub(crate) fn mp3_args(input: &Path, output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        path_arg(input),
        "-vn".to_string(),
        "-map_metadata".to_string(),
        "-1".to_string(),
        "-c:a".to_string(),
        "libmp3lame".to_string(),
        "-q:a".to_string(),
        "2".to_string(),
        "-f".to_string(),
        "mp3".to_string(),
        path_arg(output),
    ]
}

/// First picture frame (or attached cover art) as a single still image.
pub(crate) fn still_frame_args(input: &Path, output: &Path, codec: &str) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        path_arg(input),
        "-an".to_string(),
        "-map".to_string(),
        "0:v:0".to_string(),
        "-frames:v".to_string(),
        "1".to_string(),
        "-c:v".to_string(),
        codec.to_string(),
        "-f".to_string(),
        "image2".to_string(),
        path_arg(output),
    ]
}

/// ffmpeg and ffprobe invocations with a shared timeout.
#[derive(Clone, Debug)]
pub struct Ffmpeg {
    ffmpeg_path: String,
    ffprobe_path: String,
    timeout: Duration,
}

impl Ffmpeg {
    pub fn new(ffmpeg_path: String, ffprobe_path: String, timeout: Duration) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
            timeout,
        }
    }

    /// Probe a blob, also reporting whether it carries cover art.
    #[tracing::instrument(skip(self, data), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe",
        size_bytes = data.len()
    ))]
    pub async fn probe(&self, data: &Bytes) -> Result<(Probe, bool), CodecError> {
        let workdir = tempfile::tempdir()?;
        let input = write_input(workdir.path(), data).await?;

        let args = vec![
            "-v".to_string(),
            "error".to_string(),
            "-print_format".to_string(),
            "json".to_string(),
            "-show_format".to_string(),
            "-show_streams".to_string(),
            path_arg(&input),
        ];
        let stdout = self.run(&self.ffprobe_path, "probe", &args).await?;
        parse_probe(&stdout)
    }

    /// Run ffmpeg with `build_args(input, output)` and read back the output.
    #[tracing::instrument(skip_all, fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = operation,
        size_bytes = data.len()
    ))]
    pub(crate) async fn convert<F>(
        &self,
        operation: &'static str,
        data: &Bytes,
        output_extension: &str,
        build_args: F,
    ) -> Result<Bytes, CodecError>
    where
        F: FnOnce(&Path, &Path) -> Vec<String>,
    {
        let workdir = tempfile::tempdir()?;
        let input = write_input(workdir.path(), data).await?;
        let output = workdir.path().join(format!("output.{}", output_extension));

        let args = build_args(&input, &output);
        self.run(&self.ffmpeg_path, operation, &args).await?;

        let produced = tokio::fs::read(&output).await?;
        if produced.is_empty() {
            return Err(CodecError::UnexpectedOutput(format!(
                "ffmpeg {} produced an empty file",
                operation
            )));
        }
        Ok(Bytes::from(produced))
    }

    async fn run(
        &self,
        program: &str,
        operation: &'static str,
        args: &[String],
    ) -> Result<Vec<u8>, CodecError> {
        let start = Instant::now();

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CodecError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(
                    operation = operation,
                    timeout_secs = self.timeout.as_secs(),
                    "Codec invocation timed out, child killed"
                );
                return Err(CodecError::Timeout {
                    operation,
                    after: self.timeout,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::error!(operation = operation, stderr = %stderr, "{} failed", program);
            return Err(CodecError::CommandFailed {
                program: program.to_string(),
                stderr,
            });
        }

        tracing::debug!(
            operation = operation,
            duration_ms = start.elapsed().as_millis(),
            "Codec invocation completed"
        );

        Ok(output.stdout)
    }
}

async fn write_input(dir: &Path, data: &Bytes) -> Result<PathBuf, CodecError> {
    let path = dir.join("input");
    tokio::fs::write(&path, data).await?;
    Ok(path)
}
