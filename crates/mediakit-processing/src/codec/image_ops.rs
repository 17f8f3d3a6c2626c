//! In-process still image operations on the `image` crate
//!
//! All functions here are CPU-bound and are called from `spawn_blocking`.

use std::collections::HashMap;
use std::io::Cursor;

use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, Frame, GenericImageView, ImageDecoder, ImageFormat, ImageReader, Limits};
use mediakit_core::CodecError;

use super::{Container, Geometry, Probe};

/// Maximum decoded width or height, guards against decompression bombs.
const MAX_IMAGE_DIMENSION: u32 = 16384;

const JPEG_QUALITY: u8 = 90;

/// Side of the sample the dominant color is computed from.
const COLOR_SAMPLE_SIZE: u32 = 64;

/// Format of a still raster the `image` crate handles natively.
pub(crate) fn still_format(data: &[u8]) -> Option<ImageFormat> {
    Container::sniff(data).and_then(|container| container.image_format())
}

/// Decode with EXIF orientation applied, so re-encoding without metadata
/// keeps the visual orientation.
pub(crate) fn decode(data: &[u8]) -> Result<(DynamicImage, ImageFormat), CodecError> {
    let format = still_format(data)
        .ok_or_else(|| CodecError::Decode("not a supported still image".to_string()))?;

    let mut reader = ImageReader::with_format(Cursor::new(data), format);
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_IMAGE_DIMENSION);
    limits.max_image_height = Some(MAX_IMAGE_DIMENSION);
    reader.limits(limits);

    let mut decoder = reader
        .into_decoder()
        .map_err(|e| CodecError::Decode(e.to_string()))?;
    let orientation = decoder
        .orientation()
        .map_err(|e| CodecError::Decode(e.to_string()))?;
    let mut img = DynamicImage::from_decoder(decoder).map_err(|e| CodecError::Decode(e.to_string()))?;
    img.apply_orientation(orientation);

    Ok((img, format))
}

pub(crate) fn probe(data: &[u8]) -> Result<Probe, CodecError> {
    let (img, _) = decode(data)?;
    let (width, height) = img.dimensions();
    Ok(Probe {
        width: Some(width),
        height: Some(height),
        frame_count: Some(1),
        ..Probe::default()
    })
}

/// Re-encode in the source format, scaled down to `geometry` if needed.
pub(crate) fn resize(data: &[u8], geometry: Geometry) -> Result<Vec<u8>, CodecError> {
    let (img, format) = decode(data)?;
    let (width, height) = img.dimensions();
    let (target_w, target_h) = geometry.apply(width, height);

    let img = if (target_w, target_h) == (width, height) {
        img
    } else {
        img.resize_exact(target_w, target_h, FilterType::Lanczos3)
    };

    tracing::debug!(
        source_width = width,
        source_height = height,
        width = target_w,
        height = target_h,
        format = ?format,
        "Resized still image"
    );

    encode(&img, format)
}

/// Re-encode a still image as `target` (first frame only).
pub(crate) fn convert(data: &[u8], target: Container) -> Result<Vec<u8>, CodecError> {
    let format = target
        .image_format()
        .ok_or_else(|| CodecError::Encode(format!("{:?} is not a still image format", target)))?;
    let (img, _) = decode(data)?;
    encode(&img, format)
}

fn encode(img: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, CodecError> {
    let mut buffer = Vec::new();
    let encode_err = |e: image::ImageError| CodecError::Encode(e.to_string());

    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
            DynamicImage::ImageRgb8(img.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(encode_err)?;
        }
        ImageFormat::Png => {
            img.write_with_encoder(PngEncoder::new(&mut buffer))
                .map_err(encode_err)?;
        }
        ImageFormat::WebP => {
            DynamicImage::ImageRgba8(img.to_rgba8())
                .write_with_encoder(WebPEncoder::new_lossless(&mut buffer))
                .map_err(encode_err)?;
        }
        ImageFormat::Gif => {
            let mut encoder = GifEncoder::new(&mut buffer);
            encoder
                .encode_frame(Frame::new(img.to_rgba8()))
                .map_err(encode_err)?;
        }
        other => {
            return Err(CodecError::Encode(format!(
                "unsupported output format {:?}",
                other
            )))
        }
    }

    Ok(buffer)
}

/// Decode a still image to RGBA, downscaled to fit `max_side`.
pub fn decode_rgba(data: &[u8], max_side: u32) -> Result<(u32, u32, Vec<u8>), CodecError> {
    let (img, _) = decode(data)?;
    let img = if img.width() > max_side || img.height() > max_side {
        img.resize(max_side, max_side, FilterType::Triangle)
    } else {
        img
    };
    let (width, height) = img.dimensions();
    Ok((width, height, img.to_rgba8().into_raw()))
}

/// Most common color of a still image as `#rrggbb`.
///
/// Pixels are bucketed on the top four bits of each channel; the fullest
/// bucket wins (ties go to the lowest bucket) and its pixels are averaged.
/// Transparent pixels are ignored unless the image has nothing else.
pub fn dominant_color(data: &[u8]) -> Result<String, CodecError> {
    let (_, _, rgba) = decode_rgba(data, COLOR_SAMPLE_SIZE)?;

    let pixels: Vec<&[u8]> = rgba.chunks_exact(4).collect();
    let opaque: Vec<&[u8]> = pixels.iter().copied().filter(|p| p[3] >= 128).collect();
    let sample = if opaque.is_empty() { pixels } else { opaque };

    if sample.is_empty() {
        return Err(CodecError::Decode("image has no pixels".to_string()));
    }

    let mut buckets: HashMap<u16, (u32, [u64; 3])> = HashMap::new();
    for p in &sample {
        let key = (u16::from(p[0] >> 4) << 8) | (u16::from(p[1] >> 4) << 4) | u16::from(p[2] >> 4);
        let entry = buckets.entry(key).or_insert((0, [0; 3]));
        entry.0 += 1;
        entry.1[0] += u64::from(p[0]);
        entry.1[1] += u64::from(p[1]);
        entry.1[2] += u64::from(p[2]);
    }

    let (count, sums) = buckets
        .iter()
        .max_by(|(ka, (ca, _)), (kb, (cb, _))| ca.cmp(cb).then(kb.cmp(ka)))
        .map(|(_, value)| *value)
        .ok_or_else(|| CodecError::Decode("image has no pixels".to_string()))?;

    let avg = |sum: u64| (sum as f64 / f64::from(count)).round() as u8;
    Ok(format!(
        "#{:02x}{:02x}{:02x}",
        avg(sums[0]),
        avg(sums[1]),
        avg(sums[2])
    ))
}
