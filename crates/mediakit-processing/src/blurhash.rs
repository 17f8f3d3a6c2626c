//! Perceptual hash stage
//!
//! Blurhash of the thumbnail style, from a small downscaled RGBA sample.

use bytes::Bytes;
use mediakit_core::constants::{BLURHASH_X_COMPONENTS, BLURHASH_Y_COMPONENTS};
use mediakit_core::CodecError;

use crate::codec::decode_rgba;

/// Size to downscale to before computing blurhash.
const BLURHASH_SAMPLE_SIZE: u32 = 32;

/// Compute the blurhash of a still image. Deterministic for identical pixels.
pub fn compute(data: &[u8]) -> Result<String, CodecError> {
    let (width, height, rgba) = decode_rgba(data, BLURHASH_SAMPLE_SIZE)?;
    blurhash::encode(
        BLURHASH_X_COMPONENTS,
        BLURHASH_Y_COMPONENTS,
        width,
        height,
        &rgba,
    )
    .map_err(|e| CodecError::Encode(format!("blurhash: {}", e)))
}

/// [`compute`] on a blocking thread.
pub async fn compute_async(data: Bytes) -> Result<String, CodecError> {
    tokio::task::spawn_blocking(move || compute(&data))
        .await
        .map_err(|e| CodecError::Encode(format!("blurhash task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn gradient(flip: bool) -> Vec<u8> {
        let img = RgbaImage::from_fn(120, 80, |x, y| {
            let v = if flip { 255 - (x * 2) as u8 } else { (x * 2) as u8 };
            Rgba([v, (y * 3) as u8, 128, 255])
        });
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut cursor, ImageFormat::Png)
            .unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_blurhash_is_36_characters() {
        assert_eq!(compute(&gradient(false)).unwrap().len(), 36);
    }

    #[test]
    fn test_blurhash_is_deterministic() {
        let data = gradient(false);
        assert_eq!(compute(&data).unwrap(), compute(&data).unwrap());
    }

    #[test]
    fn test_distinct_images_have_distinct_hashes() {
        assert_ne!(
            compute(&gradient(false)).unwrap(),
            compute(&gradient(true)).unwrap()
        );
    }

    #[tokio::test]
    async fn test_compute_async() {
        let hash = compute_async(Bytes::from(gradient(false))).await.unwrap();
        assert_eq!(hash.len(), 36);
    }
}
