use std::io::Cursor;

use bytes::Bytes;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

/// Two-tone test card so resizing and color sampling have something to chew on.
fn card(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, _| {
        if x < width * 3 / 4 {
            Rgba([38, 140, 217, 255])
        } else {
            Rgba([250, 250, 250, 255])
        }
    })
}

pub fn still(format: ImageFormat, width: u32, height: u32) -> Bytes {
    let image = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, _| {
            if x < width * 3 / 4 {
                Rgb([38, 140, 217])
            } else {
                Rgb([250, 250, 250])
            }
        })),
        _ => DynamicImage::ImageRgba8(card(width, height)),
    };

    if format == ImageFormat::Gif {
        return gif_frames(&[image.to_rgba8()]);
    }

    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, format).expect("encode fixture");
    Bytes::from(cursor.into_inner())
}

pub fn png(width: u32, height: u32) -> Bytes {
    still(ImageFormat::Png, width, height)
}

pub fn jpeg(width: u32, height: u32) -> Bytes {
    still(ImageFormat::Jpeg, width, height)
}

fn gif_frames(frames: &[RgbaImage]) -> Bytes {
    let mut buffer = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut buffer);
        encoder.set_repeat(Repeat::Infinite).expect("gif repeat");
        for image in frames {
            let frame = Frame::from_parts(image.clone(), 0, 0, Delay::from_numer_denom_ms(1000, 1));
            encoder.encode_frame(frame).expect("encode gif frame");
        }
    }
    Bytes::from(buffer)
}

/// Three-frame 600x400 GIF.
pub fn animated_gif() -> Bytes {
    let first = card(600, 400);
    let second = RgbaImage::from_pixel(600, 400, Rgba([200, 30, 30, 255]));
    let third = RgbaImage::from_pixel(600, 400, Rgba([30, 200, 30, 255]));
    gif_frames(&[first, second, third])
}

/// Two-frame 600x400 APNG.
pub fn apng() -> Bytes {
    let (width, height) = (600, 400);
    let first = card(width, height).into_raw();
    let second = RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255])).into_raw();

    let mut buffer = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buffer, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_animated(2, 0).expect("apng header");
        encoder.set_frame_delay(1, 1).expect("apng delay");
        let mut writer = encoder.write_header().expect("apng write header");
        writer.write_image_data(&first).expect("apng frame 1");
        writer.write_image_data(&second).expect("apng frame 2");
        writer.finish().expect("apng finish");
    }
    Bytes::from(buffer)
}

/// Container magic only. Probing and transcoding go through the scripted codec.
pub fn mp4() -> Bytes {
    let mut data = vec![0x00, 0x00, 0x00, 0x18];
    data.extend_from_slice(b"ftypmp42");
    data.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
    data.extend_from_slice(b"mp42isom");
    data.resize(256, 0);
    Bytes::from(data)
}

pub fn mp3() -> Bytes {
    let mut data = b"ID3\x03\x00\x00\x00\x00\x00\x00".to_vec();
    data.extend_from_slice(&[0xFF, 0xFB, 0x90, 0x64]);
    data.resize(256, 0);
    Bytes::from(data)
}

pub fn cover_art() -> Bytes {
    png(600, 600)
}
