//! Shared fixtures for facade tests.

use image::{ImageFormat, RgbImage};
use std::io::Cursor;

/// Encode a gradient image of the given size as PNG.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png)
        .expect("encode png");
    bytes.into_inner()
}
