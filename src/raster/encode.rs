//! PNG and base64 encoding for rendered pages.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat};

/// Encode a rendered page as PNG.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

/// Standard (padded) base64 of arbitrary bytes.
#[inline]
pub fn to_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}
