use anyhow::{Context, Result};
use image::ImageFormat;
use std::io::Cursor;

/// Re-encodes an uploaded screenshot as an RGB PNG.
///
/// Uploads arrive as PNG, JPEG or WebP with or without alpha; the OCR service
/// is always sent the same format.
pub fn to_png(image_bytes: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(image_bytes).context("Failed to decode image")?;
    let rgb = img.to_rgb8();

    let mut output = Cursor::new(Vec::new());
    rgb.write_to(&mut output, ImageFormat::Png)
        .context("Failed to encode PNG")?;
    Ok(output.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    #[test]
    fn test_to_png_drops_alpha() {
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(4, 3, Rgba([10, 20, 30, 128]));
        let mut input = Cursor::new(Vec::new());
        img.write_to(&mut input, ImageFormat::Png).unwrap();

        let png = to_png(input.get_ref()).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
    }

    #[test]
    fn test_to_png_rejects_garbage() {
        assert!(to_png(b"definitely not an image").is_err());
    }
}
