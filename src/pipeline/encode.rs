//! Image encoding: rendered page → grayscale base64 PNG for the OCR request.
//!
//! Book scans carry no information in colour, and an 8-bit grayscale PNG is
//! roughly a third of the RGBA upload. PNG stays lossless so thin strokes
//! (commas, periods, the dot of an i) survive for the model.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a rasterised page for the OCR call.
pub fn encode_page(img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let gray = DynamicImage::ImageLuma8(img.to_luma8());
    let mut buf = Vec::new();
    gray.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!(
        "Encoded {}x{} page → {} bytes base64",
        gray.width(),
        gray.height(),
        b64.len()
    );

    Ok(ImageData::new(b64, "image/png").with_detail("high"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encodes_as_grayscale_png() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 4, Rgba([200, 10, 10, 255])));
        let data = encode_page(&img).expect("encode should succeed");
        assert_eq!(data.mime_type, "image/png");

        let decoded = STANDARD.decode(&data.data).expect("valid base64");
        let back = image::load_from_memory(&decoded).expect("valid png");
        assert_eq!((back.width(), back.height()), (8, 4));
        assert!(matches!(back, DynamicImage::ImageLuma8(_)));
    }
}
