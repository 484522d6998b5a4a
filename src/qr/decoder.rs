//! QR code decoder using rqrr

use crate::error::{Error, Result};
use image::{DynamicImage, GrayImage};

/// QR code decoder used to check rendered output
pub struct QrDecoder {}

impl QrDecoder {
    /// Create a new QR decoder with default settings
    pub fn new() -> Self {
        Self {}
    }

    /// Decode the first QR code found in an image
    pub fn decode(&self, img: &DynamicImage) -> Result<String> {
        self.decode_gray(&img.to_luma8())
    }

    /// Decode the first QR code found in a grayscale image
    pub fn decode_gray(&self, img: &GrayImage) -> Result<String> {
        let mut prepared = rqrr::PreparedImage::prepare(img.clone());

        let grids = prepared.detect_grids();
        let grid = grids.first().ok_or(Error::NoQrCodeFound)?;

        match grid.decode() {
            Ok((meta, content)) => {
                tracing::trace!(
                    "Decoded QR: version={:?}, ecc_level={:?}, length={}",
                    meta.version,
                    meta.ecc_level,
                    content.len()
                );
                Ok(content)
            }
            Err(e) => Err(Error::QrDecode(format!("Decode failed: {:?}", e))),
        }
    }

    /// Decode `img` and require the payload to equal `expected` exactly.
    pub fn verify(&self, img: &DynamicImage, expected: &str) -> Result<()> {
        let decoded = self.decode(img)?;
        if decoded == expected {
            Ok(())
        } else {
            Err(Error::QrDecode(format!(
                "Payload mismatch: expected '{expected}', decoded '{decoded}'"
            )))
        }
    }
}

impl Default for QrDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_image_has_no_code() {
        let blank = DynamicImage::ImageLuma8(GrayImage::from_pixel(200, 200, image::Luma([255])));
        assert!(matches!(
            QrDecoder::new().decode(&blank),
            Err(Error::NoQrCodeFound)
        ));
    }

    #[test]
    fn test_verify_rejects_blank_image() {
        let blank = DynamicImage::ImageLuma8(GrayImage::from_pixel(200, 200, image::Luma([255])));
        assert!(QrDecoder::new().verify(&blank, "QRC12345").is_err());
    }
}
