//! QR image renderer

use crate::code::Code;
use crate::error::{Error, RenderError, Result};
use crate::qr::{ErrorCorrection, QrDecoder};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use qrcode::QrCode;
use std::path::Path;

/// Largest accepted image edge, in pixels
pub const MAX_IMAGE_SIZE: u32 = 4096;

/// Largest accepted quiet zone, in modules
pub const MAX_MARGIN: u32 = 64;

/// Renders one code to one image file.
///
/// Implementations must never fail past their own boundary: every outcome is
/// either `Ok(())` or a [`RenderError`] naming the code.
pub trait ImageRenderer: Send + Sync + 'static {
    /// Render `code` and write it to `destination`
    fn render(&self, code: &Code, destination: &Path) -> std::result::Result<(), RenderError>;
}

/// Fixed visual parameters shared by every image in a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Width and height of the output image in pixels
    pub size: u32,
    /// Encoded file format
    pub format: ImageFormat,
    /// Damage tolerance tier
    pub error_correction: ErrorCorrection,
    /// Quiet zone around the symbol, in modules
    pub margin: u32,
    /// Foreground color
    pub dark: Rgb<u8>,
    /// Background color
    pub light: Rgb<u8>,
    /// Decode every image after encoding and compare with the code
    pub verify: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            size: 600,
            format: ImageFormat::Png,
            error_correction: ErrorCorrection::High,
            margin: 2,
            dark: Rgb([0, 0, 0]),
            light: Rgb([255, 255, 255]),
            verify: false,
        }
    }
}

/// QR renderer backed by the `qrcode` encoder
pub struct QrRenderer {
    options: RenderOptions,
    decoder: QrDecoder,
}

impl QrRenderer {
    /// Create a renderer with the given visual parameters
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            decoder: QrDecoder::new(),
        }
    }

    /// Visual parameters in use
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Encode `payload` verbatim into an in-memory image.
    ///
    /// The symbol and its quiet zone are scaled by the largest whole number of
    /// pixels per module that fits in `size` and centred on a `size`-wide
    /// canvas. If a single pixel per module does not fit, the canvas grows,
    /// but never past [`MAX_IMAGE_SIZE`].
    pub fn encode(&self, payload: &str) -> Result<DynamicImage> {
        let code = QrCode::with_error_correction_level(
            payload.as_bytes(),
            self.options.error_correction.ec_level(),
        )
        .map_err(|e| Error::QrEncode(format!("Failed to create QR code: {}", e)))?;

        let modules = code.width() as u32;
        let (canvas, origin, scale) = self.geometry(modules)?;

        let mut image = RgbImage::from_pixel(canvas, canvas, self.options.light);
        for (index, color) in code.to_colors().iter().enumerate() {
            if *color != qrcode::Color::Dark {
                continue;
            }
            let x = origin + (index as u32 % modules) * scale;
            let y = origin + (index as u32 / modules) * scale;
            for dy in 0..scale {
                for dx in 0..scale {
                    image.put_pixel(x + dx, y + dy, self.options.dark);
                }
            }
        }

        Ok(DynamicImage::ImageRgb8(image))
    }

    /// Canvas edge, symbol origin and pixels per module for a symbol
    /// `modules` wide.
    fn geometry(&self, modules: u32) -> Result<(u32, u32, u32)> {
        let RenderOptions { size, margin, .. } = self.options;
        let oversized = || {
            Error::QrEncode(format!(
                "{modules}-module symbol with margin {margin} does not fit a \
                 {MAX_IMAGE_SIZE}px canvas"
            ))
        };

        let span = margin
            .checked_mul(2)
            .and_then(|quiet| quiet.checked_add(modules))
            .ok_or_else(oversized)?;
        let scale = (size / span).max(1);
        let drawn = span.checked_mul(scale).ok_or_else(oversized)?;
        let canvas = size.max(drawn);
        if canvas > MAX_IMAGE_SIZE {
            return Err(oversized());
        }
        let origin = (canvas - drawn) / 2 + margin * scale;
        Ok((canvas, origin, scale))
    }

    fn render_to_file(&self, code: &Code, destination: &Path) -> Result<()> {
        let image = self.encode(code.as_str())?;
        if self.options.verify {
            self.decoder.verify(&image, code.as_str())?;
        }
        image.save_with_format(destination, self.options.format)?;
        Ok(())
    }
}

impl ImageRenderer for QrRenderer {
    fn render(&self, code: &Code, destination: &Path) -> std::result::Result<(), RenderError> {
        self.render_to_file(code, destination).map_err(|err| {
            tracing::debug!(%code, path = %destination.display(), error = %err, "Render failed");
            RenderError::new(code.as_str(), err.to_string())
        })
    }
}
