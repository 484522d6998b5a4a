//! QR code rendering and verification
//!
//! This module turns a [`Code`](crate::code::Code) into a print-ready image
//! on disk and can decode the result back to confirm the payload survived.

mod decoder;
mod renderer;

pub use decoder::QrDecoder;
pub use renderer::{ImageRenderer, MAX_IMAGE_SIZE, MAX_MARGIN, QrRenderer, RenderOptions};

use image::Rgb;
use std::fmt;
use std::str::FromStr;

/// Symbol damage tolerance tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCorrection {
    /// Recovers about 7% damage
    Low,
    /// Recovers about 15% damage
    Medium,
    /// Recovers about 25% damage
    Quartile,
    /// Recovers about 30% damage
    High,
}

impl ErrorCorrection {
    /// Parse a tier from its letter (`L`, `M`, `Q`, `H`) or name, case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "l" | "low" => Some(Self::Low),
            "m" | "medium" => Some(Self::Medium),
            "q" | "quartile" => Some(Self::Quartile),
            "h" | "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Approximate share of the symbol that may be damaged, in percent
    pub fn recovery_percent(self) -> u8 {
        match self {
            Self::Low => 7,
            Self::Medium => 15,
            Self::Quartile => 25,
            Self::High => 30,
        }
    }

    pub(crate) fn ec_level(self) -> qrcode::EcLevel {
        match self {
            Self::Low => qrcode::EcLevel::L,
            Self::Medium => qrcode::EcLevel::M,
            Self::Quartile => qrcode::EcLevel::Q,
            Self::High => qrcode::EcLevel::H,
        }
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::Low => "L",
            Self::Medium => "M",
            Self::Quartile => "Q",
            Self::High => "H",
        };
        f.write_str(letter)
    }
}

impl FromStr for ErrorCorrection {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| {
            format!("Unsupported error correction level '{value}', expected L, M, Q or H")
        })
    }
}

/// Parse a `#RRGGBB` color.
pub fn parse_color(value: &str) -> Option<Rgb<u8>> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(Rgb([channel(0..2)?, channel(2..4)?, channel(4..6)?]))
}
