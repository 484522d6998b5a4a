//! Error types for QRMINT operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using QRMINT's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for QRMINT operations
///
/// Every variant except the encode/decode helpers is fatal to a run. Per-code
/// render failures are reported through [`RenderError`] instead.
#[derive(Error, Debug)]
pub enum Error {
    /// The generator could not find a novel code within its attempt cap
    #[error(
        "Failed to generate unique code after {attempts} attempts ({issued} codes already issued)"
    )]
    ExhaustedRetries {
        /// Number of candidates tried before giving up
        attempts: usize,
        /// Size of the code set at the time of failure
        issued: usize,
    },

    /// The output directory could not be created
    #[error("Failed to create output directory {}: {source}", .path.display())]
    DirectoryProvision {
        /// Directory that was being provisioned
        path: PathBuf,
        /// Underlying filesystem error
        #[source]
        source: std::io::Error,
    },

    /// The manifest file could not be written
    #[error("Failed to write manifest {}: {message}", .path.display())]
    ManifestWrite {
        /// Manifest destination
        path: PathBuf,
        /// Underlying failure description
        message: String,
    },

    /// QR code encoding failed
    #[error("Failed to encode QR code: {0}")]
    QrEncode(String),

    /// QR code decoding failed
    #[error("Failed to decode QR code: {0}")]
    QrDecode(String),

    /// No QR code found in image
    #[error("No QR code found in image")]
    NoQrCodeFound,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image processing error
    #[error("Image processing error: {0}")]
    Image(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Failure to produce the image for a single code.
///
/// Recovered by the batch pipeline: it is counted, never propagated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Error generating QR for {code}: {message}")]
pub struct RenderError {
    /// Code whose image failed
    pub code: String,
    /// Underlying failure description
    pub message: String,
}

impl RenderError {
    /// Create a render error for `code`
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Other(format!("JSON error: {}", e))
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Other(format!("CSV error: {}", e))
    }
}
