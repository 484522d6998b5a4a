//! QRMINT - offline batch generator of unique redemption codes as QR images
//!
//! One run issues a fixed number of distinct codes (a constant prefix plus a
//! random `[A-Z0-9]` suffix), renders each one as a print-ready QR image and
//! records them all in a `code,generated_at` manifest.
//!
//! # Features
//!
//! - **Unique codes**: duplicate rejection over the random keyspace with a
//!   bounded retry cap
//! - **Bounded concurrency**: images are rendered in fixed-size batches on
//!   Tokio's blocking pool
//! - **Partial failure**: a broken image is counted, never fatal
//! - **Reproducible**: an optional seed fixes the code sequence
//!
//! # Example
//!
//! ```no_run
//! use qrmint::progress::NoProgress;
//! use qrmint::{QrmintConfig, run};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = QrmintConfig::default();
//!     config.codes.total_codes = 500;
//!
//!     let settings = config.resolve()?;
//!     let summary = run::execute(&settings, &mut NoProgress).await?;
//!
//!     println!("{} images, {} failures", summary.render.succeeded, summary.render.failed());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]

pub mod code;
pub mod config;
pub mod error;
pub mod layout;
pub mod logging;
pub mod manifest;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod qr;
pub mod run;

// Re-exports for convenience
pub use error::{Error, RenderError, Result};

pub use code::{Code, CodeFormat, CodeGenerator, CodeSet, CodeSetBuilder, RandomTokens, TokenSource};
pub use config::{
    CodeOptions, ImageOptions, LogRotation, LoggingOptions, OutputOptions, QrmintConfig,
    RunSettings,
};
pub use pipeline::{BatchPipeline, RenderReport};
pub use qr::{ErrorCorrection, ImageRenderer, QrDecoder, QrRenderer, RenderOptions};
pub use run::RunSummary;
