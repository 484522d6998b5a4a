//! QRMINT command-line entrypoint

use anyhow::Context;
use clap::Parser;
use qrmint::output::{render_banner, render_summary};
use qrmint::progress::{LogProgress, ProgressReporter, TerminalProgress};
use qrmint::{QrmintConfig, logging, run};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "qrmint",
    version,
    about = "Generate unique redemption codes as print-ready QR images"
)]
struct Cli {
    /// Optional configuration file (toml/yaml). Defaults to qrmint.{toml,yaml} in cwd/XDG config.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of unique codes to generate
    #[arg(long, value_name = "N")]
    total: Option<usize>,

    /// Fixed leading substring of every code
    #[arg(long, value_name = "PREFIX")]
    prefix: Option<String>,

    /// Total code length including the prefix
    #[arg(long, value_name = "N")]
    length: Option<usize>,

    /// Seed for a reproducible code sequence
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Image width/height in pixels
    #[arg(long, value_name = "PX")]
    size: Option<u32>,

    /// Image format / file extension (png, jpg, bmp, ...)
    #[arg(long, value_name = "EXT")]
    format: Option<String>,

    /// Error correction level (L, M, Q or H)
    #[arg(long, value_name = "LEVEL")]
    error_correction: Option<String>,

    /// Quiet zone around each symbol, in modules
    #[arg(long, value_name = "N")]
    margin: Option<u32>,

    /// Directory receiving the images
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Manifest file path
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Number of images rendered concurrently
    #[arg(long, value_name = "N")]
    batch_size: Option<usize>,

    /// Decode every image after rendering to confirm its payload
    #[arg(long)]
    verify: bool,

    /// Print the final report as JSON instead of human-readable text
    #[arg(long)]
    json: bool,

    /// Log progress instead of drawing a progress bar
    #[arg(long)]
    no_progress: bool,
}

impl Cli {
    fn apply(&self, config: &mut QrmintConfig) {
        if let Some(total) = self.total {
            config.codes.total_codes = total;
        }
        if let Some(ref prefix) = self.prefix {
            config.codes.prefix = prefix.clone();
        }
        if let Some(length) = self.length {
            config.codes.code_length = length;
        }
        if let Some(seed) = self.seed {
            config.codes.seed = Some(seed);
        }
        if let Some(size) = self.size {
            config.image.size = size;
        }
        if let Some(ref format) = self.format {
            config.image.format = format.clone();
        }
        if let Some(ref level) = self.error_correction {
            config.image.error_correction = level.clone();
        }
        if let Some(margin) = self.margin {
            config.image.margin = margin;
        }
        if self.verify {
            config.image.verify = true;
        }
        if let Some(ref output) = self.output {
            config.output.folder = output.clone();
        }
        if let Some(ref csv) = self.csv {
            config.output.csv_file = csv.clone();
        }
        if let Some(batch_size) = self.batch_size {
            config.output.batch_size = batch_size;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match generate(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("\nFatal error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

async fn generate(cli: Cli) -> anyhow::Result<()> {
    let mut config = QrmintConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);

    logging::init(&config.logging)?;
    match config.source() {
        Some(path) => tracing::info!("Using configuration file: {}", path.display()),
        None => tracing::debug!("No qrmint.toml / qrmint.yaml found, using defaults"),
    }
    let settings = config.resolve().context("invalid configuration")?;

    if !cli.json {
        for line in render_banner(&settings) {
            println!("{line}");
        }
        println!();
    }

    let mut progress: Box<dyn ProgressReporter> = if cli.json || cli.no_progress {
        Box::new(LogProgress::default())
    } else {
        Box::new(TerminalProgress::default())
    };

    let summary = run::execute(&settings, &mut *progress)
        .await
        .context("code generation run aborted")?;

    let rendered = render_summary(&summary);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&rendered.json)?);
    } else {
        println!();
        for line in &rendered.human {
            println!("{line}");
        }
    }

    Ok(())
}
