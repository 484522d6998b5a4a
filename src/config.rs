//! QRMINT runtime configuration handling
//!
//! Values are layered: defaults, then an optional toml/yaml file, then
//! `QRMINT_*` environment variables. The binary applies CLI flags last. The
//! result is resolved once into typed values and never mutated afterwards.

use crate::code::{CodeFormat, DEFAULT_MILESTONE_INTERVAL};
use crate::error::{Error, Result};
use crate::layout::OutputLayout;
use crate::pipeline::DEFAULT_BATCH_SIZE;
use crate::qr::{ErrorCorrection, MAX_IMAGE_SIZE, MAX_MARGIN, RenderOptions, parse_color};
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration structure persisted to disk or environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QrmintConfig {
    /// Code generation parameters
    pub codes: CodeOptions,
    /// Image rendering parameters
    pub image: ImageOptions,
    /// Output locations and batching
    pub output: OutputOptions,
    /// Logging configuration
    pub logging: LoggingOptions,
    /// File the values were read from, if any
    #[serde(skip)]
    source: Option<PathBuf>,
}

impl QrmintConfig {
    /// Load configuration from an explicit path or fall back to discovered defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = match explicit_path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::discover_file()?,
        };
        let mut config = match path {
            Some(path) => Self {
                source: Some(path.clone()),
                ..Self::from_file(&path)?
            },
            None => Self::default(),
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// File the configuration was loaded from, or `None` for built-in defaults.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Attempt to locate a configuration file in common locations.
    fn discover_file() -> Result<Option<PathBuf>> {
        let cwd =
            env::current_dir().map_err(|e| Error::Config(format!("Failed to read cwd: {e}")))?;
        for candidate in ["qrmint.toml", "qrmint.yaml", "qrmint.yml"] {
            let path = cwd.join(candidate);
            if path.exists() {
                return Ok(Some(path));
            }
        }

        if let Some(xdg_config) = env::var_os("XDG_CONFIG_HOME") {
            let base = PathBuf::from(xdg_config).join("qrmint");
            for candidate in ["config.toml", "config.yaml"] {
                let path = base.join(candidate);
                if path.exists() {
                    return Ok(Some(path));
                }
            }
        }

        Ok(None)
    }

    /// Read configuration from a concrete file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
            .as_str()
        {
            "toml" => toml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse TOML {}: {e}", path.display()))
            }),
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse YAML {}: {e}", path.display()))
            }),
            other => Err(Error::Config(format!(
                "Unsupported config format '{}', expected toml/yaml",
                other
            ))),
        }
    }

    /// Apply environment variable overrides after file/default loading.
    fn apply_env_overrides(&mut self) {
        self.codes.apply_env_overrides();
        self.image.apply_env_overrides();
        self.output.apply_env_overrides();
        self.logging.apply_env_overrides();
    }

    /// Validate every option and produce the typed settings for one run.
    pub fn resolve(&self) -> Result<RunSettings> {
        let format = self.codes.to_code_format()?;
        let render = self.image.to_render_options()?;
        let layout = self.output.to_layout(&self.image.format)?;

        if let Some(keyspace) = format.keyspace() {
            if keyspace < self.codes.total_codes as u128 {
                tracing::warn!(
                    keyspace = %keyspace,
                    requested = self.codes.total_codes,
                    "Requested more codes than the format can express; generation will fail"
                );
            }
        }

        Ok(RunSettings {
            total_codes: self.codes.total_codes,
            format,
            seed: self.codes.seed,
            milestone_interval: self.codes.milestone_interval,
            render,
            layout,
            csv_file: self.output.csv_file.clone(),
            batch_size: self.output.batch_size,
        })
    }
}

/// Validated, immutable parameters of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Number of codes to issue
    pub total_codes: usize,
    /// Prefix and length shared by every code
    pub format: CodeFormat,
    /// Seed for reproducible generation
    pub seed: Option<u64>,
    /// Codes between generation milestones (0 disables)
    pub milestone_interval: usize,
    /// Visual parameters of every image
    pub render: RenderOptions,
    /// Image directory and naming
    pub layout: OutputLayout,
    /// Manifest destination
    pub csv_file: PathBuf,
    /// Maximum concurrent renders
    pub batch_size: usize,
}

/// Code generation options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeOptions {
    /// Number of unique codes to issue
    pub total_codes: usize,
    /// Constant leading substring of every code
    pub prefix: String,
    /// Total code length in characters, prefix included
    pub code_length: usize,
    /// Optional seed making the generated sequence reproducible
    pub seed: Option<u64>,
    /// Accepted codes between progress log lines (0 disables)
    pub milestone_interval: usize,
}

impl Default for CodeOptions {
    fn default() -> Self {
        Self {
            total_codes: 8000,
            prefix: "QRC".to_string(),
            code_length: 8,
            seed: None,
            milestone_interval: DEFAULT_MILESTONE_INTERVAL,
        }
    }
}

impl CodeOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(total) = env::var("QRMINT_TOTAL_CODES") {
            if let Ok(parsed) = total.parse::<usize>() {
                self.total_codes = parsed;
            }
        }
        if let Ok(prefix) = env::var("QRMINT_PREFIX") {
            self.prefix = prefix;
        }
        if let Ok(length) = env::var("QRMINT_CODE_LENGTH") {
            if let Ok(parsed) = length.parse::<usize>() {
                self.code_length = parsed;
            }
        }
        if let Ok(seed) = env::var("QRMINT_SEED") {
            if let Ok(parsed) = seed.parse::<u64>() {
                self.seed = Some(parsed);
            }
        }
    }

    /// Validate prefix and length.
    pub fn to_code_format(&self) -> Result<CodeFormat> {
        CodeFormat::new(self.prefix.clone(), self.code_length)
    }
}

/// Image rendering options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageOptions {
    /// Square image edge in pixels
    pub size: u32,
    /// File extension / format token (png, jpg, bmp, ...)
    pub format: String,
    /// Error correction tier: L, M, Q or H
    pub error_correction: String,
    /// Quiet zone around the symbol, in modules
    pub margin: u32,
    /// Foreground color as `#RRGGBB`
    pub dark_color: String,
    /// Background color as `#RRGGBB`
    pub light_color: String,
    /// Decode each image after rendering and compare with its code
    pub verify: bool,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            size: 600,
            format: "png".to_string(),
            error_correction: "H".to_string(),
            margin: 2,
            dark_color: "#000000".to_string(),
            light_color: "#FFFFFF".to_string(),
            verify: false,
        }
    }
}

impl ImageOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(size) = env::var("QRMINT_IMAGE_SIZE") {
            if let Ok(parsed) = size.parse::<u32>() {
                self.size = parsed;
            }
        }
        if let Ok(format) = env::var("QRMINT_IMAGE_FORMAT") {
            self.format = format;
        }
        if let Ok(level) = env::var("QRMINT_ERROR_CORRECTION") {
            self.error_correction = level;
        }
        if let Ok(margin) = env::var("QRMINT_MARGIN") {
            if let Ok(parsed) = margin.parse::<u32>() {
                self.margin = parsed;
            }
        }
    }

    /// Parse the string options into renderer settings.
    pub fn to_render_options(&self) -> Result<RenderOptions> {
        if self.size == 0 || self.size > MAX_IMAGE_SIZE {
            return Err(Error::Config(format!(
                "Image size {} is out of range, expected 1..={MAX_IMAGE_SIZE}",
                self.size
            )));
        }
        if self.margin > MAX_MARGIN {
            return Err(Error::Config(format!(
                "Margin {} is out of range, expected 0..={MAX_MARGIN}",
                self.margin
            )));
        }

        let error_correction = self
            .error_correction
            .parse::<ErrorCorrection>()
            .map_err(Error::Config)?;

        let dark = parse_color(&self.dark_color).ok_or_else(|| {
            Error::Config(format!("Invalid dark color '{}', expected #RRGGBB", self.dark_color))
        })?;
        let light = parse_color(&self.light_color).ok_or_else(|| {
            Error::Config(format!(
                "Invalid light color '{}', expected #RRGGBB",
                self.light_color
            ))
        })?;

        Ok(RenderOptions {
            size: self.size,
            format: image_format(&self.format, self.size)?,
            error_correction,
            margin: self.margin,
            dark,
            light,
            verify: self.verify,
        })
    }
}

// ICO entries are limited to 256x256
const MAX_ICO_SIZE: u32 = 256;

fn image_format(token: &str, size: u32) -> Result<ImageFormat> {
    let format = ImageFormat::from_extension(token.trim_start_matches('.')).ok_or_else(|| {
        Error::Config(format!("Unknown image format '{token}'"))
    })?;
    if !format.writing_enabled() {
        return Err(Error::Config(format!(
            "Image format '{token}' cannot be written"
        )));
    }

    match format {
        ImageFormat::Png
        | ImageFormat::Jpeg
        | ImageFormat::Bmp
        | ImageFormat::Gif
        | ImageFormat::Tiff
        | ImageFormat::WebP
        | ImageFormat::Tga
        | ImageFormat::Pnm
        | ImageFormat::Qoi
        | ImageFormat::Avif => Ok(format),
        ImageFormat::Ico if size <= MAX_ICO_SIZE => Ok(format),
        ImageFormat::Ico => Err(Error::Config(format!(
            "Image format '{token}' holds at most {MAX_ICO_SIZE}px images, got {size}px"
        ))),
        _ => Err(Error::Config(format!(
            "Image format '{token}' cannot store 8-bit RGB images"
        ))),
    }
}

/// Output locations and batching
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    /// Directory receiving one image per code; created if absent
    pub folder: PathBuf,
    /// Manifest path
    pub csv_file: PathBuf,
    /// Maximum number of images rendered concurrently
    pub batch_size: usize,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("qr_codes"),
            csv_file: PathBuf::from("qr_codes.csv"),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl OutputOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(folder) = env::var("QRMINT_OUTPUT_FOLDER") {
            self.folder = PathBuf::from(folder);
        }
        if let Ok(csv) = env::var("QRMINT_CSV_FILE") {
            self.csv_file = PathBuf::from(csv);
        }
        if let Ok(batch) = env::var("QRMINT_BATCH_SIZE") {
            if let Ok(parsed) = batch.parse::<usize>() {
                self.batch_size = parsed;
            }
        }
    }

    fn to_layout(&self, extension: &str) -> Result<OutputLayout> {
        if self.batch_size == 0 {
            return Err(Error::Config("Batch size must be greater than zero".to_string()));
        }
        if self.folder.as_os_str().is_empty() {
            return Err(Error::Config("Output folder must not be empty".to_string()));
        }
        Ok(OutputLayout::new(
            self.folder.clone(),
            extension.trim_start_matches('.'),
        ))
    }
}

/// Structured logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    /// Default log level (overridable via `QRMINT_LOG_LEVEL`)
    pub level: String,
    /// Optional log file path for teeing structured logs
    pub file: Option<PathBuf>,
    /// Force ANSI colors in stderr logging
    pub color: bool,
    /// Optional log rotation strategy applied to `file`
    pub rotation: Option<LogRotation>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            color: true,
            rotation: None,
        }
    }
}

impl LoggingOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("QRMINT_LOG_LEVEL") {
            self.level = level;
        }
        if let Ok(file) = env::var("QRMINT_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
        if let Ok(color) = env::var("QRMINT_LOG_COLOR") {
            match color.to_ascii_lowercase().as_str() {
                "0" | "false" | "off" => self.color = false,
                "1" | "true" | "on" => self.color = true,
                _ => {}
            }
        }
        if let Ok(rotation) = env::var("QRMINT_LOG_ROTATION") {
            if let Some(parsed) = LogRotation::from_str(&rotation) {
                self.rotation = Some(parsed);
            }
        }
    }
}

/// Supported log rotation policies for file sinks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// Rotate log files once per hour
    Hourly,
    /// Rotate log files once per day
    Daily,
}

impl LogRotation {
    fn from_str(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }
}
