//! Run orchestration: provision, generate, record, render

use crate::code::{CodeGenerator, CodeSetBuilder, RandomTokens, TokenSource};
use crate::config::RunSettings;
use crate::error::Result;
use crate::layout::{DirectoryState, ensure_directory};
use crate::manifest::write_manifest;
use crate::pipeline::{BatchPipeline, RenderReport};
use crate::progress::ProgressReporter;
use crate::qr::QrRenderer;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

/// Everything a completed run reports
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Identifier attached to every log line of the run
    pub run_id: Uuid,
    /// Codes requested
    pub requested: usize,
    /// Unique codes generated
    pub generated: usize,
    /// Render outcome counts and diagnostics
    pub render: RenderReport,
    /// Image directory
    pub output_folder: PathBuf,
    /// Whether the image directory was created by this run
    pub directory: DirectoryState,
    /// Manifest path
    pub csv_file: PathBuf,
    /// Timestamp written on every manifest row
    pub generated_at: DateTime<Utc>,
    /// Combined size of the images on disk
    pub bytes_written: u64,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

/// Execute one run with codes drawn from OS entropy, or from the configured seed.
pub async fn execute(
    settings: &RunSettings,
    progress: &mut dyn ProgressReporter,
) -> Result<RunSummary> {
    execute_with(settings, RandomTokens::from_seed_option(settings.seed), progress).await
}

/// Execute one run drawing suffix characters from `source`.
///
/// Any error returned here is fatal; individual render failures are only
/// counted in the summary.
pub async fn execute_with<S: TokenSource>(
    settings: &RunSettings,
    source: S,
    progress: &mut dyn ProgressReporter,
) -> Result<RunSummary> {
    let run_id = Uuid::new_v4();
    let span = info_span!("run", %run_id);
    async move {
        let started = Instant::now();
        let folder = settings.layout.folder();

        let directory = ensure_directory(folder)?;
        match directory {
            DirectoryState::Created => info!(path = %folder.display(), "Created folder"),
            DirectoryState::Existing => info!(path = %folder.display(), "Folder exists"),
        }

        info!(total = settings.total_codes, "Generating unique codes");
        let generator = CodeGenerator::new(settings.format.clone(), source);
        let codes = CodeSetBuilder::new(generator)
            .with_milestone_interval(settings.milestone_interval)
            .build(settings.total_codes)?
            .freeze();
        info!(count = codes.len(), "Generated unique codes");

        let generated_at = Utc::now();
        write_manifest(&settings.csv_file, &codes, generated_at)?;

        info!(batch_size = settings.batch_size, "Creating QR code images");
        let renderer = Arc::new(QrRenderer::new(settings.render.clone()));
        let pipeline = BatchPipeline::new(renderer, settings.batch_size);
        let render = pipeline
            .run(Arc::clone(&codes), &settings.layout, progress)
            .await;

        let bytes_written = settings.layout.disk_usage(codes.iter());
        info!(
            succeeded = render.succeeded,
            failed = render.failed(),
            bytes_written,
            "QR code generation complete"
        );

        Ok(RunSummary {
            run_id,
            requested: settings.total_codes,
            generated: codes.len(),
            render,
            output_folder: folder.to_path_buf(),
            directory,
            csv_file: settings.csv_file.clone(),
            generated_at,
            bytes_written,
            elapsed: started.elapsed(),
        })
    }
    .instrument(span)
    .await
}
