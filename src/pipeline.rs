//! Bounded-concurrency batch rendering
//!
//! Codes are split into contiguous batches. Every job in a batch runs at once
//! on the blocking pool and the pipeline waits for the whole batch before
//! starting the next, so at most `batch_size` renders are ever in flight.
//! Counters are accumulated from each batch's collected outcomes after that
//! barrier; no job touches shared counters.
//!
//! There is no timeout: a render that never returns stalls its batch.

use crate::code::Code;
use crate::error::RenderError;
use crate::layout::OutputLayout;
use crate::progress::ProgressReporter;
use crate::qr::ImageRenderer;
use std::ops::Range;
use std::sync::Arc;
use tracing::debug;

/// Default number of codes rendered concurrently
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Aggregate outcome of a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Images written successfully
    pub succeeded: usize,
    /// One entry per failed image, in batch order
    pub failures: Vec<RenderError>,
    /// Size of each processed batch, in order
    pub batch_sizes: Vec<usize>,
}

impl RenderReport {
    /// Number of failed images
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Number of render attempts made
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed()
    }
}

/// Renders a frozen code sequence in fixed-size batches
pub struct BatchPipeline<R: ?Sized> {
    renderer: Arc<R>,
    batch_size: usize,
}

impl<R: ImageRenderer + ?Sized> BatchPipeline<R> {
    /// Create a pipeline rendering at most `batch_size` codes at a time (minimum 1)
    pub fn new(renderer: Arc<R>, batch_size: usize) -> Self {
        Self {
            renderer,
            batch_size: batch_size.max(1),
        }
    }

    /// Configured batch size
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Render every code exactly once into `layout`.
    ///
    /// Individual failures are recorded in the report and never abort the run.
    pub async fn run(
        &self,
        codes: Arc<[Code]>,
        layout: &OutputLayout,
        progress: &mut dyn ProgressReporter,
    ) -> RenderReport {
        let mut report = RenderReport::default();
        progress.start(codes.len());

        for (batch, start) in (0..codes.len()).step_by(self.batch_size).enumerate() {
            let range = start..(start + self.batch_size).min(codes.len());
            let size = range.len();
            let outcomes = self.render_batch(&codes, range, layout).await;

            let mut failed = 0;
            for outcome in outcomes {
                match outcome {
                    Ok(()) => report.succeeded += 1,
                    Err(err) => {
                        progress.failure(&err);
                        failed += 1;
                        report.failures.push(err);
                    }
                }
            }

            report.batch_sizes.push(size);
            progress.advance(size);
            debug!(batch, size, failed, "Batch complete");
        }

        progress.finish();
        report
    }

    async fn render_batch(
        &self,
        codes: &Arc<[Code]>,
        range: Range<usize>,
        layout: &OutputLayout,
    ) -> Vec<Result<(), RenderError>> {
        let jobs: Vec<_> = range
            .map(|index| {
                let codes = Arc::clone(codes);
                let renderer = Arc::clone(&self.renderer);
                let destination = layout.image_path(&codes[index]);
                let handle = tokio::task::spawn_blocking(move || {
                    renderer.render(&codes[index], &destination)
                });
                (index, handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(jobs.len());
        for (index, handle) in jobs {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(err) => Err(RenderError::new(
                    codes[index].as_str(),
                    format!("render task failed: {err}"),
                )),
            };
            outcomes.push(outcome);
        }
        outcomes
    }
}
