//! Progress reporting for the render phase

use crate::error::RenderError;
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Observer advanced once per completed batch.
///
/// Reporting is purely informational; a reporter never influences results.
pub trait ProgressReporter: Send {
    /// Begin tracking `total` units of work
    fn start(&mut self, total: usize);
    /// Record `completed` more units of work
    fn advance(&mut self, completed: usize);
    /// Work is done (or abandoned)
    fn finish(&mut self);

    /// One image failed. The run summary lists every failure as well.
    fn failure(&mut self, error: &RenderError) {
        tracing::warn!(code = %error.code, error = %error.message, "Error generating QR");
    }
}

/// Discards every update
#[derive(Debug, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn start(&mut self, _total: usize) {}
    fn advance(&mut self, _completed: usize) {}
    fn finish(&mut self) {}
}

#[derive(Debug, Default, Clone, Copy)]
struct Position {
    done: usize,
    total: usize,
}

impl Position {
    fn percentage(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.done.min(self.total) as u128 * 100) / self.total as u128) as u8
    }

    fn eta(&self, elapsed: Duration) -> Option<Duration> {
        if self.done == 0 || self.done >= self.total {
            return None;
        }
        let remaining = (self.total - self.done) as f64;
        Some(elapsed.mul_f64(remaining / self.done as f64))
    }
}

/// Emits one tracing event per batch
#[derive(Debug, Default)]
pub struct LogProgress {
    position: Position,
}

impl ProgressReporter for LogProgress {
    fn start(&mut self, total: usize) {
        self.position = Position { done: 0, total };
    }

    fn advance(&mut self, completed: usize) {
        self.position.done += completed;
        tracing::info!(
            done = self.position.done,
            total = self.position.total,
            percentage = self.position.percentage(),
            "Render progress"
        );
    }

    fn finish(&mut self) {
        tracing::debug!(done = self.position.done, "Render progress finished");
    }
}

/// Redraws a single-line bar on stderr
pub struct TerminalProgress {
    position: Position,
    width: usize,
    started: Instant,
}

impl TerminalProgress {
    /// Create a bar `width` cells wide
    pub fn new(width: usize) -> Self {
        Self {
            position: Position::default(),
            width: width.max(1),
            started: Instant::now(),
        }
    }

    fn line(&self) -> String {
        let filled = if self.position.total == 0 {
            self.width
        } else {
            self.width * self.position.done.min(self.position.total) / self.position.total
        };
        let eta = match self.position.eta(self.started.elapsed()) {
            Some(eta) => format_eta(eta),
            None => "0s".to_string(),
        };
        format!(
            "   Progress |{}{}| {}% | {}/{} codes | ETA: {}",
            "\u{2588}".repeat(filled),
            "\u{2591}".repeat(self.width - filled),
            self.position.percentage(),
            self.position.done,
            self.position.total,
            eta
        )
    }

    fn draw(&self) {
        let mut stderr = io::stderr().lock();
        // Progress is best effort; a closed stderr must not fail the run.
        let _ = write!(stderr, "\r{}", self.line());
        let _ = stderr.flush();
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new(40)
    }
}

impl ProgressReporter for TerminalProgress {
    fn start(&mut self, total: usize) {
        self.position = Position { done: 0, total };
        self.started = Instant::now();
        self.draw();
    }

    fn advance(&mut self, completed: usize) {
        self.position.done += completed;
        self.draw();
    }

    fn finish(&mut self) {
        let _ = writeln!(io::stderr());
    }

    // stderr belongs to the bar while it is drawn
    fn failure(&mut self, error: &RenderError) {
        tracing::debug!(code = %error.code, error = %error.message, "Error generating QR");
    }
}

fn format_eta(eta: Duration) -> String {
    let secs = eta.as_secs();
    if secs >= 3600 {
        format!("{}h{:02}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m{:02}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}
