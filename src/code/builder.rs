//! Drives the generator until the requested number of codes exists

use crate::code::{CodeGenerator, CodeSet, TokenSource};
use crate::error::Result;
use tracing::{debug, info};

/// Default number of accepted codes between progress milestones
pub const DEFAULT_MILESTONE_INTERVAL: usize = 1000;

// Upper bound on the up-front reservation; larger sets grow on demand.
const MAX_PREALLOCATION: usize = 1 << 20;

/// Accumulates a [`CodeSet`] of an exact size.
pub struct CodeSetBuilder<S> {
    generator: CodeGenerator<S>,
    milestone_interval: usize,
}

impl<S: TokenSource> CodeSetBuilder<S> {
    /// Create a builder around `generator`
    pub fn new(generator: CodeGenerator<S>) -> Self {
        Self {
            generator,
            milestone_interval: DEFAULT_MILESTONE_INTERVAL,
        }
    }

    /// Report a milestone every `interval` accepted codes (0 disables)
    pub fn with_milestone_interval(mut self, interval: usize) -> Self {
        self.milestone_interval = interval;
        self
    }

    /// Build exactly `target` distinct codes, logging milestones via tracing.
    pub fn build(&mut self, target: usize) -> Result<CodeSet> {
        self.build_with(target, |issued, target| {
            info!(issued, target, "Generated: {issued}/{target}");
        })
    }

    /// Build exactly `target` distinct codes, invoking `on_milestone` with
    /// `(issued, target)` at every milestone.
    ///
    /// `ExhaustedRetries` from the generator is returned unchanged; the set is
    /// never truncated.
    pub fn build_with<F>(&mut self, target: usize, mut on_milestone: F) -> Result<CodeSet>
    where
        F: FnMut(usize, usize),
    {
        let mut set = CodeSet::with_capacity(target.min(MAX_PREALLOCATION));

        while set.len() < target {
            let code = self.generator.generate(&set)?;
            set.insert(code);

            if self.milestone_interval > 0 && set.len() % self.milestone_interval == 0 {
                on_milestone(set.len(), target);
            }
        }

        debug!(count = set.len(), "Code set complete");
        Ok(set)
    }
}
