//! Unique code generator

use crate::code::{Code, CodeFormat, CodeSet, TokenSource};
use crate::error::{Error, Result};

/// Maximum candidates tried by a single [`CodeGenerator::generate`] call
pub const MAX_ATTEMPTS: usize = 100;

/// Builds candidate codes and rejects those already issued.
///
/// The attempt cap applies to one `generate` call, not to a whole run.
pub struct CodeGenerator<S> {
    format: CodeFormat,
    source: S,
    max_attempts: usize,
}

impl<S: TokenSource> CodeGenerator<S> {
    /// Create a generator for `format` drawing suffix characters from `source`
    pub fn new(format: CodeFormat, source: S) -> Self {
        Self {
            format,
            source,
            max_attempts: MAX_ATTEMPTS,
        }
    }

    /// Override the per-call attempt cap (minimum 1)
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// The format every generated code follows
    pub fn format(&self) -> &CodeFormat {
        &self.format
    }

    /// Build one candidate without any uniqueness check.
    pub fn candidate(&mut self) -> Code {
        let mut text = String::with_capacity(self.format.length());
        text.push_str(self.format.prefix());
        for _ in 0..self.format.suffix_len() {
            text.push(self.source.next_char());
        }
        Code(text)
    }

    /// Return the first candidate not already present in `existing`.
    ///
    /// `existing` is not modified; inserting the result is the caller's job.
    pub fn generate(&mut self, existing: &CodeSet) -> Result<Code> {
        for attempt in 1..=self.max_attempts {
            let candidate = self.candidate();
            if !existing.contains(candidate.as_str()) {
                if attempt > 1 {
                    tracing::trace!(attempt, code = %candidate, "Accepted code after collisions");
                }
                return Ok(candidate);
            }
        }

        Err(Error::ExhaustedRetries {
            attempts: self.max_attempts,
            issued: existing.len(),
        })
    }
}
