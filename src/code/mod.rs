//! Unique redemption code generation
//!
//! A [`Code`] is a constant prefix followed by a random suffix drawn from
//! [`ALPHABET`]. Codes are produced one at a time by the [`CodeGenerator`],
//! which rejects duplicates against a [`CodeSet`], and accumulated into a set
//! of the requested size by the [`CodeSetBuilder`].

mod builder;
mod generator;
mod token;

pub use builder::{CodeSetBuilder, DEFAULT_MILESTONE_INTERVAL};
pub use generator::{CodeGenerator, MAX_ATTEMPTS};
pub use token::{ALPHABET, RandomTokens, TokenSource};

use crate::error::{Error, Result};
use indexmap::IndexSet;
use serde::Serialize;
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// An issued redemption code. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Code(String);

impl Code {
    /// Borrow the code text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the code and return its text
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Code {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Code {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Shape shared by every code in a run: a fixed prefix and a total length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeFormat {
    prefix: String,
    length: usize,
}

impl CodeFormat {
    /// Create a format, rejecting a total length shorter than the prefix.
    ///
    /// Codes double as image file names, so a prefix containing a path
    /// separator, `..` or NUL is rejected too.
    pub fn new(prefix: impl Into<String>, length: usize) -> Result<Self> {
        let prefix = prefix.into();
        if prefix.contains("..") || prefix.contains(['/', '\\', '\0']) {
            return Err(Error::Config(format!(
                "Prefix {prefix:?} cannot be used in a file name"
            )));
        }
        let prefix_len = prefix.chars().count();
        if length < prefix_len {
            return Err(Error::Config(format!(
                "Code length {length} is shorter than prefix '{prefix}' ({prefix_len} characters)"
            )));
        }
        Ok(Self { prefix, length })
    }

    /// The constant leading substring
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Total code length in characters
    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of random characters following the prefix
    pub fn suffix_len(&self) -> usize {
        self.length - self.prefix.chars().count()
    }

    /// Number of distinct codes this format can express, or `None` if it
    /// does not fit in a `u128`.
    pub fn keyspace(&self) -> Option<u128> {
        let exponent = u32::try_from(self.suffix_len()).ok()?;
        (ALPHABET.len() as u128).checked_pow(exponent)
    }

    /// Check whether `candidate` has this format's shape.
    pub fn matches(&self, candidate: &str) -> bool {
        match candidate.strip_prefix(self.prefix.as_str()) {
            Some(suffix) => {
                suffix.len() == self.suffix_len() && suffix.bytes().all(|b| ALPHABET.contains(&b))
            }
            None => false,
        }
    }

    /// Accept existing code text that has this format's shape.
    pub fn parse(&self, candidate: &str) -> Result<Code> {
        if self.matches(candidate) {
            Ok(Code(candidate.to_string()))
        } else {
            Err(Error::Other(format!(
                "'{candidate}' does not match code format {}",
                self.template()
            )))
        }
    }

    /// Human-readable template such as `QRCXXXXX`
    pub fn template(&self) -> String {
        format!("{}{}", self.prefix, "X".repeat(self.suffix_len()))
    }
}

/// Pairwise-distinct codes in insertion order.
///
/// Grows monotonically while the run is generating, then is frozen into a
/// shared read-only slice for rendering and manifest writing.
#[derive(Debug, Clone, Default)]
pub struct CodeSet {
    codes: IndexSet<Code>,
}

impl CodeSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set with room for `capacity` codes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            codes: IndexSet::with_capacity(capacity),
        }
    }

    /// Number of accepted codes
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether no code has been accepted yet
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Membership test by code text
    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    /// Insert a code, returning `false` if it was already present.
    pub fn insert(&mut self, code: Code) -> bool {
        self.codes.insert(code)
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Code> {
        self.codes.iter()
    }

    /// Freeze the set into an ordered, shareable sequence.
    pub fn freeze(self) -> Arc<[Code]> {
        self.codes.into_iter().collect()
    }
}
