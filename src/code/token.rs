//! Random token source for code suffixes

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Symbols a code suffix may contain
pub const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Produces one suffix character at a time.
///
/// Implementations only promise uniformity over [`ALPHABET`]; they are not
/// required to be cryptographically secure.
pub trait TokenSource {
    /// Return the next character
    fn next_char(&mut self) -> char;
}

impl<T: TokenSource + ?Sized> TokenSource for &mut T {
    fn next_char(&mut self) -> char {
        (**self).next_char()
    }
}

impl<T: TokenSource + ?Sized> TokenSource for Box<T> {
    fn next_char(&mut self) -> char {
        (**self).next_char()
    }
}

/// Uniform sampling from [`ALPHABET`] backed by any `rand` generator
#[derive(Debug, Clone)]
pub struct RandomTokens<R> {
    rng: R,
}

impl<R: Rng> RandomTokens<R> {
    /// Wrap an existing generator
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomTokens<StdRng> {
    /// Seed from the operating system
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    /// Reproducible source for a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Seeded when `seed` is provided, OS entropy otherwise
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl<R: Rng> TokenSource for RandomTokens<R> {
    fn next_char(&mut self) -> char {
        ALPHABET[self.rng.random_range(0..ALPHABET.len())] as char
    }
}
