//! Shuffle seed: a real number in `[0, 1)`.

use std::fmt;

use rand::Rng;
use rand::rngs::OsRng;

use crate::{EngineError, Result};

/// Seed that parameterizes the block permutation.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Seed(f64);

impl Seed {
    /// Validate `value` as a seed.
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() || !(0.0..1.0).contains(&value) {
            return Err(EngineError::InvalidParameters(format!(
                "seed must be in [0, 1), got {value}"
            )));
        }
        Ok(Self(value))
    }

    /// Draw a fresh seed from the operating system's generator.
    pub fn random() -> Self {
        let mut rng = OsRng;
        Self::from_rng(&mut rng)
    }

    /// Draw a seed from a caller-supplied generator.
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(0.0..1.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
