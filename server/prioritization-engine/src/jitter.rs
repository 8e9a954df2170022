//! Bounded multiplicative jitter applied to each test's priority.
//!
//! The source is injected into the scorer so callers can seed it for
//! reproducible batches or pin it to a constant in tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Supplies one multiplicative factor per scored test.
pub trait Jitter {
  fn factor(&mut self) -> f64;
}

/// Uniform draw from an inclusive range.
#[derive(Debug, Clone)]
pub struct RandomJitter<R: Rng> {
  rng: R,
  min: f64,
  max: f64,
}

impl<R: Rng> RandomJitter<R> {
  pub fn new(rng: R, min: f64, max: f64) -> Self {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };
    Self { rng, min, max }
  }
}

impl RandomJitter<StdRng> {
  pub fn from_entropy(min: f64, max: f64) -> Self {
    Self::new(StdRng::from_entropy(), min, max)
  }

  pub fn seeded(seed: u64, min: f64, max: f64) -> Self {
    Self::new(StdRng::seed_from_u64(seed), min, max)
  }
}

impl<R: Rng> Jitter for RandomJitter<R> {
  fn factor(&mut self) -> f64 {
    if self.min == self.max {
      return self.min;
    }
    self.rng.gen_range(self.min..=self.max)
  }
}

/// Constant factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedJitter(pub f64);

impl FixedJitter {
  /// No jitter at all.
  pub fn neutral() -> Self {
    Self(1.0)
  }
}

impl Jitter for FixedJitter {
  fn factor(&mut self) -> f64 {
    self.0
  }
}

impl<J: Jitter + ?Sized> Jitter for Box<J> {
  fn factor(&mut self) -> f64 {
    (**self).factor()
  }
}
