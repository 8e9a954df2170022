//! Core engine: validates input, scores tests, then derives coverage stats and insights.

use tracing::info;

use crate::config::Config;
use crate::coverage;
use crate::error::EngineError;
use crate::insights;
use crate::jitter::{FixedJitter, Jitter, RandomJitter};
use crate::normalize;
use crate::score;
use crate::types::*;

/// The prioritization engine. Owns its config and jitter source; holds no other state.
pub struct Engine {
  config: Config,
  jitter: Box<dyn Jitter + Send>,
}

impl Engine {
  pub fn new(config: Config, jitter: Box<dyn Jitter + Send>) -> Self {
    Self { config, jitter }
  }

  /// Default config, jitter drawn from OS entropy.
  pub fn with_defaults() -> Self {
    let config = Config::default();
    let jitter = RandomJitter::from_entropy(config.jitter_min, config.jitter_max);
    Self::new(config, Box::new(jitter))
  }

  /// Default config, jitter from a seeded generator.
  pub fn seeded(seed: u64) -> Self {
    let config = Config::default();
    let jitter = RandomJitter::seeded(seed, config.jitter_min, config.jitter_max);
    Self::new(config, Box::new(jitter))
  }

  /// Default config, jitter pinned to 1.0.
  pub fn deterministic() -> Self {
    Self::new(Config::default(), Box::new(FixedJitter::neutral()))
  }

  /// Validate a raw request and run the full pipeline.
  pub fn analyze(&mut self, input: &Input) -> Result<Output, EngineError> {
    let normalized = normalize::normalize(input)?;
    Ok(self.prioritize(&normalized.tests, &normalized.changes))
  }

  /// Run the pipeline over already-validated records. Inputs are only read.
  pub fn prioritize(&mut self, tests: &[TestCase], changes: &[CodeChange]) -> Output {
    let prioritized_tests = score::score_tests(tests, changes, &self.config, &mut *self.jitter);
    let coverage = coverage::estimate_coverage(&prioritized_tests, changes, &self.config);
    let insights = insights::generate_insights(&prioritized_tests, changes, &self.config);
    let report_id = report_id(changes, tests);

    info!(
      report_id = %report_id,
      changes = changes.len(),
      tests = tests.len(),
      coverage_pct = coverage.coverage_percentage,
      recommended = coverage.recommended_test_count,
      "prioritization complete"
    );

    Output {
      report_id,
      prioritized_tests,
      coverage,
      insights,
    }
  }
}

/// Stable report ID: hash of change ids (in order) and test ids (sorted).
fn report_id(changes: &[CodeChange], tests: &[TestCase]) -> String {
  let mut hasher = blake3::Hasher::new();
  for change in changes {
    hasher.update(change.id.as_bytes());
    hasher.update(b"\n");
  }
  hasher.update(b"|");
  let mut test_ids: Vec<&str> = tests.iter().map(|t| t.id.as_str()).collect();
  test_ids.sort_unstable();
  for id in test_ids {
    hasher.update(id.as_bytes());
    hasher.update(b"\n");
  }
  let hex = hasher.finalize().to_hex();
  format!("run-{}", &hex[..16])
}
