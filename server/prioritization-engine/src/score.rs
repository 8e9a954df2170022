//! Priority scoring: component overlap, change impact, coverage, failure history, jitter.

use std::cmp::Ordering;

use tracing::debug;

use crate::config::Config;
use crate::jitter::Jitter;
use crate::types::{CodeChange, TestCase};

/// The raw terms behind one test's priority, before jitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
  pub component_overlap: f64,
  pub change_impact: f64,
  pub coverage: f64,
  pub history_multiplier: f64,
  /// Weighted sum times the history multiplier.
  pub base: f64,
}

/// Compute the pre-jitter terms for one test.
///
/// - Overlap: sum over changes of `shared / test components`.
/// - Impact: sum over overlapping changes of `lines * complexity * shared / change components`.
/// - Coverage: sum over changes of `coverage[change.id] * complexity * lines`.
///
/// Empty component sets contribute 0 rather than dividing by zero.
pub fn score_breakdown(test: &TestCase, changes: &[CodeChange], config: &Config) -> ScoreBreakdown {
  let mut component_overlap = 0.0;
  let mut change_impact = 0.0;
  let mut coverage = 0.0;

  for change in changes {
    let shared = change.shared_components(&test.components);
    if shared > 0 {
      component_overlap += ratio(shared, test.components.len());
      change_impact += change.changed_lines as f64
        * change.complexity
        * ratio(shared, change.components.len());
    }
    coverage += test.coverage_of(&change.id) * change.complexity * change.changed_lines as f64;
  }

  let history_multiplier = if test.last_result.is_failure() {
    config.failure_multiplier
  } else {
    1.0
  };

  let weighted = config.overlap_weight * component_overlap
    + config.impact_weight * change_impact
    + config.coverage_weight * coverage;

  ScoreBreakdown {
    component_overlap,
    change_impact,
    coverage,
    history_multiplier,
    base: weighted * history_multiplier,
  }
}

/// Score every test and return new records sorted by priority, highest first.
///
/// One jitter factor is drawn per test, in input order. The sort is stable,
/// so equal priorities keep their input order.
pub fn score_tests(
  tests: &[TestCase],
  changes: &[CodeChange],
  config: &Config,
  jitter: &mut dyn Jitter,
) -> Vec<TestCase> {
  let mut scored: Vec<TestCase> = tests
    .iter()
    .map(|test| {
      let breakdown = score_breakdown(test, changes, config);
      let factor = jitter.factor();
      let priority = round2(breakdown.base * factor);
      debug!(
        test = %test.id,
        overlap = breakdown.component_overlap,
        impact = breakdown.change_impact,
        coverage = breakdown.coverage,
        multiplier = breakdown.history_multiplier,
        jitter = factor,
        priority,
        "scored test"
      );
      test.with_priority(priority)
    })
    .collect();

  sort_by_priority(&mut scored);
  scored
}

/// Stable sort, priority descending.
pub fn sort_by_priority(tests: &mut [TestCase]) {
  tests.sort_by(|a, b| b.priority.partial_cmp(&a.priority).unwrap_or(Ordering::Equal));
}

fn ratio(part: usize, whole: usize) -> f64 {
  if whole == 0 {
    0.0
  } else {
    part as f64 / whole as f64
  }
}

fn round2(v: f64) -> f64 {
  if v.is_finite() {
    (v * 100.0).round() / 100.0
  } else {
    0.0
  }
}
