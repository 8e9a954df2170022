//! Engine configuration with the reference heuristic's defaults.

/// Tunable weights and thresholds for scoring, coverage estimation, and insights.
#[derive(Debug, Clone)]
pub struct Config {
  /// Weight of the component-overlap term.
  pub overlap_weight: f64,
  /// Weight of the change-impact term.
  pub impact_weight: f64,
  /// Weight of the coverage term. The three weights sum to 0.8, not 1.0.
  pub coverage_weight: f64,
  /// Multiplier applied to tests whose last result was a failure.
  pub failure_multiplier: f64,
  /// Inclusive lower bound of the jitter factor.
  pub jitter_min: f64,
  /// Inclusive upper bound of the jitter factor.
  pub jitter_max: f64,
  /// How many top tests the coverage estimate considers.
  pub coverage_top_tests: usize,
  /// Deflation applied per covered line to approximate overlap between tests.
  pub coverage_deflation: f64,
  /// Recommended tests per change.
  pub recommended_per_change: f64,
  /// Floor for the recommended test count (before capping at pool size).
  pub min_recommended_tests: usize,
  /// Changes with complexity strictly above this are reported as risky.
  pub risky_complexity: f64,
  /// Components whose summed changed lines strictly exceed this are reported as hot.
  pub hot_component_lines: u64,
  /// How many top tests the time-budget insight sums.
  pub time_budget_tests: usize,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      overlap_weight: 0.3,
      impact_weight: 0.3,
      coverage_weight: 0.2,
      failure_multiplier: 1.5,
      jitter_min: 0.8,
      jitter_max: 1.2,
      coverage_top_tests: 3,
      coverage_deflation: 0.2,
      recommended_per_change: 1.5,
      min_recommended_tests: 2,
      risky_complexity: 0.7,
      hot_component_lines: 50,
      time_budget_tests: 5,
    }
  }
}
