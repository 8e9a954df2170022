//! Short human-readable observations about the changes and the prioritized tests.

use crate::config::Config;
use crate::types::{CodeChange, TestCase};

/// Build insights in a fixed order; each rule appends at most one line.
///
/// `tests` is taken in the order given (normally the scorer's output), which
/// matters only for the time-budget line. That line is always present.
pub fn generate_insights(tests: &[TestCase], changes: &[CodeChange], config: &Config) -> Vec<String> {
  let mut out = Vec::new();

  let risky = changes
    .iter()
    .filter(|c| c.complexity > config.risky_complexity)
    .count();
  if risky > 0 {
    out.push(format!(
      "{} high-complexity code changes detected that require careful testing.",
      risky
    ));
  }

  let failing = tests.iter().filter(|t| t.last_result.is_failure()).count();
  if failing > 0 {
    out.push(format!(
      "{} tests failed in the last run and should be prioritized.",
      failing
    ));
  }

  let hot = hot_components(changes, config.hot_component_lines);
  if !hot.is_empty() {
    out.push(format!(
      "The following components have significant changes: {}.",
      hot.join(", ")
    ));
  }

  let n = config.time_budget_tests;
  let minutes: f64 = tests.iter().take(n).map(|t| t.execution_time).sum();
  // Round half away from zero before formatting; `{:.1}` alone rounds ties to even.
  let minutes = (minutes * 10.0).round() / 10.0;
  out.push(format!(
    "Running the top {} prioritized tests will take approximately {:.1} minutes.",
    n, minutes
  ));

  out
}

/// Components whose summed changed lines exceed `threshold`, in order of first
/// appearance. A change counts its full line count toward every component it carries.
pub fn hot_components(changes: &[CodeChange], threshold: u64) -> Vec<String> {
  let mut totals: Vec<(&str, u64)> = Vec::new();
  for change in changes {
    for component in &change.components {
      match totals.iter_mut().find(|(name, _)| *name == component.as_str()) {
        Some((_, total)) => *total += change.changed_lines as u64,
        None => totals.push((component.as_str(), change.changed_lines as u64)),
      }
    }
  }

  totals
    .into_iter()
    .filter(|(_, total)| *total > threshold)
    .map(|(name, _)| name.to_string())
    .collect()
}
