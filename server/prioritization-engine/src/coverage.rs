//! Estimate how much of the changed code the top-priority slice of tests exercises.

use crate::config::Config;
use crate::score::sort_by_priority;
use crate::types::{CodeChange, CoverageStats, TestCase};

/// Coverage stats for the top `config.coverage_top_tests` tests by priority.
///
/// Each covered line is deflated by `config.coverage_deflation` to approximate
/// overlap between tests, then the total is clamped to the changed lines.
/// Percentage is 0 when nothing changed.
pub fn estimate_coverage(tests: &[TestCase], changes: &[CodeChange], config: &Config) -> CoverageStats {
  // Re-sort rather than trust the caller's order.
  let ranked = top_tests(tests, config.coverage_top_tests);

  let total_changed_lines: u64 = changes.iter().map(|c| c.changed_lines as u64).sum();

  let covered: f64 = ranked
    .iter()
    .flat_map(|test| {
      changes
        .iter()
        .map(move |change| change.changed_lines as f64 * test.coverage_of(&change.id) * config.coverage_deflation)
    })
    .sum();
  let covered = covered.max(0.0).min(total_changed_lines as f64);

  let coverage_percentage = if total_changed_lines == 0 {
    0
  } else {
    (100.0 * covered / total_changed_lines as f64).round().clamp(0.0, 100.0) as u8
  };

  CoverageStats {
    total_changed_lines,
    covered_lines: covered.round() as u64,
    coverage_percentage,
    recommended_test_count: recommended_test_count(tests.len(), changes.len(), config),
  }
}

/// `min(pool, max(floor, ceil(per_change * changes)))`.
pub fn recommended_test_count(pool: usize, changes: usize, config: &Config) -> usize {
  let scaled = (config.recommended_per_change * changes as f64).ceil().max(0.0) as usize;
  scaled.max(config.min_recommended_tests).min(pool)
}

/// Top `n` tests by priority, as new records.
pub fn top_tests(tests: &[TestCase], n: usize) -> Vec<TestCase> {
  let mut sorted = tests.to_vec();
  sort_by_priority(&mut sorted);
  sorted.truncate(n);
  sorted
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::TestResult;

  fn change(id: &str, lines: u32) -> CodeChange {
    CodeChange {
      id: id.into(),
      file_name: format!("src/{}.ts", id),
      changed_lines: lines,
      complexity: 0.5,
      components: vec!["api".into()],
      timestamp: None,
      author: "dev".into(),
    }
  }

  fn test(id: &str, priority: f64, coverage: &[(&str, f64)]) -> TestCase {
    TestCase {
      id: id.into(),
      name: id.into(),
      components: vec!["api".into()],
      last_run: None,
      last_result: TestResult::Pass,
      execution_time: 1.0,
      priority,
      coverage: coverage.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
    }
  }

  #[test]
  fn only_top_three_by_priority_count() {
    let config = Config::default();
    let changes = vec![change("c1", 100)];
    // Deliberately unsorted; "ignored" has the lowest priority.
    let tests = vec![
      test("ignored", 0.1, &[("c1", 1.0)]),
      test("a", 9.0, &[("c1", 1.0)]),
      test("b", 8.0, &[("c1", 0.5)]),
      test("c", 7.0, &[("c1", 0.5)]),
    ];
    let stats = estimate_coverage(&tests, &changes, &config);
    // 100 * (1.0 + 0.5 + 0.5) * 0.2 = 40
    assert_eq!(stats.total_changed_lines, 100);
    assert_eq!(stats.covered_lines, 40);
    assert_eq!(stats.coverage_percentage, 40);
  }

  #[test]
  fn covered_lines_clamp_to_total() {
    let config = Config {
      coverage_deflation: 1.0,
      ..Config::default()
    };
    let changes = vec![change("c1", 10)];
    let tests = vec![
      test("a", 3.0, &[("c1", 1.0)]),
      test("b", 2.0, &[("c1", 1.0)]),
    ];
    let stats = estimate_coverage(&tests, &changes, &config);
    assert_eq!(stats.covered_lines, 10);
    assert_eq!(stats.coverage_percentage, 100);
  }

  #[test]
  fn no_changes_means_zero_not_nan() {
    let config = Config::default();
    let tests = vec![test("a", 1.0, &[]), test("b", 0.5, &[])];
    let stats = estimate_coverage(&tests, &[], &config);
    assert_eq!(stats.total_changed_lines, 0);
    assert_eq!(stats.covered_lines, 0);
    assert_eq!(stats.coverage_percentage, 0);
    assert_eq!(stats.recommended_test_count, 2);
  }

  #[test]
  fn zero_line_changes_mean_zero_percent() {
    let config = Config::default();
    let stats = estimate_coverage(&[test("a", 1.0, &[("c1", 1.0)])], &[change("c1", 0)], &config);
    assert_eq!(stats.coverage_percentage, 0);
  }

  #[test]
  fn recommended_count_scales_and_caps() {
    let config = Config::default();
    assert_eq!(recommended_test_count(10, 0, &config), 2);
    assert_eq!(recommended_test_count(10, 1, &config), 2);
    assert_eq!(recommended_test_count(10, 3, &config), 5);
    assert_eq!(recommended_test_count(4, 3, &config), 4);
    assert_eq!(recommended_test_count(1, 5, &config), 1);
    assert_eq!(recommended_test_count(0, 5, &config), 0);
  }

  #[test]
  fn top_tests_sorts_and_truncates() {
    let tests = vec![test("a", 1.0, &[]), test("b", 3.0, &[]), test("c", 2.0, &[])];
    let top = top_tests(&tests, 2);
    let ids: Vec<&str> = top.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c"]);
  }
}
