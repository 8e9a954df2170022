//! Core types for the prioritization engine (JSON contracts + internal records).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Inbound types (JSON contract — what the caller sends)
// ---------------------------------------------------------------------------

/// One JSON object from Node: the changes under review and the test pool.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Input {
  #[serde(default)]
  pub changes: Vec<InboundChange>,
  #[serde(default)]
  pub tests: Vec<InboundTest>,
}

/// One modified file. Unknown fields are silently ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundChange {
  #[serde(default)]
  pub id: String,
  #[serde(default, alias = "fileName")]
  pub file_name: String,
  /// Signed so a negative count reaches validation instead of failing the parse.
  #[serde(alias = "changedLines")]
  pub changed_lines: i64,
  pub complexity: f64,
  #[serde(default)]
  pub components: Vec<String>,
  #[serde(default)]
  pub timestamp: Option<String>,
  #[serde(default)]
  pub author: Option<String>,
}

/// One regression test from the registry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundTest {
  #[serde(default)]
  pub id: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub components: Vec<String>,
  #[serde(default, alias = "lastRun")]
  pub last_run: Option<String>,
  #[serde(default, alias = "lastResult")]
  pub last_result: Option<String>,
  #[serde(alias = "executionTime")]
  pub execution_time: f64,
  #[serde(default)]
  pub coverage: InboundCoverage,
}

/// Per-change coverage fractions, either aligned with `changes` by position or keyed by change id.
/// `null` reads as empty.
#[derive(Debug, Clone)]
pub enum InboundCoverage {
  Positional(Vec<f64>),
  ByChange(BTreeMap<String, f64>),
}

impl<'de> Deserialize<'de> for InboundCoverage {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let number = |v: &Value, at: String| {
      v.as_f64()
        .ok_or_else(|| D::Error::custom(format!("coverage[{}]: expected a number, got {}", at, v)))
    };
    match Option::<Value>::deserialize(deserializer)? {
      None | Some(Value::Null) => Ok(Self::default()),
      Some(Value::Array(items)) => items
        .iter()
        .enumerate()
        .map(|(i, v)| number(v, i.to_string()))
        .collect::<Result<Vec<_>, _>>()
        .map(Self::Positional),
      Some(Value::Object(map)) => map
        .iter()
        .map(|(k, v)| number(v, format!("{:?}", k)).map(|f| (k.clone(), f)))
        .collect::<Result<BTreeMap<_, _>, _>>()
        .map(Self::ByChange),
      Some(other) => Err(D::Error::custom(format!(
        "coverage: expected an array of numbers or an object keyed by change id, got {}",
        other
      ))),
    }
  }
}

impl Default for InboundCoverage {
  fn default() -> Self {
    Self::Positional(Vec::new())
  }
}

// ---------------------------------------------------------------------------
// Test result (normalized)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
  Pass,
  Fail,
  Skipped,
  #[default]
  Unknown,
}

impl TestResult {
  pub fn from_str_loose(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "pass" | "passed" => Some(Self::Pass),
      "fail" | "failed" => Some(Self::Fail),
      "skip" | "skipped" => Some(Self::Skipped),
      "unknown" | "" => Some(Self::Unknown),
      _ => None,
    }
  }

  pub fn is_failure(self) -> bool {
    self == Self::Fail
  }
}

// ---------------------------------------------------------------------------
// Internal validated records
// ---------------------------------------------------------------------------

/// A validated code change. Read-only to every component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeChange {
  pub id: String,
  pub file_name: String,
  pub changed_lines: u32,
  /// Risk in [0, 1].
  pub complexity: f64,
  /// Component tags, deduplicated in first-appearance order.
  pub components: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub timestamp: Option<DateTime<Utc>>,
  pub author: String,
}

impl CodeChange {
  /// Number of this change's components that `tags` also carries.
  pub fn shared_components(&self, tags: &[String]) -> usize {
    tags.iter().filter(|t| self.components.contains(t)).count()
  }
}

/// A validated regression test. `priority` is meaningless until scored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestCase {
  pub id: String,
  pub name: String,
  pub components: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub last_run: Option<DateTime<Utc>>,
  pub last_result: TestResult,
  /// Minutes.
  pub execution_time: f64,
  pub priority: f64,
  /// Exercised fraction per change id.
  pub coverage: BTreeMap<String, f64>,
}

impl TestCase {
  /// A new record identical to this one except for `priority`.
  pub fn with_priority(&self, priority: f64) -> Self {
    Self {
      id: self.id.clone(),
      name: self.name.clone(),
      components: self.components.clone(),
      last_run: self.last_run,
      last_result: self.last_result,
      execution_time: self.execution_time,
      priority,
      coverage: self.coverage.clone(),
    }
  }

  /// Coverage fraction of the given change, 0 when unknown.
  pub fn coverage_of(&self, change_id: &str) -> f64 {
    self.coverage.get(change_id).copied().unwrap_or(0.0)
  }
}

// ---------------------------------------------------------------------------
// Output types (JSON contract — what we emit)
// ---------------------------------------------------------------------------

/// Estimated coverage of the changed lines by the top-priority slice of tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoverageStats {
  pub total_changed_lines: u64,
  pub covered_lines: u64,
  /// 0..=100; 0 when there are no changed lines.
  pub coverage_percentage: u8,
  pub recommended_test_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Output {
  /// Stable across runs with the same change and test ids.
  pub report_id: String,
  pub prioritized_tests: Vec<TestCase>,
  pub coverage: CoverageStats,
  pub insights: Vec<String>,
}

/// Structured error output for invalid input.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }
}
