//! Validate inbound records and normalize them into internal `CodeChange`/`TestCase` models.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::error::EngineError;
use crate::types::*;

/// Validated inputs, ready for scoring.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
  pub changes: Vec<CodeChange>,
  pub tests: Vec<TestCase>,
}

/// Validate and normalize a whole request. Changes are normalized first since
/// positional coverage is resolved against their order.
pub fn normalize(input: &Input) -> Result<Normalized, EngineError> {
  let mut seen = HashSet::new();
  let changes = input
    .changes
    .iter()
    .enumerate()
    .map(|(i, raw)| {
      let change = normalize_change(i, raw)?;
      if !seen.insert(change.id.clone()) {
        return Err(EngineError::validation(
          format!("changes[{}].id", i),
          format!("duplicate id {:?}", change.id),
        ));
      }
      Ok(change)
    })
    .collect::<Result<Vec<_>, _>>()?;

  let mut seen = HashSet::new();
  let tests = input
    .tests
    .iter()
    .enumerate()
    .map(|(i, raw)| {
      let test = normalize_test(i, raw, &changes)?;
      if !seen.insert(test.id.clone()) {
        return Err(EngineError::validation(
          format!("tests[{}].id", i),
          format!("duplicate id {:?}", test.id),
        ));
      }
      Ok(test)
    })
    .collect::<Result<Vec<_>, _>>()?;

  Ok(Normalized { changes, tests })
}

fn normalize_change(i: usize, raw: &InboundChange) -> Result<CodeChange, EngineError> {
  let field = |name: &str| format!("changes[{}].{}", i, name);

  let id = raw.id.trim();
  if id.is_empty() {
    return Err(EngineError::validation(field("id"), "must not be empty"));
  }
  let changed_lines = u32::try_from(raw.changed_lines)
    .map_err(|_| EngineError::validation(field("changed_lines"), "must be a non-negative count"))?;
  check_fraction(raw.complexity).map_err(|reason| EngineError::validation(field("complexity"), reason))?;

  let timestamp = raw
    .timestamp
    .as_deref()
    .map(|ts| parse_timestamp(ts).map_err(|reason| EngineError::validation(field("timestamp"), reason)))
    .transpose()?;

  Ok(CodeChange {
    id: id.to_string(),
    file_name: raw.file_name.clone(),
    changed_lines,
    complexity: raw.complexity,
    components: normalize_components(&raw.components),
    timestamp,
    author: raw.author.clone().unwrap_or_default(),
  })
}

fn normalize_test(i: usize, raw: &InboundTest, changes: &[CodeChange]) -> Result<TestCase, EngineError> {
  let field = |name: &str| format!("tests[{}].{}", i, name);

  let id = raw.id.trim();
  if id.is_empty() {
    return Err(EngineError::validation(field("id"), "must not be empty"));
  }
  if !raw.execution_time.is_finite() || raw.execution_time <= 0.0 {
    return Err(EngineError::validation(field("execution_time"), "must be a positive number of minutes"));
  }

  let last_result = match raw.last_result.as_deref() {
    Some(s) => TestResult::from_str_loose(s)
      .ok_or_else(|| EngineError::validation(field("last_result"), "expected pass|fail|skipped|unknown"))?,
    None => TestResult::Unknown,
  };

  let last_run = raw
    .last_run
    .as_deref()
    .map(|ts| parse_timestamp(ts).map_err(|reason| EngineError::validation(field("last_run"), reason)))
    .transpose()?;

  let coverage = normalize_coverage(id, &raw.coverage, changes)
    .map_err(|(idx, reason)| EngineError::validation(format!("tests[{}].coverage[{}]", i, idx), reason))?;

  Ok(TestCase {
    id: id.to_string(),
    name: raw.name.clone(),
    components: normalize_components(&raw.components),
    last_run,
    last_result,
    execution_time: raw.execution_time,
    priority: 0.0,
    coverage,
  })
}

/// Resolve coverage to change-id keys. Positional entries pair with `changes`
/// by index; anything past the shorter of the two is dropped, as are keyed
/// entries naming unknown changes.
fn normalize_coverage(
  test_id: &str,
  raw: &InboundCoverage,
  changes: &[CodeChange],
) -> Result<BTreeMap<String, f64>, (String, &'static str)> {
  match raw {
    InboundCoverage::Positional(values) => {
      for (idx, v) in values.iter().enumerate() {
        check_fraction(*v).map_err(|reason| (idx.to_string(), reason))?;
      }
      Ok(
        changes
          .iter()
          .zip(values)
          .map(|(change, v)| (change.id.clone(), *v))
          .collect(),
      )
    }
    InboundCoverage::ByChange(map) => {
      let mut out = BTreeMap::new();
      for (key, v) in map {
        check_fraction(*v).map_err(|reason| (format!("{:?}", key), reason))?;
        if changes.iter().any(|c| &c.id == key) {
          out.insert(key.clone(), *v);
        } else {
          warn!(test = test_id, change = %key, "coverage names unknown change; dropped");
        }
      }
      Ok(out)
    }
  }
}

/// Trim tags, drop empties, and dedupe keeping first appearance.
fn normalize_components(raw: &[String]) -> Vec<String> {
  let mut out: Vec<String> = Vec::with_capacity(raw.len());
  for tag in raw {
    let tag = tag.trim();
    if !tag.is_empty() && !out.iter().any(|t| t == tag) {
      out.push(tag.to_string());
    }
  }
  out
}

fn check_fraction(v: f64) -> Result<(), &'static str> {
  if v.is_finite() && (0.0..=1.0).contains(&v) {
    Ok(())
  } else {
    Err("must be within [0, 1]")
  }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| format!("invalid RFC3339: {}", e))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn change(id: &str) -> InboundChange {
    InboundChange {
      id: id.into(),
      file_name: format!("src/{}.ts", id),
      changed_lines: 10,
      complexity: 0.5,
      components: vec!["api".into()],
      timestamp: Some("2025-04-15T10:30:00Z".into()),
      author: Some("jane.doe".into()),
    }
  }

  fn test(id: &str, coverage: InboundCoverage) -> InboundTest {
    InboundTest {
      id: id.into(),
      name: format!("{} test", id),
      components: vec!["api".into()],
      last_run: None,
      last_result: Some("pass".into()),
      execution_time: 1.0,
      coverage,
    }
  }

  #[test]
  fn positional_coverage_is_keyed_by_change_id_and_truncated() {
    let input = Input {
      changes: vec![change("c1"), change("c2")],
      tests: vec![
        test("t1", InboundCoverage::Positional(vec![0.4, 0.6, 0.9])),
        test("t2", InboundCoverage::Positional(vec![0.3])),
      ],
    };
    let n = normalize(&input).unwrap();
    assert_eq!(n.tests[0].coverage.len(), 2);
    assert_eq!(n.tests[0].coverage_of("c2"), 0.6);
    assert_eq!(n.tests[1].coverage.len(), 1);
    assert_eq!(n.tests[1].coverage_of("c2"), 0.0);
  }

  #[test]
  fn keyed_coverage_drops_unknown_changes() {
    let input = Input {
      changes: vec![change("c1")],
      tests: vec![test(
        "t1",
        InboundCoverage::ByChange(BTreeMap::from([("c1".into(), 0.5), ("gone".into(), 0.9)])),
      )],
    };
    let n = normalize(&input).unwrap();
    assert_eq!(n.tests[0].coverage.len(), 1);
    assert_eq!(n.tests[0].coverage_of("c1"), 0.5);
  }

  #[test]
  fn components_are_trimmed_and_deduplicated() {
    let mut c = change("c1");
    c.components = vec![" api ".into(), "auth".into(), "api".into(), "".into()];
    let n = normalize(&Input { changes: vec![c], tests: vec![] }).unwrap();
    assert_eq!(n.changes[0].components, vec!["api", "auth"]);
  }

  #[test]
  fn empty_components_are_legal() {
    let mut t = test("t1", InboundCoverage::default());
    t.components.clear();
    let n = normalize(&Input { changes: vec![change("c1")], tests: vec![t] }).unwrap();
    assert!(n.tests[0].components.is_empty());
  }

  #[test]
  fn missing_id_is_rejected() {
    let err = normalize(&Input { changes: vec![change("")], tests: vec![] }).unwrap_err();
    assert_eq!(err.field(), Some("changes[0].id"));
  }

  #[test]
  fn duplicate_ids_are_rejected() {
    let err = normalize(&Input {
      changes: vec![],
      tests: vec![test("t1", InboundCoverage::default()), test("t1", InboundCoverage::default())],
    })
    .unwrap_err();
    assert_eq!(err.field(), Some("tests[1].id"));
  }

  #[test]
  fn negative_lines_are_rejected() {
    let mut c = change("c1");
    c.changed_lines = -3;
    let err = normalize(&Input { changes: vec![c], tests: vec![] }).unwrap_err();
    assert_eq!(err.field(), Some("changes[0].changed_lines"));
  }

  #[test]
  fn complexity_out_of_range_is_rejected() {
    let mut c = change("c1");
    c.complexity = 1.2;
    let err = normalize(&Input { changes: vec![c], tests: vec![] }).unwrap_err();
    assert!(err.to_string().contains("complexity"));

    let mut c = change("c1");
    c.complexity = f64::NAN;
    assert!(normalize(&Input { changes: vec![c], tests: vec![] }).is_err());
  }

  #[test]
  fn coverage_fraction_out_of_range_is_rejected() {
    let input = Input {
      changes: vec![change("c1")],
      tests: vec![test("t1", InboundCoverage::Positional(vec![1.5]))],
    };
    let err = normalize(&input).unwrap_err();
    assert_eq!(err.field(), Some("tests[0].coverage[0]"));
  }

  #[test]
  fn non_positive_execution_time_is_rejected() {
    let mut t = test("t1", InboundCoverage::default());
    t.execution_time = 0.0;
    let err = normalize(&Input { changes: vec![], tests: vec![t] }).unwrap_err();
    assert_eq!(err.field(), Some("tests[0].execution_time"));
  }

  #[test]
  fn last_result_null_is_unknown_and_garbage_is_rejected() {
    let mut t = test("t1", InboundCoverage::default());
    t.last_result = None;
    let n = normalize(&Input { changes: vec![], tests: vec![t] }).unwrap();
    assert_eq!(n.tests[0].last_result, TestResult::Unknown);

    let mut t = test("t1", InboundCoverage::default());
    t.last_result = Some("flaky".into());
    let err = normalize(&Input { changes: vec![], tests: vec![t] }).unwrap_err();
    assert_eq!(err.field(), Some("tests[0].last_result"));
  }

  #[test]
  fn bad_timestamp_is_rejected() {
    let mut c = change("c1");
    c.timestamp = Some("yesterday".into());
    let err = normalize(&Input { changes: vec![c], tests: vec![] }).unwrap_err();
    assert!(err.to_string().contains("timestamp"));
  }
}
