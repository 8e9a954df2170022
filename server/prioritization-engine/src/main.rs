//! Binary entrypoint: read one JSON object from stdin, write one to stdout.
//!
//! Logs go to stderr, filtered by `RUST_LOG` (default `info`).
//! `PRIORITIZER_SEED` seeds the jitter; `PRIORITIZER_DETERMINISTIC=1` pins it to 1.0.

use prioritization_engine::types::ErrorOutput;
use prioritization_engine::{Engine, EngineError, Input};
use std::io::{self, Read, Write};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(io::stderr)
    .init();

  if let Err(e) = run_binary() {
    error!(error = %e, "prioritization failed");
    let out = match &e {
      EngineError::Validation { field, reason } => ErrorOutput::new(reason.clone()).with_field(field.clone()),
      _ => ErrorOutput::new(e.to_string()),
    };
    let mut stdout = io::stdout();
    let _ = serde_json::to_writer(&mut stdout, &out);
    let _ = writeln!(stdout);
    std::process::exit(1);
  }
}

fn run_binary() -> Result<(), EngineError> {
  let mut raw = String::new();
  io::stdin().lock().read_to_string(&mut raw)?;
  let input: Input = serde_json::from_str(&raw)?;

  let mut engine = engine_from_env();
  let out = engine.analyze(&input)?;

  let mut stdout = io::stdout().lock();
  serde_json::to_writer(&mut stdout, &out)?;
  let _ = writeln!(stdout);
  Ok(())
}

fn engine_from_env() -> Engine {
  if std::env::var("PRIORITIZER_DETERMINISTIC").is_ok_and(|v| v == "1") {
    return Engine::deterministic();
  }
  match std::env::var("PRIORITIZER_SEED").map(|s| s.parse::<u64>()) {
    Ok(Ok(seed)) => Engine::seeded(seed),
    Ok(Err(e)) => {
      tracing::warn!(error = %e, "ignoring unparsable PRIORITIZER_SEED");
      Engine::with_defaults()
    }
    Err(_) => Engine::with_defaults(),
  }
}
