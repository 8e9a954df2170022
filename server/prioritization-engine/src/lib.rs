//! PushLog Test Prioritization Engine — heuristic ranking of regression tests against code changes.
//!
//! Scores each test from component overlap, weighted change impact, per-change
//! coverage, and failure history, with bounded jitter from an injected source.
//! The sorted result feeds a coverage estimate for the top slice and a short
//! list of insights.
//!
//! No AI, no DB, no network; pure computation.

pub mod config;
pub mod coverage;
pub mod engine;
pub mod error;
pub mod insights;
pub mod jitter;
pub mod normalize;
pub mod score;
pub mod types;

pub use config::Config;
pub use coverage::estimate_coverage;
pub use engine::Engine;
pub use error::EngineError;
pub use insights::generate_insights;
pub use jitter::{FixedJitter, Jitter, RandomJitter};
pub use score::score_tests;
pub use types::{CodeChange, CoverageStats, Input, Output, TestCase, TestResult};
