//! Structured error types for the prioritization engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
  /// A record failed boundary validation. `field` is the record path, e.g. `changes[2].complexity`.
  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("io: {0}")]
  Io(#[from] std::io::Error),
}

impl EngineError {
  pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
    Self::Validation {
      field: field.into(),
      reason: reason.into(),
    }
  }

  /// Field path for validation failures, `None` otherwise.
  pub fn field(&self) -> Option<&str> {
    match self {
      Self::Validation { field, .. } => Some(field),
      Self::Json(_) | Self::Io(_) => None,
    }
  }
}
