//! Structured error types for the epi engine.
//!
//! True input/config errors abort a call; legitimate data gaps (missing
//! incubation profile, partial EDR points, island units) are tagged fields
//! in successful results, never errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },

  #[error("config: {0}")]
  Config(String),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),
}

impl EngineError {
  pub fn validation(field: &str, reason: &str) -> Self {
    Self::Validation {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  pub fn config(msg: impl Into<String>) -> Self {
    Self::Config(msg.into())
  }
}
