//! Error types for `klaviyo-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("expected a JSON object for a profile, got {0}")]
  NotAnObject(&'static str),

  #[error("reserved field {key} must be {expected}")]
  ReservedFieldType {
    key:      &'static str,
    expected: &'static str,
  },

  #[error("unknown consent channel: {0:?}")]
  UnknownConsent(String),

  #[error("serialization error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
