//! Error types for `klaviyo-client`.

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::client::ContentKind;

// ─── Remote error ────────────────────────────────────────────────────────────

/// A non-success response from the service.
///
/// `message` and `detail` come from a JSON error body when there is one;
/// `raw` always holds the body text as received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiError {
  pub status:  u16,
  pub message: String,
  pub detail:  String,
  pub raw:     String,
}

impl ApiError {
  /// Decode an error response. A JSON body that doesn't parse, or any
  /// non-JSON body, still yields an error carrying the raw text.
  ///
  /// `message` and `detail` are read independently: a field that is null or
  /// not a string is treated as absent without discarding the other.
  pub fn from_response(status: u16, kind: ContentKind, body: &[u8]) -> Self {
    let raw = String::from_utf8_lossy(body).into_owned();
    let mut err = match kind {
      ContentKind::Json => match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => ApiError {
          message: text_field(&fields, "message"),
          detail: text_field(&fields, "detail"),
          ..Default::default()
        },
        _ => ApiError::default(),
      },
      ContentKind::Text => ApiError {
        message: raw.clone(),
        ..Default::default()
      },
    };
    err.status = status;
    err.raw = raw;
    err
  }

  /// The most specific explanation available: `message`, then `detail`, then
  /// the raw body.
  pub fn reason(&self) -> &str {
    [&self.message, &self.detail]
      .into_iter()
      .find(|s| !s.is_empty())
      .unwrap_or(&self.raw)
  }
}

fn text_field(fields: &Map<String, Value>, key: &str) -> String {
  match fields.get(key) {
    Some(Value::String(s)) => s.clone(),
    _ => String::new(),
  }
}

impl fmt::Display for ApiError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "HTTP {}: {}", self.status, self.reason())
  }
}

impl std::error::Error for ApiError {}

// ─── Client error ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum Error {
  #[error("missing {0} in client configuration")]
  MissingCredential(&'static str),

  #[error("invalid base url {url:?}: {reason}")]
  InvalidBaseUrl { url: String, reason: String },

  #[error("transport error: {0}")]
  Transport(#[source] reqwest::Error),

  #[error("remote error: {0}")]
  Api(ApiError),

  #[error("decode error: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("expected a {expected} response, got {actual}")]
  ContentTypeMismatch {
    expected: ContentKind,
    actual:   ContentKind,
  },

  /// The round trip succeeded but the service reported that the operation
  /// did not.
  #[error("{operation} rejected by the service: {body:?}")]
  Rejected {
    operation: &'static str,
    body:      String,
  },

  #[error("profile has no email or phone number")]
  MissingIdentifier,

  #[error("profile has no id")]
  MissingProfileId,

  #[error("list id is empty")]
  MissingListId,
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// A credential or endpoint is missing or malformed. Never worth retrying.
  Configuration,
  /// The service could not be reached.
  Transport,
  /// The service answered with a non-success status.
  Remote,
  /// The service answered, but not in the expected shape.
  Decode,
  /// The service answered and refused the operation.
  LogicalFailure,
  /// The caller's input was rejected before any request was made.
  Validation,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::MissingCredential(_) | Error::InvalidBaseUrl { .. } => {
        ErrorKind::Configuration
      }
      Error::Transport(_) => ErrorKind::Transport,
      Error::Api(_) => ErrorKind::Remote,
      Error::Decode(_) | Error::ContentTypeMismatch { .. } => ErrorKind::Decode,
      Error::Rejected { .. } => ErrorKind::LogicalFailure,
      Error::MissingIdentifier
      | Error::MissingProfileId
      | Error::MissingListId => ErrorKind::Validation,
    }
  }
}

impl From<reqwest::Error> for Error {
  /// Request URLs carry the private key, so they are stripped from transport
  /// errors before those can be displayed or logged.
  fn from(err: reqwest::Error) -> Self { Error::Transport(err.without_url()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
