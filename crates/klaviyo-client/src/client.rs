//! Client configuration and the shared request/response pipeline.

use std::{fmt, time::Duration};

use bytes::Bytes;
use reqwest::{
  Method, StatusCode,
  header::{ACCEPT, CONTENT_TYPE, HeaderMap},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::{ApiError, Error, Result};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://a.klaviyo.com/api";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ─── Configuration ───────────────────────────────────────────────────────────

/// Settings for [`Client::new`].
///
/// The public key is only needed for [`Client::identify`]; every other
/// operation authenticates with the private key.
#[derive(Clone)]
pub struct ClientConfig {
  pub base_url:    String,
  pub public_key:  Option<String>,
  pub private_key: Option<String>,
  /// Bounds each round trip, connect included.
  pub timeout:     Duration,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      base_url:    DEFAULT_BASE_URL.to_string(),
      public_key:  None,
      private_key: None,
      timeout:     DEFAULT_TIMEOUT,
    }
  }
}

impl fmt::Debug for ClientConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ClientConfig")
      .field("base_url", &self.base_url)
      .field("public_key", &self.public_key.as_ref().map(|_| "<redacted>"))
      .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
      .field("timeout", &self.timeout)
      .finish()
  }
}

// ─── Content kinds ───────────────────────────────────────────────────────────

/// How a response body is interpreted, and what a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
  /// `application/json` (or a `+json` subtype).
  Json,
  /// Anything else; the service uses `text/html` for bare sentinels.
  Text,
}

impl ContentKind {
  fn accept_header(self) -> &'static str {
    match self {
      ContentKind::Json => "application/json",
      ContentKind::Text => "text/html",
    }
  }

  fn of(headers: &HeaderMap) -> Self {
    let essence = headers
      .get(CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .and_then(|v| v.split(';').next())
      .map(|v| v.trim().to_ascii_lowercase())
      .unwrap_or_default();

    if essence == "application/json" || essence.ends_with("+json") {
      ContentKind::Json
    } else {
      ContentKind::Text
    }
  }
}

impl fmt::Display for ContentKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      ContentKind::Json => "JSON",
      ContentKind::Text => "text",
    })
  }
}

// ─── Payload ─────────────────────────────────────────────────────────────────

/// A successful response body, tagged with how the service labelled it.
pub(crate) struct Payload {
  kind: ContentKind,
  body: Bytes,
}

impl Payload {
  /// Decode a JSON body into `T`. Profiles are split into reserved fields
  /// and attributes here, through their `Deserialize` impl.
  pub(crate) fn json<T: DeserializeOwned>(self) -> Result<T> {
    match self.kind {
      ContentKind::Json => Ok(serde_json::from_slice(&self.body)?),
      actual => Err(Error::ContentTypeMismatch {
        expected: ContentKind::Json,
        actual,
      }),
    }
  }

  /// The body as a string. A JSON-labelled body that is a JSON string is
  /// unquoted; any other body, a bare number included, is taken as written.
  pub(crate) fn text(self) -> String {
    let written = || String::from_utf8_lossy(&self.body).trim().to_owned();
    match self.kind {
      ContentKind::Json => {
        serde_json::from_slice::<String>(&self.body).unwrap_or_else(|_| written())
      }
      ContentKind::Text => written(),
    }
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async client for the Klaviyo API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based. Nothing is
/// mutated after construction, so one client can serve concurrent callers.
#[derive(Clone)]
pub struct Client {
  http:        reqwest::Client,
  base_url:    Url,
  public_key:  Option<String>,
  private_key: Option<String>,
}

impl fmt::Debug for Client {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Client")
      .field("base_url", &self.base_url.as_str())
      .finish_non_exhaustive()
  }
}

impl Client {
  /// Build a client. The base URL is validated here rather than on first
  /// use.
  pub fn new(config: ClientConfig) -> Result<Self> {
    let base_url = parse_base_url(&config.base_url)?;
    let http = reqwest::Client::builder()
      .timeout(config.timeout)
      .build()?;

    Ok(Self {
      http,
      base_url,
      public_key: non_blank(config.public_key),
      private_key: non_blank(config.private_key),
    })
  }

  pub(crate) fn public_key(&self) -> Result<&str> {
    self
      .public_key
      .as_deref()
      .ok_or(Error::MissingCredential("public key"))
  }

  /// `{base}/{segments...}`. Segments are percent-encoded.
  pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
    let mut url = self.base_url.clone();
    // parse_base_url rejects URLs that cannot take path segments.
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(segments);
    }
    url
  }

  pub(crate) fn private_key(&self) -> Result<&str> {
    self
      .private_key
      .as_deref()
      .ok_or(Error::MissingCredential("private key"))
  }

  /// [`Client::endpoint`] with the private key attached as `api_key`.
  pub(crate) fn authenticated(&self, segments: &[&str]) -> Result<Url> {
    let key = self.private_key()?;
    let mut url = self.endpoint(segments);
    url.query_pairs_mut().append_pair("api_key", key);
    Ok(url)
  }

  /// Send one request and classify the response.
  ///
  /// Anything other than `200 OK` becomes [`Error::Api`]. Otherwise the body
  /// is returned for the caller to decode according to its content type.
  pub(crate) async fn execute(
    &self,
    method: Method,
    accept: ContentKind,
    url: Url,
    body: Option<&Value>,
  ) -> Result<Payload> {
    // The query string carries credentials; only the path is logged.
    tracing::debug!(%method, path = url.path(), "sending request");

    let mut request = self
      .http
      .request(method.clone(), url.clone())
      .header(ACCEPT, accept.accept_header());
    if let Some(body) = body {
      request = request.json(body);
    }

    let response = request.send().await?;
    let status = response.status();
    let kind = ContentKind::of(response.headers());
    let body = response.bytes().await?;

    tracing::debug!(%method, path = url.path(), status = status.as_u16(), "received response");

    if status != StatusCode::OK {
      let err = ApiError::from_response(status.as_u16(), kind, &body);
      tracing::warn!(
        %method,
        path = url.path(),
        status = err.status,
        reason = err.reason(),
        "request failed"
      );
      return Err(Error::Api(err));
    }

    Ok(Payload { kind, body })
  }
}

fn non_blank(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}

fn parse_base_url(raw: &str) -> Result<Url> {
  let invalid = |reason: String| Error::InvalidBaseUrl {
    url: raw.to_string(),
    reason,
  };

  let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
  if !matches!(url.scheme(), "http" | "https") {
    return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
  }
  if url.cannot_be_a_base() {
    return Err(invalid("cannot be a base".to_string()));
  }
  if url.query().is_some() || url.fragment().is_some() {
    return Err(invalid("must not carry a query or fragment".to_string()));
  }
  Ok(url)
}
