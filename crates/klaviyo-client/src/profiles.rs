//! Profile operations: identify, fetch and update.

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use klaviyo_core::Profile;
use reqwest::Method;
use serde_json::{Value, json};

use crate::{
  client::{Client, ContentKind},
  error::{Error, Result},
};

/// Body the identify endpoint returns when it accepted the payload.
const IDENTIFY_ACCEPTED: &str = "1";

impl Client {
  /// `GET /identify?data=<base64 JSON>`
  ///
  /// Creates or updates a profile using the public key. The profile must
  /// carry an email or phone number.
  pub async fn identify(&self, profile: &Profile) -> Result<()> {
    let token = self.public_key()?;
    if !profile.has_identifier() {
      return Err(Error::MissingIdentifier);
    }

    let payload = json!({
      "token":      token,
      "properties": profile.outbound(),
    });
    let data = B64.encode(serde_json::to_vec(&payload)?);

    let mut url = self.endpoint(&["identify"]);
    url.query_pairs_mut().append_pair("data", &data);

    let body = self
      .execute(Method::GET, ContentKind::Text, url, None)
      .await?
      .text();

    if body != IDENTIFY_ACCEPTED {
      return Err(Error::Rejected {
        operation: "identify",
        body,
      });
    }
    Ok(())
  }

  /// `GET /v1/person/{id}`
  pub async fn get_profile(&self, id: &str) -> Result<Profile> {
    self.private_key()?;
    if id.trim().is_empty() {
      return Err(Error::MissingProfileId);
    }
    let url = self.authenticated(&["v1", "person", id])?;

    self
      .execute(Method::GET, ContentKind::Json, url, None)
      .await?
      .json()
  }

  /// `PUT /v1/person/{id}?<properties>`
  ///
  /// Sends the profile's non-empty reserved fields and all of its attributes
  /// as query parameters and returns the profile as the service now has it.
  pub async fn update_profile(&self, profile: &Profile) -> Result<Profile> {
    self.private_key()?;
    if profile.id.trim().is_empty() {
      return Err(Error::MissingProfileId);
    }
    let mut url = self.authenticated(&["v1", "person", &profile.id])?;
    {
      let mut query = url.query_pairs_mut();
      for (key, value) in &profile.outbound() {
        if let Some(text) = query_value(value) {
          query.append_pair(key, &text);
        }
      }
    }

    self
      .execute(Method::PUT, ContentKind::Json, url, None)
      .await?
      .json()
  }
}

/// Render a flat value as a query-string value. Nulls are left out.
fn query_value(value: &Value) -> Option<String> {
  match value {
    Value::Null => None,
    Value::String(s) => Some(s.clone()),
    Value::Bool(b) => Some(b.to_string()),
    Value::Number(n) => Some(n.to_string()),
    Value::Array(_) | Value::Object(_) => Some(value.to_string()),
  }
}
