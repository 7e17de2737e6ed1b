//! List operations: membership queries, subscribe and unsubscribe.

use klaviyo_core::{ListMember, Profile};
use reqwest::Method;
use serde::Serialize;
use serde_json::{Value, json};

use crate::{
  client::{Client, ContentKind},
  error::{Error, Result},
};

/// Identifiers naming list members, grouped by kind.
///
/// Serialises as the unsubscribe body; empty groups are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListIdentifiers {
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub emails:        Vec<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub phone_numbers: Vec<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub push_tokens:   Vec<String>,
}

impl ListIdentifiers {
  pub fn emails<I, S>(emails: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      emails: emails.into_iter().map(Into::into).collect(),
      ..Default::default()
    }
  }

  pub fn is_empty(&self) -> bool {
    self.emails.is_empty()
      && self.phone_numbers.is_empty()
      && self.push_tokens.is_empty()
  }

  fn query_pairs(&self) -> impl Iterator<Item = (&'static str, String)> + '_ {
    [
      ("emails", &self.emails),
      ("phone_numbers", &self.phone_numbers),
      ("push_tokens", &self.push_tokens),
    ]
    .into_iter()
    .filter(|(_, values)| !values.is_empty())
    .map(|(key, values)| (key, values.join(",")))
  }
}

impl Client {
  /// Checks shared by every list operation, in the same order as the profile
  /// operations: credential first, then input.
  fn require_list_access(&self, list_id: &str) -> Result<()> {
    self.private_key()?;
    if list_id.trim().is_empty() {
      return Err(Error::MissingListId);
    }
    Ok(())
  }

  /// `GET /v2/list/{list_id}/members?emails=..&phone_numbers=..&push_tokens=..`
  ///
  /// Returns the members of the list among those identified. Asking about
  /// nobody returns an empty result without a request.
  pub async fn in_list(
    &self,
    list_id: &str,
    who: &ListIdentifiers,
  ) -> Result<Vec<ListMember>> {
    self.require_list_access(list_id)?;
    if who.is_empty() {
      tracing::debug!(list_id, "membership query has no identifiers; skipping");
      return Ok(Vec::new());
    }

    let mut url = self.authenticated(&["v2", "list", list_id, "members"])?;
    url.query_pairs_mut().extend_pairs(who.query_pairs());

    self
      .execute(Method::GET, ContentKind::Json, url, None)
      .await?
      .json()
  }

  /// `POST /v2/list/{list_id}/subscribe`
  ///
  /// Every profile must carry an email or phone number.
  pub async fn subscribe(
    &self,
    list_id: &str,
    profiles: &[Profile],
  ) -> Result<Vec<ListMember>> {
    self.require_list_access(list_id)?;
    if profiles.is_empty() {
      return Ok(Vec::new());
    }
    if !profiles.iter().all(Profile::has_identifier) {
      return Err(Error::MissingIdentifier);
    }

    let url = self.authenticated(&["v2", "list", list_id, "subscribe"])?;
    let body = json!({
      "profiles": profiles
        .iter()
        .map(|p| Value::Object(p.outbound()))
        .collect::<Vec<_>>(),
    });

    self
      .execute(Method::POST, ContentKind::Json, url, Some(&body))
      .await?
      .json()
  }

  /// `DELETE /v2/list/{list_id}/subscribe`
  pub async fn unsubscribe(
    &self,
    list_id: &str,
    who: &ListIdentifiers,
  ) -> Result<()> {
    self.require_list_access(list_id)?;
    if who.is_empty() {
      return Ok(());
    }

    let url = self.authenticated(&["v2", "list", list_id, "subscribe"])?;
    let body = serde_json::to_value(who)?;

    // The response body carries nothing of interest.
    self
      .execute(Method::DELETE, ContentKind::Json, url, Some(&body))
      .await?;
    Ok(())
  }
}
