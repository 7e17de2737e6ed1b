//! List membership records.

use serde::{Deserialize, Serialize};

/// A profile's membership of a list, as returned by membership queries and
/// subscribe calls. Fields the service leaves out decode as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListMember {
  pub id:           String,
  pub email:        String,
  pub phone_number: String,
  /// Membership timestamp exactly as the service formats it.
  pub created:      String,
}
