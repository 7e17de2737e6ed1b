//! Consent channels recorded against a profile's `$consent` list.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// A channel the profile has consented to be contacted through.
///
/// The set is closed; the wire form is the lowercase tag, e.g. `"directmail"`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Consent {
  Email,
  Web,
  Sms,
  DirectMail,
  Mobile,
}
