//! The caller-defined attribute bag carried by every profile.
//!
//! Values are arbitrary JSON. The remote service tends to hand booleans and
//! numbers back as strings, so typed lookups are lenient about that.

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single attribute value: null, bool, number, string, array or object.
pub type AttributeValue = Value;

/// Custom key/value attributes of a profile, keyed by attribute name.
///
/// Keys starting with [`crate::RESERVED_SIGIL`] are owned by the vendor and
/// never survive a decode; see [`crate::Profile::split`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(Map<String, Value>);

impl Attributes {
  pub fn new() -> Self { Self::default() }

  /// Interpret `key` as a boolean.
  ///
  /// A bool is returned as-is and the strings `"true"` and `"1"` (exact,
  /// case-sensitive) count as true. Anything else, including a missing key,
  /// is false.
  pub fn parse_bool(&self, key: &str) -> bool {
    match self.0.get(key) {
      Some(Value::Bool(b)) => *b,
      Some(Value::String(s)) => s == "true" || s == "1",
      _ => false,
    }
  }

  /// Interpret `key` as a float, accepting either a JSON number or a string
  /// holding one (e.g. `"123.345"`).
  pub fn parse_f64(&self, key: &str) -> Option<f64> {
    match self.0.get(key)? {
      Value::Number(n) => n.as_f64(),
      Value::String(s) => s.parse().ok(),
      _ => None,
    }
  }

  /// Interpret `key` as an integer, accepting either a JSON integer or a
  /// string holding one. Fractional values yield `None`.
  pub fn parse_i64(&self, key: &str) -> Option<i64> {
    match self.0.get(key)? {
      Value::Number(n) => n.as_i64(),
      Value::String(s) => s.parse().ok(),
      _ => None,
    }
  }

  pub fn into_inner(self) -> Map<String, Value> { self.0 }
}

impl Deref for Attributes {
  type Target = Map<String, Value>;

  fn deref(&self) -> &Self::Target { &self.0 }
}

impl DerefMut for Attributes {
  fn deref_mut(&mut self) -> &mut Self::Target { &mut self.0 }
}

impl From<Map<String, Value>> for Attributes {
  fn from(map: Map<String, Value>) -> Self { Self(map) }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Attributes {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
  }
}

impl IntoIterator for Attributes {
  type IntoIter = serde_json::map::IntoIter;
  type Item = (String, Value);

  fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}

impl<'a> IntoIterator for &'a Attributes {
  type IntoIter = serde_json::map::Iter<'a>;
  type Item = (&'a String, &'a Value);

  fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}
