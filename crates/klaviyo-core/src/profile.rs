//! Profile — a tracked individual as the remote service sees it.
//!
//! On the wire a profile is one flat JSON object: `id`, `object`, the
//! sigil-prefixed reserved keys from [`ReservedField`], and any number of
//! unprefixed custom keys. In memory the reserved fields are typed and the
//! custom keys live in [`Attributes`].

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use serde_json::{Map, Value};

use crate::{
  Error, Result,
  attributes::Attributes,
  consent::Consent,
  field::{ID_KEY, OBJECT_KEY, ReservedField, is_reserved_key},
};

/// The flat wire form of a profile.
pub type FlatMap = Map<String, Value>;

// ─── Profile ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
  /// Remote-assigned identifier; empty until the service has seen the profile.
  pub id:           String,
  /// Remote discriminator, e.g. `"person"`. Passed through untouched.
  pub object_kind:  String,

  pub external_id:  String,
  pub email:        String,
  pub phone_number: String,

  pub first_name:   String,
  pub last_name:    String,
  pub organization: String,
  pub title:        String,
  pub image:        String,

  pub address1:     String,
  pub address2:     String,
  pub city:         String,
  pub region:       String,
  pub country:      String,
  pub zip:          String,
  pub latitude:     String,
  pub longitude:    String,
  pub timezone:     String,

  pub source:       String,
  pub consent:      Vec<Consent>,

  pub attributes:   Attributes,
}

impl Profile {
  /// A profile is addressable by the service once it has a non-blank email
  /// or phone number.
  pub fn has_identifier(&self) -> bool {
    !(self.email.trim().is_empty() && self.phone_number.trim().is_empty())
  }

  /// The text value of a reserved field. `None` for [`ReservedField::Consent`],
  /// which is a list.
  pub fn text(&self, field: ReservedField) -> Option<&str> {
    let slot = match field {
      ReservedField::ExternalId => &self.external_id,
      ReservedField::Email => &self.email,
      ReservedField::PhoneNumber => &self.phone_number,
      ReservedField::FirstName => &self.first_name,
      ReservedField::LastName => &self.last_name,
      ReservedField::Organization => &self.organization,
      ReservedField::Title => &self.title,
      ReservedField::Image => &self.image,
      ReservedField::Address1 => &self.address1,
      ReservedField::Address2 => &self.address2,
      ReservedField::City => &self.city,
      ReservedField::Region => &self.region,
      ReservedField::Country => &self.country,
      ReservedField::Zip => &self.zip,
      ReservedField::Latitude => &self.latitude,
      ReservedField::Longitude => &self.longitude,
      ReservedField::Timezone => &self.timezone,
      ReservedField::Source => &self.source,
      ReservedField::Consent => return None,
    };
    Some(slot.as_str())
  }

  /// Mutable access to a reserved text field. `None` for
  /// [`ReservedField::Consent`].
  pub fn text_mut(&mut self, field: ReservedField) -> Option<&mut String> {
    let slot = match field {
      ReservedField::ExternalId => &mut self.external_id,
      ReservedField::Email => &mut self.email,
      ReservedField::PhoneNumber => &mut self.phone_number,
      ReservedField::FirstName => &mut self.first_name,
      ReservedField::LastName => &mut self.last_name,
      ReservedField::Organization => &mut self.organization,
      ReservedField::Title => &mut self.title,
      ReservedField::Image => &mut self.image,
      ReservedField::Address1 => &mut self.address1,
      ReservedField::Address2 => &mut self.address2,
      ReservedField::City => &mut self.city,
      ReservedField::Region => &mut self.region,
      ReservedField::Country => &mut self.country,
      ReservedField::Zip => &mut self.zip,
      ReservedField::Latitude => &mut self.latitude,
      ReservedField::Longitude => &mut self.longitude,
      ReservedField::Timezone => &mut self.timezone,
      ReservedField::Source => &mut self.source,
      ReservedField::Consent => return None,
    };
    Some(slot)
  }

  fn reserved_value(&self, field: ReservedField) -> Value {
    match self.text(field) {
      Some(text) => Value::String(text.to_owned()),
      None => Value::Array(
        self
          .consent
          .iter()
          .map(|c| Value::String(c.as_ref().to_owned()))
          .collect(),
      ),
    }
  }

  fn is_blank(&self, field: ReservedField) -> bool {
    match self.text(field) {
      Some(text) => text.is_empty(),
      None => self.consent.is_empty(),
    }
  }

  // ── Flatten ───────────────────────────────────────────────────────────────

  /// Merge the reserved fields and the attributes into one flat map.
  ///
  /// Always carries `id`, `object` and every reserved key. A reserved field
  /// overwrites an attribute stored under the same key.
  pub fn flatten(&self) -> FlatMap {
    let mut flat = self.attributes.clone().into_inner();
    flat.insert(ID_KEY.to_owned(), Value::String(self.id.clone()));
    flat.insert(OBJECT_KEY.to_owned(), Value::String(self.object_kind.clone()));
    for field in ReservedField::ALL {
      flat.insert(field.wire_key().to_owned(), self.reserved_value(field));
    }
    flat
  }

  /// The flat map as sent on identify, update and subscribe: `id` and
  /// `object` removed, and empty reserved fields left out so they don't
  /// clear what the service already holds.
  pub fn outbound(&self) -> FlatMap {
    let mut flat = self.flatten();
    flat.remove(ID_KEY);
    flat.remove(OBJECT_KEY);
    for field in ReservedField::ALL {
      if self.is_blank(field) {
        flat.remove(field.wire_key());
      }
    }
    flat
  }

  // ── Split ─────────────────────────────────────────────────────────────────

  /// Separate a flat map back into reserved fields and attributes.
  ///
  /// `id`, `object` and every sigil-prefixed key are consumed; keys in the
  /// sigil namespace that aren't in the reserved table are dropped. What
  /// remains becomes a fresh [`Attributes`].
  pub fn split(mut flat: FlatMap) -> Result<Self> {
    let mut profile = Profile {
      id: decode_passthrough(ID_KEY, flat.remove(ID_KEY))?,
      object_kind: decode_passthrough(OBJECT_KEY, flat.remove(OBJECT_KEY))?,
      ..Default::default()
    };

    for field in ReservedField::ALL {
      let value = flat.remove(field.wire_key());
      if let Some(slot) = profile.text_mut(field) {
        *slot = decode_text(field, value)?;
      } else {
        profile.consent = decode_consent(value)?;
      }
    }

    flat.retain(|key, _| !is_reserved_key(key));
    profile.attributes = Attributes::from(flat);
    Ok(profile)
  }

  /// [`Profile::split`] for an arbitrary JSON value, which must be an object.
  pub fn from_value(value: Value) -> Result<Self> {
    match value {
      Value::Object(flat) => Self::split(flat),
      other => Err(Error::NotAnObject(json_type(&other))),
    }
  }
}

// ─── Field decoding ──────────────────────────────────────────────────────────

fn decode_passthrough(key: &'static str, value: Option<Value>) -> Result<String> {
  match value {
    None | Some(Value::Null) => Ok(String::new()),
    Some(Value::String(s)) => Ok(s),
    Some(_) => Err(Error::ReservedFieldType { key, expected: "a string" }),
  }
}

fn decode_text(field: ReservedField, value: Option<Value>) -> Result<String> {
  match value {
    None | Some(Value::Null) => Ok(String::new()),
    Some(Value::String(s)) => Ok(s),
    Some(Value::Number(n)) if field.accepts_number() => Ok(n.to_string()),
    Some(_) => Err(Error::ReservedFieldType {
      key:      field.wire_key(),
      expected: if field.accepts_number() {
        "a string or number"
      } else {
        "a string"
      },
    }),
  }
}

fn decode_consent(value: Option<Value>) -> Result<Vec<Consent>> {
  let mismatch = || Error::ReservedFieldType {
    key:      ReservedField::Consent.wire_key(),
    expected: "an array of strings",
  };

  match value {
    None | Some(Value::Null) => Ok(Vec::new()),
    Some(Value::Array(items)) => items
      .into_iter()
      .map(|item| match item {
        Value::String(tag) => {
          Consent::from_str(&tag).map_err(|_| Error::UnknownConsent(tag))
        }
        _ => Err(mismatch()),
      })
      .collect(),
    Some(_) => Err(mismatch()),
  }
}

fn json_type(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

// ─── Serde ───────────────────────────────────────────────────────────────────

impl Serialize for Profile {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    self.flatten().serialize(serializer)
  }
}

impl<'de> Deserialize<'de> for Profile {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let flat = FlatMap::deserialize(deserializer)?;
    Profile::split(flat).map_err(D::Error::custom)
  }
}
