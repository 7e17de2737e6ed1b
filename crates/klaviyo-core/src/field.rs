//! The fixed table of vendor-reserved profile fields.
//!
//! Every reserved field travels under a wire key carrying [`RESERVED_SIGIL`].
//! The vendor owns the whole sigil namespace, including keys not listed here.

/// Prefix marking a wire key as vendor-reserved.
pub const RESERVED_SIGIL: char = '$';

/// Wire key of the remote-assigned profile id.
pub const ID_KEY: &str = "id";

/// Wire key of the remote object discriminator (e.g. `"person"`).
pub const OBJECT_KEY: &str = "object";

/// True if `key` lies in the vendor-reserved namespace.
pub fn is_reserved_key(key: &str) -> bool { key.starts_with(RESERVED_SIGIL) }

/// A reserved profile field understood natively by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservedField {
  // ── Identifiers ─────────────────────────────────────────────────────────
  ExternalId,
  Email,
  PhoneNumber,

  // ── Descriptive ─────────────────────────────────────────────────────────
  FirstName,
  LastName,
  Organization,
  Title,
  Image,

  // ── Location ────────────────────────────────────────────────────────────
  Address1,
  Address2,
  City,
  Region,
  Country,
  Zip,
  Latitude,
  Longitude,
  Timezone,

  // ── Provenance ──────────────────────────────────────────────────────────
  Source,
  Consent,
}

impl ReservedField {
  /// Every reserved field, in wire order.
  pub const ALL: [ReservedField; 19] = [
    Self::ExternalId,
    Self::Email,
    Self::PhoneNumber,
    Self::FirstName,
    Self::LastName,
    Self::Organization,
    Self::Title,
    Self::Image,
    Self::Address1,
    Self::Address2,
    Self::City,
    Self::Region,
    Self::Country,
    Self::Zip,
    Self::Latitude,
    Self::Longitude,
    Self::Timezone,
    Self::Source,
    Self::Consent,
  ];

  /// The sigil-prefixed key this field is sent and received under.
  pub const fn wire_key(self) -> &'static str {
    match self {
      Self::ExternalId => "$id",
      Self::Email => "$email",
      Self::PhoneNumber => "$phone_number",
      Self::FirstName => "$first_name",
      Self::LastName => "$last_name",
      Self::Organization => "$organization",
      Self::Title => "$title",
      Self::Image => "$image",
      Self::Address1 => "$address1",
      Self::Address2 => "$address2",
      Self::City => "$city",
      Self::Region => "$region",
      Self::Country => "$country",
      Self::Zip => "$zip",
      Self::Latitude => "$latitude",
      Self::Longitude => "$longitude",
      Self::Timezone => "$timezone",
      Self::Source => "$source",
      Self::Consent => "$consent",
    }
  }

  /// The field's name on [`crate::Profile`].
  pub const fn name(self) -> &'static str {
    match self {
      Self::ExternalId => "external_id",
      Self::Email => "email",
      Self::PhoneNumber => "phone_number",
      Self::FirstName => "first_name",
      Self::LastName => "last_name",
      Self::Organization => "organization",
      Self::Title => "title",
      Self::Image => "image",
      Self::Address1 => "address1",
      Self::Address2 => "address2",
      Self::City => "city",
      Self::Region => "region",
      Self::Country => "country",
      Self::Zip => "zip",
      Self::Latitude => "latitude",
      Self::Longitude => "longitude",
      Self::Timezone => "timezone",
      Self::Source => "source",
      Self::Consent => "consent",
    }
  }

  pub fn from_wire_key(key: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|f| f.wire_key() == key)
  }

  /// Latitude and longitude are text on the profile but the service may
  /// send them as bare numbers.
  pub(crate) const fn accepts_number(self) -> bool {
    matches!(self, Self::Latitude | Self::Longitude)
  }
}
