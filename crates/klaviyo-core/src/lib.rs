//! Core types for the Klaviyo client SDK.
//!
//! A [`Profile`] is a fixed set of vendor-reserved fields plus a free-form
//! [`Attributes`] bag. On the wire both live side by side in one flat JSON
//! object; [`Profile::flatten`] and [`Profile::split`] convert between the
//! two shapes.
//!
//! This crate is deliberately free of HTTP dependencies and performs no
//! logging.

pub mod attributes;
pub mod consent;
pub mod error;
pub mod field;
pub mod member;
pub mod profile;

pub use attributes::{AttributeValue, Attributes};
pub use consent::Consent;
pub use error::{Error, Result};
pub use field::{RESERVED_SIGIL, ReservedField};
pub use member::ListMember;
pub use profile::{FlatMap, Profile};
