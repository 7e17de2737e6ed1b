//! Async HTTP client for the Klaviyo profile and list APIs.
//!
//! Every operation makes at most one round trip. Credentials are checked and
//! profiles validated before anything touches the network; see [`Error`] for
//! how failures are classified.
//!
//! # Quick start
//!
//! ```no_run
//! use klaviyo_client::{Client, ClientConfig};
//! use klaviyo_core::Profile;
//!
//! # async fn run() -> klaviyo_client::Result<()> {
//! let client = Client::new(ClientConfig {
//!   public_key: Some("pk_public".into()),
//!   private_key: Some("pk_private".into()),
//!   ..Default::default()
//! })?;
//!
//! let mut profile = client.get_profile("01ABC").await?;
//! let likes_gold = profile.attributes.parse_bool("LikesGold");
//! profile.attributes.insert("LikesGold".into(), (!likes_gold).into());
//! client.update_profile(&profile).await?;
//! # Ok(())
//! # }
//! ```

mod client;
pub mod error;
mod lists;
mod profiles;

pub use client::{Client, ClientConfig, ContentKind, DEFAULT_BASE_URL};
pub use error::{ApiError, Error, ErrorKind, Result};
pub use lists::ListIdentifiers;

#[cfg(test)]
mod tests;
