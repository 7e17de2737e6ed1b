//! Layered client settings: config file, then `KLAVIYO_*` environment
//! variables, then command-line flags.

use std::{path::Path, time::Duration};

use anyhow::{Context as _, Result};
use klaviyo_client::{ClientConfig, DEFAULT_BASE_URL};
use serde::Deserialize;

/// Shape of the optional TOML config file and the `KLAVIYO_*` variables.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
  pub base_url:     Option<String>,
  pub public_key:   Option<String>,
  pub private_key:  Option<String>,
  pub timeout_secs: Option<u64>,
}

impl Settings {
  /// Read `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("KLAVIYO"))
      .build()
      .with_context(|| format!("reading configuration from {}", path.display()))?
      .try_deserialize()
      .context("invalid configuration")
  }

  /// Values set in `over` win over those in `self`.
  pub fn overlay(self, over: Settings) -> Settings {
    Settings {
      base_url:     over.base_url.or(self.base_url),
      public_key:   over.public_key.or(self.public_key),
      private_key:  over.private_key.or(self.private_key),
      timeout_secs: over.timeout_secs.or(self.timeout_secs),
    }
  }

  pub fn into_client_config(self) -> ClientConfig {
    let defaults = ClientConfig::default();
    ClientConfig {
      base_url:    self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
      public_key:  self.public_key,
      private_key: self.private_key,
      timeout:     self
        .timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(defaults.timeout),
    }
  }
}
