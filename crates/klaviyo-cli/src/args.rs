//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use klaviyo_client::ListIdentifiers;
use klaviyo_core::{Consent, Profile};
use serde_json::Value;

use crate::settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "klaviyo", version, about = "Manage Klaviyo profiles and lists")]
pub struct Cli {
  /// Path to a TOML config file (base_url, public_key, private_key,
  /// timeout_secs).
  #[arg(short, long, value_name = "FILE", default_value = "klaviyo.toml")]
  pub config: PathBuf,

  /// API root, e.g. https://a.klaviyo.com/api
  #[arg(long, global = true)]
  pub base_url: Option<String>,

  /// Public key, used by `identify`.
  #[arg(long, global = true)]
  pub public_key: Option<String>,

  /// Private key, used by every other command.
  #[arg(long, global = true)]
  pub private_key: Option<String>,

  /// Per-request timeout in seconds.
  #[arg(long, global = true)]
  pub timeout_secs: Option<u64>,

  #[command(subcommand)]
  pub command: Command,
}

impl Cli {
  /// Connection settings given as flags.
  pub fn flag_settings(&self) -> Settings {
    Settings {
      base_url:     self.base_url.clone(),
      public_key:   self.public_key.clone(),
      private_key:  self.private_key.clone(),
      timeout_secs: self.timeout_secs,
    }
  }
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Create or update a profile by email or phone number.
  Identify(ProfileArgs),

  /// Print a profile as flat JSON.
  Get { id: String },

  /// Fetch a profile, apply the given changes and send it back.
  Update {
    id:      String,
    #[command(flatten)]
    changes: ProfileArgs,
  },

  /// Show which of the given identifiers are members of a list.
  InList {
    list_id: String,
    #[command(flatten)]
    who:     MemberArgs,
  },

  /// Subscribe one profile to a list.
  Subscribe {
    list_id: String,
    #[command(flatten)]
    profile: ProfileArgs,
  },

  /// Unsubscribe identifiers from a list.
  Unsubscribe {
    list_id: String,
    #[command(flatten)]
    who:     MemberArgs,
  },
}

#[derive(Args, Debug, Default)]
pub struct ProfileArgs {
  #[arg(long)]
  pub email:      Option<String>,

  #[arg(long)]
  pub phone:      Option<String>,

  #[arg(long)]
  pub first_name: Option<String>,

  #[arg(long)]
  pub last_name:  Option<String>,

  /// Consent channel (email, web, sms, directmail, mobile). Repeatable;
  /// replaces the profile's existing consent list.
  #[arg(long)]
  pub consent:    Vec<Consent>,

  /// Custom attribute as KEY=VALUE. VALUE is read as JSON when it parses,
  /// otherwise as a string. Repeatable.
  #[arg(long = "attr", value_name = "KEY=VALUE", value_parser = parse_attr)]
  pub attrs:      Vec<(String, Value)>,
}

impl ProfileArgs {
  /// Write every given value into `profile`, leaving the rest untouched.
  pub fn apply(self, profile: &mut Profile) {
    if let Some(email) = self.email {
      profile.email = email;
    }
    if let Some(phone) = self.phone {
      profile.phone_number = phone;
    }
    if let Some(first_name) = self.first_name {
      profile.first_name = first_name;
    }
    if let Some(last_name) = self.last_name {
      profile.last_name = last_name;
    }
    if !self.consent.is_empty() {
      profile.consent = self.consent;
    }
    profile.attributes.extend(self.attrs);
  }

  pub fn into_profile(self) -> Profile {
    let mut profile = Profile::default();
    self.apply(&mut profile);
    profile
  }
}

#[derive(Args, Debug, Default)]
pub struct MemberArgs {
  /// Repeatable.
  #[arg(long = "email")]
  pub emails:        Vec<String>,

  /// Repeatable.
  #[arg(long = "phone")]
  pub phone_numbers: Vec<String>,

  /// Repeatable.
  #[arg(long = "push-token")]
  pub push_tokens:   Vec<String>,
}

impl From<MemberArgs> for ListIdentifiers {
  fn from(args: MemberArgs) -> Self {
    ListIdentifiers {
      emails:        args.emails,
      phone_numbers: args.phone_numbers,
      push_tokens:   args.push_tokens,
    }
  }
}

fn parse_attr(raw: &str) -> Result<(String, Value), String> {
  let (key, value) = raw
    .split_once('=')
    .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))?;
  if key.is_empty() {
    return Err("attribute key is empty".to_string());
  }
  if key.starts_with(klaviyo_core::RESERVED_SIGIL) {
    return Err(format!("{key:?} is reserved; use the dedicated flag"));
  }
  let value = serde_json::from_str(value)
    .unwrap_or_else(|_| Value::String(value.to_string()));
  Ok((key.to_string(), value))
}
