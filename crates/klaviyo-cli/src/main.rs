//! `klaviyo` — command-line access to the Klaviyo profile and list APIs.
//!
//! # Usage
//!
//! ```text
//! klaviyo --private-key pk_xxx get 01ABC
//! klaviyo identify --email kitty@example.com --attr IsTest=true
//! klaviyo in-list LIST1 --email kitty@example.com
//! ```
//!
//! Keys and the base URL may also come from `klaviyo.toml` or from
//! `KLAVIYO_PUBLIC_KEY`, `KLAVIYO_PRIVATE_KEY`, `KLAVIYO_BASE_URL` and
//! `KLAVIYO_TIMEOUT_SECS`.

mod args;
mod settings;

use anyhow::{Context, Result};
use args::{Cli, Command};
use clap::Parser;
use klaviyo_client::Client;
use serde::Serialize;
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  // Flags override the environment, which overrides the config file.
  let settings = Settings::load(&cli.config)?.overlay(cli.flag_settings());
  let client = Client::new(settings.into_client_config())
    .context("failed to build client")?;

  run(&client, cli.command).await
}

async fn run(client: &Client, command: Command) -> Result<()> {
  match command {
    Command::Identify(args) => {
      let profile = args.into_profile();
      client.identify(&profile).await.context("identify failed")?;
      tracing::info!(email = %profile.email, phone = %profile.phone_number, "profile identified");
    }

    Command::Get { id } => {
      let profile = client
        .get_profile(&id)
        .await
        .with_context(|| format!("fetching profile {id}"))?;
      print_json(&profile)?;
    }

    Command::Update { id, changes } => {
      let mut profile = client
        .get_profile(&id)
        .await
        .with_context(|| format!("fetching profile {id}"))?;
      changes.apply(&mut profile);
      let updated = client
        .update_profile(&profile)
        .await
        .with_context(|| format!("updating profile {id}"))?;
      print_json(&updated)?;
    }

    Command::InList { list_id, who } => {
      let members = client
        .in_list(&list_id, &who.into())
        .await
        .with_context(|| format!("querying members of list {list_id}"))?;
      print_json(&members)?;
    }

    Command::Subscribe { list_id, profile } => {
      let members = client
        .subscribe(&list_id, &[profile.into_profile()])
        .await
        .with_context(|| format!("subscribing to list {list_id}"))?;
      print_json(&members)?;
    }

    Command::Unsubscribe { list_id, who } => {
      client
        .unsubscribe(&list_id, &who.into())
        .await
        .with_context(|| format!("unsubscribing from list {list_id}"))?;
      tracing::info!(%list_id, "unsubscribed");
    }
  }
  Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  let text = serde_json::to_string_pretty(value).context("rendering output")?;
  println!("{text}");
  Ok(())
}
