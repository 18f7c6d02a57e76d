//! `pinpoint` — terminal dashboard for the Pinpoint location tracker.
//!
//! # Usage
//!
//! ```
//! pinpoint link --label "evening walk" --ttl-minutes 60
//! pinpoint links
//! pinpoint reports 3f9a0c1b7d2e
//! pinpoint watch 3f9a0c1b7d2e --interval 5
//! ```

mod client;
mod table;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use pinpoint_core::token::Token;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "pinpoint", about = "Dashboard for the Pinpoint location tracker")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the pinpoint server (default: http://localhost:5001).
  #[arg(long, env = "PINPOINT_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Generate a new tracking link.
  Link {
    /// Label for this link.
    #[arg(short, long)]
    label: Option<String>,
    /// Minutes until the link is shown as expired (0 = never).
    #[arg(short, long, default_value_t = 60)]
    ttl_minutes: u32,
  },
  /// List every tracking link.
  Links,
  /// Show the reports received for a token.
  Reports { token: String },
  /// Poll a token and print reports as they arrive.
  Watch {
    token: String,
    /// Seconds between polls.
    #[arg(short, long, default_value_t = 5)]
    interval: u64,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:5001".to_string()),
  };
  tracing::debug!(base_url = %api_config.base_url, "using server");

  let client = ApiClient::new(api_config)?;

  match args.command {
    Command::Link { label, ttl_minutes } => {
      let issued = client
        .create_link(label.as_deref(), Some(ttl_minutes))
        .await?;
      println!("Link generated: {}", issued.url);
      match issued.link.expires_at {
        Some(at) => println!("Expires at:     {}", at.to_rfc3339()),
        None => println!("Expires at:     never"),
      }
    }
    Command::Links => {
      let links = client.list_links().await?;
      print!("{}", table::links(&links));
    }
    Command::Reports { token } => {
      let token = Token::parse(&token)?;
      let reports = client.list_reports(&token).await?;
      print!("{}", table::reports(token.as_str(), &reports));
    }
    Command::Watch { token, interval } => {
      let token = Token::parse(&token)?;
      watch(&client, &token, Duration::from_secs(interval.max(1))).await?;
    }
  }

  Ok(())
}

// ─── Watch loop ───────────────────────────────────────────────────────────────

async fn watch(client: &ApiClient, token: &Token, interval: Duration) -> Result<()> {
  let mut seen = 0usize;
  let mut ticker = tokio::time::interval(interval);

  loop {
    tokio::select! {
      _ = tokio::signal::ctrl_c() => return Ok(()),
      _ = ticker.tick() => {}
    }

    let reports = match client.list_reports(token).await {
      Ok(r) => r,
      Err(e) => {
        tracing::warn!(error = %e, "poll failed");
        continue;
      }
    };

    // Reports are append-only, so anything past `seen` is new.
    if reports.len() > seen {
      print!("{}", table::reports(token.as_str(), &reports[seen..]));
      seen = reports.len();
    }
  }
}
