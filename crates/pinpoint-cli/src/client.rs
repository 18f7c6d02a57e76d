//! Async HTTP client wrapping the pinpoint JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use pinpoint_core::{link::TrackingLink, report::Report, token::Token};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

/// Connection settings for the pinpoint API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// A link as the API returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct IssuedLink {
  #[serde(flatten)]
  pub link:    TrackingLink,
  pub url:     String,
  pub expired: bool,
}

#[derive(Debug, Serialize)]
struct CreateLink<'a> {
  label:       Option<&'a str>,
  ttl_minutes: Option<u32>,
}

/// Async HTTP client for the pinpoint JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  // ── Links ─────────────────────────────────────────────────────────────────

  /// `POST /api/links`
  pub async fn create_link(
    &self,
    label: Option<&str>,
    ttl_minutes: Option<u32>,
  ) -> Result<IssuedLink> {
    let resp = self
      .client
      .post(self.url("/links"))
      .json(&CreateLink { label, ttl_minutes })
      .send()
      .await
      .context("POST /links failed")?;

    check(resp, "POST /links")
      .await?
      .json()
      .await
      .context("deserialising link")
  }

  /// `GET /api/links`
  pub async fn list_links(&self) -> Result<Vec<IssuedLink>> {
    let resp = self
      .client
      .get(self.url("/links"))
      .send()
      .await
      .context("GET /links failed")?;

    check(resp, "GET /links")
      .await?
      .json()
      .await
      .context("deserialising links")
  }

  // ── Reports ───────────────────────────────────────────────────────────────

  /// `GET /api/tokens/<token>/reports`
  pub async fn list_reports(&self, token: &Token) -> Result<Vec<Report>> {
    let path = format!("/tokens/{token}/reports");
    let resp = self
      .client
      .get(self.url(&path))
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;

    check(resp, &path)
      .await?
      .json()
      .await
      .context("deserialising reports")
  }
}

/// Turn a non-2xx response into an error carrying the server's message.
async fn check(resp: Response, what: &str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let detail = resp
    .json::<serde_json::Value>()
    .await
    .ok()
    .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned))
    .unwrap_or_default();
  Err(anyhow!("{what} → {status} {detail}"))
}
