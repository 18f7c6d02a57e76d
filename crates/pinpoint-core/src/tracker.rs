//! [`Tracker`] — the ingestion and query interfaces over a [`ReportStore`].
//!
//! The HTTP layers never talk to a store directly. They go through a tracker,
//! which parses untrusted tokens, stamps receipt times and maps backend
//! errors into [`Error::Store`].

use std::{collections::BTreeSet, sync::Arc};

use chrono::{TimeDelta, Utc};

use crate::{
  Error, Result,
  link::TrackingLink,
  report::{Report, Submission},
  store::ReportStore,
  token::Token,
};

/// How many fresh tokens [`Tracker::issue_link`] draws before giving up.
pub const ISSUE_ATTEMPTS: usize = 8;

/// Shared handle to a store. Cloning is cheap.
pub struct Tracker<S> {
  store: Arc<S>,
}

impl<S> Clone for Tracker<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: ReportStore> Tracker<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  // ── Links ─────────────────────────────────────────────────────────────

  /// Generate a token and register it with the given label and TTL.
  pub async fn issue_link(
    &self,
    label: Option<String>,
    ttl: Option<TimeDelta>,
  ) -> Result<TrackingLink> {
    for _ in 0..ISSUE_ATTEMPTS {
      let mut link = TrackingLink::new(Token::generate()?);
      if let Some(label) = &label {
        link = link.with_label(label.as_str());
      }
      if let Some(ttl) = ttl {
        link = link.with_ttl(ttl);
      }
      if self.store.create_link(link.clone()).await.map_err(Error::store)? {
        return Ok(link);
      }
    }
    Err(Error::TokenExhausted(ISSUE_ATTEMPTS))
  }

  /// Register a caller-chosen token. Idempotent.
  pub async fn create_token(&self, token: &str) -> Result<Token> {
    let token = Token::parse(token)?;
    self
      .store
      .create_token(token.clone())
      .await
      .map_err(Error::store)?;
    Ok(token)
  }

  pub async fn links(&self) -> Result<Vec<TrackingLink>> {
    self.store.list_links().await.map_err(Error::store)
  }

  // ── Ingestion ─────────────────────────────────────────────────────────

  /// Store a validated submission for `token`, creating the token if needed.
  pub async fn submit(
    &self,
    token: &str,
    submission: Submission,
    source_address: Option<String>,
  ) -> Result<Report> {
    let token = Token::parse(token)?;
    let report = submission.into_report(Utc::now(), source_address);
    self
      .store
      .append_report(token, report.clone())
      .await
      .map_err(Error::store)?;
    Ok(report)
  }

  /// Parse a raw JSON body and store it. Nothing is written if the body is
  /// rejected.
  pub async fn submit_json(
    &self,
    token: &str,
    body: &[u8],
    source_address: Option<String>,
  ) -> Result<Report> {
    let token = Token::parse(token)?;
    let submission = Submission::from_slice(body)?;
    self.submit(token.as_str(), submission, source_address).await
  }

  // ── Queries ───────────────────────────────────────────────────────────

  pub async fn tokens(&self) -> Result<BTreeSet<Token>> {
    self.store.list_tokens().await.map_err(Error::store)
  }

  /// Reports for `token` in arrival order. A token that could never have been
  /// issued simply has no reports.
  pub async fn reports_for(&self, token: &str) -> Result<Vec<Report>> {
    let Ok(token) = Token::parse(token) else {
      return Ok(Vec::new());
    };
    self.store.list_reports(token).await.map_err(Error::store)
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::memory::MemoryStore;

  fn tracker() -> Tracker<MemoryStore> { Tracker::new(Arc::new(MemoryStore::new())) }

  fn body(v: serde_json::Value) -> Vec<u8> { v.to_string().into_bytes() }

  #[tokio::test]
  async fn issued_links_are_registered() {
    let t = tracker();
    let link = t
      .issue_link(Some("dog walker".into()), Some(TimeDelta::minutes(60)))
      .await
      .unwrap();

    assert_eq!(link.label.as_deref(), Some("dog walker"));
    assert!(link.expires_at.is_some());
    assert!(t.tokens().await.unwrap().contains(&link.token));
    assert_eq!(t.links().await.unwrap(), vec![link]);
  }

  #[tokio::test]
  async fn scenario_two_tokens() {
    let t = tracker();
    t.create_token("abc123").await.unwrap();

    let first = t
      .submit(
        "abc123",
        Submission::new(37.7749, -122.4194).unwrap().with_accuracy(15.0),
        None,
      )
      .await
      .unwrap();
    let reports = t.reports_for("abc123").await.unwrap();
    assert_eq!(reports, vec![first.clone()]);
    assert_eq!(reports[0].latitude, 37.7749);
    assert_eq!(reports[0].longitude, -122.4194);
    assert_eq!(reports[0].accuracy, Some(15.0));

    let second = t
      .submit("abc123", Submission::new(40.7128, -74.0060).unwrap(), None)
      .await
      .unwrap();
    assert_eq!(t.reports_for("abc123").await.unwrap(), vec![first, second]);

    t.submit("zzz999", Submission::new(1.0, 1.0).unwrap(), None)
      .await
      .unwrap();
    assert!(t.tokens().await.unwrap().contains(&Token::parse("zzz999").unwrap()));
    assert_eq!(t.reports_for("zzz999").await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn rejected_payload_writes_nothing() {
    let t = tracker();
    t.submit_json("abc123", &body(json!({ "latitude": 1, "longitude": 2 })), None)
      .await
      .unwrap();

    let err = t
      .submit_json(
        "abc123",
        &body(json!({ "latitude": "oops", "longitude": 2 })),
        None,
      )
      .await
      .unwrap_err();
    assert!(err.is_client_error());
    assert_eq!(t.reports_for("abc123").await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn malformed_token_is_rejected_on_submit() {
    let t = tracker();
    let err = t
      .submit("../etc", Submission::new(0.0, 0.0).unwrap(), None)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::InvalidToken(_)));
    assert!(t.tokens().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn malformed_token_reads_as_empty() {
    let t = tracker();
    assert!(t.reports_for("not a token").await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn source_address_is_recorded() {
    let t = tracker();
    let report = t
      .submit(
        "abc123",
        Submission::new(0.0, 0.0).unwrap(),
        Some("203.0.113.9".into()),
      )
      .await
      .unwrap();
    assert_eq!(report.source_address.as_deref(), Some("203.0.113.9"));
  }

  // ── Failing backend ─────────────────────────────────────────────────

  struct Unavailable;

  fn down() -> std::io::Error { std::io::Error::other("disk unavailable") }

  impl ReportStore for Unavailable {
    type Error = std::io::Error;

    async fn create_link(&self, _link: TrackingLink) -> Result<bool, Self::Error> {
      Err(down())
    }

    async fn list_links(&self) -> Result<Vec<TrackingLink>, Self::Error> {
      Err(down())
    }

    async fn list_tokens(&self) -> Result<BTreeSet<Token>, Self::Error> {
      Err(down())
    }

    async fn append_report(&self, _token: Token, _report: Report) -> Result<(), Self::Error> {
      Err(down())
    }

    async fn list_reports(&self, _token: Token) -> Result<Vec<Report>, Self::Error> {
      Err(down())
    }
  }

  #[tokio::test]
  async fn store_failures_surface_as_store_errors() {
    let t = Tracker::new(Arc::new(Unavailable));

    let err = t
      .submit("abc123", Submission::new(1.0, 2.0).unwrap(), None)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Store(_)));
    assert!(!err.is_client_error());
    assert!(err.to_string().contains("disk unavailable"));

    assert!(matches!(t.reports_for("abc123").await, Err(Error::Store(_))));
    assert!(matches!(t.tokens().await, Err(Error::Store(_))));
    assert!(matches!(t.links().await, Err(Error::Store(_))));
    assert!(matches!(t.create_token("abc123").await, Err(Error::Store(_))));
    assert!(matches!(t.issue_link(None, None).await, Err(Error::Store(_))));
  }

  #[tokio::test]
  async fn bad_input_is_rejected_before_reaching_the_store() {
    let t = Tracker::new(Arc::new(Unavailable));
    let err = t
      .submit_json("abc123", &body(json!({ "latitude": "x" })), None)
      .await
      .unwrap_err();
    assert!(err.is_client_error());
    assert!(t.reports_for("not a token").await.unwrap().is_empty());
  }
}
