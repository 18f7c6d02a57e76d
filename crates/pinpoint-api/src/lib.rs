//! JSON REST API for Pinpoint.
//!
//! Exposes an axum [`Router`] backed by any [`ReportStore`] through a
//! [`Tracker`]. TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", pinpoint_api::api_router(api_state.clone()))
//! ```

pub mod error;
pub mod links;
pub mod reports;
pub mod source;
pub mod tokens;

use std::sync::Arc;

use axum::{
  Router,
  routing::get,
};
use pinpoint_core::{store::ReportStore, token::Token, tracker::Tracker};

pub use error::ApiError;

// ─── State ────────────────────────────────────────────────────────────────────

/// State shared by every API handler.
pub struct ApiState<S> {
  pub tracker:    Tracker<S>,
  /// Externally reachable base URL used to build shareable links.
  pub public_url: Arc<str>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      tracker:    self.tracker.clone(),
      public_url: Arc::clone(&self.public_url),
    }
  }
}

impl<S: ReportStore> ApiState<S> {
  pub fn new(tracker: Tracker<S>, public_url: impl Into<Arc<str>>) -> Self {
    Self { tracker, public_url: public_url.into() }
  }

  /// The visitor-facing URL for `token`.
  pub fn link_url(&self, token: &Token) -> String {
    format!("{}/track/{token}", self.public_url.trim_end_matches('/'))
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: ReportStore + 'static,
{
  Router::new()
    // Links
    .route("/links", get(links::list::<S>).post(links::create::<S>))
    // Tokens and their reports
    .route("/tokens", get(tokens::list::<S>))
    .route(
      "/tokens/{token}/reports",
      get(reports::list::<S>).post(reports::submit::<S>),
    )
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
