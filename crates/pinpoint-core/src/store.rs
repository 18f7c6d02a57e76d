//! The `ReportStore` trait.
//!
//! The trait is implemented by storage backends ([`MemoryStore`] here and
//! `pinpoint-store-sqlite`). Higher layers (`pinpoint-api`,
//! `pinpoint-server`) depend on this abstraction, not on any concrete backend.
//!
//! [`MemoryStore`]: crate::memory::MemoryStore

use std::{collections::BTreeSet, future::Future};

use crate::{link::TrackingLink, report::Report, token::Token};

/// Abstraction over a token-scoped report store.
///
/// Reports are append-only and returned in arrival order (oldest first).
/// Implementations must guarantee that concurrent appends are never lost and
/// that reads never observe a partially written report.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ReportStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Links ─────────────────────────────────────────────────────────────

  /// Register `link` unless its token is already known.
  ///
  /// Returns `true` if the link was created, `false` if the token existed
  /// (in which case the stored metadata is left untouched).
  fn create_link(
    &self,
    link: TrackingLink,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Register `token` with an empty report list. Idempotent.
  fn create_token(
    &self,
    token: Token,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_ {
    let created = self.create_link(TrackingLink::new(token));
    async move { created.await.map(|_| ()) }
  }

  /// All known links ordered by `created_at`, then token. Tokens that were
  /// created implicitly by a report appear as bare links.
  fn list_links(
    &self,
  ) -> impl Future<Output = Result<Vec<TrackingLink>, Self::Error>> + Send + '_;

  /// All known tokens.
  fn list_tokens(
    &self,
  ) -> impl Future<Output = Result<BTreeSet<Token>, Self::Error>> + Send + '_;

  // ── Reports ───────────────────────────────────────────────────────────

  /// Append `report` to the list for `token`, creating the token if it was
  /// never registered.
  fn append_report(
    &self,
    token: Token,
    report: Report,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// A snapshot of the reports for `token` in arrival order. Unknown tokens
  /// yield an empty list.
  fn list_reports(
    &self,
    token: Token,
  ) -> impl Future<Output = Result<Vec<Report>, Self::Error>> + Send + '_;
}
