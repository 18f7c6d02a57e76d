//! Handlers for `/tokens/{token}/reports`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/tokens/:token/reports` | Arrival order; `[]` for unknown tokens |
//! | `POST` | `/tokens/:token/reports` | Body: the tracking page's JSON payload |
//!
//! The server also mounts [`submit`] at `/report/:token`, which is where the
//! tracking page posts.

use axum::{
  Json,
  extract::{Path, State},
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use pinpoint_core::{report::Report, store::ReportStore};
use serde::Serialize;

use crate::{ApiState, error::ApiError, source::SourceAddress};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /tokens/:token/reports`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Path(token): Path<String>,
) -> Result<Json<Vec<Report>>, ApiError>
where
  S: ReportStore,
{
  let reports = state.tracker.reports_for(&token).await?;
  Ok(Json(reports))
}

// ─── Submit ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Accepted {
  pub status:      &'static str,
  pub received_at: DateTime<Utc>,
}

/// `POST /tokens/:token/reports` — the body is parsed by hand so malformed
/// payloads surface as 400 with a reason rather than an extractor rejection.
pub async fn submit<S>(
  State(state): State<ApiState<S>>,
  Path(token): Path<String>,
  SourceAddress(source): SourceAddress,
  body: Bytes,
) -> Result<Json<Accepted>, ApiError>
where
  S: ReportStore,
{
  let report = match state.tracker.submit_json(&token, &body, source).await {
    Ok(report) => report,
    Err(e) => {
      tracing::warn!(%token, error = %e, "rejected report");
      return Err(e.into());
    }
  };

  tracing::debug!(
    %token,
    source = ?report.source_address,
    accuracy = ?report.accuracy,
    "stored report"
  );
  Ok(Json(Accepted { status: "ok", received_at: report.received_at }))
}
