//! Handlers for `/links` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/links` | Every known link, oldest first |
//! | `POST` | `/links` | Body: `{"label":"...","ttl_minutes":60}`; both optional |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{TimeDelta, Utc};
use pinpoint_core::{link::TrackingLink, store::ReportStore};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

/// A link as returned by the API: its stored fields plus the shareable URL.
#[derive(Debug, Serialize, Deserialize)]
pub struct LinkView {
  #[serde(flatten)]
  pub link:    TrackingLink,
  pub url:     String,
  /// Display hint only; expired links still accept reports.
  pub expired: bool,
}

impl LinkView {
  fn new<S: ReportStore>(state: &ApiState<S>, link: TrackingLink) -> Self {
    Self {
      url: state.link_url(&link.token),
      expired: link.is_expired(Utc::now()),
      link,
    }
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /links`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<LinkView>>, ApiError>
where
  S: ReportStore,
{
  let links = state.tracker.links().await?;
  Ok(Json(
    links
      .into_iter()
      .map(|link| LinkView::new(&state, link))
      .collect(),
  ))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CreateBody {
  pub label:       Option<String>,
  /// Minutes until the link is shown as expired; `0` or absent means never.
  pub ttl_minutes: Option<u32>,
}

/// `POST /links` — returns 201 + the new [`LinkView`].
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ReportStore,
{
  let ttl = body
    .ttl_minutes
    .filter(|m| *m > 0)
    .map(|m| TimeDelta::minutes(i64::from(m)));
  let link = state.tracker.issue_link(body.label, ttl).await?;

  tracing::info!(token = %link.token, label = ?link.label, "issued tracking link");
  Ok((StatusCode::CREATED, Json(LinkView::new(&state, link))))
}
