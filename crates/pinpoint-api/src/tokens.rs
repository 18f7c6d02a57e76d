//! Handler for `GET /tokens`.

use axum::{Json, extract::State};
use pinpoint_core::{store::ReportStore, token::Token};

use crate::{ApiState, error::ApiError};

/// `GET /tokens` — every known token, sorted.
pub async fn list<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Token>>, ApiError>
where
  S: ReportStore,
{
  let tokens = state.tracker.tokens().await?;
  Ok(Json(tokens.into_iter().collect()))
}
