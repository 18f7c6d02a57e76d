//! HTTP server for Pinpoint.
//!
//! Combines the visitor-facing routes (the tracking page and the endpoint it
//! posts to) with the JSON API nested under `/api`, backed by any
//! [`ReportStore`].

pub mod error;
pub mod page;
pub mod settings;

pub use error::Error;
pub use settings::{ServerConfig, StoreBackend, StoreConfig};

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use pinpoint_api::{ApiState, api_router, reports};
use pinpoint_core::{store::ReportStore, tracker::Tracker};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the router.
pub struct AppState<S> {
  pub api:    ApiState<S>,
  pub config: Arc<ServerConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { api: self.api.clone(), config: Arc::clone(&self.config) }
  }
}

impl<S: ReportStore> AppState<S> {
  pub fn new(store: Arc<S>, config: ServerConfig) -> Self {
    let api = ApiState::new(Tracker::new(store), config.public_url());
    Self { api, config: Arc::new(config) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full axum [`Router`] for the server.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ReportStore + 'static,
{
  let visitor = Router::new()
    .route("/track/{token}", get(page::handler))
    .route("/report/{token}", post(reports::submit::<S>))
    .with_state(state.api.clone());

  let app = Router::new()
    .merge(visitor)
    .nest("/api", api_router(state.api.clone()))
    .layer(TraceLayer::new_for_http());

  if state.config.allow_any_origin {
    app.layer(CorsLayer::permissive())
  } else {
    app
  }
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use std::net::SocketAddr;

  use axum::{
    body::Body,
    extract::connect_info::MockConnectInfo,
    http::{Request, StatusCode, header},
  };
  use pinpoint_core::memory::MemoryStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  fn make_state() -> AppState<MemoryStore> {
    AppState::new(Arc::new(MemoryStore::new()), ServerConfig::default())
  }

  async fn body_string(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
  }

  fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
      .method("POST")
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap()
  }

  fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
  }

  // ── Tracking page ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn tracking_page_is_html_with_token() {
    let resp = router(make_state()).oneshot(get("/track/abc123")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
    assert!(ct.starts_with("text/html"), "Content-Type: {ct}");
    let html = body_string(resp).await;
    assert!(html.contains("\"abc123\""), "page: {html}");
  }

  #[tokio::test]
  async fn tracking_page_rejects_malformed_token() {
    let resp = router(make_state())
      .oneshot(get("/track/%3Cscript%3E"))
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Report ingestion ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn report_endpoint_stores_and_api_reads_back() {
    let state = make_state();

    let resp = router(state.clone())
      .oneshot(post_json(
        "/report/abc123",
        json!({
          "token": "abc123",
          "timestamp": "2024-05-01T12:00:00.000Z",
          "latitude": 37.7749,
          "longitude": -122.4194,
          "accuracy": 15.0,
          "heading": null,
          "speed": null,
          "userAgent": "Mozilla/5.0"
        }),
      ))
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let ack: Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(ack["status"], "ok");

    let resp = router(state)
      .oneshot(get("/api/tokens/abc123/reports"))
      .await
      .unwrap();
    let reports: Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(reports.as_array().unwrap().len(), 1);
    assert_eq!(reports[0]["latitude"], 37.7749);
    assert_eq!(reports[0]["client_timestamp"], "2024-05-01T12:00:00.000Z");
    assert_eq!(reports[0]["user_agent"], "Mozilla/5.0");
  }

  #[tokio::test]
  async fn peer_address_is_recorded_when_available() {
    let state = make_state();
    let app = router(state.clone())
      .layer(MockConnectInfo(SocketAddr::from(([192, 0, 2, 10], 40000))));

    let resp = app
      .oneshot(post_json("/report/zzz999", json!({ "latitude": 0, "longitude": 0 })))
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let reports = state.api.tracker.reports_for("zzz999").await.unwrap();
    assert_eq!(reports[0].source_address.as_deref(), Some("192.0.2.10"));
  }

  #[tokio::test]
  async fn invalid_report_is_400() {
    let state = make_state();
    let resp = router(state.clone())
      .oneshot(post_json("/report/abc123", json!({ "latitude": "x", "longitude": 0 })))
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(state.api.tracker.tokens().await.unwrap().is_empty());
  }

  // ── API mounting and CORS ───────────────────────────────────────────────────

  #[tokio::test]
  async fn issued_link_points_at_tracking_page() {
    let resp = router(make_state())
      .oneshot(post_json("/api/links", json!({ "label": "test" })))
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let link: Value = serde_json::from_str(&body_string(resp).await).unwrap();
    let token = link["token"].as_str().unwrap();
    assert_eq!(link["url"], format!("http://localhost:5001/track/{token}"));
  }

  #[tokio::test]
  async fn cors_allows_any_origin_by_default() {
    let req = Request::builder()
      .uri("/api/tokens")
      .header(header::ORIGIN, "https://elsewhere.example")
      .body(Body::empty())
      .unwrap();
    let resp = router(make_state()).oneshot(req).await.unwrap();
    assert_eq!(
      resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
      "*"
    );
  }

  #[tokio::test]
  async fn cors_can_be_disabled() {
    let config = ServerConfig { allow_any_origin: false, ..ServerConfig::default() };
    let state = AppState::new(Arc::new(MemoryStore::new()), config);
    let req = Request::builder()
      .uri("/api/tokens")
      .header(header::ORIGIN, "https://elsewhere.example")
      .body(Body::empty())
      .unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
  }
}
