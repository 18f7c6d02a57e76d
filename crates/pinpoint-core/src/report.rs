//! Reports — one coordinate submission received for a token.
//!
//! A [`Submission`] is what a visitor's browser sends; it becomes an immutable
//! [`Report`] once the server stamps it with its own receipt time. Only the
//! coordinates are validated. Everything else the browser reports is kept as
//! opaque metadata and never used for ordering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

// ─── Report ──────────────────────────────────────────────────────────────────

/// A stored location report. Never updated or deleted once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
  /// Server-assigned receipt time; the only authoritative timestamp.
  pub received_at:      DateTime<Utc>,
  /// Network origin of the sender, best effort and unauthenticated.
  pub source_address:   Option<String>,
  /// Timestamp claimed by the browser. Untrusted, stored verbatim.
  pub client_timestamp: Option<String>,
  pub latitude:         f64,
  pub longitude:        f64,
  /// Reported accuracy radius in meters.
  pub accuracy:         Option<f64>,
  pub heading:          Option<f64>,
  pub speed:            Option<f64>,
  pub user_agent:       Option<String>,
}

// ─── Submission ──────────────────────────────────────────────────────────────

/// A validated coordinate payload that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
  pub latitude:         f64,
  pub longitude:        f64,
  pub accuracy:         Option<f64>,
  pub heading:          Option<f64>,
  pub speed:            Option<f64>,
  pub client_timestamp: Option<String>,
  pub user_agent:       Option<String>,
}

impl Submission {
  /// Build a submission from bare coordinates, validating their range.
  pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
    validate_coordinates(latitude, longitude)?;
    Ok(Self {
      latitude,
      longitude,
      accuracy: None,
      heading: None,
      speed: None,
      client_timestamp: None,
      user_agent: None,
    })
  }

  pub fn with_accuracy(mut self, accuracy: f64) -> Self {
    self.accuracy = Some(accuracy);
    self
  }

  /// Parse the JSON body posted by the tracking page.
  ///
  /// Accepts the browser's field names (`userAgent`, `timestamp`) as well as
  /// their snake_case forms. A `token` field in the body is ignored; the token
  /// in the URL is authoritative.
  pub fn from_slice(body: &[u8]) -> Result<Self> {
    let value: Value = serde_json::from_slice(body)
      .map_err(|e| Error::Validation(format!("invalid JSON: {e}")))?;
    Self::from_json(&value)
  }

  /// Extract a submission from an already-parsed JSON value.
  pub fn from_json(value: &Value) -> Result<Self> {
    let obj = value
      .as_object()
      .ok_or_else(|| Error::Validation("payload must be a JSON object".into()))?;

    let latitude = required_number(obj, "latitude")?;
    let longitude = required_number(obj, "longitude")?;
    validate_coordinates(latitude, longitude)?;

    Ok(Self {
      latitude,
      longitude,
      accuracy: optional_number(obj, &["accuracy"]),
      heading: optional_number(obj, &["heading"]),
      speed: optional_number(obj, &["speed"]),
      client_timestamp: optional_string(obj, &["timestamp", "client_timestamp"]),
      user_agent: optional_string(obj, &["userAgent", "user_agent"]),
    })
  }

  /// Stamp the submission with the server's receipt time.
  pub fn into_report(
    self,
    received_at: DateTime<Utc>,
    source_address: Option<String>,
  ) -> Report {
    Report {
      received_at,
      source_address,
      client_timestamp: self.client_timestamp,
      latitude: self.latitude,
      longitude: self.longitude,
      accuracy: self.accuracy,
      heading: self.heading,
      speed: self.speed,
      user_agent: self.user_agent,
    }
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Reject non-finite or out-of-range coordinates.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
  if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
    return Err(Error::Validation(format!(
      "latitude {latitude} outside [-90, 90]"
    )));
  }
  if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
    return Err(Error::Validation(format!(
      "longitude {longitude} outside [-180, 180]"
    )));
  }
  Ok(())
}

fn required_number(obj: &Map<String, Value>, key: &str) -> Result<f64> {
  match obj.get(key) {
    None | Some(Value::Null) => {
      Err(Error::Validation(format!("missing {key}")))
    }
    Some(v) => v
      .as_f64()
      .ok_or_else(|| Error::Validation(format!("{key} is not numeric"))),
  }
}

// Metadata is not validated: anything that is not a number is dropped.
fn optional_number(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
  keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_f64))
}

fn optional_string(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
  keys
    .iter()
    .find_map(|k| obj.get(*k).and_then(Value::as_str))
    .map(str::to_owned)
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn parse(v: Value) -> Result<Submission> {
    Submission::from_slice(v.to_string().as_bytes())
  }

  #[test]
  fn browser_payload_is_accepted() {
    let s = parse(json!({
      "token": "ignored",
      "timestamp": "2024-05-01T12:00:00.000Z",
      "latitude": 37.7749,
      "longitude": -122.4194,
      "accuracy": 15.0,
      "heading": null,
      "speed": null,
      "userAgent": "Mozilla/5.0"
    }))
    .unwrap();

    assert_eq!(s.latitude, 37.7749);
    assert_eq!(s.longitude, -122.4194);
    assert_eq!(s.accuracy, Some(15.0));
    assert_eq!(s.heading, None);
    assert_eq!(s.client_timestamp.as_deref(), Some("2024-05-01T12:00:00.000Z"));
    assert_eq!(s.user_agent.as_deref(), Some("Mozilla/5.0"));
  }

  #[test]
  fn missing_coordinates_are_rejected() {
    let err = parse(json!({ "longitude": 1.0 })).unwrap_err();
    assert!(matches!(err, Error::Validation(ref m) if m == "missing latitude"));

    let err = parse(json!({ "latitude": 1.0, "longitude": null })).unwrap_err();
    assert!(matches!(err, Error::Validation(ref m) if m == "missing longitude"));
  }

  #[test]
  fn non_numeric_coordinates_are_rejected() {
    let err = parse(json!({ "latitude": "north", "longitude": 1.0 })).unwrap_err();
    assert!(matches!(err, Error::Validation(ref m) if m == "latitude is not numeric"));
  }

  #[test]
  fn out_of_range_coordinates_are_rejected() {
    assert!(parse(json!({ "latitude": 90.5, "longitude": 0.0 })).is_err());
    assert!(parse(json!({ "latitude": 0.0, "longitude": -180.01 })).is_err());
    assert!(parse(json!({ "latitude": -90.0, "longitude": 180.0 })).is_ok());
    assert!(Submission::new(f64::NAN, 0.0).is_err());
  }

  #[test]
  fn malformed_bodies_are_validation_errors() {
    assert!(matches!(
      Submission::from_slice(b"not json"),
      Err(Error::Validation(_))
    ));
    assert!(matches!(
      Submission::from_slice(b"[1, 2]"),
      Err(Error::Validation(_))
    ));
  }

  #[test]
  fn non_numeric_metadata_is_dropped() {
    let s = parse(json!({
      "latitude": 1.0,
      "longitude": 2.0,
      "accuracy": "high",
      "speed": 3.5
    }))
    .unwrap();
    assert_eq!(s.accuracy, None);
    assert_eq!(s.speed, Some(3.5));
  }

  #[test]
  fn into_report_keeps_every_field() {
    let at = Utc::now();
    let report = Submission::new(40.7128, -74.0060)
      .unwrap()
      .with_accuracy(8.0)
      .into_report(at, Some("10.0.0.7".into()));

    assert_eq!(report.received_at, at);
    assert_eq!(report.latitude, 40.7128);
    assert_eq!(report.longitude, -74.0060);
    assert_eq!(report.accuracy, Some(8.0));
    assert_eq!(report.source_address.as_deref(), Some("10.0.0.7"));
  }
}
