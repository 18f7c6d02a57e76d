//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings in UTC with nanosecond precision,
//! so a report read back compares equal to the one that was written.

use chrono::{DateTime, SecondsFormat, Utc};
use pinpoint_core::{link::TrackingLink, report::Report, token::Token};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `links` row.
pub struct RawLink {
  pub token:      String,
  pub label:      Option<String>,
  pub created_at: String,
  pub expires_at: Option<String>,
}

impl RawLink {
  pub const COLUMNS: &'static str = "token, label, created_at, expires_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      token:      row.get(0)?,
      label:      row.get(1)?,
      created_at: row.get(2)?,
      expires_at: row.get(3)?,
    })
  }

  pub fn into_link(self) -> Result<TrackingLink> {
    Ok(TrackingLink {
      token:      Token::parse(&self.token)?,
      label:      self.label,
      created_at: decode_dt(&self.created_at)?,
      expires_at: self.expires_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw values read directly from a `reports` row.
pub struct RawReport {
  pub timestamp:        String,
  pub latitude:         f64,
  pub longitude:        f64,
  pub accuracy:         Option<f64>,
  pub source_address:   Option<String>,
  pub client_timestamp: Option<String>,
  pub heading:          Option<f64>,
  pub speed:            Option<f64>,
  pub user_agent:       Option<String>,
}

impl RawReport {
  pub const COLUMNS: &'static str = "timestamp, latitude, longitude, accuracy, \
     source_address, client_timestamp, heading, speed, user_agent";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      timestamp:        row.get(0)?,
      latitude:         row.get(1)?,
      longitude:        row.get(2)?,
      accuracy:         row.get(3)?,
      source_address:   row.get(4)?,
      client_timestamp: row.get(5)?,
      heading:          row.get(6)?,
      speed:            row.get(7)?,
      user_agent:       row.get(8)?,
    })
  }

  pub fn into_report(self) -> Result<Report> {
    Ok(Report {
      received_at:      decode_dt(&self.timestamp)?,
      source_address:   self.source_address,
      client_timestamp: self.client_timestamp,
      latitude:         self.latitude,
      longitude:        self.longitude,
      accuracy:         self.accuracy,
      heading:          self.heading,
      speed:            self.speed,
      user_agent:       self.user_agent,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_roundtrip_with_nanos() {
    let dt = Utc.timestamp_opt(1_714_564_800, 123_456_789).unwrap();
    let encoded = encode_dt(dt);
    assert!(encoded.ends_with('Z'), "{encoded}");
    assert_eq!(decode_dt(&encoded).unwrap(), dt);
  }

  #[test]
  fn bad_timestamp_is_a_parse_error() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }
}
