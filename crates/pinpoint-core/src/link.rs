//! Tracking links — the metadata recorded alongside an issued token.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::token::Token;

/// A shareable link. The token is the only part a visitor ever sees.
///
/// `expires_at` is informational: reports keep being accepted after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingLink {
  pub token:      Token,
  pub label:      Option<String>,
  pub created_at: DateTime<Utc>,
  pub expires_at: Option<DateTime<Utc>>,
}

impl TrackingLink {
  /// A link with no label and no expiry, created now.
  pub fn new(token: Token) -> Self {
    Self {
      token,
      label: None,
      created_at: Utc::now(),
      expires_at: None,
    }
  }

  pub fn with_label(mut self, label: impl Into<String>) -> Self {
    let label = label.into();
    self.label = (!label.trim().is_empty()).then_some(label);
    self
  }

  /// Set the expiry `ttl` after `created_at`. A zero TTL means "never".
  pub fn with_ttl(mut self, ttl: TimeDelta) -> Self {
    self.expires_at = (ttl > TimeDelta::zero())
      .then(|| self.created_at.checked_add_signed(ttl))
      .flatten();
    self
  }

  pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
    self.expires_at.is_some_and(|at| at <= now)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn token() -> Token { Token::parse("abc123").unwrap() }

  #[test]
  fn zero_ttl_never_expires() {
    let link = TrackingLink::new(token()).with_ttl(TimeDelta::zero());
    assert_eq!(link.expires_at, None);
    assert!(!link.is_expired(Utc::now() + TimeDelta::days(3650)));
  }

  #[test]
  fn ttl_sets_expiry_relative_to_creation() {
    let link = TrackingLink::new(token()).with_ttl(TimeDelta::minutes(60));
    assert_eq!(link.expires_at, Some(link.created_at + TimeDelta::minutes(60)));
    assert!(!link.is_expired(link.created_at));
    assert!(link.is_expired(link.created_at + TimeDelta::minutes(61)));
  }

  #[test]
  fn blank_labels_are_dropped() {
    assert_eq!(TrackingLink::new(token()).with_label("  ").label, None);
    assert_eq!(
      TrackingLink::new(token()).with_label("bike").label.as_deref(),
      Some("bike")
    );
  }
}
