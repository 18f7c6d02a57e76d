//! Best-effort extraction of a report sender's network address.

use std::{convert::Infallible, net::SocketAddr};

use axum::{
  extract::{ConnectInfo, FromRequestParts},
  http::request::Parts,
};

/// The sender's address: the first `X-Forwarded-For` hop if present, else the
/// TCP peer when the server was started with connect info. Never rejects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceAddress(pub Option<String>);

impl<S> FromRequestParts<S> for SourceAddress
where
  S: Send + Sync,
{
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    let forwarded = parts
      .headers
      .get("x-forwarded-for")
      .and_then(|v| v.to_str().ok())
      .and_then(|v| v.split(',').next())
      .map(str::trim)
      .filter(|v| !v.is_empty())
      .map(str::to_owned);

    let peer = || {
      parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
    };

    Ok(Self(forwarded.or_else(peer)))
  }
}
