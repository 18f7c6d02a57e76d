//! Error types for `pinpoint-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid token: {0:?}")]
  InvalidToken(String),

  #[error("invalid payload: {0}")]
  Validation(String),

  #[error("randomness source unavailable: {0}")]
  Entropy(String),

  #[error("could not allocate an unused token after {0} attempts")]
  TokenExhausted(usize),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Whether the error was caused by the caller's input rather than by the
  /// server.
  pub fn is_client_error(&self) -> bool {
    matches!(self, Self::InvalidToken(_) | Self::Validation(_))
  }

  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
