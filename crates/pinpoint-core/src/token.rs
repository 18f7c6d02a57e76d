//! Tracking tokens — the opaque identifiers embedded in shareable links.
//!
//! Generated tokens are 12 lowercase hex characters drawn from the operating
//! system's randomness source. Tokens arriving from the network are accepted
//! as long as they are short and URL-safe; they carry no other structure.

use std::{fmt, str::FromStr};

use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of random bytes behind a generated token (two hex chars each).
pub const TOKEN_BYTES: usize = 6;

/// Upper bound on the length of a token accepted from a caller.
pub const MAX_TOKEN_LEN: usize = 64;

/// An opaque identifier binding a shareable link to its reports.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Token(String);

impl Token {
  /// Draw a fresh token from the OS randomness source.
  ///
  /// Fails only if the randomness source itself is unavailable, which callers
  /// should treat as fatal.
  pub fn generate() -> Result<Self> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
      .try_fill_bytes(&mut bytes)
      .map_err(|e| Error::Entropy(e.to_string()))?;
    Ok(Self(hex::encode(bytes)))
  }

  /// Accept a caller-supplied token.
  ///
  /// Only empty, over-long, or non URL-safe input is rejected; any other
  /// string is a valid (possibly never issued) token.
  pub fn parse(raw: &str) -> Result<Self> {
    let valid = !raw.is_empty()
      && raw.len() <= MAX_TOKEN_LEN
      && raw
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
      Ok(Self(raw.to_owned()))
    } else {
      Err(Error::InvalidToken(raw.to_owned()))
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Token {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.pad(&self.0) }
}

impl FromStr for Token {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl TryFrom<String> for Token {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::parse(&value) }
}

impl From<Token> for String {
  fn from(token: Token) -> Self { token.0 }
}

impl AsRef<str> for Token {
  fn as_ref(&self) -> &str { &self.0 }
}
