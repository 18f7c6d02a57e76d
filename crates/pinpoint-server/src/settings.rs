//! Runtime server configuration.
//!
//! Layered from an optional TOML file and `PINPOINT_*` environment variables
//! (nested keys use `__`, e.g. `PINPOINT_STORE__BACKEND=sqlite`). Every field
//! has a default, so the server starts with no configuration at all.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Which [`ReportStore`](pinpoint_core::store::ReportStore) backs the server.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
  /// Reports live for the lifetime of the process.
  #[default]
  Memory,
  /// Reports are persisted to the SQLite file at `store.path`.
  Sqlite,
}

#[derive(Deserialize, Clone, Debug)]
pub struct StoreConfig {
  #[serde(default)]
  pub backend: StoreBackend,
  #[serde(default = "default_store_path")]
  pub path:    PathBuf,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self { backend: StoreBackend::default(), path: default_store_path() }
  }
}

impl StoreConfig {
  /// `path` with a leading `~` expanded to the user's home directory.
  pub fn resolved_path(&self) -> PathBuf { expand_tilde(&self.path) }
}

/// Runtime server configuration, deserialised from `pinpoint.toml` and the
/// environment.
#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:             String,
  #[serde(default = "default_port")]
  pub port:             u16,
  /// Base URL embedded in shareable links. Defaults to
  /// `http://localhost:{port}`, since browsers only grant geolocation to
  /// secure or localhost origins.
  #[serde(default)]
  pub public_url:       Option<String>,
  /// Answer CORS preflights from any origin.
  #[serde(default = "default_true")]
  pub allow_any_origin: bool,
  #[serde(default)]
  pub store:            StoreConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:             default_host(),
      port:             default_port(),
      public_url:       None,
      allow_any_origin: true,
      store:            StoreConfig::default(),
    }
  }
}

impl ServerConfig {
  /// Read `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("PINPOINT")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }

  pub fn public_url(&self) -> String {
    self
      .public_url
      .clone()
      .unwrap_or_else(|| format!("http://localhost:{}", self.port))
  }

  pub fn bind_address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

fn default_host() -> String { "0.0.0.0".to_string() }

fn default_port() -> u16 { 5001 }

fn default_true() -> bool { true }

fn default_store_path() -> PathBuf { PathBuf::from("pinpoint.sqlite3") }

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
