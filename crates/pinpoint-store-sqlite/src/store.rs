//! [`SqliteStore`] — the SQLite implementation of [`ReportStore`].

use std::{collections::BTreeSet, path::Path};

use chrono::Utc;
use pinpoint_core::{
  link::TrackingLink, report::Report, store::ReportStore, token::Token,
};

use crate::{
  Result,
  encode::{RawLink, RawReport, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Pinpoint report store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run raw SQL against the connection.
  #[cfg(test)]
  pub(crate) async fn execute_batch(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ReportStore impl ────────────────────────────────────────────────────────

impl ReportStore for SqliteStore {
  type Error = crate::Error;

  // ── Links ─────────────────────────────────────────────────────────────────

  async fn create_link(&self, link: TrackingLink) -> Result<bool> {
    let token_str   = link.token.to_string();
    let created_str = encode_dt(link.created_at);
    let expires_str = link.expires_at.map(encode_dt);
    let label       = link.label;

    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT OR IGNORE INTO links (token, label, created_at, expires_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![token_str, label, created_str, expires_str],
        )?;
        Ok(n == 1)
      })
      .await?;

    Ok(inserted)
  }

  async fn list_links(&self) -> Result<Vec<TrackingLink>> {
    let raws: Vec<RawLink> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM links ORDER BY created_at, token",
          RawLink::COLUMNS
        ))?;
        let rows = stmt
          .query_map([], RawLink::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLink::into_link).collect()
  }

  async fn list_tokens(&self) -> Result<BTreeSet<Token>> {
    let raws: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT token FROM links")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      raws
        .iter()
        .map(|t| Token::parse(t))
        .collect::<pinpoint_core::Result<_>>()?,
    )
  }

  // ── Reports ───────────────────────────────────────────────────────────────

  async fn append_report(&self, token: Token, report: Report) -> Result<()> {
    let token_str   = token.to_string();
    let created_str = encode_dt(Utc::now());
    let at_str      = encode_dt(report.received_at);

    self
      .conn
      .call(move |conn| {
        // The implicit link and the report land together or not at all.
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT OR IGNORE INTO links (token, created_at) VALUES (?1, ?2)",
          rusqlite::params![token_str, created_str],
        )?;
        tx.execute(
          "INSERT INTO reports (
             token, timestamp, latitude, longitude, accuracy,
             source_address, client_timestamp, heading, speed, user_agent
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            token_str,
            at_str,
            report.latitude,
            report.longitude,
            report.accuracy,
            report.source_address,
            report.client_timestamp,
            report.heading,
            report.speed,
            report.user_agent,
          ],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_reports(&self, token: Token) -> Result<Vec<Report>> {
    let token_str = token.to_string();

    let raws: Vec<RawReport> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM reports WHERE token = ?1 ORDER BY id",
          RawReport::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![token_str], RawReport::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReport::into_report).collect()
  }
}
