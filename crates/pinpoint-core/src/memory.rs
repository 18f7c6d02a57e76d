//! [`MemoryStore`] — a process-lifetime [`ReportStore`] held in memory.

use std::{
  collections::{BTreeSet, HashMap},
  convert::Infallible,
  sync::Arc,
};

use parking_lot::Mutex;

use crate::{
  link::TrackingLink, report::Report, store::ReportStore, token::Token,
};

struct Entry {
  link:    TrackingLink,
  reports: Vec<Report>,
}

/// A report store backed by a single mutex-guarded map.
///
/// Every mutation and every snapshot read holds the lock for exactly one
/// operation; nothing awaits while it is held. Cloning is cheap and clones
/// share the same map.
#[derive(Clone, Default)]
pub struct MemoryStore {
  entries: Arc<Mutex<HashMap<Token, Entry>>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Total number of reports across all tokens.
  pub fn report_count(&self) -> usize {
    self.entries.lock().values().map(|e| e.reports.len()).sum()
  }
}

impl ReportStore for MemoryStore {
  type Error = Infallible;

  async fn create_link(&self, link: TrackingLink) -> Result<bool, Infallible> {
    let mut entries = self.entries.lock();
    if entries.contains_key(&link.token) {
      return Ok(false);
    }
    entries.insert(link.token.clone(), Entry { link, reports: Vec::new() });
    Ok(true)
  }

  async fn list_links(&self) -> Result<Vec<TrackingLink>, Infallible> {
    let mut links: Vec<TrackingLink> = {
      let entries = self.entries.lock();
      entries.values().map(|e| e.link.clone()).collect()
    };
    links.sort_by(|a, b| {
      a.created_at
        .cmp(&b.created_at)
        .then_with(|| a.token.cmp(&b.token))
    });
    Ok(links)
  }

  async fn list_tokens(&self) -> Result<BTreeSet<Token>, Infallible> {
    Ok(self.entries.lock().keys().cloned().collect())
  }

  async fn append_report(
    &self,
    token: Token,
    report: Report,
  ) -> Result<(), Infallible> {
    let mut entries = self.entries.lock();
    entries
      .entry(token)
      .or_insert_with_key(|token| Entry {
        link:    TrackingLink::new(token.clone()),
        reports: Vec::new(),
      })
      .reports
      .push(report);
    Ok(())
  }

  async fn list_reports(&self, token: Token) -> Result<Vec<Report>, Infallible> {
    Ok(
      self
        .entries
        .lock()
        .get(&token)
        .map(|e| e.reports.clone())
        .unwrap_or_default(),
    )
  }
}
