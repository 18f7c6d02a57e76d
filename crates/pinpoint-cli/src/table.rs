//! Plain-text tables for links and reports.

use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use pinpoint_core::report::Report;

use crate::client::IssuedLink;

/// User agents are cut to this many characters in the reports table.
pub const USER_AGENT_WIDTH: usize = 100;

fn fmt_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Secs, true) }

fn or_dash(s: Option<&str>) -> &str { s.unwrap_or("-") }

pub fn truncate(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_owned()
  } else {
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
  }
}

/// OpenStreetMap link centred on a report.
pub fn map_url(report: &Report) -> String {
  format!(
    "https://www.openstreetmap.org/?mlat={lat}&mlon={lon}#map=17/{lat}/{lon}",
    lat = report.latitude,
    lon = report.longitude,
  )
}

pub fn links(links: &[IssuedLink]) -> String {
  if links.is_empty() {
    return "No links generated yet.\n".to_owned();
  }

  let mut out = String::new();
  let _ = writeln!(
    out,
    "{:<14} {:<20} {:<21} {:<21} {}",
    "TOKEN", "LABEL", "CREATED", "EXPIRES", "URL"
  );
  for l in links {
    let expires = match l.link.expires_at {
      Some(at) if l.expired => format!("{} (expired)", fmt_dt(at)),
      Some(at) => fmt_dt(at),
      None => "never".to_owned(),
    };
    let _ = writeln!(
      out,
      "{:<14} {:<20} {:<21} {:<21} {}",
      l.link.token,
      truncate(or_dash(l.link.label.as_deref()), 20),
      fmt_dt(l.link.created_at),
      expires,
      l.url,
    );
  }
  out
}

pub fn reports(token: &str, reports: &[Report]) -> String {
  let mut out = format!("Total {} report(s) for token `{token}`\n", reports.len());
  if reports.is_empty() {
    return out;
  }

  let _ = writeln!(
    out,
    "{:<21} {:<16} {:<25} {:>11} {:>12} {:>9}  {}",
    "RECEIVED", "SOURCE", "CLIENT TIME", "LATITUDE", "LONGITUDE", "ACC(m)", "USER AGENT"
  );
  for r in reports {
    let accuracy = r.accuracy.map_or_else(|| "-".to_owned(), |a| format!("{a:.1}"));
    let _ = writeln!(
      out,
      "{:<21} {:<16} {:<25} {:>11.6} {:>12.6} {:>9}  {}",
      fmt_dt(r.received_at),
      truncate(or_dash(r.source_address.as_deref()), 16),
      truncate(or_dash(r.client_timestamp.as_deref()), 25),
      r.latitude,
      r.longitude,
      accuracy,
      truncate(or_dash(r.user_agent.as_deref()), USER_AGENT_WIDTH),
    );
  }

  out.push('\n');
  for (i, r) in reports.iter().enumerate() {
    let _ = writeln!(out, "  [{}] {}", i + 1, map_url(r));
  }
  out
}
