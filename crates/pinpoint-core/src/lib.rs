//! Core types and trait definitions for the Pinpoint location tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the token-scoped report model, the [`ReportStore`](store::ReportStore)
//! abstraction, an in-memory backend, and the [`Tracker`](tracker::Tracker)
//! service that the ingestion and query layers call into.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod link;
pub mod memory;
pub mod report;
pub mod store;
pub mod token;
pub mod tracker;

pub use error::{Error, Result};
