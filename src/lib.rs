//! Matchday library
//!
//! A data-freshness layer for sports fixtures: a TTL cache over a persistent
//! key-value store, and a stale-while-revalidate refresh orchestrator with
//! request cancellation, periodic revalidation and focus-triggered
//! revalidation. The binary wraps it in a small ratatui viewer.

pub mod app;
pub mod cache;
pub mod cancel;
pub mod cli;
pub mod fixtures;
pub mod refresh;
pub mod store;
pub mod ui;
