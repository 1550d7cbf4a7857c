//! # Character Stats
//!
//! Tracks per-character stats (height, strength, ...) alongside a chat with a
//! generation backend.
//!
//! ```text
//! transcript text ──> extractor ──> StatStore ──> persistence + UI refresh
//!
//! chat request ──> StatsInterceptor ──(stat summary merged once)──> transport
//!
//! compare action ──> unit normalizer ──> ranker ──> report
//! ```
//!
//! All stat state lives in a [`engine::StatsContext`] owned by the engine
//! thread; the UI talks to it through [`engine::protocol`] commands.

pub mod config;
pub mod engine;
pub mod model;
pub mod ui;
