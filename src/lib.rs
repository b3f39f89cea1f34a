//! # League Stats
//!
//! Basketball league statistics: per-game rows folded into season lines,
//! fuzzy reconciliation of player and team names, and a league chat that
//! falls back to local answers when its backend is unavailable.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (stat rows, season lines, leaderboards, games)
//! - **calculate**: Season aggregation, leaderboards, standings, comparisons, team trends and game previews
//! - **reconcile**: Player and team name matching
//! - **storage**: League data directory (JSONL)
//! - **chat**: Chat backend client and local fallback responder
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod chat;
pub mod config;
pub mod models;
pub mod reconcile;
pub mod storage;

pub use models::*;
