//! Core data models for league statistics.

mod game;
mod game_stat;
mod stat_line;
mod stats;

pub use game::*;
pub use game_stat::*;
pub use stat_line::*;
pub use stats::*;
