//! League data directory.
//!
//! Rows are materialized upstream and dropped into a directory per league:
//!
//! ```text
//! <data_dir>/leagues/<league_id>/player_stats.jsonl
//! <data_dir>/leagues/<league_id>/team_stats.jsonl
//! <data_dir>/leagues/<league_id>/games.jsonl
//! ```
//!
//! Nothing here writes on the request path; the writer exists for imports
//! and fixtures.

pub mod jsonl;
pub mod league;

use std::path::PathBuf;
use thiserror::Error;

pub use jsonl::{JsonlReader, JsonlWriter, LeagueFile};
pub use league::LeagueStore;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid league id: {0}")]
    InvalidLeagueId(String),

    #[error("Background read failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn leagues_dir(&self) -> PathBuf {
        self.data_dir.join("leagues")
    }

    /// Directory for one league. League ids are a single path component.
    pub fn league_dir(&self, league_id: &str) -> Result<PathBuf, StorageError> {
        let id = league_id.trim();
        let is_plain = !id.is_empty()
            && id != "."
            && id != ".."
            && !id.contains(['/', '\\'])
            && !id.contains('\0');

        if !is_plain {
            return Err(StorageError::InvalidLeagueId(league_id.to_string()));
        }

        Ok(self.leagues_dir().join(id))
    }

    pub fn file_path(&self, league_id: &str, file: LeagueFile) -> Result<PathBuf, StorageError> {
        Ok(self.league_dir(league_id)?.join(file.filename()))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

/// League ids present in the data directory, sorted.
pub fn list_leagues(config: &StorageConfig) -> Result<Vec<String>, StorageError> {
    let dir = config.leagues_dir();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut leagues = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                leagues.push(name.to_string());
            }
        }
    }

    leagues.sort();
    Ok(leagues)
}
