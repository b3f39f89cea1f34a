//! Async access to one data directory's leagues.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use super::{JsonlReader, JsonlWriter, LeagueFile, StorageConfig, StorageError};
use crate::models::{GameResult, GameStatRecord};

/// Read-mostly handle on the league data directory.
///
/// Reads never fail: errors are logged and come back as empty results, so a
/// view with a broken file renders "no data" rather than an error.
#[derive(Debug, Clone)]
pub struct LeagueStore {
    config: Arc<StorageConfig>,
}

impl LeagueStore {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Per-game player rows.
    pub async fn player_stats(&self, league_id: &str) -> Vec<GameStatRecord> {
        self.read_or_empty(league_id, LeagueFile::PlayerStats).await
    }

    /// Per-game team aggregate rows.
    pub async fn team_stats(&self, league_id: &str) -> Vec<GameStatRecord> {
        self.read_or_empty(league_id, LeagueFile::TeamStats).await
    }

    /// Scheduled and completed games.
    pub async fn games(&self, league_id: &str) -> Vec<GameResult> {
        self.read_or_empty(league_id, LeagueFile::Games).await
    }

    /// Read a league file, propagating errors.
    pub async fn try_read<T>(&self, league_id: &str, file: LeagueFile) -> Result<Vec<T>, StorageError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let path = self.config.file_path(league_id, file)?;
        tokio::task::spawn_blocking(move || JsonlReader::<T>::new(path).read_all()).await?
    }

    async fn read_or_empty<T>(&self, league_id: &str, file: LeagueFile) -> Vec<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        match self.try_read(league_id, file).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(
                    "Failed to read {} for league '{}': {}",
                    file.filename(),
                    league_id,
                    e
                );
                Vec::new()
            }
        }
    }

    /// Replace a league file's contents.
    pub fn write<T: Serialize>(
        &self,
        league_id: &str,
        file: LeagueFile,
        rows: &[T],
    ) -> Result<usize, StorageError> {
        let path = self.config.file_path(league_id, file)?;
        JsonlWriter::new(path).write_all(rows)
    }
}
