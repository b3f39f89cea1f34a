//! JSONL (JSON Lines) files.
//!
//! Each line is one JSON object: a stat row or a game.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::StorageError;

/// Files kept per league.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeagueFile {
    PlayerStats,
    TeamStats,
    Games,
}

impl LeagueFile {
    pub fn filename(&self) -> &'static str {
        match self {
            LeagueFile::PlayerStats => "player_stats.jsonl",
            LeagueFile::TeamStats => "team_stats.jsonl",
            LeagueFile::Games => "games.jsonl",
        }
    }
}

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn write_lines(&self, file: File, rows: &[T]) -> Result<usize, StorageError> {
        let mut writer = BufWriter::new(file);
        for row in rows {
            let json = serde_json::to_string(row)?;
            writeln!(writer, "{}", json)?;
        }
        writer.flush()?;
        Ok(rows.len())
    }

    /// Append rows to the file.
    pub fn append_batch(&self, rows: &[T]) -> Result<usize, StorageError> {
        if rows.is_empty() {
            return Ok(0);
        }

        self.ensure_dir()?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let count = self.write_lines(file, rows)?;
        debug!("Appended {} rows to {:?}", count, self.path);
        Ok(count)
    }

    /// Write rows, replacing the entire file.
    pub fn write_all(&self, rows: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;
        let count = self.write_lines(File::create(&self.path)?, rows)?;
        info!("Wrote {} rows to {:?}", count, self.path);
        Ok(count)
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read every row. A missing file is empty; unparseable lines are
    /// logged and skipped.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut rows = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    warn!("Failed to parse line {} in {:?}: {}", index + 1, self.path, e);
                }
            }
        }

        debug!("Read {} rows from {:?}", rows.len(), self.path);
        Ok(rows)
    }
}
