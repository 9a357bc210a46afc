//! Persistent saved-turn store.
//!
//! The user can pin the currently displayed turn; pinned turns live in an
//! append-only JSON file under the app data dir, tagged with the session
//! profile. Membership is a pure equality check on the turn text.

use crate::error::{EngineError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One pinned turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTurn {
    /// Full turn text at the time it was saved.
    pub text: String,
    /// When the turn was saved.
    pub timestamp: DateTime<Utc>,
    /// Session profile active when the turn was saved.
    pub profile: String,
}

/// Append-only store of saved turns, backed by a JSON file.
#[derive(Debug)]
pub struct SavedTurnStore {
    path: PathBuf,
    records: Vec<SavedTurn>,
}

impl SavedTurnStore {
    /// Open the store at `path`, loading existing records.
    ///
    /// A missing file is an empty store; a corrupt file is an error so
    /// the caller can decide whether to discard user data.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content).map_err(|e| EngineError::Storage(e.to_string()))?
        } else {
            Vec::new()
        };
        Ok(Self { path, records })
    }

    /// Open the store at the default platform path.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::paths::saved_turns_path())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn records(&self) -> &[SavedTurn] {
        &self.records
    }

    /// Whether a turn with exactly this text has already been saved.
    #[must_use]
    pub fn is_saved(&self, text: &str) -> bool {
        self.records.iter().any(|r| r.text == text)
    }

    /// Append a turn and persist. Returns `false` (without writing) if
    /// the text is already saved.
    pub fn save(&mut self, text: &str, profile: &str) -> Result<bool> {
        if self.is_saved(text) {
            return Ok(false);
        }
        self.records.push(SavedTurn {
            text: text.to_owned(),
            timestamp: Utc::now(),
            profile: profile.to_owned(),
        });
        self.persist()?;
        Ok(true)
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.records)
            .map_err(|e| EngineError::Storage(e.to_string()))?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = SavedTurnStore::open(dir.path().join("saved.json")).unwrap();
        assert!(store.records().is_empty());
    }

    #[test]
    fn save_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.json");

        let mut store = SavedTurnStore::open(&path).unwrap();
        assert!(store.save("Mention your rollout experience.", "interview").unwrap());

        let reloaded = SavedTurnStore::open(&path).unwrap();
        assert_eq!(reloaded.records().len(), 1);
        assert!(reloaded.is_saved("Mention your rollout experience."));
        assert_eq!(reloaded.records()[0].profile, "interview");
    }

    #[test]
    fn duplicate_text_is_not_appended() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SavedTurnStore::open(dir.path().join("saved.json")).unwrap();
        assert!(store.save("same answer", "sales").unwrap());
        assert!(!store.save("same answer", "sales").unwrap());
        assert_eq!(store.records().len(), 1);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(SavedTurnStore::open(&path).is_err());
    }
}
