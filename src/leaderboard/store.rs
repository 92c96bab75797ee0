//! Player records and their JSON storage.
//!
//! The whole store is read at startup and rewritten after every change.
//! Writes go to a temp file in the same directory which then replaces the
//! data file, so a crash mid-write leaves the previous file intact.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::artifact::Artifact;

/// Player id -> record. Iterates in id order, which fixes the ranking fallback order.
pub type RecordStore = BTreeMap<String, PlayerRecord>;

fn default_language() -> String {
    "en".to_string()
}

/// One player on the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Leaderboard name chosen by the player
    #[serde(default)]
    pub display_name: Option<String>,
    /// Account handle, filled in when first seen or by backfill
    #[serde(default)]
    pub username: Option<String>,
    /// Submitted artifacts; position + 1 is the index players refer to
    #[serde(default)]
    artifacts: Vec<Artifact>,
    /// Best CV among `artifacts`, 0 when empty
    #[serde(default)]
    max_cv: f64,
    /// Preferred OCR language code
    #[serde(default = "default_language")]
    pub language: String,
}

impl PlayerRecord {
    pub fn new(username: Option<String>) -> Self {
        Self {
            display_name: None,
            username,
            artifacts: Vec::new(),
            max_cv: 0.0,
            language: default_language(),
        }
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn max_cv(&self) -> f64 {
        self.max_cv
    }

    /// Number of artifacts with CV at or above `threshold`.
    pub fn count_at_least(&self, threshold: f64) -> usize {
        self.artifacts.iter().filter(|a| a.cv() >= threshold).count()
    }

    pub fn push_artifact(&mut self, artifact: Artifact) {
        self.artifacts.push(artifact);
        self.recompute_max_cv();
    }

    /// Removes the artifact at a 1-based index.
    pub fn remove_artifact(&mut self, index: usize) -> Option<Artifact> {
        let slot = self.slot(index)?;
        let removed = self.artifacts.remove(slot);
        self.recompute_max_cv();
        Some(removed)
    }

    /// Replaces the artifact at a 1-based index, returning the old one.
    pub fn replace_artifact(&mut self, index: usize, artifact: Artifact) -> Option<Artifact> {
        let slot = self.slot(index)?;
        let old = std::mem::replace(&mut self.artifacts[slot], artifact);
        self.recompute_max_cv();
        Some(old)
    }

    /// True if `index` (1-based) refers to an artifact.
    pub fn has_index(&self, index: usize) -> bool {
        self.slot(index).is_some()
    }

    fn slot(&self, index: usize) -> Option<usize> {
        (1..=self.artifacts.len()).contains(&index).then(|| index - 1)
    }

    fn recompute_max_cv(&mut self) {
        self.max_cv = self
            .artifacts
            .iter()
            .map(|a| a.cv())
            .fold(0.0, f64::max);
    }

    /// Restores the max-CV invariant on records read from disk.
    fn repair(&mut self) {
        for artifact in &mut self.artifacts {
            artifact.recompute_cv();
        }
        self.recompute_max_cv();
    }
}

/// Whole-file JSON storage for the record store.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads all records. A missing file is an empty store.
    pub fn load(&self) -> Result<RecordStore> {
        if !self.path.exists() {
            crate::log(&format!(
                "{} not found. Starting with an empty leaderboard.",
                self.path.display()
            ));
            return Ok(RecordStore::new());
        }

        let content = fs::read_to_string(&self.path)
            .context(format!("Failed to read data file: {}", self.path.display()))?;
        let mut records: RecordStore = serde_json::from_str(&content)
            .context(format!("Failed to parse data file: {}", self.path.display()))?;
        for record in records.values_mut() {
            record.repair();
        }

        crate::log(&format!(
            "Loaded {} players from {}",
            records.len(),
            self.path.display()
        ));
        Ok(records)
    }

    /// Rewrites the whole data file.
    pub fn save(&self, records: &RecordStore) -> Result<()> {
        let json = serde_json::to_string_pretty(records)
            .context("Failed to serialize player records")?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .context(format!("Failed to create data directory: {}", dir.display()))?;

        let mut file = NamedTempFile::new_in(&dir).context("Failed to create temp data file")?;
        file.write_all(json.as_bytes())
            .context("Failed to write player records")?;
        file.persist(&self.path)
            .context(format!("Failed to replace data file: {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn artifact(crit_rate: f64, crit_dmg: f64) -> Artifact {
        Artifact::new(crit_rate, crit_dmg).unwrap()
    }

    #[test]
    fn test_new_record_defaults() {
        let record = PlayerRecord::new(Some("alice".to_string()));
        assert_eq!(record.language, "en");
        assert_eq!(record.max_cv(), 0.0);
        assert!(record.artifacts().is_empty());
        assert!(record.display_name.is_none());
    }

    #[test]
    fn test_max_cv_tracks_artifacts() {
        let mut record = PlayerRecord::new(None);
        record.push_artifact(artifact(10.0, 20.0));
        record.push_artifact(artifact(5.0, 10.0));
        assert!((record.max_cv() - 40.0).abs() < 1e-9);

        record.remove_artifact(1).unwrap();
        assert!((record.max_cv() - 20.0).abs() < 1e-9);

        record.replace_artifact(1, artifact(1.0, 1.0)).unwrap();
        assert!((record.max_cv() - 3.0).abs() < 1e-9);

        record.remove_artifact(1).unwrap();
        assert_eq!(record.max_cv(), 0.0);
    }

    #[test]
    fn test_index_is_one_based() {
        let mut record = PlayerRecord::new(None);
        record.push_artifact(artifact(1.0, 1.0));
        record.push_artifact(artifact(2.0, 2.0));
        assert!(!record.has_index(0));
        assert!(record.has_index(1));
        assert!(record.has_index(2));
        assert!(!record.has_index(3));
        assert!(record.remove_artifact(0).is_none());
        assert!(record.remove_artifact(3).is_none());

        let removed = record.remove_artifact(2).unwrap();
        assert_eq!(removed.crit_rate(), 2.0);
        assert_eq!(record.artifacts().len(), 1);
    }

    #[test]
    fn test_count_at_least() {
        let mut record = PlayerRecord::new(None);
        record.push_artifact(artifact(12.0, 22.0)); // 46
        record.push_artifact(artifact(10.0, 20.0)); // 40
        record.push_artifact(artifact(5.0, 5.0)); // 15
        assert_eq!(record.count_at_least(45.0), 1);
        assert_eq!(record.count_at_least(40.0), 2);
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path().join("data.json"));

        let mut record = PlayerRecord::new(Some("alice".to_string()));
        record.display_name = Some("Ali".to_string());
        record.language = "ja".to_string();
        record.push_artifact(artifact(10.3, 20.7));
        record.push_artifact(artifact(3.9, 7.8));
        let mut records = RecordStore::new();
        records.insert("1001".to_string(), record.clone());

        storage.save(&records).unwrap();
        let loaded = storage.load().unwrap();

        let back = &loaded["1001"];
        assert_eq!(back.artifacts().len(), 2);
        assert!((back.max_cv() - record.max_cv()).abs() < 1e-9);
        for (a, b) in back.artifacts().iter().zip(record.artifacts()) {
            assert!((a.crit_rate() - b.crit_rate()).abs() < 1e-9);
            assert!((a.crit_dmg() - b.crit_dmg()).abs() < 1e-9);
            assert!((a.cv() - b.cv()).abs() < 1e-9);
        }
        assert_eq!(back.display_name.as_deref(), Some("Ali"));
        assert_eq!(back.language, "ja");
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path().join("data.json"));
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn test_load_older_format() {
        // Early data files have no username or language and a stale max_cv
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(
            &path,
            r#"{ "42": { "display_name": "Player1",
                        "artifacts": [ {"crit_rate": 10.0, "crit_dmg": 20.0, "cv": 40.0} ],
                        "max_cv": 12.0 } }"#,
        )
        .unwrap();

        let records = JsonStorage::new(&path).load().unwrap();
        let record = &records["42"];
        assert_eq!(record.language, "en");
        assert!(record.username.is_none());
        assert!((record.max_cv() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_load_corrupt_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "{ nope").unwrap();
        assert!(JsonStorage::new(&path).load().is_err());
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path().join("data.json"));

        let mut records = RecordStore::new();
        records.insert("1".to_string(), PlayerRecord::new(None));
        records.insert("2".to_string(), PlayerRecord::new(None));
        storage.save(&records).unwrap();

        records.remove("1");
        storage.save(&records).unwrap();

        let loaded = storage.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains_key("2"));
    }
}
