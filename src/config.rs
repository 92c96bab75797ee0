//! Configuration for the leaderboard.
//!
//! Loads settings from config.json at startup. Provides file locations,
//! the OCR endpoint, and leaderboard display limits.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

const CONFIG_FILE: &str = "config.json";

/// Complete leaderboard configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Player records, rewritten after every change
    pub data_file: PathBuf,
    /// Multilingual keyword table used to read OCR transcripts
    pub languages_file: PathBuf,
    /// Known accounts (id, username, nickname) for name lookups
    pub members_file: PathBuf,
    /// EasyOCR-compatible endpoint receiving the screenshot
    pub ocr_api_url: String,
    /// Upper bound for a single OCR request (seconds)
    pub ocr_timeout_secs: u64,
    /// Rows shown on the leaderboard
    pub max_leaderboard_players: usize,
    /// Longest name shown on the leaderboard (longest that fits on mobile)
    pub max_name_length: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data.json"),
            languages_file: PathBuf::from("languages.json"),
            members_file: PathBuf::from("members.json"),
            ocr_api_url: "https://api.easyocr.org/ocr".to_string(),
            ocr_timeout_secs: 60,
            max_leaderboard_players: 99,
            max_name_length: 13,
        }
    }
}

impl BotConfig {
    /// Loads config from an explicit path, or searches the default locations.
    ///
    /// Search order: next to the executable, then the per-user config directory.
    /// Falls back to defaults when nothing usable is found.
    pub fn load(explicit: Option<&Path>) -> Self {
        let candidates: Vec<PathBuf> = match explicit {
            Some(path) => vec![path.to_path_buf()],
            None => std::iter::once(paths::get_exe_dir().join(CONFIG_FILE))
                .chain(paths::get_user_config_dir().map(|dir| dir.join(CONFIG_FILE)))
                .collect(),
        };

        for config_path in candidates {
            crate::log(&format!("Looking for config at: {}", config_path.display()));
            if !config_path.exists() {
                continue;
            }
            match fs::read_to_string(&config_path) {
                Ok(contents) => match serde_json::from_str(&contents) {
                    Ok(config) => {
                        crate::log(&format!("Config loaded from {}", config_path.display()));
                        return config;
                    }
                    Err(e) => {
                        crate::log(&format!(
                            "Failed to parse {}: {}. Using defaults.",
                            config_path.display(),
                            e
                        ));
                        return Self::default();
                    }
                },
                Err(e) => {
                    crate::log(&format!(
                        "Failed to read {}: {}. Using defaults.",
                        config_path.display(),
                        e
                    ));
                    return Self::default();
                }
            }
        }

        crate::log("config.json not found. Using default config.");
        Self::default()
    }

    pub fn data_path(&self) -> PathBuf {
        paths::resolve(&self.data_file)
    }

    pub fn languages_path(&self) -> PathBuf {
        paths::resolve(&self.languages_file)
    }

    pub fn members_path(&self) -> PathBuf {
        paths::resolve(&self.members_file)
    }
}
