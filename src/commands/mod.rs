//! Leaderboard commands.
//!
//! `Tracker` holds the shared record store and everything the commands need.
//! Each mutating command locks the store only for read → compute → write →
//! save; the OCR round-trip of a scan happens before the lock is taken.
//! `dispatch` is the command boundary: whatever goes wrong inside a command
//! comes back as a failed `Reply`, never as a panic or an error.

pub mod error;
pub mod manage;
pub mod submit;

pub use error::CommandError;
pub use manage::{ArtifactList, ArtifactRemoved, Backfilled, LanguageSet, Leaderboard, NameSet, PlayerRemoved};
pub use submit::{Modified, Scanned, Submitted};

use anyhow::{anyhow, Result};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::BotConfig;
use crate::leaderboard::{leaderboard_ranks, Directory, JsonStorage, PlayerRecord, RecordStore};
use crate::ocr::{KeywordTable, OcrEngine};

/// Shared state for all commands.
pub struct Tracker {
    records: Mutex<RecordStore>,
    storage: JsonStorage,
    languages: KeywordTable,
    directory: Directory,
    max_leaderboard_players: usize,
    max_name_length: usize,
}

impl Tracker {
    pub fn new(
        records: RecordStore,
        storage: JsonStorage,
        languages: KeywordTable,
        directory: Directory,
    ) -> Self {
        let defaults = BotConfig::default();
        Self {
            records: Mutex::new(records),
            storage,
            languages,
            directory,
            max_leaderboard_players: defaults.max_leaderboard_players,
            max_name_length: defaults.max_name_length,
        }
    }

    /// Loads records, keywords and members from the configured files.
    pub fn open(config: &BotConfig) -> Result<Self> {
        let storage = JsonStorage::new(config.data_path());
        let records = storage.load()?;
        let languages = KeywordTable::load(&config.languages_path());
        crate::log(&format!(
            "OCR languages available: {}",
            languages.ocr_languages().join(", ")
        ));
        let directory = Directory::load(&config.members_path());

        let mut tracker = Self::new(records, storage, languages, directory);
        tracker.max_leaderboard_players = config.max_leaderboard_players;
        tracker.max_name_length = config.max_name_length;
        Ok(tracker)
    }

    pub fn languages(&self) -> &KeywordTable {
        &self.languages
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Copy of the current records.
    pub fn snapshot(&self) -> RecordStore {
        self.lock().clone()
    }

    /// Locks the store. Commands only write after their checks pass, so a
    /// lock poisoned by a panicking command still holds consistent records.
    fn lock(&self) -> MutexGuard<'_, RecordStore> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn save(&self, records: &RecordStore) -> Result<(), CommandError> {
        self.storage.save(records).map_err(|e| {
            crate::log(&format!(
                "Failed to save {}: {:#}",
                self.storage.path().display(),
                e
            ));
            CommandError::Internal(e)
        })
    }

    /// Gets or creates the record for a player, taking the handle from the directory.
    fn ensure_user<'a>(&self, records: &'a mut RecordStore, player_id: &str) -> &'a mut PlayerRecord {
        records.entry(player_id.to_string()).or_insert_with(|| {
            PlayerRecord::new(self.directory.get(player_id).map(|m| m.username.clone()))
        })
    }

    /// Resolves a typed identifier to a player that is on the leaderboard.
    fn find_player(
        &self,
        records: &RecordStore,
        invoker_id: &str,
        identifier: Option<&str>,
    ) -> Result<String, CommandError> {
        let resolved = crate::leaderboard::resolve_user(identifier, invoker_id, records, &self.directory)
            .filter(|id| records.contains_key(id));
        match (resolved, identifier) {
            (Some(id), _) => Ok(id),
            (None, Some(query)) if !query.trim().is_empty() => {
                Err(CommandError::UserNotFound(query.to_string()))
            }
            (None, _) => Err(CommandError::NotOnLeaderboard),
        }
    }

    fn display_name(&self, records: &RecordStore, player_id: &str) -> String {
        crate::leaderboard::display_name(player_id, records.get(player_id), &self.directory)
    }

    /// Runs one command and turns the result into a reply.
    pub fn dispatch(&self, invoker_id: &str, command: Command, ocr: &dyn OcrEngine) -> Reply {
        let name = command.name();
        crate::log(&format!("Command /{} from {}", name, invoker_id));

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.run(invoker_id, command, ocr)));
        match result {
            Ok(Ok(outcome)) => Reply::success(outcome.to_string()),
            Ok(Err(e)) => {
                crate::log(&format!("Command /{} failed: {:#}", name, e));
                Reply::failure(e.title(), e.to_string())
            }
            Err(_) => {
                crate::log(&format!("Command /{} panicked", name));
                Reply::failure(
                    "Command Failed",
                    "Something went wrong while handling the command.".to_string(),
                )
            }
        }
    }

    fn run(&self, invoker_id: &str, command: Command, ocr: &dyn OcrEngine) -> Result<Outcome, CommandError> {
        Ok(match command {
            Command::Name { new_name } => Outcome::NameSet(self.set_name(invoker_id, &new_name)?),
            Command::Language { code } => Outcome::LanguageSet(self.set_language(invoker_id, &code)?),
            Command::Submit {
                crit_rate,
                crit_dmg,
            } => Outcome::Submitted(self.submit(invoker_id, crit_rate, crit_dmg)?),
            Command::Scan { image } => Outcome::Scanned(self.scan(invoker_id, &image, ocr)?),
            Command::List { user } => Outcome::ArtifactList(self.list(invoker_id, user.as_deref())?),
            Command::Remove {
                user,
                index: Some(index),
            } => Outcome::ArtifactRemoved(self.remove_artifact(invoker_id, &user, index)?),
            Command::Remove { user, index: None } => {
                Outcome::PlayerRemoved(self.remove_player(invoker_id, &user)?)
            }
            Command::Modify {
                user,
                index,
                crit_rate,
                crit_dmg,
            } => Outcome::Modified(self.modify(invoker_id, &user, index, crit_rate, crit_dmg)?),
            Command::Leaderboard => Outcome::Leaderboard(self.leaderboard()),
            Command::Backfill => Outcome::Backfilled(self.backfill_usernames()?),
        })
    }
}

/// Current rank of a player, if on the leaderboard.
fn rank_of(records: &RecordStore, player_id: &str) -> Option<usize> {
    leaderboard_ranks(records).get(player_id).copied()
}

/// Rank of a player that must be in the store.
fn required_rank(records: &RecordStore, player_id: &str) -> Result<usize, CommandError> {
    rank_of(records, player_id)
        .ok_or_else(|| CommandError::Internal(anyhow!("player {} missing after update", player_id)))
}

/// A command as issued by a player.
#[derive(Debug, Clone)]
pub enum Command {
    Name { new_name: String },
    Language { code: String },
    Submit { crit_rate: f64, crit_dmg: f64 },
    Scan { image: Vec<u8> },
    List { user: Option<String> },
    Remove { user: String, index: Option<usize> },
    Modify { user: String, index: usize, crit_rate: f64, crit_dmg: f64 },
    Leaderboard,
    Backfill,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Name { .. } => "name",
            Command::Language { .. } => "language",
            Command::Submit { .. } => "submit",
            Command::Scan { .. } => "scan",
            Command::List { .. } => "list",
            Command::Remove { .. } => "remove",
            Command::Modify { .. } => "modify",
            Command::Leaderboard => "leaderboard",
            Command::Backfill => "backfill",
        }
    }
}

/// Result of a successful command.
#[derive(Debug, Clone)]
pub enum Outcome {
    NameSet(NameSet),
    LanguageSet(LanguageSet),
    Submitted(Submitted),
    Scanned(Scanned),
    ArtifactList(ArtifactList),
    ArtifactRemoved(ArtifactRemoved),
    PlayerRemoved(PlayerRemoved),
    Modified(Modified),
    Leaderboard(Leaderboard),
    Backfilled(Backfilled),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::NameSet(o) => o.fmt(f),
            Outcome::LanguageSet(o) => o.fmt(f),
            Outcome::Submitted(o) => o.fmt(f),
            Outcome::Scanned(o) => o.fmt(f),
            Outcome::ArtifactList(o) => o.fmt(f),
            Outcome::ArtifactRemoved(o) => o.fmt(f),
            Outcome::PlayerRemoved(o) => o.fmt(f),
            Outcome::Modified(o) => o.fmt(f),
            Outcome::Leaderboard(o) => o.fmt(f),
            Outcome::Backfilled(o) => o.fmt(f),
        }
    }
}

/// What the presentation layer shows for a command.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub success: bool,
    pub text: String,
}

impl Reply {
    fn success(text: String) -> Self {
        Self {
            success: true,
            text,
        }
    }

    fn failure(title: &str, message: String) -> Self {
        Self {
            success: false,
            text: format!("{}\n{}", title, message),
        }
    }
}
