//! Player and leaderboard management: /name, /language, /list, /remove,
//! /leaderboard, plus the start-up username backfill.

use std::fmt;

use super::{required_rank, rank_of, CommandError, Tracker};
use crate::artifact::Artifact;
use crate::leaderboard::table::{render_artifacts, render_leaderboard};
use crate::leaderboard::{sorted_leaderboard, LeaderboardRow, RankChange};

#[derive(Debug, Clone)]
pub struct NameSet {
    /// New leaderboard name; `None` when the override was cleared.
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LanguageSet {
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct ArtifactList {
    pub player_name: String,
    pub artifacts: Vec<Artifact>,
}

#[derive(Debug, Clone)]
pub struct ArtifactRemoved {
    pub index: usize,
    pub player_name: String,
    pub removed: Artifact,
    pub rank: RankChange,
}

#[derive(Debug, Clone)]
pub struct PlayerRemoved {
    pub player_name: String,
    pub previous_rank: usize,
}

#[derive(Debug, Clone)]
pub struct Leaderboard {
    pub rows: Vec<LeaderboardRow>,
    pub name_width: usize,
}

#[derive(Debug, Clone)]
pub struct Backfilled {
    pub updated: usize,
}

impl fmt::Display for NameSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "Your leaderboard name is now set to {}", name),
            None => write!(f, "Your leaderboard name has been reset"),
        }
    }
}

impl fmt::Display for LanguageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Your artifact OCR language has been set to {}",
            self.code
        )
    }
}

impl fmt::Display for ArtifactList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Artifacts for {}", self.player_name)?;
        write!(f, "{}", render_artifacts(&self.artifacts))
    }
}

impl fmt::Display for ArtifactRemoved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Removed artifact #{} for {}.",
            self.index, self.player_name
        )?;
        write!(f, "Rank: {}", self.rank)
    }
}

impl fmt::Display for PlayerRemoved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Removed {} and all of their artifacts from the leaderboard.",
            self.player_name
        )?;
        write!(f, "Previous Rank: #{}", self.previous_rank)
    }
}

impl fmt::Display for Leaderboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return write!(f, "No artifacts have been submitted yet.");
        }
        writeln!(f, "CRIT Value Leaderboard")?;
        write!(f, "{}", render_leaderboard(&self.rows, self.name_width))
    }
}

impl fmt::Display for Backfilled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Backfilled {} missing usernames", self.updated)
    }
}

impl Tracker {
    /// Sets (or with a blank name, clears) the invoking player's leaderboard name.
    pub fn set_name(&self, invoker_id: &str, new_name: &str) -> Result<NameSet, CommandError> {
        let name = Some(new_name.trim().to_string()).filter(|n| !n.is_empty());

        let mut records = self.lock();
        self.ensure_user(&mut records, invoker_id).display_name = name.clone();
        self.save(&records)?;

        crate::log(&format!("Player {} set leaderboard name to {:?}", invoker_id, name));
        Ok(NameSet { name })
    }

    /// Sets the invoking player's OCR language. Must be a language in the keyword table.
    pub fn set_language(&self, invoker_id: &str, code: &str) -> Result<LanguageSet, CommandError> {
        let code = code.trim().to_lowercase();
        if !self.languages.contains(&code) {
            return Err(CommandError::UnknownLanguage {
                code,
                available: self.languages.codes_list(),
            });
        }

        let mut records = self.lock();
        self.ensure_user(&mut records, invoker_id).language = code.clone();
        self.save(&records)?;

        crate::log(&format!("Player {} set OCR language to {}", invoker_id, code));
        Ok(LanguageSet { code })
    }

    /// Lists a player's artifacts; the invoking player when no identifier is given.
    pub fn list(&self, invoker_id: &str, identifier: Option<&str>) -> Result<ArtifactList, CommandError> {
        let records = self.lock();
        let player_id = self.find_player(&records, invoker_id, identifier)?;

        let artifacts = records[&player_id].artifacts().to_vec();
        if artifacts.is_empty() {
            return Err(CommandError::NoArtifacts);
        }
        Ok(ArtifactList {
            player_name: self.display_name(&records, &player_id),
            artifacts,
        })
    }

    /// Removes one artifact (1-based index) from a player.
    pub fn remove_artifact(
        &self,
        invoker_id: &str,
        identifier: &str,
        index: usize,
    ) -> Result<ArtifactRemoved, CommandError> {
        let mut records = self.lock();
        let player_id = self.find_player(&records, invoker_id, Some(identifier))?;

        let max = records[&player_id].artifacts().len();
        if !records[&player_id].has_index(index) {
            return Err(CommandError::IndexOutOfRange { index, max });
        }

        let old_rank = rank_of(&records, &player_id);
        let removed = records
            .get_mut(&player_id)
            .and_then(|record| record.remove_artifact(index))
            .ok_or(CommandError::IndexOutOfRange { index, max })?;
        let new_rank = required_rank(&records, &player_id)?;
        self.save(&records)?;

        let rank = RankChange::between(old_rank, new_rank, false);
        crate::log(&format!(
            "Artifact #{} (CV {:.1}) removed from {} ({})",
            index, removed.cv(), player_id, rank
        ));
        Ok(ArtifactRemoved {
            index,
            player_name: self.display_name(&records, &player_id),
            removed,
            rank,
        })
    }

    /// Removes a player and all of their artifacts.
    pub fn remove_player(&self, invoker_id: &str, identifier: &str) -> Result<PlayerRemoved, CommandError> {
        let mut records = self.lock();
        let player_id = self.find_player(&records, invoker_id, Some(identifier))?;

        let previous_rank = required_rank(&records, &player_id)?;
        let player_name = self.display_name(&records, &player_id);
        records.remove(&player_id);
        self.save(&records)?;

        crate::log(&format!(
            "Player {} removed (was #{})",
            player_id, previous_rank
        ));
        Ok(PlayerRemoved {
            player_name,
            previous_rank,
        })
    }

    /// Top players, best first.
    pub fn leaderboard(&self) -> Leaderboard {
        let records = self.lock();
        let rows = sorted_leaderboard(&records)
            .into_iter()
            .take(self.max_leaderboard_players)
            .enumerate()
            .map(|(position, (id, record))| {
                let name = crate::leaderboard::display_name(id, Some(record), &self.directory);
                LeaderboardRow::new(position + 1, name, record)
            })
            .collect();
        Leaderboard {
            rows,
            name_width: self.max_name_length,
        }
    }

    /// Fills in missing usernames from the directory. Saves only if something changed.
    pub fn backfill_usernames(&self) -> Result<Backfilled, CommandError> {
        let mut records = self.lock();
        let mut updated = 0;
        for (id, record) in records.iter_mut() {
            if record.username.is_some() {
                continue;
            }
            if let Some(member) = self.directory.get(id) {
                record.username = Some(member.username.clone());
                updated += 1;
            }
        }

        if updated > 0 {
            self.save(&records)?;
            crate::log(&format!("Backfilled {} missing usernames", updated));
        }
        Ok(Backfilled { updated })
    }
}
