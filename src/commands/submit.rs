//! Adding and changing artifacts: /submit, /scan, /modify.

use std::fmt;

use super::{required_rank, rank_of, CommandError, Tracker};
use crate::artifact::{Artifact, ValidationError};
use crate::leaderboard::RankChange;
use crate::ocr::{ocr_language_hints, ocr_screenshot, parse_artifact_text, Interpretation, OcrEngine};

#[derive(Debug, Clone)]
pub struct Submitted {
    pub artifact: Artifact,
    pub rank: RankChange,
}

#[derive(Debug, Clone)]
pub struct Scanned {
    /// What was stored. Zeroed when the read stats failed validation.
    pub artifact: Artifact,
    /// Why the read stats were discarded, if they were.
    pub discarded: Option<ValidationError>,
    pub languages: Vec<String>,
    pub rank: RankChange,
}

#[derive(Debug, Clone)]
pub struct Modified {
    pub index: usize,
    pub player_name: String,
    pub old: Artifact,
    pub new: Artifact,
    pub rank: RankChange,
}

fn write_stats(f: &mut fmt::Formatter<'_>, artifact: &Artifact) -> fmt::Result {
    writeln!(f, "CRIT Rate: {:.1}%", artifact.crit_rate())?;
    writeln!(f, "CRIT DMG: {:.1}%", artifact.crit_dmg())?;
    writeln!(f, "CRIT Value: {:.1}", artifact.cv())
}

impl fmt::Display for Submitted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Artifact Submitted")?;
        write_stats(f, &self.artifact)?;
        write!(f, "Rank: {}", self.rank)
    }
}

impl fmt::Display for Scanned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Artifact Scan Result ({})", self.languages.join(", "))?;
        if let Some(reason) = &self.discarded {
            writeln!(f, "Scanned stats discarded: {}", reason)?;
        }
        write_stats(f, &self.artifact)?;
        write!(f, "Rank: {}", self.rank)
    }
}

impl fmt::Display for Modified {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Artifact #{} Modified for {}", self.index, self.player_name)?;
        writeln!(
            f,
            "CRIT Rate: {:.1}% → {:.1}%",
            self.old.crit_rate(), self.new.crit_rate()
        )?;
        writeln!(
            f,
            "CRIT DMG: {:.1}% → {:.1}%",
            self.old.crit_dmg(), self.new.crit_dmg()
        )?;
        writeln!(f, "CRIT Value: {:.1} → {:.1}", self.old.cv(), self.new.cv())?;
        write!(f, "Rank: {}", self.rank)
    }
}

impl Tracker {
    /// Adds an artifact for the invoking player. Invalid stats change nothing.
    pub fn submit(
        &self,
        invoker_id: &str,
        crit_rate: f64,
        crit_dmg: f64,
    ) -> Result<Submitted, CommandError> {
        let artifact = Artifact::new(crit_rate, crit_dmg)?;
        let rank = self.append_artifact(invoker_id, artifact)?;
        crate::log(&format!(
            "Player {} submitted CV {:.1} ({})",
            invoker_id, artifact.cv(), rank
        ));
        Ok(Submitted { artifact, rank })
    }

    /// Reads an artifact screenshot and adds it for the invoking player.
    ///
    /// OCR runs before the store is locked, so a slow or failed OCR call never
    /// holds up other commands or leaves a partial change. Circlets are
    /// refused. Stats that fail validation are stored as a zeroed artifact.
    pub fn scan(
        &self,
        invoker_id: &str,
        image_bytes: &[u8],
        ocr: &dyn OcrEngine,
    ) -> Result<Scanned, CommandError> {
        let language = self
            .lock()
            .get(invoker_id)
            .map(|record| record.language.clone())
            .unwrap_or_else(|| "en".to_string());
        let languages = ocr_language_hints(&language);

        let transcript =
            ocr_screenshot(ocr, image_bytes, &languages).map_err(CommandError::Ocr)?;

        let (crit_rate, crit_dmg) = match parse_artifact_text(&transcript, &self.languages) {
            Interpretation::Circlet => {
                crate::log(&format!("Player {} scanned a circlet", invoker_id));
                return Err(CommandError::Circlet);
            }
            Interpretation::Stats {
                crit_rate,
                crit_dmg,
            } => (crit_rate, crit_dmg),
        };

        let (artifact, discarded) = match Artifact::new(crit_rate, crit_dmg) {
            Ok(artifact) => (artifact, None),
            Err(reason) => (Artifact::zeroed(), Some(reason)),
        };

        let rank = self.append_artifact(invoker_id, artifact)?;
        crate::log(&format!(
            "Player {} scanned CR {:.1} CD {:.1} -> CV {:.1} ({})",
            invoker_id, crit_rate, crit_dmg, artifact.cv(), rank
        ));
        Ok(Scanned {
            artifact,
            discarded,
            languages,
            rank,
        })
    }

    /// Replaces an existing artifact. Checks the index, then the stats, then writes.
    pub fn modify(
        &self,
        invoker_id: &str,
        identifier: &str,
        index: usize,
        crit_rate: f64,
        crit_dmg: f64,
    ) -> Result<Modified, CommandError> {
        let mut records = self.lock();
        let player_id = self.find_player(&records, invoker_id, Some(identifier))?;

        let max = records[&player_id].artifacts().len();
        if !records[&player_id].has_index(index) {
            return Err(CommandError::IndexOutOfRange { index, max });
        }
        let new = Artifact::new(crit_rate, crit_dmg)?;

        let old_rank = rank_of(&records, &player_id);
        let old = records
            .get_mut(&player_id)
            .and_then(|record| record.replace_artifact(index, new))
            .ok_or(CommandError::IndexOutOfRange { index, max })?;
        let new_rank = required_rank(&records, &player_id)?;
        self.save(&records)?;

        let rank = RankChange::between(old_rank, new_rank, false);
        crate::log(&format!(
            "Artifact #{} of {} modified: CV {:.1} -> {:.1} ({})",
            index, player_id, old.cv(), new.cv(), rank
        ));
        Ok(Modified {
            index,
            player_name: self.display_name(&records, &player_id),
            old,
            new,
            rank,
        })
    }

    /// Appends to a player's artifacts (creating the player) and saves.
    fn append_artifact(&self, player_id: &str, artifact: Artifact) -> Result<RankChange, CommandError> {
        let mut records = self.lock();
        // A record created by /name or /language has not entered the board yet
        let is_new_player = records
            .get(player_id)
            .is_none_or(|record| record.artifacts().is_empty());
        let old_rank = rank_of(&records, player_id);

        self.ensure_user(&mut records, player_id).push_artifact(artifact);

        let new_rank = required_rank(&records, player_id)?;
        self.save(&records)?;
        Ok(RankChange::between(old_rank, new_rank, is_new_player))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{tracker, FakeOcr};
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgb};
    use std::io::Cursor;

    fn png() -> Vec<u8> {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(2, 2, Rgb([0, 0, 0]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_first_submission_enters_leaderboard() {
        let (tracker, _dir) = tracker();
        tracker.submit("2", 12.0, 24.0).unwrap(); // 48

        let result = tracker.submit("1", 10.0, 20.0).unwrap();
        assert!((result.artifact.cv() - 40.0).abs() < 1e-9);
        assert_eq!(result.rank, RankChange::Entered { rank: 2 });
        assert_eq!(result.rank.to_string(), "Entered leaderboard at rank #2");

        // Handle taken from the directory
        assert_eq!(tracker.snapshot()["1"].username.as_deref(), Some("alice"));
    }

    #[test]
    fn test_submission_moves_rank() {
        let (tracker, _dir) = tracker();
        tracker.submit("2", 12.0, 24.0).unwrap();
        tracker.submit("1", 10.0, 20.0).unwrap();

        let result = tracker.submit("1", 13.0, 26.0).unwrap(); // 52
        assert_eq!(result.rank, RankChange::Improved { by: 1, rank: 1 });

        let result = tracker.submit("1", 1.0, 1.0).unwrap();
        assert_eq!(result.rank, RankChange::Unchanged { rank: 1 });
    }

    #[test]
    fn test_invalid_submission_changes_nothing() {
        let (tracker, dir) = tracker();
        let err = tracker.submit("1", 12.3, 45.6).unwrap_err();
        assert!(matches!(
            err,
            CommandError::Validation(ValidationError::ExceedsMax { .. })
        ));
        assert!(tracker.submit("1", -1.0, 5.0).is_err());
        assert!(tracker.snapshot().is_empty());
        assert!(!dir.path().join("data.json").exists());
    }

    #[test]
    fn test_first_submission_after_name_enters_leaderboard() {
        let (tracker, _dir) = tracker();
        tracker.submit("2", 12.0, 24.0).unwrap();
        tracker.set_name("1", "Ali").unwrap();

        let result = tracker.submit("1", 13.0, 26.0).unwrap();
        assert_eq!(result.rank, RankChange::Entered { rank: 1 });
        assert_eq!(result.rank.to_string(), "Entered leaderboard at rank #1");

        // Later submissions compare ranks again
        let result = tracker.submit("1", 1.0, 1.0).unwrap();
        assert_eq!(result.rank, RankChange::Unchanged { rank: 1 });
    }

    #[test]
    fn test_non_finite_submission_keeps_store_loadable() {
        let (tracker, dir) = tracker();
        tracker.submit("1", 10.0, 20.0).unwrap();

        let err = tracker.submit("1", f64::NAN, 0.0).unwrap_err();
        assert!(matches!(
            err,
            CommandError::Validation(ValidationError::NotANumber)
        ));
        assert!(tracker.modify("1", "alice", 1, 1.0, f64::INFINITY).is_err());

        let storage = crate::leaderboard::JsonStorage::new(dir.path().join("data.json"));
        let loaded = storage.load().unwrap();
        assert_eq!(loaded["1"].artifacts().len(), 1);
        assert!((loaded["1"].max_cv() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_submission_persisted() {
        let (tracker, dir) = tracker();
        tracker.submit("1", 10.0, 20.0).unwrap();

        let storage = crate::leaderboard::JsonStorage::new(dir.path().join("data.json"));
        let loaded = storage.load().unwrap();
        assert_eq!(loaded["1"].artifacts().len(), 1);
        assert!((loaded["1"].max_cv() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_identical_stats_tie_stable() {
        let (tracker, _dir) = tracker();
        tracker.submit("1", 10.0, 20.0).unwrap();
        tracker.submit("2", 10.0, 20.0).unwrap();

        let records = tracker.snapshot();
        assert_eq!(records["1"].max_cv(), records["2"].max_cv());
        let ranks = crate::leaderboard::leaderboard_ranks(&records);
        for _ in 0..5 {
            assert_eq!(crate::leaderboard::leaderboard_ranks(&tracker.snapshot()), ranks);
        }

        // An extra 40+ artifact breaks the tie
        tracker.submit("2", 10.0, 20.0).unwrap();
        let ranks = crate::leaderboard::leaderboard_ranks(&tracker.snapshot());
        assert_eq!(ranks["2"], 1);
        assert_eq!(ranks["1"], 2);
    }

    #[test]
    fn test_scan_stores_stats() {
        let (tracker, _dir) = tracker();
        let ocr = FakeOcr(Some("Gladiator's Nostalgia\nCRIT Rate+7.0%\nCRIT DMG+14.0%"));
        let result = tracker.scan("1", &png(), &ocr).unwrap();

        assert_eq!(result.artifact.crit_rate(), 7.0);
        assert_eq!(result.artifact.crit_dmg(), 14.0);
        assert!(result.discarded.is_none());
        assert_eq!(result.languages, vec!["en"]);
        assert_eq!(result.rank, RankChange::Entered { rank: 1 });
        assert_eq!(tracker.snapshot()["1"].artifacts().len(), 1);
    }

    #[test]
    fn test_scan_uses_player_language() {
        let (tracker, _dir) = tracker();
        tracker.set_language("1", "ch_sim").unwrap();
        let ocr = FakeOcr(Some("暴击率+3.9%\n暴击伤害+7.8%"));
        let result = tracker.scan("1", &png(), &ocr).unwrap();
        assert_eq!(result.languages, vec!["ch_sim", "en"]);
        assert!((result.artifact.cv() - 15.6).abs() < 1e-9);
        // Setting the language made a record but no submission
        assert_eq!(result.rank, RankChange::Entered { rank: 1 });
    }

    #[test]
    fn test_scan_circlet_rejected() {
        let (tracker, _dir) = tracker();
        let ocr = FakeOcr(Some("Circlet of Logos\nCRIT Rate+31.1%"));
        let err = tracker.scan("1", &png(), &ocr).unwrap_err();
        assert!(matches!(err, CommandError::Circlet));
        assert!(tracker.snapshot().is_empty());
    }

    #[test]
    fn test_scan_over_ceiling_stores_zeroed() {
        let (tracker, _dir) = tracker();
        let ocr = FakeOcr(Some("Crit Rate+12.3%\nCrit DMG+45.6%"));
        let result = tracker.scan("1", &png(), &ocr).unwrap();

        assert_eq!(result.artifact, Artifact::zeroed());
        let reason = result.discarded.unwrap();
        assert_eq!(reason.reported_cv(), Some(70.2));
        assert_eq!(tracker.snapshot()["1"].artifacts().len(), 1);
        assert_eq!(tracker.snapshot()["1"].max_cv(), 0.0);
    }

    #[test]
    fn test_scan_ocr_failure_changes_nothing() {
        let (tracker, _dir) = tracker();
        let err = tracker.scan("1", &png(), &FakeOcr(None)).unwrap_err();
        assert!(matches!(err, CommandError::Ocr(_)));
        assert!(tracker.snapshot().is_empty());
    }

    #[test]
    fn test_modify() {
        let (tracker, _dir) = tracker();
        tracker.submit("1", 10.0, 20.0).unwrap();
        tracker.submit("2", 12.0, 24.0).unwrap();

        let result = tracker.modify("1", "Ali", 1, 13.0, 26.0).unwrap();
        assert_eq!(result.index, 1);
        assert_eq!(result.player_name, "Ali");
        assert!((result.old.cv() - 40.0).abs() < 1e-9);
        assert!((result.new.cv() - 52.0).abs() < 1e-9);
        assert_eq!(result.rank, RankChange::Improved { by: 1, rank: 1 });
        assert!((tracker.snapshot()["1"].max_cv() - 52.0).abs() < 1e-9);
    }

    #[test]
    fn test_modify_checks_index_before_stats() {
        let (tracker, _dir) = tracker();
        tracker.submit("1", 10.0, 20.0).unwrap();

        let err = tracker.modify("1", "alice", 2, -1.0, 0.0).unwrap_err();
        assert!(matches!(err, CommandError::IndexOutOfRange { index: 2, max: 1 }));

        let err = tracker.modify("1", "alice", 1, 30.0, 0.0).unwrap_err();
        assert!(matches!(err, CommandError::Validation(_)));
        assert!((tracker.snapshot()["1"].max_cv() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_modify_unknown_user() {
        let (tracker, _dir) = tracker();
        let err = tracker.modify("1", "bob", 1, 1.0, 1.0).unwrap_err();
        assert!(matches!(err, CommandError::UserNotFound(ref q) if q == "bob"));
    }
}
