//! Leaderboard ordering and rank-change reporting.
//!
//! Players are ordered best-first by max CV, then by how many artifacts reach
//! 45 CV, then by how many reach 40 CV. Anything still tied keeps store order.
//! Ranks are always recomputed from scratch; another player's tiebreak counts
//! can move a rank even when the mutated player's own max CV did not change.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use super::store::{PlayerRecord, RecordStore};

/// Artifacts at or above this CV count for the first tiebreak.
pub const TIER_HIGH: f64 = 45.0;
/// Artifacts at or above this CV count for the second tiebreak.
pub const TIER_LOW: f64 = 40.0;

fn compare(a: &PlayerRecord, b: &PlayerRecord) -> Ordering {
    b.max_cv()
        .total_cmp(&a.max_cv())
        .then_with(|| b.count_at_least(TIER_HIGH).cmp(&a.count_at_least(TIER_HIGH)))
        .then_with(|| b.count_at_least(TIER_LOW).cmp(&a.count_at_least(TIER_LOW)))
}

/// Records best-first. `sort_by` is stable, so full ties keep store order.
pub fn sorted_leaderboard(records: &RecordStore) -> Vec<(&str, &PlayerRecord)> {
    let mut sorted: Vec<(&str, &PlayerRecord)> = records
        .iter()
        .map(|(id, record)| (id.as_str(), record))
        .collect();
    sorted.sort_by(|(_, a), (_, b)| compare(a, b));
    sorted
}

/// Player id -> 1-based rank.
pub fn leaderboard_ranks(records: &RecordStore) -> HashMap<String, usize> {
    sorted_leaderboard(records)
        .into_iter()
        .enumerate()
        .map(|(position, (id, _))| (id.to_string(), position + 1))
        .collect()
}

/// How a player's rank moved after a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankChange {
    /// First appearance on the leaderboard
    Entered { rank: usize },
    Improved { by: usize, rank: usize },
    Worsened { by: usize, rank: usize },
    Unchanged { rank: usize },
}

impl RankChange {
    /// Compares ranks taken before and after a change.
    ///
    /// New entrants only report the new rank; their old rank is not compared.
    /// A missing old rank is treated the same way.
    pub fn between(old_rank: Option<usize>, new_rank: usize, is_new_player: bool) -> Self {
        let old_rank = match old_rank {
            Some(rank) if !is_new_player => rank,
            _ => return RankChange::Entered { rank: new_rank },
        };

        match new_rank.cmp(&old_rank) {
            Ordering::Less => RankChange::Improved {
                by: old_rank - new_rank,
                rank: new_rank,
            },
            Ordering::Greater => RankChange::Worsened {
                by: new_rank - old_rank,
                rank: new_rank,
            },
            Ordering::Equal => RankChange::Unchanged { rank: new_rank },
        }
    }
}

impl fmt::Display for RankChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankChange::Entered { rank } => write!(f, "Entered leaderboard at rank #{}", rank),
            RankChange::Improved { by, rank } => write!(f, "▲ +{} → #{}", by, rank),
            RankChange::Worsened { by, rank } => write!(f, "▼ -{} → #{}", by, rank),
            RankChange::Unchanged { rank } => write!(f, "▬ Unchanged (#{})", rank),
        }
    }
}
