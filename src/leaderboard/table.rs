//! Fixed-width text tables for the leaderboard and artifact lists.

use super::ranking::{TIER_HIGH, TIER_LOW};
use super::store::PlayerRecord;
use crate::artifact::Artifact;

/// One leaderboard line.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub name: String,
    pub max_cv: f64,
    pub count_high: usize,
    pub count_low: usize,
}

impl LeaderboardRow {
    pub fn new(rank: usize, name: String, record: &PlayerRecord) -> Self {
        Self {
            rank,
            name,
            max_cv: record.max_cv(),
            count_high: record.count_at_least(TIER_HIGH),
            count_low: record.count_at_least(TIER_LOW),
        }
    }
}

/// Shortens a name to `max_len` characters, marking the cut with `-`.
pub fn truncate_name(name: &str, max_len: usize) -> String {
    if max_len == 0 || name.chars().count() <= max_len {
        return name.to_string();
    }
    let mut short: String = name.chars().take(max_len - 1).collect();
    short.push('-');
    short
}

/// Renders the leaderboard with names padded to `name_width`.
pub fn render_leaderboard(rows: &[LeaderboardRow], name_width: usize) -> String {
    let mut lines = vec![
        format!("# |{:<width$}|Max |45+|40+", "Name", width = name_width),
        format!("--+{}+----+---+---", "-".repeat(name_width)),
    ];
    for row in rows {
        let name = truncate_name(&row.name, name_width);
        lines.push(format!(
            "{:<2}|{:<width$}|{:<4.1}|{:<3}|{:<3}",
            row.rank,
            name,
            row.max_cv,
            row.count_high,
            row.count_low,
            width = name_width
        ));
    }
    lines.join("\n")
}

/// Renders a player's artifacts with their 1-based indices.
pub fn render_artifacts(artifacts: &[Artifact]) -> String {
    let mut lines = vec![
        "Index | CR   | CD   | CV   ".to_string(),
        "------+------+------+-----".to_string(),
    ];
    for (idx, arti) in artifacts.iter().enumerate() {
        lines.push(format!(
            "{:<5} | {:<4.1} | {:<4.1} | {:<4.1}",
            idx + 1,
            arti.crit_rate(),
            arti.crit_dmg(),
            arti.cv()
        ));
    }
    lines.join("\n")
}
