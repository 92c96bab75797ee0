//! Player records, ranking, and name lookups.

pub mod identity;
pub mod ranking;
pub mod store;
pub mod table;

pub use identity::{resolve_user, Directory, Member};
pub use ranking::{leaderboard_ranks, sorted_leaderboard, RankChange};
pub use store::{JsonStorage, PlayerRecord, RecordStore};
pub use table::LeaderboardRow;

/// Name shown for a player: leaderboard name, then server display name, then handle.
pub fn display_name(player_id: &str, record: Option<&PlayerRecord>, directory: &Directory) -> String {
    if let Some(name) = record.and_then(|r| r.display_name.as_deref()) {
        return name.to_string();
    }
    if let Some(member) = directory.get(player_id) {
        return member.display_name().to_string();
    }
    record
        .and_then(|r| r.username.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}
