//! Resolving a typed name to a player id.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::store::RecordStore;

/// An account known to the chat server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    /// Account handle
    pub username: String,
    /// Server nickname, if set
    #[serde(default)]
    pub nickname: Option<String>,
}

impl Member {
    /// Nickname, falling back to the handle.
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.username)
    }
}

/// Every account in scope for name lookups.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    members: Vec<Member>,
}

impl Directory {
    pub fn new(members: Vec<Member>) -> Self {
        Self { members }
    }

    /// Loads members from a JSON array. A missing or unreadable file gives an empty directory.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            crate::log(&format!(
                "{} not found. Name lookups use leaderboard names only.",
                path.display()
            ));
            return Self::default();
        }

        match fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|content| Ok(serde_json::from_str::<Vec<Member>>(&content)?))
        {
            Ok(members) => {
                crate::log(&format!(
                    "Loaded {} members from {}",
                    members.len(),
                    path.display()
                ));
                Self { members }
            }
            Err(e) => {
                crate::log(&format!(
                    "Failed to load {}: {}. Name lookups use leaderboard names only.",
                    path.display(),
                    e
                ));
                Self::default()
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }
}

/// Resolves a typed user identifier to a player id.
///
/// With no identifier the invoking user is meant. Otherwise, ignoring case
/// and in this order: leaderboard name, server display name, account handle.
/// The first exact match wins.
pub fn resolve_user(
    identifier: Option<&str>,
    invoker_id: &str,
    records: &RecordStore,
    directory: &Directory,
) -> Option<String> {
    let Some(identifier) = identifier.map(str::trim).filter(|s| !s.is_empty()) else {
        return Some(invoker_id.to_string());
    };
    let wanted = identifier.to_lowercase();

    // 1. Leaderboard display name
    let by_leaderboard_name = records.iter().find_map(|(id, record)| {
        record
            .display_name
            .as_deref()
            .filter(|name| name.to_lowercase() == wanted)
            .map(|_| id.clone())
    });
    if by_leaderboard_name.is_some() {
        return by_leaderboard_name;
    }

    // 2. Server display name (nickname or handle)
    if let Some(member) = directory
        .members()
        .iter()
        .find(|m| m.display_name().to_lowercase() == wanted)
    {
        return Some(member.id.clone());
    }

    // 3. Plain account handle
    directory
        .members()
        .iter()
        .find(|m| m.username.to_lowercase() == wanted)
        .map(|m| m.id.clone())
}
