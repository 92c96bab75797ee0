use thiserror::Error;

use crate::artifact::ValidationError;

/// Why a command did not go through. None of these leave the store half-changed.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Circlets are not allowed, sorry!")]
    Circlet,

    #[error("User '{0}' not found in the leaderboard.")]
    UserNotFound(String),

    #[error("You don't have any artifacts on the leaderboard yet.")]
    NotOnLeaderboard,

    #[error("No artifacts found for this user.")]
    NoArtifacts,

    #[error("Invalid artifact index {index}. Please provide a number between 1 and {max}.")]
    IndexOutOfRange { index: usize, max: usize },

    #[error("Unknown language '{code}'. Available language codes: {available}")]
    UnknownLanguage { code: String, available: String },

    #[error("OCR failed to process the image: {0:#}")]
    Ocr(anyhow::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CommandError {
    /// Short heading for the failure, shown above the message.
    pub fn title(&self) -> &'static str {
        match self {
            CommandError::Validation(_) => "Invalid Artifact Stats",
            CommandError::Circlet => "Invalid Artifact",
            CommandError::UserNotFound(_) | CommandError::NotOnLeaderboard => "User Not Found",
            CommandError::NoArtifacts => "No Artifacts",
            CommandError::IndexOutOfRange { .. } => "Invalid Artifact Index",
            CommandError::UnknownLanguage { .. } => "Invalid Language",
            CommandError::Ocr(_) => "OCR Failed",
            CommandError::Internal(_) => "Command Failed",
        }
    }
}
