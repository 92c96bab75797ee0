//! CRIT Value Leaderboard
//!
//! Command-line front end for the artifact leaderboard. Each invocation runs
//! one command as the given user against the configured data file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use cv_leaderboard::commands::{Command, Tracker};
use cv_leaderboard::config::BotConfig;
use cv_leaderboard::ocr::EasyOcrClient;
use cv_leaderboard::{log, paths};

#[derive(Parser)]
#[command(name = "cv-leaderboard", version, about = "Artifact CRIT Value leaderboard")]
struct Cli {
    /// Path to config.json (default: next to the executable, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Id of the player running the command
    #[arg(long, global = true, env = "CV_LEADERBOARD_USER", default_value = "local")]
    user: String,

    #[command(subcommand)]
    cmd: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Change your display name on the leaderboard (empty to reset).
    Name { new_name: String },

    /// Set your OCR language for artifact scanning.
    Language { language: String },

    /// Submit an artifact (CRIT Rate & CRIT DMG).
    Submit { crit_rate: f64, crit_dmg: f64 },

    /// Scan an artifact screenshot.
    #[command(alias = "sc")]
    Scan { image: PathBuf },

    /// List all artifacts for a user.
    List {
        /// Leaderboard name or username (default: yourself)
        user_identifier: Option<String>,
    },

    /// Remove a user or a specific artifact.
    Remove {
        /// Leaderboard name or username
        user_identifier: String,
        /// Index of the artifact to remove (1-based); omit to remove the whole user
        artifact_index: Option<usize>,
    },

    /// Modify an existing artifact.
    Modify {
        /// Leaderboard name or username
        user_identifier: String,
        /// Index of the artifact to modify (1-based)
        artifact_index: usize,
        crit_rate: f64,
        crit_dmg: f64,
    },

    /// Display the CRIT Value leaderboard.
    Leaderboard,

    /// Fill in missing usernames from the member list.
    Backfill,
}

impl CliCommand {
    fn into_command(self) -> Result<Command> {
        Ok(match self {
            CliCommand::Name { new_name } => Command::Name { new_name },
            CliCommand::Language { language } => Command::Language { code: language },
            CliCommand::Submit {
                crit_rate,
                crit_dmg,
            } => Command::Submit {
                crit_rate,
                crit_dmg,
            },
            CliCommand::Scan { image } => Command::Scan {
                image: std::fs::read(&image)
                    .context(format!("Failed to read image: {}", image.display()))?,
            },
            CliCommand::List { user_identifier } => Command::List {
                user: user_identifier,
            },
            CliCommand::Remove {
                user_identifier,
                artifact_index,
            } => Command::Remove {
                user: user_identifier,
                index: artifact_index,
            },
            CliCommand::Modify {
                user_identifier,
                artifact_index,
                crit_rate,
                crit_dmg,
            } => Command::Modify {
                user: user_identifier,
                index: artifact_index,
                crit_rate,
                crit_dmg,
            },
            CliCommand::Leaderboard => Command::Leaderboard,
            CliCommand::Backfill => Command::Backfill,
        })
    }
}

fn main() -> ExitCode {
    // Set up panic hook to log panics
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = panic_info
            .location()
            .map(|loc| format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_default();
        log(&format!("[PANIC]{} {}", location, msg));
    }));

    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log(&format!("Error: {:#}", e));
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Runs one command. Returns whether the command succeeded.
fn run() -> Result<bool> {
    let cli = Cli::parse();

    paths::ensure_directories()?;

    let config = BotConfig::load(cli.config.as_deref());
    let tracker = Tracker::open(&config)?;
    let ocr = EasyOcrClient::new(
        &config.ocr_api_url,
        Duration::from_secs(config.ocr_timeout_secs),
    )?;

    let command = cli.cmd.into_command()?;
    let reply = tracker.dispatch(&cli.user, command, &ocr);
    println!("{}", reply.text);
    Ok(reply.success)
}
