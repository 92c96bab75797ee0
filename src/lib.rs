//! CRIT Value leaderboard core.
//!
//! Tracks artifact submissions (CRIT Rate / CRIT DMG pairs), reads them out of
//! OCR transcripts of artifact screenshots, and ranks players by their best
//! CRIT Value.

pub mod artifact;
pub mod commands;
pub mod config;
pub mod leaderboard;
pub mod ocr;
pub mod paths;

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;

/// Logs a message to both stderr and the log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    eprint!("{}", line);
    let log_path = paths::get_logs_dir().join("cv_leaderboard.log");
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}
