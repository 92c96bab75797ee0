use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the directory containing the executable.
pub fn get_exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Returns the logs directory: `<exe_dir>/logs/`
pub fn get_logs_dir() -> PathBuf {
    get_exe_dir().join("logs")
}

/// Returns the per-user config directory: `<config_dir>/cv-leaderboard/`
pub fn get_user_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cv-leaderboard"))
}

/// Resolves a configured path. Relative paths are taken from the executable directory.
pub fn resolve(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        get_exe_dir().join(path)
    }
}

/// Ensures all output directories exist. Call at startup.
pub fn ensure_directories() -> std::io::Result<()> {
    std::fs::create_dir_all(get_logs_dir())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_keeps_absolute_paths() {
        let dir = tempfile::tempdir().unwrap();
        let absolute = dir.path().join("data.json");
        assert_eq!(resolve(&absolute), absolute);
    }

    #[test]
    fn test_resolve_relative_to_exe_dir() {
        let resolved = resolve(Path::new("data.json"));
        assert_eq!(resolved, get_exe_dir().join("data.json"));
    }
}
