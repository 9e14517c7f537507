//! Application path management
//!
//! - **Dev mode** (debug builds): `config.yaml` in the working directory wins.
//! - **Default**: `<config dir>/privacy-monitor/config.yaml`, where the config
//!   dir is `~/.config` on Linux (via `dirs::config_dir`).

use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory name under the platform config directory
const APP_NAME: &str = "privacy-monitor";

/// Application paths for config and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// Path to the configuration file
    pub config: PathBuf,
    /// Path to the logs directory
    pub logs_dir: PathBuf,
}

impl AppPaths {
    /// Detect the appropriate paths based on environment.
    ///
    /// Note: This is called before logging is initialized, so we use eprintln
    /// for early diagnostic output.
    pub fn detect() -> Self {
        #[cfg(debug_assertions)]
        {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            if cwd.join("config.yaml").exists() {
                eprintln!("[paths] Running in DEV mode (config.yaml found in cwd)");
                return Self::in_dir(&cwd);
            }
        }

        let base = dirs::config_dir()
            .unwrap_or_else(|| {
                eprintln!("[paths] WARNING: no config directory, falling back to cwd");
                PathBuf::from(".")
            })
            .join(APP_NAME);

        Self::in_dir(&base)
    }

    /// Paths rooted at a single directory
    pub fn in_dir(base: &Path) -> Self {
        Self {
            config: base.join("config.yaml"),
            logs_dir: base.join("logs"),
        }
    }

    /// Get the base directory (for displaying in logs)
    pub fn base_dir(&self) -> PathBuf {
        self.config
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Ensure the logs directory exists.
    ///
    /// The config file itself is optional and never created here.
    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        if !self.logs_dir.exists() {
            debug!("Creating logs directory: {}", self.logs_dir.display());
            std::fs::create_dir_all(&self.logs_dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_dir_layout() {
        let paths = AppPaths::in_dir(Path::new("test"));
        assert_eq!(paths.config, PathBuf::from("test/config.yaml"));
        assert_eq!(paths.logs_dir, PathBuf::from("test/logs"));
        assert_eq!(paths.base_dir(), PathBuf::from("test"));
    }

    #[test]
    fn test_ensure_directories_creates_logs_only() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::in_dir(&dir.path().join("app"));

        paths.ensure_directories().unwrap();
        assert!(paths.logs_dir.is_dir());
        assert!(!paths.config.exists());

        // Idempotent
        paths.ensure_directories().unwrap();
    }
}
