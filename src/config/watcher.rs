//! Hot reload for the YAML configuration
//!
//! The containing directory is watched rather than the file itself: editors
//! that save through a temporary file and a rename replace the inode, and a
//! watch on the old inode would go quiet after the first save. Events are
//! filtered down to the config's file name, and a burst of them (write,
//! chmod, rename) collapses into a single reload after [`SETTLE_DELAY`].

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

use super::PrivacyConfig;

/// Time allowed for editors to finish writing before the file is re-read
const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Delivers a fresh [`PrivacyConfig`] every time the file settles after a change
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<PrivacyConfig>,
}

/// State shared by the notify callback thread
struct ReloadTrigger {
    config_path: PathBuf,
    file_name: OsString,
    /// Set while a reload is waiting out the settle delay
    scheduled: AtomicBool,
    tx: mpsc::Sender<PrivacyConfig>,
    runtime: Handle,
}

impl ReloadTrigger {
    fn on_event(self: &Arc<Self>, event: Event) {
        if !touches_file(&event, &self.file_name) {
            trace!(kind = ?event.kind, "Ignoring unrelated event");
            return;
        }
        debug!(kind = ?event.kind, "Config file changed: {:?}", event.paths);

        if self.scheduled.swap(true, Ordering::AcqRel) {
            return;
        }

        let trigger = Arc::clone(self);
        self.runtime.spawn(async move {
            tokio::time::sleep(SETTLE_DELAY).await;
            // Events arriving from here on schedule a new reload
            trigger.scheduled.store(false, Ordering::Release);

            match PrivacyConfig::load(&trigger.config_path).await {
                Ok(config) => {
                    info!("Configuration reloaded from {}", trigger.config_path.display());
                    if trigger.tx.send(config).await.is_err() {
                        debug!("Config receiver dropped, discarding reload");
                    }
                }
                Err(e) => warn!("Failed to reload config (keeping old config): {:#}", e),
            }
        });
    }
}

/// Whether `event` may have changed the contents behind `file_name`
///
/// Creates cover rename-into-place saves; all modify kinds (data, metadata,
/// rename) are accepted. Removals are not: the next create reloads.
fn touches_file(event: &Event, file_name: &OsStr) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event
            .paths
            .iter()
            .any(|path| path.file_name() == Some(file_name))
}

/// Directory to watch for `config_path` (a bare file name means the cwd)
fn watch_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

impl ConfigWatcher {
    /// Load `config_path` and start watching it
    ///
    /// Returns the watcher together with the initially loaded configuration.
    /// Must be called from within a Tokio runtime.
    pub async fn new(config_path: PathBuf) -> Result<(Self, PrivacyConfig)> {
        let initial_config = PrivacyConfig::load(&config_path)
            .await
            .context("Failed to load initial config")?;

        let file_name = config_path
            .file_name()
            .map(OsStr::to_os_string)
            .with_context(|| format!("Config path has no file name: {}", config_path.display()))?;
        let dir = watch_dir(&config_path);

        let (tx, rx) = mpsc::channel(10);
        let trigger = Arc::new(ReloadTrigger {
            config_path: config_path.clone(),
            file_name,
            scheduled: AtomicBool::new(false),
            tx,
            // notify callbacks run on their own OS thread, not in Tokio context
            runtime: Handle::current(),
        });

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => trigger.on_event(event),
            Err(e) => error!("Watch error: {}", e),
        })?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch config directory: {}", dir.display()))?;

        info!(
            "Watching {} for changes to {}",
            dir.display(),
            config_path.display()
        );

        Ok((Self { _watcher: watcher, rx }, initial_config))
    }

    /// Wait for the next reloaded configuration
    ///
    /// Returns None if the watcher has been closed.
    pub async fn next_config(&mut self) -> Option<PrivacyConfig> {
        self.rx.recv().await
    }
}
