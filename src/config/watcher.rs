//! Hot reload of the configuration file.
//!
//! The parent directory is watched rather than the file itself: editors and
//! deploy tools usually replace a file by renaming a sibling over it, which a
//! watch on the old inode never sees. Events for other entries of the
//! directory are dropped.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::AppConfig;

/// Reloads one configuration file and forwards every valid version.
pub struct ConfigWatcher {
    path: PathBuf,
    file_name: Option<OsString>,
    updates: mpsc::UnboundedSender<AppConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end for reloaded configs.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<AppConfig>) {
        let (updates, rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            file_name: path.file_name().map(OsString::from),
            updates,
        };
        (watcher, rx)
    }

    /// Start watching. Updates stop when the returned handle is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let dir = watched_dir(&self.path).to_path_buf();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if self.concerns(&event) => self.reload(),
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, path = %self.path.display(), "Config watch error"),
            },
            Config::default(),
        )?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %path.display(), "Watching configuration");
        Ok(watcher)
    }

    fn concerns(&self, event: &Event) -> bool {
        (event.kind.is_modify() || event.kind.is_create())
            && event
                .paths
                .iter()
                .any(|p| p.file_name().map(OsString::from) == self.file_name)
    }

    fn reload(&self) {
        let config = match load_config(&self.path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, path = %self.path.display(), "Reload rejected, keeping current configuration");
                return;
            }
        };
        if self.updates.send(config).is_err() {
            tracing::warn!(path = %self.path.display(), "Reloaded configuration has no receiver");
        } else {
            tracing::info!(path = %self.path.display(), "Configuration reloaded");
        }
    }
}

fn watched_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}
