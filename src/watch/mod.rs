use anyhow::Result;
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

/// Events emitted by the config watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A watched config file was written, created or removed
    ConfigChanged(PathBuf),
}

/// A debounced watcher over the global and local config files
pub struct ConfigWatcher {
    _watcher: notify_debouncer_mini::Debouncer<RecommendedWatcher>,
}

/// True when `path` is one of the watched files
fn is_watched(path: &Path, files: &[PathBuf]) -> bool {
    files
        .iter()
        .any(|f| path == f || (path.file_name() == f.file_name() && path.parent() == f.parent()))
}

impl ConfigWatcher {
    /// Start watching `files`. Editors often replace a file instead of writing
    /// it in place, so the parent directories are watched and events are
    /// filtered back down to the file names.
    pub fn new(files: &[PathBuf], debounce_ms: u64, tx: mpsc::Sender<WatchEvent>) -> Result<Self> {
        let files: Vec<PathBuf> = files.iter().map(|f| absolute(f)).collect();
        let watched = files.clone();

        let mut debouncer = new_debouncer(
            Duration::from_millis(debounce_ms),
            move |result: std::result::Result<Vec<notify_debouncer_mini::DebouncedEvent>, notify::Error>| {
                match result {
                    Ok(events) => {
                        let changed: BTreeSet<PathBuf> = events
                            .into_iter()
                            .filter(|e| e.kind == DebouncedEventKind::Any)
                            .filter(|e| is_watched(&e.path, &watched))
                            .map(|e| e.path)
                            .collect();
                        for path in changed {
                            if tx.send(WatchEvent::ConfigChanged(path)).is_err() {
                                // receiver gone, the app is shutting down
                                return;
                            }
                        }
                    }
                    Err(e) => tracing::warn!("config watcher error: {e}"),
                }
            },
        )?;

        let dirs: BTreeSet<PathBuf> = files
            .iter()
            .filter_map(|f| f.parent().map(Path::to_path_buf))
            .filter(|d| d.is_dir())
            .collect();
        for dir in &dirs {
            debouncer.watcher().watch(dir, RecursiveMode::NonRecursive)?;
            tracing::debug!(dir = %dir.display(), "watching config directory");
        }

        Ok(ConfigWatcher {
            _watcher: debouncer,
        })
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
