//! Config file watcher for automatic reload.
//!
//! Watches the config file for changes and emits reload events on a tokio
//! channel. Uses debouncing to avoid multiple reloads during rapid saves from
//! editors.

use anyhow::{Context, Result};
use notify::{Config as NotifyConfig, Event, PollWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// Poll interval of the fallback backend.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Event indicating the config file has changed and needs reloading.
#[derive(Debug, Clone)]
pub struct ConfigReloadEvent {
    /// Path to the config file that changed.
    pub path: PathBuf,
}

/// Watches the config file for changes and sends reload events.
pub struct ConfigWatcher {
    /// The file system watcher (kept alive to maintain watching).
    _watcher: Box<dyn Watcher + Send>,
    event_receiver: UnboundedReceiver<ConfigReloadEvent>,
}

impl std::fmt::Debug for ConfigWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigWatcher").finish_non_exhaustive()
    }
}

/// Shared state captured by the notify callback.
#[derive(Clone)]
struct EventFilter {
    filename: OsString,
    canonical_path: PathBuf,
    debounce_delay: Duration,
    tx: UnboundedSender<ConfigReloadEvent>,
    last_event_time: Arc<Mutex<Option<Instant>>>,
}

impl EventFilter {
    fn handle(&self, result: notify::Result<Event>) {
        let Ok(event) = result else {
            return;
        };

        // Only modify and create events (create covers atomic saves)
        if !matches!(
            event.kind,
            notify::EventKind::Modify(_) | notify::EventKind::Create(_)
        ) {
            return;
        }

        let matches_config = event
            .paths
            .iter()
            .any(|p| p.file_name().is_some_and(|f| f == self.filename));
        if !matches_config {
            return;
        }

        if !self.debounce_elapsed(Instant::now()) {
            log::trace!("Debouncing config reload event");
            return;
        }

        let reload_event = ConfigReloadEvent {
            path: self.canonical_path.clone(),
        };
        log::info!("Config file changed: {}", reload_event.path.display());
        if let Err(e) = self.tx.send(reload_event) {
            log::error!("Failed to send config reload event: {}", e);
        }
    }

    /// Record `now` and return `true` unless the previous event was within
    /// the debounce window.
    fn debounce_elapsed(&self, now: Instant) -> bool {
        let mut last = self.last_event_time.lock();
        match *last {
            Some(last_time) if now.duration_since(last_time) < self.debounce_delay => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}

impl ConfigWatcher {
    /// Create a new config watcher.
    ///
    /// Uses the platform's native watcher when available and falls back to a
    /// `PollWatcher` (e.g. inside containers or on network filesystems).
    ///
    /// # Arguments
    /// * `config_path` - Path to the config file to watch.
    /// * `debounce_delay_ms` - Debounce delay in milliseconds to avoid rapid reloads.
    ///
    /// # Errors
    /// Returns an error if the config file doesn't exist or watching fails on both
    /// backends.
    pub fn new(config_path: &Path, debounce_delay_ms: u64) -> Result<Self> {
        if !config_path.exists() {
            anyhow::bail!("Config file not found: {}", config_path.display());
        }

        let canonical: PathBuf = config_path
            .canonicalize()
            .unwrap_or_else(|_| config_path.to_path_buf());

        let filename: OsString = canonical
            .file_name()
            .context("Config path has no filename")?
            .to_os_string();

        let parent_dir: PathBuf = canonical
            .parent()
            .context("Config path has no parent directory")?
            .to_path_buf();

        let (tx, rx) = unbounded_channel::<ConfigReloadEvent>();
        let filter = EventFilter {
            filename,
            canonical_path: canonical.clone(),
            debounce_delay: Duration::from_millis(debounce_delay_ms),
            tx,
            last_event_time: Arc::new(Mutex::new(None)),
        };

        let mut watcher = Self::create_watcher(filter)?;
        watcher
            .watch(&parent_dir, RecursiveMode::NonRecursive)
            .with_context(|| {
                format!("Failed to watch config directory: {}", parent_dir.display())
            })?;

        log::info!("Config hot reload: watching {}", canonical.display());

        Ok(Self {
            _watcher: watcher,
            event_receiver: rx,
        })
    }

    /// Try `RecommendedWatcher` first, then `PollWatcher`.
    fn create_watcher(filter: EventFilter) -> Result<Box<dyn Watcher + Send>> {
        let native_filter = filter.clone();
        match notify::recommended_watcher(move |res: notify::Result<Event>| {
            native_filter.handle(res)
        }) {
            Ok(w) => {
                log::debug!("Config watcher: using native (RecommendedWatcher) backend");
                Ok(Box::new(w))
            }
            Err(e) => {
                log::warn!(
                    "Config watcher: native backend unavailable ({}); falling back to PollWatcher",
                    e
                );
                let poll_watcher = PollWatcher::new(
                    move |res: notify::Result<Event>| filter.handle(res),
                    NotifyConfig::default().with_poll_interval(POLL_INTERVAL),
                )
                .context("Failed to create fallback PollWatcher")?;
                Ok(Box::new(poll_watcher))
            }
        }
    }

    /// Check for pending config reload events (non-blocking).
    pub fn try_recv(&mut self) -> Option<ConfigReloadEvent> {
        self.event_receiver.try_recv().ok()
    }

    /// Wait for the next reload event. Returns `None` once the watcher backend
    /// has shut down.
    pub async fn recv(&mut self) -> Option<ConfigReloadEvent> {
        self.event_receiver.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn filter(debounce_ms: u64) -> (EventFilter, UnboundedReceiver<ConfigReloadEvent>) {
        let (tx, rx) = unbounded_channel();
        (
            EventFilter {
                filename: OsString::from("config.json"),
                canonical_path: PathBuf::from("/etc/tilefont/config.json"),
                debounce_delay: Duration::from_millis(debounce_ms),
                tx,
                last_event_time: Arc::new(Mutex::new(None)),
            },
            rx,
        )
    }

    fn modify_event(path: &str) -> notify::Result<Event> {
        Ok(Event::new(notify::EventKind::Modify(notify::event::ModifyKind::Any))
            .add_path(PathBuf::from(path)))
    }

    #[test]
    fn test_watcher_creation_with_existing_file() {
        let temp_dir: TempDir = TempDir::new().expect("Failed to create temp dir");
        let config_path: PathBuf = temp_dir.path().join("config.json");
        fs::write(&config_path, "{}\n").expect("Failed to write config");

        let result = ConfigWatcher::new(&config_path, 100);
        assert!(
            result.is_ok(),
            "ConfigWatcher should succeed with existing file"
        );
    }

    #[test]
    fn test_watcher_creation_with_nonexistent_file() {
        let path = PathBuf::from("/tmp/nonexistent_tilefont_watcher_test/config.json");
        let result = ConfigWatcher::new(&path, 100);
        assert!(
            result.is_err(),
            "ConfigWatcher should fail with nonexistent file"
        );
    }

    #[test]
    fn test_no_initial_events() {
        let temp_dir: TempDir = TempDir::new().expect("Failed to create temp dir");
        let config_path: PathBuf = temp_dir.path().join("config.json");
        fs::write(&config_path, "{}\n").expect("Failed to write config");

        let mut watcher: ConfigWatcher =
            ConfigWatcher::new(&config_path, 100).expect("Failed to create watcher");

        assert!(
            watcher.try_recv().is_none(),
            "No events should be pending after creation"
        );
    }

    #[test]
    fn test_filter_ignores_other_files_and_kinds() {
        let (filter, mut rx) = filter(0);

        filter.handle(modify_event("/etc/tilefont/other.json"));
        filter.handle(Ok(Event::new(notify::EventKind::Remove(
            notify::event::RemoveKind::File,
        ))
        .add_path(PathBuf::from("/etc/tilefont/config.json"))));
        assert!(rx.try_recv().is_err());

        filter.handle(modify_event("/etc/tilefont/config.json"));
        let event = rx.try_recv().expect("reload event expected");
        assert_eq!(event.path, PathBuf::from("/etc/tilefont/config.json"));
    }

    #[test]
    fn test_filter_debounces_rapid_events() {
        let (filter, mut rx) = filter(60_000);

        filter.handle(modify_event("/etc/tilefont/config.json"));
        filter.handle(modify_event("/etc/tilefont/config.json"));

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err(), "second event should be debounced");
    }

    #[test]
    fn test_debug_impl() {
        let temp_dir: TempDir = TempDir::new().expect("Failed to create temp dir");
        let config_path: PathBuf = temp_dir.path().join("config.json");
        fs::write(&config_path, "{}\n").expect("Failed to write config");

        let watcher: ConfigWatcher =
            ConfigWatcher::new(&config_path, 100).expect("Failed to create watcher");

        let debug_str: String = format!("{:?}", watcher);
        assert!(
            debug_str.contains("ConfigWatcher"),
            "Debug output should contain struct name"
        );
    }
}
