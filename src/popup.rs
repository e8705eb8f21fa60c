// When to show the payment popup.
// The card only reports "revealed"; this decides when the popup appears and
// remembers for the rest of the session that it was open.

use crate::error::Error;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub const POPUP_KEY: &str = "popupOpen";
pub const DEFAULT_POPUP_DELAY: Duration = Duration::from_millis(5000);

/// Session-scoped key/value storage, injected by the host.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// Lives as long as the process does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// `<tmp>/scratch-pay/session.json`
pub fn default_session_path() -> PathBuf {
    std::env::temp_dir().join("scratch-pay").join("session.json")
}

/// A JSON object on disk, rewritten on every change, so a restarted window
/// sees what the previous one left behind.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStore {
    /// Missing or unreadable files start an empty session.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        let entries = if content.trim().is_empty() {
            HashMap::new()
        } else {
            serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), "ignoring corrupt session file: {e}");
                HashMap::new()
            })
        };
        Self { path, entries }
    }

    fn save(&self) -> Result<(), Error> {
        let err = |reason: String| Error::Session { path: self.path.display().to_string(), reason };
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| err(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(&self.entries).map_err(|e| err(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| err(e.to_string()))
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            warn!("{e}");
        }
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist();
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.persist();
        }
    }
}

pub struct PopupCoordinator<S: SessionStore> {
    store: S,
    delay: Duration,
    reveal_seen: bool,
    revealed_at: Option<Instant>,
    visible: bool,
}

impl<S: SessionStore> PopupCoordinator<S> {
    /// Restores an open popup left over from earlier in the session.
    pub fn new(store: S, delay: Duration) -> Self {
        let visible = store.get(POPUP_KEY).as_deref() == Some("1");
        if visible {
            info!("restoring payment popup from session");
        }
        Self { store, delay, reveal_seen: false, revealed_at: None, visible }
    }

    /// The card was revealed at `now`. Only the first call starts the delay,
    /// so a closed popup does not come back.
    pub fn on_revealed(&mut self, now: Instant) {
        if self.reveal_seen {
            return;
        }
        self.reveal_seen = true;
        self.revealed_at = Some(now);
    }

    /// Advance the clock. Returns whether the popup is visible.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.visible {
            if let Some(at) = self.revealed_at {
                if now.duration_since(at) >= self.delay {
                    self.visible = true;
                    self.revealed_at = None;
                    self.store.set(POPUP_KEY, "1");
                    info!("payment popup shown");
                }
            }
        }
        self.visible
    }

    pub fn close(&mut self) {
        self.visible = false;
        self.revealed_at = None;
        self.store.remove(POPUP_KEY);
        info!("payment popup closed");
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
