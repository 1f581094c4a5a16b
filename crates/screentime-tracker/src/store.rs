//! Persistence of session state across process restarts.
//!
//! The tracker saves after every state transition (start, break, reminder
//! shown or deferred) and removes the entry on logout. Ticks are not saved:
//! elapsed time is recomputed from `startedAt` on reload.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use screentime_core::{SessionKey, SessionState};

// ============================================================================
// Store Trait
// ============================================================================

/// Errors from a session store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("session store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Keyed storage for [`SessionState`].
///
/// Implementations are synchronous; the tracker calls them from its actor
/// task and only on state transitions.
pub trait SessionStore: Send + Sync {
    /// Returns the saved state, or `None` if nothing is stored for `key`.
    fn load(&self, key: &SessionKey) -> StoreResult<Option<SessionState>>;

    fn save(&self, key: &SessionKey, state: &SessionState) -> StoreResult<()>;

    /// Removes the entry. Removing a missing entry is not an error.
    fn remove(&self, key: &SessionKey) -> StoreResult<()>;
}

// ============================================================================
// File Store
// ============================================================================

/// On-disk record: the state plus enough context to inspect it by hand.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSession {
    key: SessionKey,
    saved_at: DateTime<Utc>,
    state: SessionState,
}

/// One pretty-printed JSON file per session key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// The directory is created lazily on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &SessionKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.file_stem()))
    }
}

impl SessionStore for FileStore {
    fn load(&self, key: &SessionKey) -> StoreResult<Option<SessionState>> {
        let path = self.path_for(key);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let persisted: PersistedSession = serde_json::from_str(&contents)?;
        if persisted.key != *key {
            warn!(
                path = %path.display(),
                key = %key,
                stored_key = %persisted.key,
                "Ignoring session state saved under another key"
            );
            return Ok(None);
        }
        debug!(path = %path.display(), key = %key, "Loaded session state");
        Ok(Some(persisted.state))
    }

    fn save(&self, key: &SessionKey, state: &SessionState) -> StoreResult<()> {
        fs::create_dir_all(&self.dir)?;

        let record = PersistedSession {
            key: key.clone(),
            saved_at: Utc::now(),
            state: state.clone(),
        };
        let json = serde_json::to_string_pretty(&record)?;

        // Write-then-rename so a crash never leaves a truncated file
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;

        debug!(path = %path.display(), key = %key, "Saved session state");
        Ok(())
    }

    fn remove(&self, key: &SessionKey) -> StoreResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// Memory Store
// ============================================================================

/// In-process store for `--ephemeral` runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<SessionKey, SessionState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SessionKey, SessionState>> {
        // A poisoned map is still a valid map
        self.sessions
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl SessionStore for MemoryStore {
    fn load(&self, key: &SessionKey) -> StoreResult<Option<SessionState>> {
        Ok(self.lock().get(key).cloned())
    }

    fn save(&self, key: &SessionKey, state: &SessionState) -> StoreResult<()> {
        self.lock().insert(key.clone(), state.clone());
        Ok(())
    }

    fn remove(&self, key: &SessionKey) -> StoreResult<()> {
        self.lock().remove(key);
        Ok(())
    }
}
