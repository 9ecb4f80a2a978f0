use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::AppResult;

use super::TokenStore;

/// On-disk layout of `session.json`.
#[derive(Serialize, Deserialize, Default)]
struct Snapshot {
    #[serde(default)]
    entries: HashMap<String, String>,
}

/// File-backed token store.
///
/// The map lives in memory behind a lock; every mutation rewrites `session.json`
/// through a temp file + rename so a crash never leaves a half-written snapshot.
#[derive(Clone)]
pub struct KvStore {
    dir: PathBuf,
    map: Arc<RwLock<HashMap<String, String>>>,
}

impl KvStore {
    pub fn snapshot_path_in(dir: &Path) -> PathBuf { dir.join("session.json") }

    fn snapshot_path(&self) -> PathBuf { Self::snapshot_path_in(&self.dir) }

    /// Open the store under `dir`. A missing snapshot opens empty; a corrupt one is
    /// logged and also opens empty (the next write replaces it).
    pub fn open(dir: impl Into<PathBuf>) -> AppResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        let path = Self::snapshot_path_in(&dir);
        let entries = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Snapshot>(&bytes) {
                Ok(s) => s.entries,
                Err(e) => {
                    warn!(path = %path.display(), "discarding unreadable session snapshot: {}", e);
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(dir = %dir.display(), keys = entries.len(), "session store opened");
        Ok(Self { dir, map: Arc::new(RwLock::new(entries)) })
    }

    pub fn dir(&self) -> &Path { &self.dir }

    pub fn len(&self) -> usize { self.map.read().len() }

    pub fn is_empty(&self) -> bool { self.map.read().is_empty() }

    // Caller holds the write lock so the file matches the map it is about to commit.
    fn persist(&self, entries: HashMap<String, String>) -> AppResult<HashMap<String, String>> {
        let snap = Snapshot { entries };
        let bytes = serde_json::to_vec_pretty(&snap)?;
        let tmp = self.snapshot_path().with_extension("json.tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, self.snapshot_path())?;
        debug!(keys = snap.entries.len(), "session snapshot written");
        Ok(snap.entries)
    }
}

impl TokenStore for KvStore {
    /// The in-memory value changes only once the snapshot is on disk.
    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut w = self.map.write();
        if w.get(key).map(|v| v == value).unwrap_or(false) {
            return Ok(());
        }
        let mut next = w.clone();
        next.insert(key.to_string(), value.to_string());
        *w = self.persist(next)?;
        Ok(())
    }

    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.map.read().get(key).cloned())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let mut w = self.map.write();
        if !w.contains_key(key) {
            return Ok(());
        }
        let mut next = w.clone();
        next.remove(key);
        *w = self.persist(next)?;
        Ok(())
    }
}
