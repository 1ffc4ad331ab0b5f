//! Key-value persistence for data that outlives a single game.
//!
//! Two records are stored: the achievement list (JSON array of ids) and the
//! reputation ledger (JSON object). Both loaders are total: a missing,
//! unreadable or corrupt value falls back to the default and is logged.
//! Both savers log failures and never propagate them, so the in-memory
//! state stays authoritative for the running session.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use market_trial_engine::domain::ReputationData;
use market_trial_engine::reputation::rank_for_points;

pub const ACHIEVEMENTS_KEY: &str = "gameAchievements";
pub const REPUTATION_KEY: &str = "gameReputation";

#[derive(Debug)]
pub enum StorageError {
    /// Keys are restricted to ASCII alphanumerics, `_` and `-`.
    InvalidKey(String),
    IoError(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::InvalidKey(key) => write!(f, "InvalidKey: {:?}", key),
            StorageError::IoError(msg) => write!(f, "IoError: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        StorageError::IoError(err.to_string())
    }
}

/// Abstract string store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Process-local store, mostly for tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One file per key under a data directory: `<dir>/<key>.json`.
///
/// Writes go to a temporary sibling which is fsynced and renamed over the
/// target, so a crash never leaves a half-written value behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// The directory is created lazily on first write.
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        let tmp = path.with_extension("json.tmp");
        {
            let mut file = File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Typed records
// ---------------------------------------------------------------------------

pub fn load_achievements(store: &dyn KeyValueStore) -> Vec<String> {
    let raw = match store.get(ACHIEVEMENTS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            log::error!("failed to read achievements: {}", e);
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<String>>(&raw) {
        Ok(mut ids) => {
            let mut seen = std::collections::BTreeSet::new();
            ids.retain(|id| seen.insert(id.clone()));
            ids
        }
        Err(e) => {
            log::error!("corrupt achievements record, starting empty: {}", e);
            Vec::new()
        }
    }
}

pub fn save_achievements(store: &mut dyn KeyValueStore, achievements: &[String]) {
    let result = serde_json::to_string(achievements)
        .map_err(|e| StorageError::IoError(e.to_string()))
        .and_then(|json| store.set(ACHIEVEMENTS_KEY, &json));
    if let Err(e) = result {
        log::error!("failed to save achievements: {}", e);
    }
}

/// Stored reputation. The rank is recomputed from points so a hand-edited
/// or stale record can never disagree with its own point total.
pub fn load_reputation(store: &dyn KeyValueStore) -> ReputationData {
    let raw = match store.get(REPUTATION_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return ReputationData::default(),
        Err(e) => {
            log::error!("failed to read reputation: {}", e);
            return ReputationData::default();
        }
    };
    match serde_json::from_str::<ReputationData>(&raw) {
        Ok(mut data) => {
            data.points = data.points.max(0);
            let rank = rank_for_points(data.points);
            if rank != data.rank {
                log::warn!("stored rank {:?} disagrees with {} points", data.rank, data.points);
                data.rank = rank;
            }
            data
        }
        Err(e) => {
            log::error!("corrupt reputation record, starting from zero: {}", e);
            ReputationData::default()
        }
    }
}

pub fn save_reputation(store: &mut dyn KeyValueStore, reputation: &ReputationData) {
    let result = serde_json::to_string(reputation)
        .map_err(|e| StorageError::IoError(e.to_string()))
        .and_then(|json| store.set(REPUTATION_KEY, &json));
    if let Err(e) = result {
        log::error!("failed to save reputation: {}", e);
    }
}
