use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// Storage for the best score across sessions
pub trait BestScoreStore {
    /// Last persisted best score, 0 if none
    fn get(&self) -> u32;

    /// Persist a new best score. Writing the same or a larger value again is
    /// always safe.
    fn set(&mut self, value: u32);
}

/// In-memory store
///
/// Clones share the same value, so a test can keep a handle while the engine
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    best: Arc<AtomicU32>,
    writes: Arc<AtomicUsize>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_best(best: u32) -> Self {
        let store = Self::new();
        store.best.store(best, Ordering::Relaxed);
        store
    }

    /// Number of `set` calls seen so far
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }
}

impl BestScoreStore for MemoryScoreStore {
    fn get(&self) -> u32 {
        self.best.load(Ordering::Relaxed)
    }

    fn set(&mut self, value: u32) {
        self.best.store(value, Ordering::Relaxed);
        self.writes.fetch_add(1, Ordering::Relaxed);
    }
}

/// On-disk document
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct BestScoreRecord {
    best: u32,
}

/// Store backed by a small JSON file
#[derive(Debug, Clone)]
pub struct FileScoreStore {
    path: PathBuf,
    best: u32,
}

impl FileScoreStore {
    /// Open the store at `path`, reading the current value once
    ///
    /// A missing file means no best score yet. An unreadable or corrupt file
    /// is logged and treated the same way.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let best = match read_record(&path) {
            Ok(Some(record)) => record.best,
            Ok(None) => 0,
            Err(err) => {
                tracing::warn!("ignoring best score file {:?}: {:#}", path, err);
                0
            }
        };
        tracing::debug!(best, path = ?path, "loaded best score");

        Self { path, best }
    }
}

impl BestScoreStore for FileScoreStore {
    fn get(&self) -> u32 {
        self.best
    }

    fn set(&mut self, value: u32) {
        self.best = value;
        if let Err(err) = write_record(&self.path, BestScoreRecord { best: value }) {
            tracing::warn!("failed to persist best score {}: {:#}", value, err);
        }
    }
}

fn read_record(path: &Path) -> Result<Option<BestScoreRecord>> {
    if !path.exists() {
        return Ok(None);
    }

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read best score from {:?}", path))?;
    let record = serde_json::from_str(&json).context("Failed to parse best score")?;
    Ok(Some(record))
}

fn write_record(path: &Path, record: BestScoreRecord) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let json = serde_json::to_string(&record).context("Failed to serialize best score")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write best score to {:?}", path))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_shares_value() {
        let handle = MemoryScoreStore::with_best(30);
        let mut owned = handle.clone();

        assert_eq!(owned.get(), 30);
        owned.set(50);

        assert_eq!(handle.get(), 50);
        assert_eq!(handle.writes(), 1);
    }

    #[test]
    fn test_file_store_missing_file_is_zero() {
        let dir = TempDir::new().unwrap();
        let store = FileScoreStore::open(dir.path().join("best.json"));
        assert_eq!(store.get(), 0);
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("best.json");

        let mut store = FileScoreStore::open(&path);
        store.set(120);
        assert_eq!(store.get(), 120);
        assert!(path.exists());

        let reopened = FileScoreStore::open(&path);
        assert_eq!(reopened.get(), 120);
    }

    #[test]
    fn test_file_store_rewrite_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("best.json");

        let mut store = FileScoreStore::open(&path);
        store.set(40);
        store.set(40);

        assert_eq!(FileScoreStore::open(&path).get(), 40);
    }

    #[test]
    fn test_file_store_write_failure_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file.txt");
        std::fs::write(&blocker, "not a directory").unwrap();
        let path = blocker.join("best.json");

        let mut store = FileScoreStore::open(&path);
        store.set(50);

        assert_eq!(store.get(), 50);
        assert!(!path.exists());
    }

    #[test]
    fn test_file_store_corrupt_file_reads_as_zero() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("best.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileScoreStore::open(&path);
        assert_eq!(store.get(), 0);
    }
}
