use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::engine::error::{Result, StatsError};

/// The two named records kept by the persistence collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Preferences,
    Stats,
}

impl Partition {
    pub fn name(&self) -> &'static str {
        match self {
            Partition::Preferences => "char_stats_prefs",
            Partition::Stats => "char_stats_data",
        }
    }
}

/// Key-value storage for serialized partitions. Best-effort: callers log
/// failures and keep running on the in-memory state.
pub trait Persistence: Send {
    /// `Ok(None)` when the partition was never written.
    fn load(&self, partition: Partition) -> Result<Option<String>>;
    fn save(&self, partition: Partition, contents: &str) -> Result<()>;
}

/// One `<partition>.json` file per partition inside a directory.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, partition: Partition) -> PathBuf {
        self.dir.join(format!("{}.json", partition.name()))
    }
}

impl Persistence for JsonFileStore {
    fn load(&self, partition: Partition) -> Result<Option<String>> {
        let path = self.path(partition);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| StatsError::persistence(partition.name(), e))
    }

    fn save(&self, partition: Partition, contents: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| StatsError::persistence(partition.name(), e))?;
        fs::write(self.path(partition), contents)
            .map_err(|e| StatsError::persistence(partition.name(), e))
    }
}

/// In-memory store. Clones share the same data, so a caller can keep a
/// handle after moving one into the engine.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Default)]
struct MemoryInner {
    records: HashMap<Partition, String>,
    writes: HashMap<Partition, usize>,
    failing: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(partition: Partition, contents: &str) -> Self {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.lock() {
            inner.records.insert(partition, contents.to_string());
        }
        store
    }

    /// Makes every later load and save fail.
    pub fn set_failing(&self, failing: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failing = failing;
        }
    }

    pub fn get(&self, partition: Partition) -> Option<String> {
        self.inner.lock().ok()?.records.get(&partition).cloned()
    }

    pub fn writes(&self, partition: Partition) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.writes.get(&partition).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

impl Persistence for MemoryStore {
    fn load(&self, partition: Partition) -> Result<Option<String>> {
        let inner = self
            .inner
            .lock()
            .map_err(|e| StatsError::persistence(partition.name(), e))?;
        if inner.failing {
            return Err(StatsError::persistence(partition.name(), "storage unavailable"));
        }
        Ok(inner.records.get(&partition).cloned())
    }

    fn save(&self, partition: Partition, contents: &str) -> Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| StatsError::persistence(partition.name(), e))?;
        if inner.failing {
            return Err(StatsError::persistence(partition.name(), "storage unavailable"));
        }
        inner.records.insert(partition, contents.to_string());
        *inner.writes.entry(partition).or_insert(0) += 1;
        Ok(())
    }
}
