//! Consumption history: the ids of records already rendered.
//!
//! Stored as a JSON array of strings and rewritten in full after every
//! successful record. Reading is forgiving: a missing or corrupt file is an
//! empty history, since losing it only risks repeats.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::errors::CardgenError;
use crate::storage::write_json_atomic;

/// Ordered, duplicate-free set of used record ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistorySet {
    ids: Vec<String>,
    index: HashSet<String>,
}

impl HistorySet {
    pub fn from_ids<I: IntoIterator<Item = String>>(ids: I) -> Self {
        let mut set = HistorySet::default();
        for id in ids {
            set.insert(id);
        }
        set
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    /// Appends `id`; returns false if it was already present.
    pub fn insert(&mut self, id: String) -> bool {
        if self.index.contains(&id) {
            return false;
        }
        self.index.insert(id.clone());
        self.ids.push(id);
        true
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

/// The on-disk history file plus its in-memory copy. Single writer.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    set: HistorySet,
}

impl HistoryStore {
    /// Reads the history file at `path`.
    pub fn open(path: &Path) -> Self {
        let set = read_history(path);
        HistoryStore {
            path: path.to_path_buf(),
            set,
        }
    }

    pub fn set(&self) -> &HistorySet {
        &self.set
    }

    /// Adds `id` and rewrites the file. Already-present ids do not touch disk.
    pub fn record(&mut self, id: &str) -> Result<(), CardgenError> {
        if self.set.insert(id.to_string()) {
            write_json_atomic(&self.path, self.set.ids(), false)?;
        }
        Ok(())
    }

    /// Starts a new cycle: forgets every recorded id and rewrites the file empty.
    pub fn reset(&mut self) -> Result<(), CardgenError> {
        self.set = HistorySet::default();
        write_json_atomic(&self.path, self.set.ids(), false)
    }
}

fn read_history(path: &Path) -> HistorySet {
    if !path.exists() {
        return HistorySet::default();
    }
    let parsed = std::fs::read(path)
        .map_err(CardgenError::from)
        .and_then(|raw| serde_json::from_slice::<Vec<String>>(&raw).map_err(CardgenError::from));
    match parsed {
        Ok(ids) => HistorySet::from_ids(ids),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "History file unreadable; treating as empty");
            HistorySet::default()
        }
    }
}
