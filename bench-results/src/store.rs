//! JSON-backed results store keyed by experiment identifier
//!
//! The whole store lives in a single JSON object:
//! ```json
//! {
//!     "node1_plain": {
//!         "ops_time": 1.2,
//!         "total_time": 9.8,
//!         "final_memory_usage": 143.5,
//!         "memory_usage_over_time": [[0.0, 80.1], [0.5, 143.5]]
//!     }
//! }
//! ```

use crate::error::Result;
use crate::model::ExperimentResult;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// Mapping from experiment key to its result, iterated in ascending key order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultsStore {
    experiments: BTreeMap<String, ExperimentResult>,
}

impl ResultsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a store file
    ///
    /// # Errors
    /// Returns error if the file cannot be read, is not valid JSON, or an entry
    /// is missing one of the expected fields.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Parse a store file, or start empty if it does not exist yet
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match fs::read_to_string(path.as_ref()) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.as_ref().display(), "results file absent, starting empty");
                Ok(Self::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load and merge several store files in order
    ///
    /// Files that do not exist are skipped with a warning. When a key appears
    /// in more than one file, the entry from the later file wins.
    pub fn load_merged<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut merged = Self::new();
        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                warn!(path = %path.display(), "results file not found, skipping");
                continue;
            }
            merged.merge(Self::load(path)?);
        }
        Ok(merged)
    }

    /// Write the whole store, creating parent directories as needed
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;

        fs::write(path, buf)?;
        Ok(())
    }

    /// Record one experiment in the store file at `path`.
    ///
    /// Loads the current file (or starts empty), inserts or overwrites `key`
    /// and rewrites the whole file.
    ///
    /// The file is not locked. Two processes running this concurrently on the
    /// same path can lose an update: whichever finishes writing last wins and
    /// the other entry is silently dropped.
    pub fn upsert_file<P: AsRef<Path>>(
        path: P,
        key: impl Into<String>,
        result: ExperimentResult,
    ) -> Result<Self> {
        let path = path.as_ref();
        let mut store = Self::load_or_default(path)?;
        store.insert(key, result);
        store.save(path)?;
        Ok(store)
    }

    /// Insert or overwrite an entry, returning the previous one
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        result: ExperimentResult,
    ) -> Option<ExperimentResult> {
        self.experiments.insert(key.into(), result)
    }

    /// Merge `other` into `self`; entries in `other` overwrite existing keys
    pub fn merge(&mut self, other: ResultsStore) {
        self.experiments.extend(other.experiments);
    }

    pub fn get(&self, key: &str) -> Option<&ExperimentResult> {
        self.experiments.get(key)
    }

    /// Experiment keys in ascending lexicographic order
    pub fn keys(&self) -> Vec<String> {
        self.experiments.keys().cloned().collect()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ExperimentResult> {
        self.experiments.iter()
    }

    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }
}
