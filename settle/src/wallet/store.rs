// Copyright (c) Trestle Contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::RwLock;

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum MarkerStoreError {
    #[error("marker file io: {0}")]
    Io(#[from] std::io::Error),
    #[error("marker file malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Durable wallet restore hints. Values are provider names. The store is
/// advisory: a lost or stale marker only skips a silent reconnect.
pub trait MarkerStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

#[derive(Default)]
pub struct MemoryMarkerStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryMarkerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MarkerStore for MemoryMarkerStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.write().unwrap().remove(key);
    }
}

/// Markers in a single JSON document, rewritten whole on each mutation.
/// Write failures are logged and swallowed; the hint is not worth failing a
/// connect over.
pub struct FileMarkerStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileMarkerStore {
    /// Open the store, loading existing markers. A missing file starts
    /// empty; a malformed one is discarded with a warning.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, MarkerStoreError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(
                    "[MarkerStore] Ignoring malformed marker file: path={}, error={}",
                    path.display(),
                    e
                );
                HashMap::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(MarkerStoreError::Io(e)),
        };
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    fn persist(&self, entries: &HashMap<String, String>) {
        let result = serde_json::to_string_pretty(entries)
            .map_err(MarkerStoreError::from)
            .and_then(|content| fs::write(&self.path, content).map_err(MarkerStoreError::from));
        if let Err(e) = result {
            warn!(
                "[MarkerStore] Failed to persist markers: path={}, error={}",
                self.path.display(),
                e
            );
        }
    }
}

impl MarkerStore for FileMarkerStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.write().unwrap();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.write().unwrap();
        if entries.remove(key).is_some() {
            self.persist(&entries);
        }
    }
}
