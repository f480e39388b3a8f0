// Copyright (c) Trestle Contributors
// SPDX-License-Identifier: Apache-2.0

//! Write-once cache for wrapped-token addresses.
//!
//! A wrapped deployment never moves once created, so entries carry no
//! expiry and the first write wins. Reads are served from a plain map
//! behind a sync lock so non-suspending call sites can use it too.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use trestle_types::chain::ChainId;

/// Keyed by `(K, destination chain)`; the resolver files registered tokens
/// under their registry key and unregistered ones under their on-chain
/// identity.
pub struct WrappedAddressCache<K> {
    entries: RwLock<HashMap<(K, ChainId), String>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl<K: Clone + Eq + Hash> WrappedAddressCache<K> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, token: &K, chain: ChainId) -> Option<String> {
        let entries = self.entries.read().unwrap();
        match entries.get(&(token.clone(), chain)) {
            Some(address) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(address.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// First write wins; later inserts for the same key are ignored.
    pub fn insert(&self, token: K, chain: ChainId, address: String) {
        let mut entries = self.entries.write().unwrap();
        entries.entry((token, chain)).or_insert(address);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
