//! In-memory implementation of [`RemoteStore`] for tests and development.
//!
//! Rows live in a map keyed by collection; upsert resolves against each
//! row's `id` member like the real store does. Reads and writes can be
//! failed per collection to exercise degraded paths.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::store::{Collection, RemoteStore, StoreError, TransportError};

/// A fake remote store holding rows in memory.
#[derive(Clone, Default)]
pub struct MemoryRemoteStore {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Default)]
struct MemoryInner {
    collections: HashMap<Collection, Vec<Value>>,
    failed_reads: HashSet<Collection>,
    failed_writes: HashSet<Collection>,
}

fn row_id(row: &Value) -> Option<i64> {
    row.get("id").and_then(Value::as_i64)
}

impl MemoryRemoteStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Preload `rows` as the full contents of `collection`.
    pub fn put(&self, collection: Collection, rows: Vec<Value>) {
        self.lock().collections.insert(collection, rows);
    }

    /// Current contents of `collection`.
    #[must_use]
    pub fn rows(&self, collection: Collection) -> Vec<Value> {
        self.lock()
            .collections
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Make every read of `collection` fail until cleared.
    pub fn fail_reads(&self, collection: Collection) {
        self.lock().failed_reads.insert(collection);
    }

    /// Make every write of `collection` fail until cleared.
    pub fn fail_writes(&self, collection: Collection) {
        self.lock().failed_writes.insert(collection);
    }

    /// Clear all injected faults.
    pub fn heal(&self) {
        let mut inner = self.lock();
        inner.failed_reads.clear();
        inner.failed_writes.clear();
    }
}

fn unavailable(collection: Collection) -> TransportError {
    TransportError::Unavailable(format!("{collection} is unavailable"))
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn fetch_all(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        let inner = self.lock();
        if inner.failed_reads.contains(&collection) {
            return Err(StoreError::Read {
                collection,
                source: unavailable(collection),
            });
        }
        Ok(inner
            .collections
            .get(&collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn insert(
        &self,
        collection: Collection,
        rows: Vec<Value>,
    ) -> Result<Vec<Value>, StoreError> {
        let mut inner = self.lock();
        if inner.failed_writes.contains(&collection) {
            return Err(StoreError::Write {
                collection,
                source: unavailable(collection),
            });
        }
        inner
            .collections
            .entry(collection)
            .or_default()
            .extend(rows.iter().cloned());
        Ok(rows)
    }

    async fn upsert(&self, collection: Collection, rows: Vec<Value>) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut inner = self.lock();
        if inner.failed_writes.contains(&collection) {
            return Err(StoreError::Write {
                collection,
                source: unavailable(collection),
            });
        }
        let stored = inner.collections.entry(collection).or_default();
        for row in rows {
            let key = row_id(&row);
            match stored.iter_mut().find(|existing| row_id(existing) == key) {
                Some(slot) => *slot = row,
                None => stored.push(row),
            }
        }
        Ok(())
    }
}
