//! Remote collection store adapter.
//!
//! The durable side of the synchronization layer is an opaque remote
//! key-collection store: four named collections of JSON rows, each keyed
//! by a numeric `id` primary key, supporting select-all, insert, and
//! upsert-by-primary-key. [`HttpRemoteStore`] talks to the real thing
//! over its PostgREST-style REST dialect; [`MemoryRemoteStore`] backs
//! tests.
//!
//! Only the [`SyncCoordinator`](crate::sync::SyncCoordinator) calls this
//! layer.

pub mod http;
pub mod memory;

pub use http::HttpRemoteStore;
pub use memory::MemoryRemoteStore;

use core::fmt;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// The four remote collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Products,
    Users,
    Orders,
    Settings,
}

impl Collection {
    /// Remote collection name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Users => "users",
            Self::Orders => "orders",
            Self::Settings => "settings",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure talking to the remote store, split by direction.
///
/// The underlying transport detail is carried as a source; callers only
/// branch on read vs. write.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A select-all against the remote collection failed.
    #[error("remote read failed for {collection}: {source}")]
    Read {
        collection: Collection,
        #[source]
        source: TransportError,
    },

    /// An insert or upsert against the remote collection failed.
    #[error("remote write failed for {collection}: {source}")]
    Write {
        collection: Collection,
        #[source]
        source: TransportError,
    },
}

/// Transport-level cause of a [`StoreError`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection, status, or body read).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// A row could not be encoded or decoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The store reported itself unavailable.
    #[error("{0}")]
    Unavailable(String),
}

/// An opaque remote key-collection store.
///
/// Rows are JSON objects whose `id` member is the primary key. The store
/// itself decides per-row atomicity of a batch; implementations report
/// failure if the underlying call fails at all and never attempt a
/// manual rollback.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Return every row of `collection`.
    async fn fetch_all(&self, collection: Collection) -> Result<Vec<Value>, StoreError>;

    /// Insert `rows` and return the stored representation.
    async fn insert(&self, collection: Collection, rows: Vec<Value>)
    -> Result<Vec<Value>, StoreError>;

    /// Insert rows whose key is absent, replace rows whose key exists.
    ///
    /// Calling with zero rows is a no-op and must not touch the remote.
    async fn upsert(&self, collection: Collection, rows: Vec<Value>) -> Result<(), StoreError>;
}
