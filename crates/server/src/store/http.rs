//! HTTP implementation of [`RemoteStore`].
//!
//! Speaks the PostgREST dialect: collections are REST resources under a
//! common base URL, selected with `?select=*`, written with `POST`, and
//! upserted by primary key via the `Prefer: resolution=merge-duplicates`
//! header. Authentication is an API key sent both as `apikey` and as a
//! bearer token.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::debug;

use crate::config::RemoteStoreConfig;
use crate::store::{Collection, RemoteStore, StoreError, TransportError};

/// Client for the remote collection store.
///
/// Cheaply cloneable; all clones share one HTTP connection pool.
#[derive(Clone)]
pub struct HttpRemoteStore {
    inner: Arc<HttpRemoteStoreInner>,
}

struct HttpRemoteStoreInner {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpRemoteStore {
    /// Create a new remote store client.
    #[must_use]
    pub fn new(config: &RemoteStoreConfig) -> Self {
        Self {
            inner: Arc::new(HttpRemoteStoreInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.trim_end_matches('/').to_owned(),
                api_key: config.api_key.expose_secret().to_owned(),
            }),
        }
    }

    fn collection_url(&self, collection: Collection) -> String {
        format!("{}/{}", self.inner.base_url, collection.as_str())
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.inner.api_key)
            .bearer_auth(&self.inner.api_key)
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn fetch_all(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        let read_error = |source: reqwest::Error| StoreError::Read {
            collection,
            source: TransportError::Http(source),
        };

        debug!(%collection, "fetching remote collection");
        let response = self
            .authed(self.inner.client.get(self.collection_url(collection)))
            .query(&[("select", "*")])
            .send()
            .await
            .map_err(read_error)?
            .error_for_status()
            .map_err(read_error)?;

        response.json().await.map_err(read_error)
    }

    async fn insert(
        &self,
        collection: Collection,
        rows: Vec<Value>,
    ) -> Result<Vec<Value>, StoreError> {
        let write_error = |source: reqwest::Error| StoreError::Write {
            collection,
            source: TransportError::Http(source),
        };

        debug!(%collection, rows = rows.len(), "inserting into remote collection");
        let response = self
            .authed(self.inner.client.post(self.collection_url(collection)))
            .header("Prefer", "return=representation")
            .json(&rows)
            .send()
            .await
            .map_err(write_error)?
            .error_for_status()
            .map_err(write_error)?;

        response.json().await.map_err(write_error)
    }

    async fn upsert(&self, collection: Collection, rows: Vec<Value>) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }

        let write_error = |source: reqwest::Error| StoreError::Write {
            collection,
            source: TransportError::Http(source),
        };

        debug!(%collection, rows = rows.len(), "upserting remote collection");
        self.authed(self.inner.client.post(self.collection_url(collection)))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&rows)
            .send()
            .await
            .map_err(write_error)?
            .error_for_status()
            .map_err(write_error)?;

        Ok(())
    }
}
