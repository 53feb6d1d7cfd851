//! Synchronization between the state container and the remote store.
//!
//! [`SyncCoordinator`] is the only component that talks to the
//! [`RemoteStore`]: it pulls remote state into the
//! [`StateContainer`] on load (seeding empty collections on first run),
//! and pushes locally mutated collections back out on save. The load
//! path never fails - a remote read error degrades to the seed
//! defaults and is flagged to the caller. The save path is fail-fast
//! and surfaces the first write error verbatim.

use std::slice;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::container::StateContainer;
use crate::models::{Order, Product, Settings, Snapshot, User};
use crate::seed::SeedData;
use crate::store::{Collection, RemoteStore, StoreError, TransportError};

/// Result of a load: the installed snapshot, and whether it came from
/// the seed defaults because the remote store could not be read.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub snapshot: Snapshot,
    pub degraded: bool,
}

/// A partial-state write request: only the collections present are
/// touched, locally and remotely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SavePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<User>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orders: Option<Vec<Order>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
}

/// Orchestrates [`StateContainer`] ⇄ [`RemoteStore`].
#[derive(Clone)]
pub struct SyncCoordinator {
    store: Arc<dyn RemoteStore>,
    container: StateContainer,
    seeds: Arc<SeedData>,
}

impl SyncCoordinator {
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStore>, container: StateContainer, seeds: SeedData) -> Self {
        Self {
            store,
            container,
            seeds: Arc::new(seeds),
        }
    }

    /// Pull remote state and install it as the current snapshot.
    ///
    /// Run once at startup and again on every refresh request. Any
    /// remote read failure falls back to the all-default state; the
    /// caller sees `degraded = true` rather than an error.
    pub async fn load(&self) -> LoadOutcome {
        match self.refresh_remote().await {
            Ok(snapshot) => {
                info!(
                    products = snapshot.products.len(),
                    users = snapshot.users.len(),
                    orders = snapshot.orders.len(),
                    "remote state loaded"
                );
                self.install(snapshot.clone());
                LoadOutcome {
                    snapshot,
                    degraded: false,
                }
            }
            Err(err) => {
                warn!(error = %err, "remote load failed; serving seed defaults");
                let snapshot = self.seeds.default_snapshot();
                self.install(snapshot.clone());
                LoadOutcome {
                    snapshot,
                    degraded: true,
                }
            }
        }
    }

    /// Write the collections present in `payload`.
    ///
    /// The payload is merged into the local snapshot first, then each
    /// present collection is upserted remotely in a fixed order,
    /// aborting on the first failure. Local state is not rolled back
    /// when the remote write fails; the divergence is logged and the
    /// error surfaced to the caller.
    ///
    /// # Errors
    ///
    /// Returns the first [`StoreError::Write`] encountered.
    pub async fn save(&self, payload: SavePayload) -> Result<(), StoreError> {
        self.apply_local(&payload);

        let result = self.push_remote(&payload).await;
        if let Err(err) = &result {
            warn!(error = %err, "remote write failed; local state is ahead of the remote store");
        }
        result
    }

    /// Upsert the full local user collection to the remote store.
    ///
    /// Called after directory mutations so staff changes made through
    /// the user endpoints reach the durable store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if the upsert fails.
    pub async fn push_users(&self) -> Result<(), StoreError> {
        let users = self.container.snapshot().users;
        self.push_rows(Collection::Users, &users).await
    }

    fn install(&self, snapshot: Snapshot) {
        self.container.update(move |_| snapshot);
    }

    async fn refresh_remote(&self) -> Result<Snapshot, StoreError> {
        let products: Vec<Product> = self.fetch(Collection::Products).await?;
        let users: Vec<User> = self.fetch(Collection::Users).await?;
        let orders: Vec<Order> = self.fetch(Collection::Orders).await?;
        let settings: Option<Settings> = self.fetch(Collection::Settings).await?.into_iter().next();

        // First-run fallback: an empty collection is populated from its
        // seed payload, adopting whatever the store echoes back.
        let products = if products.is_empty() {
            self.seed_collection(Collection::Products, &self.seeds.products)
                .await
        } else {
            products
        };
        let users = if users.is_empty() {
            self.seed_collection(Collection::Users, &self.seeds.users)
                .await
        } else {
            users
        };
        let settings = match settings {
            Some(settings) => settings,
            None => self.seed_settings().await,
        };

        Ok(Snapshot {
            products,
            users,
            orders,
            settings,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>, StoreError> {
        let rows = self.store.fetch_all(collection).await?;
        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<_, _>>()
            .map_err(|err| StoreError::Read {
                collection,
                source: TransportError::Json(err),
            })
    }

    /// Write `seed` into the empty remote collection and adopt the
    /// result. A failed or empty-handed write is swallowed: the
    /// collection starts empty and the error is only logged.
    async fn seed_collection<T>(&self, collection: Collection, seed: &[T]) -> Vec<T>
    where
        T: Serialize + DeserializeOwned,
    {
        info!(%collection, "remote collection empty; writing first-run seed");
        let rows = match encode_rows(seed) {
            Ok(rows) => rows,
            Err(err) => {
                warn!(%collection, error = %err, "seed payload failed to encode");
                return Vec::new();
            }
        };

        match self.store.insert(collection, rows).await {
            Ok(returned) => returned
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<_, _>>()
                .unwrap_or_else(|err| {
                    warn!(%collection, error = %err, "seed write echoed malformed rows");
                    Vec::new()
                }),
            Err(err) => {
                warn!(%collection, error = %err, "seed write failed; starting with empty collection");
                Vec::new()
            }
        }
    }

    /// Settings variant of the seed fallback: when the write result is
    /// unusable the seed record itself is adopted, since a settings
    /// record must always exist.
    async fn seed_settings(&self) -> Settings {
        let seeded: Vec<Settings> = self
            .seed_collection(Collection::Settings, slice::from_ref(&self.seeds.settings))
            .await;
        seeded
            .into_iter()
            .next()
            .unwrap_or_else(|| self.seeds.settings.clone())
    }

    fn apply_local(&self, payload: &SavePayload) {
        self.container.update(|mut snapshot| {
            if let Some(products) = &payload.products {
                merge_rows(&mut snapshot.products, products.clone(), |p| p.id);
            }
            if let Some(users) = &payload.users {
                merge_rows(&mut snapshot.users, users.clone(), |u| u.id);
                snapshot.users.sort_by_key(|u| u.id);
            }
            if let Some(orders) = &payload.orders {
                merge_rows(&mut snapshot.orders, orders.clone(), |o| o.id);
            }
            if let Some(settings) = &payload.settings {
                snapshot.settings = settings.clone();
            }
            snapshot
        });
    }

    async fn push_remote(&self, payload: &SavePayload) -> Result<(), StoreError> {
        if let Some(products) = &payload.products {
            self.push_rows(Collection::Products, products).await?;
        }
        if let Some(users) = &payload.users {
            self.push_rows(Collection::Users, users).await?;
        }
        if let Some(orders) = &payload.orders {
            self.push_rows(Collection::Orders, orders).await?;
        }
        if let Some(settings) = &payload.settings {
            self.push_rows(Collection::Settings, slice::from_ref(settings))
                .await?;
        }
        Ok(())
    }

    async fn push_rows<T: Serialize>(
        &self,
        collection: Collection,
        rows: &[T],
    ) -> Result<(), StoreError> {
        let rows = encode_rows(rows).map_err(|err| StoreError::Write {
            collection,
            source: TransportError::Json(err),
        })?;
        self.store.upsert(collection, rows).await
    }
}

/// Upsert `incoming` into `existing` by primary key.
fn merge_rows<T, K: PartialEq>(existing: &mut Vec<T>, incoming: Vec<T>, key: impl Fn(&T) -> K) {
    for record in incoming {
        let id = key(&record);
        match existing.iter_mut().find(|row| key(row) == id) {
            Some(slot) => *slot = record,
            None => existing.push(record),
        }
    }
}

fn encode_rows<T: Serialize>(rows: &[T]) -> Result<Vec<Value>, serde_json::Error> {
    rows.iter().map(serde_json::to_value).collect()
}
