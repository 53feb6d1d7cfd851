//! Application state shared across handlers.

use std::sync::Arc;

use crate::container::StateContainer;
use crate::models::Snapshot;
use crate::seed::SeedData;
use crate::services::users::UserDirectory;
use crate::store::RemoteStore;
use crate::sync::SyncCoordinator;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// state container and the sync coordinator. The container starts empty;
/// the first load installs the initial snapshot.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    container: StateContainer,
    sync: SyncCoordinator,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `store` - Remote collection store the coordinator syncs against
    /// * `seeds` - First-run seed payloads
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStore>, seeds: SeedData) -> Self {
        let container = StateContainer::new(Snapshot::default());
        let sync = SyncCoordinator::new(store, container.clone(), seeds);

        Self {
            inner: Arc::new(AppStateInner { container, sync }),
        }
    }

    /// Get a reference to the shared state container.
    #[must_use]
    pub fn container(&self) -> &StateContainer {
        &self.inner.container
    }

    /// Get a reference to the sync coordinator.
    #[must_use]
    pub fn sync(&self) -> &SyncCoordinator {
        &self.inner.sync
    }

    /// Build a user directory over the shared container.
    #[must_use]
    pub fn directory(&self) -> UserDirectory {
        UserDirectory::new(self.inner.container.clone())
    }
}
