//! Shared state container.
//!
//! Holds the current [`Snapshot`] of all four collections and is the
//! single serialization point for mutation: a transform runs to
//! completion under the container's lock before the next state is
//! installed, so readers never observe a torn update. Subscribers are
//! notified with the new snapshot after each successful update.

use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::models::Snapshot;

type Listener = Box<dyn Fn(&Snapshot) + Send + Sync + 'static>;

/// Shared, atomically updatable application state.
///
/// Cheaply cloneable; all clones observe the same state. Components
/// receive a clone explicitly instead of reaching for a global.
#[derive(Clone)]
pub struct StateContainer {
    inner: Arc<ContainerInner>,
}

struct ContainerInner {
    snapshot: Mutex<Snapshot>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener_id: AtomicU64,
}

impl StateContainer {
    /// Create a container holding `initial` as the current snapshot.
    #[must_use]
    pub fn new(initial: Snapshot) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                snapshot: Mutex::new(initial),
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(0),
            }),
        }
    }

    /// Return a clone of the current snapshot.
    ///
    /// The lock is held only for the clone; reads never wait on an
    /// in-flight remote call.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.inner
            .snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Atomically replace the snapshot with `transform(current)`.
    ///
    /// The transform receives the current snapshot by value and returns
    /// the next one; it runs to completion under the container's lock.
    /// Subscribers are notified with the new snapshot afterwards.
    pub fn update(&self, transform: impl FnOnce(Snapshot) -> Snapshot) {
        match self.try_update(|current| Ok::<_, Infallible>(transform(current))) {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }

    /// Like [`update`](Self::update), but the transform may fail.
    ///
    /// On `Err` the update is aborted: state is unchanged and no
    /// subscriber is notified.
    ///
    /// # Errors
    ///
    /// Returns whatever error the transform produced.
    pub fn try_update<E>(
        &self,
        transform: impl FnOnce(Snapshot) -> Result<Snapshot, E>,
    ) -> Result<(), E> {
        let updated = {
            let mut guard = self
                .inner
                .snapshot
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let next = transform(guard.clone())?;
            *guard = next.clone();
            next
        };
        self.notify(&updated);
        Ok(())
    }

    /// Register a listener invoked on every successful update.
    ///
    /// The listener stays registered until the returned handle's
    /// [`unsubscribe`](Subscription::unsubscribe) is called; merely
    /// dropping the handle keeps the subscription alive.
    pub fn subscribe(&self, listener: impl Fn(&Snapshot) + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Box::new(listener)));
        Subscription {
            container: Arc::downgrade(&self.inner),
            id,
        }
    }

    fn notify(&self, snapshot: &Snapshot) {
        let listeners = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for (_, listener) in listeners.iter() {
            listener(snapshot);
        }
    }
}

/// Handle to a registered listener.
pub struct Subscription {
    container: Weak<ContainerInner>,
    id: u64,
}

impl Subscription {
    /// Deregister the listener.
    pub fn unsubscribe(self) {
        if let Some(inner) = self.container.upgrade() {
            inner
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(id, _)| *id != self.id);
        }
    }
}
