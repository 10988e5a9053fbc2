//! Process-wide session: who is logged in, if anyone.
//!
//! DESIGN
//! ======
//! The store holds exactly one piece of mutable state, the current
//! [`Identity`]. "Authenticated" is always derived from it and never stored
//! separately, so the two cannot disagree.
//!
//! Observers run synchronously, in registration order, before the mutating
//! call returns. The store releases its own locks before invoking them, so an
//! observer may read the store, subscribe, or drop a [`Subscription`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};

use crate::net::api::ApiError;
use crate::net::types::Identity;

type Observer = Arc<dyn Fn(Option<&Identity>) + Send + Sync>;

#[derive(Default)]
struct Inner {
    identity: RwLock<Option<Identity>>,
    observers: Mutex<Vec<(u64, Observer)>>,
    next_observer_id: AtomicU64,
}

impl Inner {
    fn observers(&self) -> MutexGuard<'_, Vec<(u64, Observer)>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shared handle to the session. Clones observe and mutate the same session.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("identity", &self.identity())
            .field("observers", &self.inner.observers().len())
            .finish()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current identity, if logged in.
    pub fn identity(&self) -> Option<Identity> {
        self.inner
            .identity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner
            .identity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Replace the current identity and notify observers.
    pub fn set_identity(&self, identity: Identity) {
        tracing::debug!(id = %identity.id, "session identity set");
        self.replace(Some(identity));
    }

    /// Forget the current identity and notify observers.
    pub fn clear(&self) {
        tracing::debug!("session cleared");
        self.replace(None);
    }

    /// Clear the session if `error` says the server no longer accepts it.
    /// Returns whether the session was cleared.
    pub fn clear_if_unauthorized(&self, error: &ApiError) -> bool {
        if error.is_unauthorized() && self.is_authenticated() {
            tracing::info!("session invalidated by 401 response");
            self.clear();
            return true;
        }
        false
    }

    /// Register `observer` to run after every mutation with the new identity.
    ///
    /// The observer stays registered until the returned [`Subscription`] is
    /// dropped.
    #[must_use = "dropping the subscription unregisters the observer"]
    pub fn subscribe(&self, observer: impl Fn(Option<&Identity>) + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_observer_id.fetch_add(1, Ordering::Relaxed);
        self.inner.observers().push((id, Arc::new(observer)));
        Subscription { store: Arc::downgrade(&self.inner), id }
    }

    fn replace(&self, identity: Option<Identity>) {
        let snapshot = {
            let mut current = self
                .inner
                .identity
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *current = identity;
            current.clone()
        };

        // Snapshot so observers can (un)subscribe without deadlocking.
        let observers: Vec<Observer> = self
            .inner
            .observers()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in observers {
            observer(snapshot.as_ref());
        }
    }
}

/// Keeps an observer registered; unregisters it on drop.
pub struct Subscription {
    store: Weak<Inner>,
    id: u64,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish_non_exhaustive()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            inner.observers().retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
