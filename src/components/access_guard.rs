//! Gate that shows protected content only to an authenticated session.
//!
//! Two forms:
//! - [`render`] evaluates the gate once.
//! - [`AccessGuard`] stays mounted, follows the session, and swaps its output
//!   whenever the authenticated predicate flips.
//!
//! In both, protected children are built lazily: while the session is
//! unauthenticated they are never constructed, so nothing they start on
//! mount (fetches, sockets) runs early.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::state::session::{SessionStore, Subscription};

/// Evaluate the gate once: `children()` when authenticated, else `login()`.
/// Only the selected branch is evaluated.
pub fn render<V>(session: &SessionStore, login: impl FnOnce() -> V, children: impl FnOnce() -> V) -> V {
    if session.is_authenticated() { children() } else { login() }
}

/// What a mounted guard is currently showing.
#[derive(Debug)]
pub enum GuardView<V> {
    Login(V),
    Children(V),
}

impl<V> GuardView<V> {
    pub fn is_children(&self) -> bool {
        matches!(self, Self::Children(_))
    }

    pub fn get(&self) -> &V {
        match self {
            Self::Login(view) | Self::Children(view) => view,
        }
    }

    /// The protected children, if they are what is showing.
    pub fn children(&self) -> Option<&V> {
        match self {
            Self::Children(view) => Some(view),
            Self::Login(_) => None,
        }
    }
}

type Factory<V> = Box<dyn Fn() -> V + Send + Sync>;

struct GuardInner<V> {
    login: Factory<V>,
    children: Factory<V>,
    view: Mutex<Option<GuardView<V>>>,
}

impl<V> GuardInner<V> {
    fn view(&self) -> MutexGuard<'_, Option<GuardView<V>>> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bring the output in line with `authenticated`. A no-op unless the
    /// predicate differs from what is showing.
    fn reconcile(&self, authenticated: bool) {
        let mut view = self.view();
        if view.as_ref().is_some_and(|v| v.is_children() == authenticated) {
            return;
        }

        // Unmount the old output before mounting the new one.
        drop(view.take());
        tracing::debug!(authenticated, "access guard swapping view");
        *view = Some(if authenticated {
            GuardView::Children((self.children)())
        } else {
            GuardView::Login((self.login)())
        });
    }
}

/// A mounted access guard.
///
/// Holds a session subscription for its whole lifetime; dropping the guard
/// unsubscribes and unmounts whatever it is showing.
pub struct AccessGuard<V> {
    inner: Arc<GuardInner<V>>,
    _subscription: Subscription,
}

impl<V: Send + 'static> AccessGuard<V> {
    /// Mount the guard and build its initial output.
    ///
    /// The factories may read the session but must not call back into this
    /// guard.
    pub fn mount(
        session: &SessionStore,
        login: impl Fn() -> V + Send + Sync + 'static,
        children: impl Fn() -> V + Send + Sync + 'static,
    ) -> Self {
        let inner = Arc::new(GuardInner { login: Box::new(login), children: Box::new(children), view: Mutex::new(None) });

        let weak = Arc::downgrade(&inner);
        let subscription = session.subscribe(move |identity| {
            if let Some(inner) = weak.upgrade() {
                inner.reconcile(identity.is_some());
            }
        });
        inner.reconcile(session.is_authenticated());

        Self { inner, _subscription: subscription }
    }
}

impl<V> AccessGuard<V> {
    /// Inspect the current output.
    ///
    /// Do not mutate the session from inside `f`; the swap it triggers
    /// needs the lock `f` is holding.
    pub fn with_view<R>(&self, f: impl FnOnce(&GuardView<V>) -> R) -> Option<R> {
        self.inner.view().as_ref().map(f)
    }

    pub fn is_showing_children(&self) -> bool {
        self.with_view(GuardView::is_children).unwrap_or(false)
    }
}

impl<V> fmt::Debug for AccessGuard<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessGuard")
            .field("showing_children", &self.is_showing_children())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "access_guard_test.rs"]
mod tests;
