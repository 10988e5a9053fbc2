use super::*;
use crate::net::types::{Identity, IdentityId};
use std::sync::atomic::{AtomicUsize, Ordering};

fn alice() -> Identity {
    Identity::new(IdentityId::from(1)).with_name("Alice")
}

fn bob() -> Identity {
    Identity::new(IdentityId::from(2)).with_name("Bob")
}

#[derive(Debug, PartialEq, Eq)]
enum Screen {
    Login,
    Protected(&'static str),
}

// =============================================================
// render
// =============================================================

#[test]
fn render_shows_login_without_evaluating_children() {
    let session = SessionStore::new();
    let children_built = AtomicUsize::new(0);

    let screen = render(
        &session,
        || Screen::Login,
        || {
            children_built.fetch_add(1, Ordering::SeqCst);
            Screen::Protected("dashboard")
        },
    );

    assert_eq!(screen, Screen::Login);
    assert_eq!(children_built.load(Ordering::SeqCst), 0);
}

#[test]
fn render_returns_children_unchanged_when_authenticated() {
    let session = SessionStore::new();
    session.set_identity(alice());
    let login_built = AtomicUsize::new(0);

    let children = vec![1, 2, 3];
    let rendered = render(
        &session,
        || {
            login_built.fetch_add(1, Ordering::SeqCst);
            Vec::new()
        },
        || children.clone(),
    );

    assert_eq!(rendered, children);
    assert_eq!(login_built.load(Ordering::SeqCst), 0);
}

#[test]
fn render_follows_clear() {
    let session = SessionStore::new();
    session.set_identity(alice());
    session.clear();

    assert_eq!(render(&session, || Screen::Login, || Screen::Protected("x")), Screen::Login);
}

// =============================================================
// AccessGuard
// =============================================================

fn counting_guard(session: &SessionStore) -> (AccessGuard<Screen>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let logins = Arc::new(AtomicUsize::new(0));
    let mounts = Arc::new(AtomicUsize::new(0));
    let login_count = Arc::clone(&logins);
    let mount_count = Arc::clone(&mounts);
    let guard = AccessGuard::mount(
        session,
        move || {
            login_count.fetch_add(1, Ordering::SeqCst);
            Screen::Login
        },
        move || {
            mount_count.fetch_add(1, Ordering::SeqCst);
            Screen::Protected("dashboard")
        },
    );
    (guard, logins, mounts)
}

#[test]
fn mounted_guard_starts_on_login_without_children() {
    let session = SessionStore::new();
    let (guard, logins, mounts) = counting_guard(&session);

    assert!(!guard.is_showing_children());
    assert_eq!(guard.with_view(|v| matches!(v.get(), Screen::Login)), Some(true));
    assert_eq!(logins.load(Ordering::SeqCst), 1);
    assert_eq!(mounts.load(Ordering::SeqCst), 0);
}

#[test]
fn mounted_guard_starts_on_children_when_already_authenticated() {
    let session = SessionStore::new();
    session.set_identity(alice());
    let (guard, logins, mounts) = counting_guard(&session);

    assert!(guard.is_showing_children());
    assert_eq!(logins.load(Ordering::SeqCst), 0);
    assert_eq!(mounts.load(Ordering::SeqCst), 1);
}

#[test]
fn swap_is_synchronous_with_session_change() {
    let session = SessionStore::new();
    let (guard, _, _) = counting_guard(&session);

    session.set_identity(alice());
    assert!(guard.is_showing_children(), "no stale frame after login");
    assert_eq!(guard.with_view(|v| v.children().map(|s| s == &Screen::Protected("dashboard"))), Some(Some(true)));

    session.clear();
    assert!(!guard.is_showing_children(), "no stale frame after logout");
}

#[test]
fn identity_change_without_predicate_change_keeps_children() {
    let session = SessionStore::new();
    let (_guard, logins, mounts) = counting_guard(&session);

    session.set_identity(alice());
    session.set_identity(bob());
    session.set_identity(alice());
    assert_eq!(mounts.load(Ordering::SeqCst), 1);

    session.clear();
    session.clear();
    assert_eq!(logins.load(Ordering::SeqCst), 2);
}

#[test]
fn dropping_guard_unsubscribes() {
    let session = SessionStore::new();
    let (guard, _, mounts) = counting_guard(&session);
    drop(guard);

    session.set_identity(alice());
    assert_eq!(mounts.load(Ordering::SeqCst), 0);
}

/// Records construction and teardown in one shared log.
struct Tracked {
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

impl Tracked {
    fn new(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Self {
        log.lock().expect("log mutex should lock").push(format!("mount:{name}"));
        Self { name, log: Arc::clone(log) }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.log.lock().expect("log mutex should lock").push(format!("unmount:{}", self.name));
    }
}

#[test]
fn previous_view_unmounts_before_next_mounts() {
    let session = SessionStore::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    let login_log = Arc::clone(&log);
    let children_log = Arc::clone(&log);
    let guard = AccessGuard::mount(
        &session,
        move || Tracked::new("login", &login_log),
        move || Tracked::new("dashboard", &children_log),
    );

    session.set_identity(alice());
    session.clear();
    drop(guard);

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "mount:login",
            "unmount:login",
            "mount:dashboard",
            "unmount:dashboard",
            "mount:login",
            "unmount:login",
        ]
    );
}

#[test]
fn children_may_read_session_while_mounting() {
    let session = SessionStore::new();
    let reader = session.clone();
    let guard = AccessGuard::mount(
        &session,
        || None,
        move || reader.identity().map(|i| i.display_name().to_owned()),
    );

    session.set_identity(alice());
    assert_eq!(guard.with_view(|v| v.get().clone()), Some(Some("Alice".to_owned())));
}
