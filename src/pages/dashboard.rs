//! Dashboard page listing rooms, with a realtime feed scoped to its lifetime.
//!
//! LIFECYCLE
//! =========
//! [`Dashboard::mount`] starts two tasks: the room fetch and, when an address
//! is configured, the realtime channel. Both belong to the dashboard.
//! [`Dashboard::unmount`] closes the channel gracefully; plain drop (e.g. the
//! access guard swapping to the login view) aborts both tasks, which still
//! releases the socket.

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::net::api::ApiClient;
use crate::net::realtime::RealtimeChannel;
use crate::net::rooms;
use crate::net::types::Identity;
use crate::state::rooms::RoomsState;
use crate::state::session::SessionStore;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RealtimeStatus {
    /// No realtime address configured.
    #[default]
    Disabled,
    Connecting,
    Open,
    Closed,
    Failed(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashboardState {
    /// Who the dashboard greets; captured at mount.
    pub identity: Option<Identity>,
    pub rooms: RoomsState,
    /// Text frames received on the realtime channel, oldest first.
    pub messages: Vec<String>,
    pub realtime: RealtimeStatus,
}

struct RealtimeTask {
    shutdown: oneshot::Sender<()>,
    outgoing: mpsc::UnboundedSender<String>,
    handle: JoinHandle<()>,
}

pub struct Dashboard {
    api: ApiClient,
    session: SessionStore,
    state: watch::Sender<DashboardState>,
    fetch: Option<JoinHandle<()>>,
    realtime: Option<RealtimeTask>,
}

impl Dashboard {
    /// Mount the dashboard: start loading rooms and open the realtime
    /// channel if `realtime_url` is set. Must be called inside a Tokio runtime.
    pub fn mount(api: ApiClient, session: SessionStore, realtime_url: Option<String>) -> Self {
        let initial = DashboardState {
            identity: session.identity(),
            realtime: if realtime_url.is_some() { RealtimeStatus::Connecting } else { RealtimeStatus::Disabled },
            ..DashboardState::default()
        };
        let (state, _) = watch::channel(initial);

        let realtime = realtime_url.map(|url| {
            let (shutdown, shutdown_rx) = oneshot::channel();
            let (outgoing, outgoing_rx) = mpsc::unbounded_channel();
            let handle = tokio::spawn(run_realtime(url, state.clone(), outgoing_rx, shutdown_rx));
            RealtimeTask { shutdown, outgoing, handle }
        });

        let mut dashboard = Self { api, session, state, fetch: None, realtime };
        dashboard.refresh();
        tracing::debug!("dashboard mounted");
        dashboard
    }

    /// Refetch the room list, replacing any fetch still in flight.
    pub fn refresh(&mut self) {
        if let Some(previous) = self.fetch.take() {
            previous.abort();
        }
        self.state.send_modify(|s| s.rooms.begin_load());
        self.fetch = Some(tokio::spawn(load_rooms(self.api.clone(), self.session.clone(), self.state.clone())));
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    /// Receiver that wakes on every state change.
    pub fn watch(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    /// Queue a text frame on the realtime channel; frames queued while it is
    /// still connecting go out once it opens. Returns `false` when realtime
    /// is disabled or the channel has ended.
    pub fn send_message(&self, text: impl Into<String>) -> bool {
        self.realtime
            .as_ref()
            .is_some_and(|realtime| realtime.outgoing.send(text.into()).is_ok())
    }

    /// End the session. A guard mounted on the same store unmounts this
    /// dashboard in response.
    pub fn logout(&self) {
        tracing::info!("logging out");
        self.session.clear();
    }

    /// Tear down gracefully: stop the fetch and close the realtime channel.
    pub async fn unmount(mut self) {
        if let Some(fetch) = self.fetch.take() {
            fetch.abort();
        }
        if let Some(RealtimeTask { shutdown, handle, .. }) = self.realtime.take() {
            let _ = shutdown.send(());
            let _ = handle.await;
        }
        tracing::debug!("dashboard unmounted");
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        if let Some(fetch) = self.fetch.take() {
            fetch.abort();
        }
        if let Some(realtime) = self.realtime.take() {
            realtime.handle.abort();
        }
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

async fn load_rooms(api: ApiClient, session: SessionStore, state: watch::Sender<DashboardState>) {
    match rooms::list(&api).await {
        Ok(items) => {
            tracing::debug!(count = items.len(), "rooms loaded");
            state.send_modify(|s| s.rooms.finish_load(items));
        }
        Err(err) => {
            tracing::warn!(error = %err, "room fetch failed");
            state.send_modify(|s| s.rooms.fail_load(err.to_string()));
            session.clear_if_unauthorized(&err);
        }
    }
}

async fn run_realtime(
    url: String,
    state: watch::Sender<DashboardState>,
    mut outgoing: mpsc::UnboundedReceiver<String>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut channel = tokio::select! {
        opened = RealtimeChannel::open(&url) => match opened {
            Ok(channel) => channel,
            Err(err) => {
                tracing::warn!(error = %err, "realtime channel unavailable");
                state.send_modify(|s| s.realtime = RealtimeStatus::Failed(err.to_string()));
                return;
            }
        },
        _ = &mut shutdown => return,
    };
    state.send_modify(|s| s.realtime = RealtimeStatus::Open);

    loop {
        tokio::select! {
            frame = channel.recv() => match frame {
                Some(text) => state.send_modify(|s| s.messages.push(text)),
                None => break,
            },
            Some(text) = outgoing.recv() => {
                if channel.send_text(text).is_err() {
                    break;
                }
            }
            _ = &mut shutdown => {
                channel.close().await;
                state.send_modify(|s| s.realtime = RealtimeStatus::Closed);
                return;
            }
        }
    }
    state.send_modify(|s| s.realtime = RealtimeStatus::Closed);
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
