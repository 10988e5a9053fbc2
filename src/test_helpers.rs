//! In-process stub servers for tests.

use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::ClientConfig;
use crate::net::api::ApiClient;

/// Serve `router` on an ephemeral local port and return its base URL.
pub(crate) async fn spawn_stub(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("stub listener should bind");
    let addr = listener.local_addr().expect("stub listener should have an address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stub server failed");
    });
    format!("http://{addr}")
}

/// Serve `router` and return a client pointed at it.
pub(crate) async fn stub_client(router: Router) -> ApiClient {
    let base_url = spawn_stub(router).await;
    ApiClient::new(&ClientConfig::new(base_url)).expect("client should build")
}

/// Base URL of a port nobody is listening on.
pub(crate) async fn dead_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("probe listener should bind");
    let addr = listener.local_addr().expect("probe listener should have an address");
    drop(listener);
    format!("http://{addr}")
}

/// Echo server that greets on connect and reports how each socket ended.
async fn echo_handler(State(closed): State<mpsc::UnboundedSender<&'static str>>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| echo_session(socket, closed))
}

async fn echo_session(mut socket: WebSocket, closed: mpsc::UnboundedSender<&'static str>) {
    let _ = socket.send(WsMessage::Text("welcome".into())).await;
    let ending = loop {
        match socket.recv().await {
            Some(Ok(WsMessage::Text(text))) => {
                let reply = format!("echo:{}", text.as_str());
                let _ = socket.send(WsMessage::Text(reply.into())).await;
            }
            Some(Ok(WsMessage::Close(_))) => break "close-frame",
            Some(Ok(_)) => {}
            Some(Err(_)) | None => break "dropped",
        }
    };
    let _ = closed.send(ending);
}

pub(crate) async fn spawn_echo_server() -> (String, mpsc::UnboundedReceiver<&'static str>) {
    let (closed_tx, closed_rx) = mpsc::unbounded_channel();
    let router = Router::new().route("/ws", get(echo_handler)).with_state(closed_tx);
    let base = spawn_stub(router).await;
    let url = format!("{}/ws", base.replacen("http://", "ws://", 1));
    (url, closed_rx)
}
