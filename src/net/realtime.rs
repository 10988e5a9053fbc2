//! Realtime text channel over WebSocket.
//!
//! A [`RealtimeChannel`] is a scoped resource: it is opened by the view that
//! consumes it and released when that view goes away. [`RealtimeChannel::close`]
//! sends a close frame and waits for the socket task; dropping the channel
//! without closing aborts the task, which drops the socket.
//!
//! There is no reconnect loop; a dropped connection ends the stream of
//! frames and [`RealtimeChannel::recv`] returns `None`.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    #[error("websocket connect failed: {0}")]
    Connect(Box<tokio_tungstenite::tungstenite::Error>),

    #[error("realtime channel closed")]
    Closed,
}

enum Command {
    Text(String),
    Close,
}

#[derive(Debug)]
pub struct RealtimeChannel {
    commands: mpsc::UnboundedSender<Command>,
    frames: mpsc::UnboundedReceiver<String>,
    task: Option<JoinHandle<()>>,
}

impl RealtimeChannel {
    /// Connect to `url` and start pumping frames.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::Connect`] if the handshake fails.
    pub async fn open(url: &str) -> Result<Self, RealtimeError> {
        let (socket, _) = connect_async(url)
            .await
            .map_err(|e| RealtimeError::Connect(Box::new(e)))?;
        tracing::info!(%url, "realtime channel opened");

        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (frames_tx, frames_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(pump(socket, commands_rx, frames_tx));

        Ok(Self { commands: commands_tx, frames: frames_rx, task: Some(task) })
    }

    /// Queue a text frame for sending.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::Closed`] once the socket task has stopped.
    pub fn send_text(&self, text: impl Into<String>) -> Result<(), RealtimeError> {
        self.commands
            .send(Command::Text(text.into()))
            .map_err(|_| RealtimeError::Closed)
    }

    /// Next text frame from the server; `None` once the connection ended.
    pub async fn recv(&mut self) -> Option<String> {
        self.frames.recv().await
    }

    /// Send a close frame and wait for the socket task to finish.
    pub async fn close(mut self) {
        let _ = self.commands.send(Command::Close);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        tracing::info!("realtime channel closed");
    }
}

impl Drop for RealtimeChannel {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn pump(
    socket: Socket,
    mut commands: mpsc::UnboundedReceiver<Command>,
    frames: mpsc::UnboundedSender<String>,
) {
    let (mut write, mut read) = socket.split();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Text(text)) => {
                    if write.send(Message::text(text)).await.is_err() {
                        break;
                    }
                }
                Some(Command::Close) | None => {
                    let _ = write.send(Message::Close(None)).await;
                    break;
                }
            },
            message = read.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    if frames.send(text.as_str().to_owned()).is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "realtime recv error");
                    break;
                }
            },
        }
    }
}

#[cfg(test)]
#[path = "realtime_test.rs"]
mod tests;
