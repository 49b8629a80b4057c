//! `Transport` implementation over an axum WebSocket

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::{Mutex, Notify};
use tokio::time::timeout;
use tracing::debug;

use super::WS_CLOSE_TIMEOUT_MS;
use crate::hub::{Frame, Transport, TransportError};

/// Split WebSocket so the hub can write while the session task reads
pub struct WsTransport {
    sink: Mutex<SplitSink<WebSocket, Message>>,
    stream: Mutex<SplitStream<WebSocket>>,
    closed: AtomicBool,
    closed_notify: Notify,
}

impl WsTransport {
    pub fn new(socket: WebSocket) -> Self {
        let (sink, stream) = socket.split();
        Self {
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
            closed: AtomicBool::new(false),
            closed_notify: Notify::new(),
        }
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn send_text(&self, text: String) -> Result<(), TransportError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::Closed);
        }

        self.sink
            .lock()
            .await
            .send(Message::Text(text))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn receive_frame(&self) -> Result<Frame, TransportError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::Closed);
        }

        let mut stream = self.stream.lock().await;
        loop {
            let next = tokio::select! {
                next = stream.next() => next,
                _ = self.closed_notify.notified() => return Err(TransportError::Closed),
            };

            match next {
                Some(Ok(Message::Text(text))) => return Ok(Frame::Text(text)),
                Some(Ok(Message::Close(_))) | None => return Ok(Frame::Close),
                Some(Ok(Message::Ping(_))) => {
                    // Pong is handled automatically by axum
                    debug!("Page WebSocket ping received");
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(TransportError::Receive(e.to_string())),
            }
        }
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.closed_notify.notify_one();

        let mut sink = self.sink.lock().await;
        match timeout(Duration::from_millis(WS_CLOSE_TIMEOUT_MS), sink.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!("Page WebSocket close failed: {}", e),
            Err(_) => debug!("Page WebSocket close timed out"),
        }
    }
}
