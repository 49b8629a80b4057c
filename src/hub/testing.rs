//! Recording transport used by hub tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc, Notify};

use super::transport::{Frame, Transport, TransportError};

pub struct MockTransport {
    sent: Mutex<Vec<String>>,
    fail_sends: AtomicBool,
    hang_sends: AtomicBool,
    closed: AtomicBool,
    close_calls: AtomicUsize,
    closed_notify: Notify,
    inbound_tx: mpsc::UnboundedSender<Result<Frame, TransportError>>,
    inbound_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Result<Frame, TransportError>>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail_sends: AtomicBool::new(false),
            hang_sends: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            close_calls: AtomicUsize::new(0),
            closed_notify: Notify::new(),
            inbound_tx,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
        })
    }

    /// A transport whose every send fails
    pub fn failing() -> Arc<Self> {
        let t = Self::new();
        t.set_failing(true);
        t
    }

    /// A transport whose sends never complete
    pub fn hanging() -> Arc<Self> {
        let t = Self::new();
        t.hang_sends.store(true, Ordering::SeqCst);
        t
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_sends.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    pub fn clear_sent(&self) {
        self.sent.lock().clear();
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub fn push_text(&self, text: &str) {
        let _ = self.inbound_tx.send(Ok(Frame::Text(text.to_string())));
    }

    pub fn push_close(&self) {
        let _ = self.inbound_tx.send(Ok(Frame::Close));
    }

    pub fn push_error(&self) {
        let _ = self
            .inbound_tx
            .send(Err(TransportError::Receive("connection reset".to_string())));
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_text(&self, text: String) -> Result<(), TransportError> {
        if self.hang_sends.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::Send("broken pipe".to_string()));
        }
        self.sent.lock().push(text);
        Ok(())
    }

    async fn receive_frame(&self) -> Result<Frame, TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        let mut rx = self.inbound_rx.lock().await;
        tokio::select! {
            frame = rx.recv() => frame.unwrap_or(Ok(Frame::Close)),
            _ = self.closed_notify.notified() => Err(TransportError::Closed),
        }
    }

    async fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
        self.closed_notify.notify_one();
    }
}
