//! In-process paired device link.
//!
//! Stands in for the device-to-display transport: two endpoints joined by
//! crossed bounded channels, each usable from its own thread. Payloads cross
//! as serialized JSON, so everything observable by a peer goes through the
//! same wire contract as a real transport.

use crate::payload::MetricPayload;
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default per-direction queue depth.
pub const DEFAULT_CAPACITY: usize = 64;

/// Errors surfaced by link endpoints.
#[derive(Debug)]
pub enum LinkError {
    /// The peer endpoint has been dropped.
    Disconnected,
    /// No payload arrived within the wait.
    Timeout,
    /// The outgoing queue is full; the payload was not queued.
    Busy,
    /// A received payload could not be parsed.
    Malformed(serde_json::Error),
}

impl std::fmt::Display for LinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkError::Disconnected => write!(f, "link peer disconnected"),
            LinkError::Timeout => write!(f, "timed out waiting for payload"),
            LinkError::Busy => write!(f, "link queue full"),
            LinkError::Malformed(e) => write!(f, "malformed payload: {e}"),
        }
    }
}

impl std::error::Error for LinkError {}

impl From<serde_json::Error> for LinkError {
    fn from(e: serde_json::Error) -> Self {
        LinkError::Malformed(e)
    }
}

/// One endpoint of a paired link.
///
/// Reachability mirrors endpoint lifetime: once a peer is dropped the
/// surviving endpoint reports unreachable and its sends fail, but payloads
/// queued before the drop can still be received.
pub struct PairedLink {
    tx: Sender<String>,
    rx: Receiver<String>,
    self_alive: Arc<AtomicBool>,
    peer_alive: Arc<AtomicBool>,
}

impl PairedLink {
    /// Create a connected endpoint pair with the default queue depth.
    pub fn pair() -> (PairedLink, PairedLink) {
        Self::pair_with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a connected endpoint pair with the given per-direction depth.
    pub fn pair_with_capacity(capacity: usize) -> (PairedLink, PairedLink) {
        let (a_tx, b_rx) = bounded(capacity);
        let (b_tx, a_rx) = bounded(capacity);
        let a_alive = Arc::new(AtomicBool::new(true));
        let b_alive = Arc::new(AtomicBool::new(true));

        let a = PairedLink {
            tx: a_tx,
            rx: a_rx,
            self_alive: a_alive.clone(),
            peer_alive: b_alive.clone(),
        };
        let b = PairedLink {
            tx: b_tx,
            rx: b_rx,
            self_alive: b_alive,
            peer_alive: a_alive,
        };
        (a, b)
    }

    /// Whether the peer endpoint is still alive.
    pub fn is_reachable(&self) -> bool {
        self.peer_alive.load(Ordering::SeqCst)
    }

    /// Queue a payload for the peer without blocking.
    pub fn send(&self, payload: &MetricPayload) -> Result<(), LinkError> {
        let json = serde_json::to_string(payload)?;
        match self.tx.try_send(json) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(LinkError::Busy),
            Err(TrySendError::Disconnected(_)) => Err(LinkError::Disconnected),
        }
    }

    /// Wait up to `timeout` for the next payload from the peer.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<MetricPayload, LinkError> {
        match self.rx.recv_timeout(timeout) {
            Ok(json) => Ok(MetricPayload::from_json(&json)?),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => Err(LinkError::Timeout),
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => Err(LinkError::Disconnected),
        }
    }

    /// Take the next payload if one is already queued.
    pub fn try_recv(&self) -> Result<Option<MetricPayload>, LinkError> {
        match self.rx.try_recv() {
            Ok(json) => Ok(Some(MetricPayload::from_json(&json)?)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(LinkError::Disconnected),
        }
    }
}

impl Drop for PairedLink {
    fn drop(&mut self) {
        self.self_alive.store(false, Ordering::SeqCst);
    }
}
