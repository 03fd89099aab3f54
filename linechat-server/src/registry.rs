/// Live connection registry shared by every connection handler
use std::collections::HashMap;

use tokio::sync::{mpsc, Mutex};
use tokio_util::bytes::Bytes;
use tracing::debug;

/// Unique for the lifetime of the server process, never reused
pub type ConnectionId = u64;

/// Handle to one registered connection's outbound queue.
///
/// Cloning is cheap. The sender feeds the connection's dedicated writer
/// task, so enqueueing a frame never blocks on the peer's socket and a
/// slow reader cannot stall delivery to anyone else.
#[derive(Clone, Debug)]
pub struct PeerHandle {
    id: ConnectionId,
    outbound: mpsc::UnboundedSender<Bytes>,
}

impl PeerHandle {
    pub fn new(id: ConnectionId, outbound: mpsc::UnboundedSender<Bytes>) -> Self {
        Self { id, outbound }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queues one encoded frame for delivery. Returns false when the
    /// peer's writer task is already gone.
    pub fn send(&self, frame: Bytes) -> bool {
        self.outbound.send(frame).is_ok()
    }
}

/// The server's only shared mutable state: connection id to live peer.
///
/// The mutex serializes add/remove against broadcast iteration.
/// Iteration snapshots the handles under the lock and applies the
/// callback outside it, so a peer removed mid-broadcast neither takes a
/// write-after-close nor aborts delivery to the remaining peers.
#[derive(Debug, Default)]
pub struct Registry {
    peers: Mutex<HashMap<ConnectionId, PeerHandle>>,
}

impl Registry {
    /// Inserts a connection whose id was assigned by the caller.
    pub async fn add(&self, peer: PeerHandle) {
        self.peers.lock().await.insert(peer.id(), peer);
    }

    /// Removes the connection if still present. Idempotent: the second
    /// removal in a double-disconnect race is a no-op.
    pub async fn remove(&self, id: ConnectionId) {
        self.peers.lock().await.remove(&id);
    }

    /// Applies `f` to every registered connection except `excluded`.
    ///
    /// Visit order is unspecified; every non-excluded peer is visited
    /// exactly once against the snapshot taken when the call started.
    pub async fn for_each_except<F>(&self, excluded: ConnectionId, f: F)
    where
        F: FnMut(&PeerHandle),
    {
        self.snapshot(Some(excluded)).await.iter().for_each(f);
    }

    /// Applies `f` to every registered connection, no exclusion.
    pub async fn for_each_all<F>(&self, f: F)
    where
        F: FnMut(&PeerHandle),
    {
        self.snapshot(None).await.iter().for_each(f);
    }

    /// Fan-out of one pre-encoded frame to everyone. Chat relays go
    /// through here: the sender hears its own message back.
    pub async fn broadcast_all(&self, frame: Bytes) {
        self.for_each_all(|peer| deliver(peer, &frame)).await;
    }

    /// Fan-out for join/leave notices, which skip the triggering id.
    pub async fn broadcast_except(&self, excluded: ConnectionId, frame: Bytes) {
        self.for_each_except(excluded, |peer| deliver(peer, &frame))
            .await;
    }

    async fn snapshot(&self, excluded: Option<ConnectionId>) -> Vec<PeerHandle> {
        self.peers
            .lock()
            .await
            .values()
            .filter(|peer| Some(peer.id) != excluded)
            .cloned()
            .collect()
    }
}

// A failed enqueue means the peer's writer already exited; its own
// handler will run the close path, so the broadcast just moves on.
fn deliver(peer: &PeerHandle, frame: &Bytes) {
    if !peer.send(frame.clone()) {
        debug!(id = peer.id(), "peer queue closed, skipping delivery");
    }
}
