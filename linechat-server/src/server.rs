/// Accept loop and shared state for the broadcast server
use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use anyhow::Result;
use tokio::net::TcpListener;

use crate::{connection, registry::Registry};

/// Owns the listener, the connection registry, and the id counter.
///
/// Construction is separate from [`run`](Server::run) so tests can bind
/// port 0 and read the ephemeral address back before driving traffic.
pub struct Server {
    listener: TcpListener,
    registry: Arc<Registry>,
    next_id: AtomicU64,
}

impl Server {
    pub fn new(listener: TcpListener) -> Self {
        Self {
            listener,
            registry: Arc::new(Registry::default()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until the listener fails.
    ///
    /// A listener-level error is fatal: without a working accept loop
    /// the server cannot make progress, so the error surfaces to the
    /// operator instead of being swallowed.
    pub async fn run(self) -> Result<()> {
        loop {
            let (stream, _addr) = self.listener.accept().await?;
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            tokio::spawn(connection::handle_connection(
                id,
                stream,
                Arc::clone(&self.registry),
            ));
        }
    }
}
