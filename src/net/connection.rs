//! Per-connection identity and in-flight cycle accounting.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::observability::metrics;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique id, shown as `conn-N` in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Counts cycles that are still running so shutdown can wait for them.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    in_flight: Arc<AtomicU64>,
    accepted: Arc<AtomicU64>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly accepted client. The cycle counts as in flight until
    /// the returned guard is dropped.
    pub fn track(&self, peer_addr: SocketAddr) -> ConnectionGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.accepted.fetch_add(1, Ordering::Relaxed);
        metrics::connection_opened();

        ConnectionGuard {
            in_flight: Arc::clone(&self.in_flight),
            id: ConnectionId::next(),
            peer_addr,
            opened_at: Instant::now(),
        }
    }

    pub fn active_count(&self) -> u64 {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Clients accepted since the tracker was created.
    pub fn accepted_count(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    /// Poll until no cycle is in flight or `grace` elapses.
    ///
    /// Returns `false` if cycles were still running when time ran out.
    pub async fn wait_for_drain(&self, grace: Duration) -> bool {
        let drained = async {
            while self.active_count() > 0 {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        };
        tokio::time::timeout(grace, drained).await.is_ok()
    }
}

/// Marks one cycle as in flight.
#[derive(Debug)]
pub struct ConnectionGuard {
    in_flight: Arc<AtomicU64>,
    id: ConnectionId,
    peer_addr: SocketAddr,
    opened_at: Instant,
}

impl ConnectionGuard {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Time since the client was accepted.
    pub fn age(&self) -> Duration {
        self.opened_at.elapsed()
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        metrics::connection_closed();
        tracing::trace!(
            connection_id = %self.id,
            peer_addr = %self.peer_addr,
            lifetime_ms = self.age().as_millis() as u64,
            "Connection released"
        );
    }
}
