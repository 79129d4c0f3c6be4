//! Client-facing TCP acceptor.
//!
//! A slot is taken from the concurrency limit *before* `accept` is called, so
//! when every slot is busy new clients queue in the kernel backlog instead of
//! being accepted and left waiting.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::ListenerConfig;

#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("cannot listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("accept failed: {0}")]
    Accept(#[source] io::Error),

    /// The slot semaphore was closed; no further connections can be taken.
    #[error("connection slots closed")]
    Closed,
}

/// A client connection together with the slot it occupies.
#[derive(Debug)]
pub struct Accepted {
    pub stream: TcpStream,
    pub peer_addr: SocketAddr,
    pub slot: CycleSlot,
}

/// One of `max_connections` concurrency slots. Released on drop, panics included.
#[derive(Debug)]
pub struct CycleSlot {
    _permit: OwnedSemaphorePermit,
}

/// Listening endpoint that admits at most `max_connections` concurrent cycles.
pub struct Listener {
    inner: TcpListener,
    slots: Arc<Semaphore>,
    max_connections: usize,
}

impl Listener {
    /// Open the listening endpoint. Failure here is fatal for the process.
    pub async fn bind(config: &ListenerConfig) -> Result<Self, ListenerError> {
        let addr = config.bind_address();
        let bind_error = |source| ListenerError::Bind {
            addr: addr.clone(),
            source,
        };

        let socket_addr = config
            .socket_addr()
            .map_err(|e| bind_error(io::Error::new(io::ErrorKind::InvalidInput, e)))?;
        let inner = TcpListener::bind(socket_addr).await.map_err(bind_error)?;
        let local_addr = inner.local_addr().map_err(bind_error)?;

        tracing::info!(
            address = %local_addr,
            max_connections = config.max_connections,
            "Listening for clients"
        );

        Ok(Self {
            inner,
            slots: Arc::new(Semaphore::new(config.max_connections)),
            max_connections: config.max_connections,
        })
    }

    /// Wait for a free slot, then for the next client.
    pub async fn accept(&self) -> Result<Accepted, ListenerError> {
        let permit = Arc::clone(&self.slots)
            .acquire_owned()
            .await
            .map_err(|_| ListenerError::Closed)?;

        let (stream, peer_addr) = self.inner.accept().await.map_err(ListenerError::Accept)?;
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(peer_addr = %peer_addr, error = %e, "Could not disable Nagle");
        }

        tracing::debug!(
            peer_addr = %peer_addr,
            free_slots = self.slots.available_permits(),
            "Client accepted"
        );

        Ok(Accepted {
            stream,
            peer_addr,
            slot: CycleSlot { _permit: permit },
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    /// Slots not currently held by a running cycle.
    pub fn free_slots(&self) -> usize {
        self.slots.available_permits()
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }
}
