//! Connection acceptor and per-connection proxy cycle.
//!
//! # Responsibilities
//! - Accept client connections within the configured concurrency limit
//! - Run each cycle on its own task inside a `connection` span
//! - Parse → build → connect → send → relay, with a deadline on every step
//! - Close both sockets on every exit path
//! - Stop accepting on shutdown and drain in-flight cycles

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::Instrument;

use crate::config::ProxyConfig;
use crate::http::error::{ProxyError, Stage};
use crate::http::forward::OriginForwarder;
use crate::http::headers::build_outbound;
use crate::http::request::read_request;
use crate::http::response::error_response;
use crate::lifecycle::ShutdownSignal;
use crate::net::{Accepted, ConnectionId, ConnectionTracker, Listener, ListenerError};
use crate::observability::metrics;
use crate::resilience::{with_deadline, Deadlines};

/// Pause after a failed accept so a persistent error (e.g. EMFILE) does not spin.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// The forwarding proxy server.
pub struct ProxyServer {
    config: Arc<ProxyConfig>,
    tracker: ConnectionTracker,
}

impl ProxyServer {
    /// Create a new server with the given configuration.
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            config: Arc::new(config),
            tracker: ConnectionTracker::new(),
        }
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Tracker of in-flight cycles.
    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }

    /// Accept connections until `shutdown` fires, then drain running cycles.
    pub async fn run(self, listener: Listener, mut shutdown: ShutdownSignal) {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!(address = %addr, "Proxy accepting connections");
        }

        loop {
            tokio::select! {
                _ = shutdown.wait() => {
                    tracing::info!("Stopped accepting connections");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok(Accepted { stream, peer_addr, slot }) => {
                        let guard = self.tracker.track(peer_addr);
                        let config = Arc::clone(&self.config);
                        tokio::spawn(async move {
                            handle_connection(stream, peer_addr, guard.id(), &config).await;
                            drop(guard);
                            drop(slot);
                        });
                    }
                    Err(ListenerError::Closed) => break,
                    Err(e) => {
                        tracing::error!(error = %e, "Accept failed");
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                },
            }
        }

        drop(listener);

        let grace = Duration::from_secs(self.config.lifecycle.shutdown_grace_secs);
        let active = self.tracker.active_count();
        if active > 0 {
            tracing::info!(active, grace_secs = grace.as_secs(), "Draining connections");
        }
        if !self.tracker.wait_for_drain(grace).await {
            tracing::warn!(
                remaining = self.tracker.active_count(),
                "Grace period elapsed with connections still open"
            );
        }
        tracing::info!(accepted = self.tracker.accepted_count(), "Proxy stopped");
    }
}

/// Run one full cycle for an accepted client connection.
///
/// Never fails: every error is logged, counted and ends only this cycle. The
/// client socket is closed when this returns.
pub async fn handle_connection(
    mut client: TcpStream,
    peer_addr: SocketAddr,
    connection_id: ConnectionId,
    config: &ProxyConfig,
) {
    let span = tracing::info_span!(
        "connection",
        connection_id = %connection_id,
        peer_addr = %peer_addr,
    );

    async move {
        let start = Instant::now();
        tracing::debug!("Cycle started");

        match proxy_cycle(&mut client, config).await {
            Ok(bytes) => {
                tracing::info!(
                    bytes,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Response relayed"
                );
                metrics::record_relay(bytes, start);
            }
            Err(err) => {
                match &err {
                    ProxyError::ClientClosed => {
                        tracing::debug!(kind = err.kind(), "Client sent no request")
                    }
                    _ => tracing::warn!(kind = err.kind(), error = %err, "Cycle aborted"),
                }
                metrics::record_error(err.kind(), start);

                if config.relay.error_responses {
                    send_error_response(&mut client, &err, config).await;
                }
            }
        }

        let _ = client.shutdown().await;
    }
    .instrument(span)
    .await
}

async fn send_error_response(client: &mut TcpStream, err: &ProxyError, config: &ProxyConfig) {
    let Some(response) = error_response(err) else {
        return;
    };
    let idle = Duration::from_secs(config.timeouts.idle_secs);
    if let Err(e) = with_deadline(Stage::ClientWrite, idle, client.write_all(response)).await {
        tracing::debug!(error = %e, "Failed to send error response");
    }
}

/// Parse the client's request, forward it and relay the origin's answer.
///
/// Returns the number of response bytes relayed to the client.
async fn proxy_cycle(client: &mut TcpStream, config: &ProxyConfig) -> Result<u64, ProxyError> {
    let deadlines = Deadlines::from(&config.timeouts);
    let forwarder = OriginForwarder::from_config(config);

    let (client_read, mut client_write) = client.split();
    let mut client_read = BufReader::new(client_read);

    let request = with_deadline(
        Stage::RequestHead,
        deadlines.request_head,
        read_request(&mut client_read, &config.limits),
    )
    .await?;

    let outbound = build_outbound(&request);
    tracing::trace!(block = %String::from_utf8_lossy(&outbound), "Outbound request");

    let mut origin = forwarder.connect(&request.target).await?;
    tracing::info!(origin = %request.target, "Forwarding request");

    forwarder.send(&mut origin, &outbound).await?;
    let relayed = forwarder.relay(&mut origin, &mut client_write).await;

    // The origin socket closes here no matter how the relay ended.
    drop(origin);
    relayed
}
