//! Origin connection, request send and response relay.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, trace};

use crate::config::ProxyConfig;
use crate::http::error::{ProxyError, Stage};
use crate::http::target::Target;
use crate::resilience::{with_deadline, Deadlines};

/// Talks to the origin on behalf of one client cycle.
#[derive(Debug, Clone, Copy)]
pub struct OriginForwarder {
    deadlines: Deadlines,
    buffer_bytes: usize,
}

impl OriginForwarder {
    pub fn new(deadlines: Deadlines, buffer_bytes: usize) -> Self {
        Self {
            deadlines,
            buffer_bytes,
        }
    }

    pub fn from_config(config: &ProxyConfig) -> Self {
        Self::new(Deadlines::from(&config.timeouts), config.relay.buffer_bytes)
    }

    /// Open a fresh TCP connection to the target's host and port.
    pub async fn connect(&self, target: &Target) -> Result<TcpStream, ProxyError> {
        let addr = target.authority();
        let connecting = tokio::time::timeout(self.deadlines.connect, TcpStream::connect(&addr));
        let stream = match connecting.await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => return Err(ProxyError::Connect { addr, source }),
            Err(_) => return Err(ProxyError::Timeout(Stage::Connect)),
        };

        debug!(origin = %addr, "Connected to origin");
        Ok(stream)
    }

    /// Write the complete outbound header block.
    pub async fn send<W>(&self, origin: &mut W, block: &[u8]) -> Result<(), ProxyError>
    where
        W: AsyncWrite + Unpin,
    {
        with_deadline(Stage::OriginWrite, self.deadlines.idle, async {
            origin.write_all(block).await?;
            origin.flush().await
        })
        .await?;

        trace!(bytes = block.len(), "Request sent to origin");
        Ok(())
    }

    /// Copy the origin's byte stream to the client until the origin closes.
    ///
    /// No part of the response is interpreted. Returns the number of bytes relayed.
    pub async fn relay<R, W>(&self, origin: &mut R, client: &mut W) -> Result<u64, ProxyError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = vec![0u8; self.buffer_bytes];
        let mut total = 0u64;

        loop {
            let n = with_deadline(Stage::OriginRead, self.deadlines.idle, origin.read(&mut buf))
                .await?;
            if n == 0 {
                break;
            }

            let write = client.write_all(&buf[..n]);
            with_deadline(Stage::ClientWrite, self.deadlines.idle, write).await?;
            total += n as u64;
        }

        with_deadline(Stage::ClientWrite, self.deadlines.idle, client.flush()).await?;
        Ok(total)
    }
}
