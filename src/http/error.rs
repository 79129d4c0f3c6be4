//! Error taxonomy for a single proxy cycle.
//!
//! Every variant is cycle-local: it ends the current connection and never
//! the accept loop.

use std::fmt;
use std::io;

/// The client sent something the proxy refuses to forward.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("method '{0}' is not supported, only GET")]
    MethodNotAllowed(String),

    #[error("malformed request line")]
    MalformedRequestLine,

    #[error("request line is not valid UTF-8")]
    InvalidEncoding,

    #[error("request target has an empty host")]
    EmptyHost,

    #[error("invalid port '{0}' in request target")]
    InvalidPort(String),

    #[error("line exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    #[error("host exceeds {limit} bytes")]
    HostTooLong { limit: usize },

    #[error("request target exceeds {limit} bytes")]
    TargetTooLong { limit: usize },

    #[error("more than {limit} header lines")]
    TooManyHeaders { limit: usize },
}

/// The step of a cycle that ran out of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    RequestHead,
    Connect,
    OriginWrite,
    OriginRead,
    ClientWrite,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::RequestHead => "reading request head",
            Stage::Connect => "connecting to origin",
            Stage::OriginWrite => "writing to origin",
            Stage::OriginRead => "reading from origin",
            Stage::ClientWrite => "writing to client",
        };
        f.write_str(name)
    }
}

/// Errors that end a proxy cycle.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The client closed the connection before sending a request line.
    #[error("client closed the connection before sending a request")]
    ClientClosed,

    #[error("failed to connect to origin {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("timed out {0}")]
    Timeout(Stage),
}

impl ProxyError {
    /// Stable label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Protocol(_) => "protocol",
            ProxyError::ClientClosed => "client_closed",
            ProxyError::Connect { .. } => "connect",
            ProxyError::Io(_) => "io",
            ProxyError::Timeout(_) => "timeout",
        }
    }
}
