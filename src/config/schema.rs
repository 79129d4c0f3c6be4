//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::net::{AddrParseError, IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

/// Root configuration for the forwarding proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind host, port, connection limit).
    pub listener: ListenerConfig,

    /// Size limits applied while parsing the client request.
    pub limits: LimitsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Response relay settings.
    pub relay: RelayConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Startup and shutdown settings.
    pub lifecycle: LifecycleConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Address to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port. The command line port always wins over this value.
    pub port: u16,

    /// Maximum concurrent connections (backpressure).
    /// A value of 1 serializes cycles one after another.
    pub max_connections: usize,
}

impl ListenerConfig {
    /// Socket address to bind. IPv6 hosts are accepted without brackets.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        Ok(SocketAddr::new(self.host.parse::<IpAddr>()?, self.port))
    }

    /// Printable form of [`Self::socket_addr`], falling back to `host:port`.
    pub fn bind_address(&self) -> String {
        match self.socket_addr() {
            Ok(addr) => addr.to_string(),
            Err(_) => format!("{}:{}", self.host, self.port),
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_connections: 256,
        }
    }
}

/// Request size limits. Anything larger is rejected, never truncated.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum length of the request line or of any header line, terminator included.
    pub max_line_bytes: usize,

    /// Maximum number of header lines after the request line.
    pub max_headers: usize,

    /// Maximum length of the origin host name.
    pub max_host_bytes: usize,

    /// Maximum length of the request target.
    pub max_target_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_line_bytes: 8192,
            max_headers: 100,
            max_host_bytes: 255,
            max_target_bytes: 8192,
        }
    }
}

/// Timeout configuration for the stages of a cycle.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Origin connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Deadline for the client to deliver the complete request head, in seconds.
    pub request_secs: u64,

    /// Deadline for every single read or write while relaying, in seconds.
    pub idle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            request_secs: 30,
            idle_secs: 60,
        }
    }
}

/// Relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Size of the chunk read from the origin before it is written to the client.
    pub buffer_bytes: usize,

    /// Write a minimal status response to the client when a cycle fails
    /// before anything was relayed. Off means the connection is closed silently.
    pub error_responses: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            buffer_bytes: 8192,
            error_responses: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// How long in-flight cycles may keep running after a shutdown signal.
    pub shutdown_grace_secs: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            shutdown_grace_secs: 10,
        }
    }
}
