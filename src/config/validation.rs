//! Configuration validation.
//!
//! Semantic checks that serde cannot express: non-zero limits and timeouts,
//! parseable addresses, known log formats. All violations are collected and
//! reported together rather than stopping at the first one.

use std::net::{IpAddr, SocketAddr};

use crate::config::schema::ProxyConfig;

/// Smallest accepted line limit; anything below cannot hold a request line.
pub const MIN_LINE_BYTES: usize = 16;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `limits.max_headers`.
    pub field: &'static str,
    /// Human readable description.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a configuration, returning every violation found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.host.parse::<IpAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.host",
            format!("'{}' is not an IP address", config.listener.host),
        ));
    }

    let positive_sizes = [
        ("listener.max_connections", config.listener.max_connections),
        ("limits.max_headers", config.limits.max_headers),
        ("limits.max_host_bytes", config.limits.max_host_bytes),
        ("limits.max_target_bytes", config.limits.max_target_bytes),
        ("relay.buffer_bytes", config.relay.buffer_bytes),
    ];
    for (field, value) in positive_sizes {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than zero"));
        }
    }

    if config.limits.max_line_bytes < MIN_LINE_BYTES {
        errors.push(ValidationError::new(
            "limits.max_line_bytes",
            format!("must be at least {}", MIN_LINE_BYTES),
        ));
    }

    let positive_secs = [
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("timeouts.idle_secs", config.timeouts.idle_secs),
    ];
    for (field, value) in positive_secs {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than zero"));
        }
    }

    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        other => errors.push(ValidationError::new(
            "observability.log_format",
            format!("unknown format '{}', expected 'pretty' or 'json'", other),
        )),
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
