//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound the request head read, the origin connect and every relay read/write
//! - Turn an elapsed deadline into a cycle-local `ProxyError::Timeout`
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; the wrapped future is dropped on expiry
//! - Timeout errors are distinct from other errors

use std::future::Future;
use std::time::Duration;

use crate::config::TimeoutConfig;
use crate::http::error::{ProxyError, Stage};

/// Per-cycle deadlines derived from [`TimeoutConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadlines {
    pub request_head: Duration,
    pub connect: Duration,
    pub idle: Duration,
}

impl From<&TimeoutConfig> for Deadlines {
    fn from(config: &TimeoutConfig) -> Self {
        Self {
            request_head: Duration::from_secs(config.request_secs),
            connect: Duration::from_secs(config.connect_secs),
            idle: Duration::from_secs(config.idle_secs),
        }
    }
}

impl Default for Deadlines {
    fn default() -> Self {
        Self::from(&TimeoutConfig::default())
    }
}

/// Run `fut` with a deadline, mapping expiry to `ProxyError::Timeout(stage)`.
pub async fn with_deadline<T, E, F>(stage: Stage, limit: Duration, fut: F) -> Result<T, ProxyError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<ProxyError>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(ProxyError::Timeout(stage)),
    }
}
