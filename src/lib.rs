//! GET-only forwarding HTTP proxy library.

pub mod config;
pub mod http;
pub mod net;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::schema::ProxyConfig;
pub use http::ProxyServer;
pub use lifecycle::Shutdown;
