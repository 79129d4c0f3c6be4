//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every cycle produces:
//!     → logging.rs (structured events inside a per-connection span)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape), when enabled
//! ```

pub mod logging;
pub mod metrics;
