//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Each cycle:
//!     → timeouts.rs (request head deadline)
//!     → timeouts.rs (origin connect deadline)
//!     → timeouts.rs (idle deadline on every relay read and write)
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline so one slow peer only stalls its own task
//! - No retries: a GET through this proxy is attempted exactly once

pub mod timeouts;

pub use timeouts::{with_deadline, Deadlines};
