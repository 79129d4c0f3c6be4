//! HTTP forwarding pipeline.
//!
//! # Data Flow
//! ```text
//! Accepted TCP connection
//!     → server.rs (task per connection, deadlines, teardown)
//!     → request.rs + line.rs (bounded request line and header lines)
//!     → target.rs (host, port, path out of the request target)
//!     → headers.rs (HTTP/1.0 outbound block, reserved headers regenerated)
//!     → forward.rs (connect, send, raw relay of the origin's bytes)
//!     → response.rs (optional status response when a cycle fails early)
//! ```

pub mod error;
pub mod forward;
pub mod headers;
pub mod line;
pub mod request;
pub mod response;
pub mod server;
pub mod target;

pub use error::{ProtocolError, ProxyError, Stage};
pub use forward::OriginForwarder;
pub use headers::{build_outbound, USER_AGENT};
pub use request::{read_request, ParsedRequest, RESERVED_HEADERS};
pub use server::{handle_connection, ProxyServer};
pub use target::{parse_target, Target};
