//! Request target decomposition into host, port and path.
//!
//! The scan is literal: an optional `http://` prefix is dropped, the host runs
//! up to the first `/` or `:`, an optional decimal port follows, and whatever
//! remains is the path. Targets without the prefix go through the same scan,
//! so `example.com/x` names host `example.com` while an origin-form target
//! such as `/index.html` has an empty host and is rejected.

use std::fmt;

use crate::http::error::ProtocolError;

/// Port used when the target does not name one.
pub const DEFAULT_PORT: &str = "80";

const HTTP_PREFIX: &str = "http://";

/// Origin coordinates extracted from a request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Never empty.
    pub host: String,
    /// Decimal port in `1..=65535`.
    pub port: String,
    /// Path plus query. Never empty.
    pub path: String,
}

impl Target {
    /// `host:port`, as passed to the resolver.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "http://{}:{}{}", self.host, self.port, self.path)
    }
}

/// Split a request target into its origin host, port and path.
pub fn parse_target(target: &str) -> Result<Target, ProtocolError> {
    let rest = target.strip_prefix(HTTP_PREFIX).unwrap_or(target);

    let host_end = rest.find(|c: char| c == '/' || c == ':').unwrap_or(rest.len());
    let (host, mut rest) = rest.split_at(host_end);
    if host.is_empty() {
        return Err(ProtocolError::EmptyHost);
    }

    let port = match rest.strip_prefix(':') {
        Some(after_colon) => {
            let digits = after_colon.bytes().take_while(u8::is_ascii_digit).count();
            let (port, remainder) = after_colon.split_at(digits);
            rest = remainder;
            parse_port(port)?
        }
        None => DEFAULT_PORT.to_string(),
    };

    let path = match rest.find('/') {
        Some(slash) => &rest[slash..],
        None => rest,
    };
    let path = if path.is_empty() { "/" } else { path };

    Ok(Target {
        host: host.to_string(),
        port,
        path: path.to_string(),
    })
}

fn parse_port(digits: &str) -> Result<String, ProtocolError> {
    match digits.parse::<u16>() {
        Ok(port) if port != 0 => Ok(port.to_string()),
        _ => Err(ProtocolError::InvalidPort(digits.to_string())),
    }
}
