//! Outbound request construction.
//!
//! The request line always states HTTP/1.0 and `Connection: close` is always
//! sent, so the origin ends the response by closing its side. The relay
//! depends on that and never looks at lengths or chunking.

use crate::http::request::ParsedRequest;

/// User-Agent sent to every origin regardless of what the client sent.
pub const USER_AGENT: &str =
    "User-Agent: Mozilla/5.0 (X11; Linux x86_64; rv:10.0.3) Gecko/20120305 Firefox/10.0.3";

const CRLF: &[u8] = b"\r\n";

/// Build the exact bytes written to the origin for `request`.
pub fn build_outbound(request: &ParsedRequest) -> Vec<u8> {
    let passed: usize = request.pass_through.iter().map(Vec::len).sum();
    let fixed = 160 + request.target.path.len() + request.target.host.len();
    let mut block = Vec::with_capacity(fixed + passed);

    block.extend_from_slice(b"GET ");
    block.extend_from_slice(request.target.path.as_bytes());
    block.extend_from_slice(b" HTTP/1.0\r\n");

    block.extend_from_slice(b"Connection: close\r\n");
    block.extend_from_slice(b"Proxy-Connection: close\r\n");
    block.extend_from_slice(b"Host: ");
    block.extend_from_slice(request.target.host.as_bytes());
    block.extend_from_slice(CRLF);
    block.extend_from_slice(USER_AGENT.as_bytes());
    block.extend_from_slice(CRLF);

    for line in &request.pass_through {
        block.extend_from_slice(line);
    }

    block.extend_from_slice(CRLF);
    block
}
