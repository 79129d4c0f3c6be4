//! Minimal status responses for cycles that fail before relaying.
//!
//! Only written when `relay.error_responses` is enabled. The default is to
//! close the client connection without a response.

use crate::http::error::{ProtocolError, ProxyError, Stage};

const BAD_REQUEST: &[u8] = b"HTTP/1.0 400 Bad Request\r\nConnection: close\r\n\r\n";
const METHOD_NOT_ALLOWED: &[u8] =
    b"HTTP/1.0 405 Method Not Allowed\r\nAllow: GET\r\nConnection: close\r\n\r\n";
const REQUEST_TIMEOUT: &[u8] = b"HTTP/1.0 408 Request Timeout\r\nConnection: close\r\n\r\n";
const URI_TOO_LONG: &[u8] = b"HTTP/1.0 414 URI Too Long\r\nConnection: close\r\n\r\n";
const HEADER_FIELDS_TOO_LARGE: &[u8] =
    b"HTTP/1.0 431 Request Header Fields Too Large\r\nConnection: close\r\n\r\n";
const BAD_GATEWAY: &[u8] = b"HTTP/1.0 502 Bad Gateway\r\nConnection: close\r\n\r\n";
const GATEWAY_TIMEOUT: &[u8] = b"HTTP/1.0 504 Gateway Timeout\r\nConnection: close\r\n\r\n";

/// Response to send for `err`, if any.
///
/// Errors raised once the request reached the origin get `None`: by then the
/// client may already hold part of the origin's response.
pub fn error_response(err: &ProxyError) -> Option<&'static [u8]> {
    match err {
        ProxyError::Protocol(protocol) => Some(match protocol {
            ProtocolError::MethodNotAllowed(_) => METHOD_NOT_ALLOWED,
            ProtocolError::TargetTooLong { .. } | ProtocolError::HostTooLong { .. } => URI_TOO_LONG,
            ProtocolError::LineTooLong { .. } | ProtocolError::TooManyHeaders { .. } => {
                HEADER_FIELDS_TOO_LARGE
            }
            ProtocolError::MalformedRequestLine
            | ProtocolError::InvalidEncoding
            | ProtocolError::EmptyHost
            | ProtocolError::InvalidPort(_) => BAD_REQUEST,
        }),
        ProxyError::Connect { .. } => Some(BAD_GATEWAY),
        ProxyError::Timeout(Stage::RequestHead) => Some(REQUEST_TIMEOUT),
        ProxyError::Timeout(Stage::Connect) => Some(GATEWAY_TIMEOUT),
        ProxyError::Timeout(_) | ProxyError::ClientClosed | ProxyError::Io(_) => None,
    }
}
