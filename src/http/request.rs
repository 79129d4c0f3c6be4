//! Client request parsing.
//!
//! Reads the request line and header block of a single GET request. Header
//! lines are kept as raw bytes so the ones that pass through reach the origin
//! exactly as the client sent them. The four reserved headers are dropped
//! here and regenerated by the header builder.

use tokio::io::AsyncBufRead;
use tracing::debug;

use crate::config::LimitsConfig;
use crate::http::error::{ProtocolError, ProxyError};
use crate::http::line::{is_blank, read_line_limited, trim_terminator, LineRead};
use crate::http::target::{parse_target, Target};

/// Headers the proxy always writes itself. Matched case-insensitively.
pub const RESERVED_HEADERS: [&str; 4] = ["Host", "User-Agent", "Connection", "Proxy-Connection"];

/// A parsed client request, alive for one cycle only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    pub method: String,
    pub target: Target,
    /// Version the client declared. Logged, never forwarded.
    pub version: String,
    /// Non-reserved header lines in arrival order, terminators included.
    pub pass_through: Vec<Vec<u8>>,
}

/// The three tokens of a request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine<'a> {
    pub method: &'a str,
    pub target: &'a str,
    pub version: &'a str,
}

/// Split a request line into method, target and version.
///
/// Exactly three whitespace separated tokens are required.
pub fn parse_request_line(line: &[u8]) -> Result<RequestLine<'_>, ProtocolError> {
    let line =
        std::str::from_utf8(trim_terminator(line)).map_err(|_| ProtocolError::InvalidEncoding)?;

    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next(), tokens.next()) {
        (Some(method), Some(target), Some(version), None) => Ok(RequestLine {
            method,
            target,
            version,
        }),
        _ => Err(ProtocolError::MalformedRequestLine),
    }
}

/// Name of a raw header line: the bytes before the first colon.
pub fn header_name(line: &[u8]) -> &[u8] {
    let line = trim_terminator(line);
    match line.iter().position(|&b| b == b':') {
        Some(colon) => &line[..colon],
        None => line,
    }
}

/// Whether a raw header line carries one of [`RESERVED_HEADERS`].
pub fn is_reserved(line: &[u8]) -> bool {
    let name = header_name(line);
    RESERVED_HEADERS
        .iter()
        .any(|reserved| name.eq_ignore_ascii_case(reserved.as_bytes()))
}

/// Read and validate one GET request from the client.
pub async fn read_request<R>(
    reader: &mut R,
    limits: &LimitsConfig,
) -> Result<ParsedRequest, ProxyError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();

    if read_line_limited(reader, &mut line, limits.max_line_bytes).await? == LineRead::Eof {
        return Err(ProxyError::ClientClosed);
    }

    let request_line = parse_request_line(&line)?;
    if request_line.method != "GET" {
        return Err(ProtocolError::MethodNotAllowed(request_line.method.to_string()).into());
    }
    if request_line.target.len() > limits.max_target_bytes {
        return Err(ProtocolError::TargetTooLong {
            limit: limits.max_target_bytes,
        }
        .into());
    }

    let target = parse_target(request_line.target)?;
    if target.host.len() > limits.max_host_bytes {
        return Err(ProtocolError::HostTooLong {
            limit: limits.max_host_bytes,
        }
        .into());
    }

    let method = request_line.method.to_string();
    let version = request_line.version.to_string();
    let pass_through = read_headers(reader, &mut line, limits).await?;

    debug!(
        %method,
        host = %target.host,
        port = %target.port,
        path = %target.path,
        %version,
        pass_through = pass_through.len(),
        "Parsed request"
    );

    Ok(ParsedRequest {
        method,
        target,
        version,
        pass_through,
    })
}

/// Collect header lines up to the blank line or end of stream.
async fn read_headers<R>(
    reader: &mut R,
    line: &mut Vec<u8>,
    limits: &LimitsConfig,
) -> Result<Vec<Vec<u8>>, ProxyError>
where
    R: AsyncBufRead + Unpin,
{
    let mut pass_through = Vec::new();
    let mut seen = 0usize;

    loop {
        // A partial line cut off by end of stream is dropped rather than
        // forwarded without its terminator, which would corrupt the block.
        if read_line_limited(reader, line, limits.max_line_bytes).await? == LineRead::Eof {
            break;
        }
        if is_blank(line) {
            break;
        }

        seen += 1;
        if seen > limits.max_headers {
            return Err(ProtocolError::TooManyHeaders {
                limit: limits.max_headers,
            }
            .into());
        }

        if !is_reserved(line) {
            pass_through.push(line.clone());
        }
    }

    Ok(pass_through)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    async fn parse(raw: &[u8]) -> Result<ParsedRequest, ProxyError> {
        parse_with(raw, &LimitsConfig::default()).await
    }

    async fn parse_with(raw: &[u8], limits: &LimitsConfig) -> Result<ParsedRequest, ProxyError> {
        let mut reader = BufReader::new(raw);
        read_request(&mut reader, limits).await
    }

    #[tokio::test]
    async fn parses_absolute_target_and_filters_reserved_headers() {
        let request = parse(
            b"GET http://example.com:8080/a/b?x=1 HTTP/1.1\r\n\
              Host: example.com\r\n\
              User-Agent: test\r\n\
              Accept: text/html\r\n\
              Connection: keep-alive\r\n\
              Proxy-Connection: keep-alive\r\n\
              X-Trace: 1\r\n\
              \r\n",
        )
        .await
        .unwrap();

        assert_eq!(request.method, "GET");
        assert_eq!(request.version, "HTTP/1.1");
        assert_eq!(request.target.host, "example.com");
        assert_eq!(request.target.port, "8080");
        assert_eq!(request.target.path, "/a/b?x=1");
        assert_eq!(
            request.pass_through,
            vec![b"Accept: text/html\r\n".to_vec(), b"X-Trace: 1\r\n".to_vec()]
        );
    }

    #[tokio::test]
    async fn reserved_names_match_case_insensitively() {
        let request = parse(
            b"GET http://example.com/ HTTP/1.0\r\n\
              HOST: foo\r\n\
              user-agent: x\r\n\
              CoNnEcTiOn: close\r\n\
              proxy-connection: close\r\n\
              Hostname: kept\r\n\
              \r\n",
        )
        .await
        .unwrap();

        assert_eq!(request.pass_through, vec![b"Hostname: kept\r\n".to_vec()]);
    }

    #[tokio::test]
    async fn header_lines_pass_through_byte_for_byte() {
        let request = parse(b"GET http://h/ HTTP/1.1\r\nX-Bin: \xff\xfe\nNoColonLine\r\n\n")
            .await
            .unwrap();
        assert_eq!(
            request.pass_through,
            vec![b"X-Bin: \xff\xfe\n".to_vec(), b"NoColonLine\r\n".to_vec()]
        );
    }

    #[tokio::test]
    async fn end_of_stream_ends_header_block() {
        let request = parse(b"GET http://h/ HTTP/1.1\r\nAccept: */*\r\nX-Cut").await.unwrap();
        assert_eq!(request.pass_through, vec![b"Accept: */*\r\n".to_vec()]);
    }

    #[tokio::test]
    async fn non_get_methods_are_rejected() {
        for method in ["POST", "HEAD", "CONNECT", "get"] {
            let raw = format!("{} http://example.com/ HTTP/1.1\r\n\r\n", method);
            let err = parse(raw.as_bytes()).await.unwrap_err();
            assert!(
                matches!(
                    &err,
                    ProxyError::Protocol(ProtocolError::MethodNotAllowed(m)) if m == method
                ),
                "{} should be rejected, got {:?}",
                method,
                err
            );
        }
    }

    #[tokio::test]
    async fn malformed_request_lines() {
        for raw in [
            &b"\r\n"[..],
            b"GET\r\n",
            b"GET http://h/\r\n",
            b"GET http://h/ HTTP/1.1 extra\r\n",
        ] {
            let err = parse(raw).await.unwrap_err();
            assert!(
                matches!(err, ProxyError::Protocol(ProtocolError::MalformedRequestLine)),
                "{:?}",
                err
            );
        }
    }

    #[tokio::test]
    async fn non_utf8_request_line() {
        let err = parse(b"GET http://h/\xff HTTP/1.1\r\n\r\n").await.unwrap_err();
        assert!(matches!(err, ProxyError::Protocol(ProtocolError::InvalidEncoding)));
    }

    #[tokio::test]
    async fn empty_stream_is_client_closed() {
        assert!(matches!(parse(b"").await, Err(ProxyError::ClientClosed)));
        assert!(matches!(parse(b"GET http://h/").await, Err(ProxyError::ClientClosed)));
    }

    #[tokio::test]
    async fn origin_form_target_is_rejected() {
        let err = parse(b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n")
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::Protocol(ProtocolError::EmptyHost)));
    }

    #[tokio::test]
    async fn oversized_fields_are_rejected() {
        let limits = LimitsConfig {
            max_line_bytes: 64,
            max_headers: 2,
            max_host_bytes: 8,
            max_target_bytes: 32,
        };

        let long_line = format!("GET http://h/{} HTTP/1.1\r\n\r\n", "a".repeat(80));
        assert!(matches!(
            parse_with(long_line.as_bytes(), &limits).await,
            Err(ProxyError::Protocol(ProtocolError::LineTooLong { limit: 64 }))
        ));

        let long_target = format!("GET http://h/{} HTTP/1.1\r\n\r\n", "a".repeat(30));
        assert!(matches!(
            parse_with(long_target.as_bytes(), &limits).await,
            Err(ProxyError::Protocol(ProtocolError::TargetTooLong { limit: 32 }))
        ));

        let long_host = b"GET http://abcdefghijk/ HTTP/1.1\r\n\r\n";
        assert!(matches!(
            parse_with(long_host, &limits).await,
            Err(ProxyError::Protocol(ProtocolError::HostTooLong { limit: 8 }))
        ));

        let long_header = format!("GET http://h/ HTTP/1.1\r\nX-Big: {}\r\n\r\n", "b".repeat(80));
        assert!(matches!(
            parse_with(long_header.as_bytes(), &limits).await,
            Err(ProxyError::Protocol(ProtocolError::LineTooLong { limit: 64 }))
        ));

        let many = b"GET http://h/ HTTP/1.1\r\nA: 1\r\nHost: h\r\nC: 3\r\n\r\n";
        assert!(matches!(
            parse_with(many, &limits).await,
            Err(ProxyError::Protocol(ProtocolError::TooManyHeaders { limit: 2 }))
        ));
    }

    #[test]
    fn header_name_extraction() {
        assert_eq!(header_name(b"Host: a\r\n"), b"Host");
        assert_eq!(header_name(b"Host:a:b\r\n"), b"Host");
        assert_eq!(header_name(b"Bare\r\n"), b"Bare");
        assert!(is_reserved(b"proxy-CONNECTION: x\r\n"));
        assert!(!is_reserved(b"Host : spaced\r\n"));
        assert!(!is_reserved(b"X-Host: a\r\n"));
    }
}
