//! Length-bounded line reading over any buffered async reader.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::http::error::{ProtocolError, ProxyError};

/// Outcome of [`read_line_limited`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRead {
    /// A complete line, terminator included, was read into the buffer.
    Line,
    /// The stream ended. The buffer holds whatever partial line preceded the end.
    Eof,
}

/// Read one `\n`-terminated line into `buf`, failing once it grows past `max` bytes.
///
/// `buf` is cleared first. The terminator is kept so lines can be forwarded verbatim.
pub async fn read_line_limited<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max: usize,
) -> Result<LineRead, ProxyError>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(LineRead::Eof);
        }

        let (complete, used) = match available.iter().position(|&b| b == b'\n') {
            Some(i) => (true, i + 1),
            None => (false, available.len()),
        };
        if buf.len() + used > max {
            return Err(ProtocolError::LineTooLong { limit: max }.into());
        }

        buf.extend_from_slice(&available[..used]);
        reader.consume(used);

        if complete {
            return Ok(LineRead::Line);
        }
    }
}

/// True for a line consisting of nothing but a line terminator.
pub fn is_blank(line: &[u8]) -> bool {
    line == b"\r\n" || line == b"\n"
}

/// Strip a trailing `\r\n` or `\n`.
pub fn trim_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
