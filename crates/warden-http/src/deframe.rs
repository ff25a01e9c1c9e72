// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw HTTP/1.1 response handling for the tunnel path.
//!
//! Only two things are extracted: the numeric status and the body, found at
//! the first blank line. Malformed input never fails; it degrades to status 0
//! and/or the raw bytes as the body.

use std::time::Duration;

use tracing::debug;
use warden_core::{ResponseBuffer, TunnelConnection};

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Status and body of a deframed response. The body borrows the buffer it
/// was deframed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawHttpResponse<'a> {
    /// 0 when the status line could not be parsed.
    pub status_code: u16,
    pub body: &'a [u8],
}

/// Read the status code from the start of a raw response.
///
/// Requires more than 5 bytes starting with `HTTP/`. The code is the leading
/// run of digits after the first space; anything else yields 0.
pub fn parse_status(raw: &[u8]) -> u16 {
    if raw.len() <= 5 || !raw.starts_with(b"HTTP/") {
        return 0;
    }
    let Some(space) = raw.iter().position(|&b| b == b' ') else {
        return 0;
    };
    let after = &raw[space + 1..];
    let digits = after.iter().take_while(|b| b.is_ascii_digit()).count();
    std::str::from_utf8(&after[..digits])
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

/// Split a raw response accumulated in `buf` into status and body.
///
/// If a blank line is present the body is moved to the front of `buf` and the
/// head discarded; otherwise the whole content is the body.
pub fn deframe(buf: &mut ResponseBuffer) -> RawHttpResponse<'_> {
    let status_code = parse_status(buf.as_bytes());
    if let Some(pos) = buf
        .as_bytes()
        .windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
    {
        buf.retain_from(pos + HEADER_TERMINATOR.len());
    } else {
        debug!(len = buf.len(), "response has no header terminator, using raw bytes as body");
    }
    RawHttpResponse {
        status_code,
        body: buf.as_bytes(),
    }
}

/// Read from `conn` in `chunk_size` reads until end of stream, appending with
/// the partial-chunk policy.
///
/// A read error ends the response the same way end of stream does. Returns
/// the number of bytes received from the peer, which may exceed what `buf`
/// kept.
pub async fn read_to_end(
    conn: &mut dyn TunnelConnection,
    buf: &mut ResponseBuffer,
    chunk_size: usize,
    timeout: Duration,
) -> usize {
    let mut chunk = vec![0u8; chunk_size.max(1)];
    let mut received = 0;
    loop {
        match conn.read(&mut chunk, timeout).await {
            Ok(0) => break,
            Ok(n) => {
                received += n;
                buf.append_partial(&chunk[..n]);
            }
            Err(e) => {
                debug!(error = %e, received, "tunnel read ended with error");
                break;
            }
        }
    }
    received
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::{Scheme, TunnelConnector, TunnelTarget};
    use warden_test_utils::MockTunnelConnector;

    fn filled(bytes: &[u8], capacity: usize) -> ResponseBuffer {
        let mut buf = ResponseBuffer::with_capacity(capacity).unwrap();
        buf.append_partial(bytes);
        buf
    }

    #[test]
    fn extracts_status_and_body() {
        let mut buf = filled(b"HTTP/1.1 404 Not Found\r\nX: y\r\n\r\nnot found", 256);
        let response = deframe(&mut buf);
        assert_eq!(response.status_code, 404);
        assert_eq!(response.body, b"not found");
        assert_eq!(buf.len(), 9);
    }

    #[test]
    fn missing_terminator_keeps_raw_bytes() {
        let raw = b"garbage without a status line";
        let mut buf = filled(raw, 256);
        let response = deframe(&mut buf);
        assert_eq!(response.status_code, 0);
        assert_eq!(response.body, raw);
    }

    #[test]
    fn status_without_body() {
        let mut buf = filled(b"HTTP/1.1 204 No Content\r\n\r\n", 256);
        let response = deframe(&mut buf);
        assert_eq!(response.status_code, 204);
        assert!(response.body.is_empty());
    }

    #[test]
    fn body_keeps_later_blank_lines() {
        let mut buf = filled(b"HTTP/1.0 200 OK\r\n\r\na\r\n\r\nb", 256);
        let response = deframe(&mut buf);
        assert_eq!(response.body, b"a\r\n\r\nb");
    }

    #[test]
    fn parse_status_edge_cases() {
        assert_eq!(parse_status(b"HTTP/"), 0);
        assert_eq!(parse_status(b"HTTP/1.1"), 0);
        assert_eq!(parse_status(b"HTTP/1.1 "), 0);
        assert_eq!(parse_status(b"HTTP/1.1 abc"), 0);
        assert_eq!(parse_status(b"HTTP/1.1 200"), 200);
        assert_eq!(parse_status(b"HTTP/2 301 Moved"), 301);
        assert_eq!(parse_status(b"http/1.1 200 OK"), 0);
        assert_eq!(parse_status(b"SIP/2.0 200 OK"), 0);
        assert_eq!(parse_status(b"HTTP/1.1 99999 Huge"), 0);
    }

    #[tokio::test]
    async fn read_to_end_truncates_at_capacity() {
        let connector =
            MockTunnelConnector::with_chunks(vec![b"0123456789".to_vec(), b"abcdefghij".to_vec()]);
        let target = TunnelTarget {
            host: "h".to_string(),
            port: 80,
            scheme: Scheme::Http,
        };
        let mut conn = connector.open(&target, Duration::from_secs(1)).await.unwrap();
        let mut buf = ResponseBuffer::with_capacity(16).unwrap();
        let received = read_to_end(conn.as_mut(), &mut buf, 4, Duration::from_secs(1)).await;
        assert_eq!(received, 20);
        assert_eq!(buf.as_bytes(), b"0123456789abcde");
        assert!(buf.is_truncated());
    }

    #[tokio::test]
    async fn read_error_ends_response() {
        let connector =
            MockTunnelConnector::new(b"HTTP/1.1 200 OK\r\n\r\npartial".to_vec()).fail_read_after_script();
        let target = TunnelTarget {
            host: "h".to_string(),
            port: 80,
            scheme: Scheme::Http,
        };
        let mut conn = connector.open(&target, Duration::from_secs(1)).await.unwrap();
        let mut buf = ResponseBuffer::with_capacity(256).unwrap();
        read_to_end(conn.as_mut(), &mut buf, 4096, Duration::from_secs(1)).await;
        let response = deframe(&mut buf);
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, b"partial");
    }
}
