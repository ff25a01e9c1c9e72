// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP/1.1 request framing for the tunnel path.

use warden_core::{HeaderSet, Method, WardenError};

const VERSION_SUFFIX: &[u8] = b" HTTP/1.1\r\n";
const HOST_PREFIX: &[u8] = b"Host: ";
const CONTENT_LENGTH_PREFIX: &[u8] = b"Content-Length: ";
const CONNECTION_CLOSE: &[u8] = b"Connection: close\r\n";
const CRLF: &[u8] = b"\r\n";

/// A fully rendered request, ready to be written to a tunnel in one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedRequest {
    bytes: Vec<u8>,
    head_len: usize,
}

impl FramedRequest {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Length of the request line and headers, including the blank line.
    pub fn head_len(&self) -> usize {
        self.head_len
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Render a complete HTTP/1.1 request.
///
/// Layout, in order: request line, `Host`, caller headers in input order,
/// `Content-Length` when `body` is non-empty, `Connection: close`, a blank
/// line, then the body. The exact size is computed first and allocated once,
/// so either the whole request is returned or an error is.
///
/// Fails with `InvalidArgument` if a header would break the framing or the
/// head exceeds `max_head_bytes`, and with `OutOfMemory` if the allocation
/// fails.
pub fn build_request(
    method: Method,
    path: &str,
    host: &str,
    headers: &HeaderSet,
    body: &[u8],
    max_head_bytes: usize,
) -> Result<FramedRequest, WardenError> {
    headers.validate()?;

    let content_length = (!body.is_empty()).then(|| body.len().to_string());

    let head_len = method.as_str().len()
        + 1
        + path.len()
        + VERSION_SUFFIX.len()
        + HOST_PREFIX.len()
        + host.len()
        + CRLF.len()
        + headers
            .iter()
            .map(|(name, value)| name.len() + 2 + value.len() + CRLF.len())
            .sum::<usize>()
        + content_length
            .as_ref()
            .map_or(0, |n| CONTENT_LENGTH_PREFIX.len() + n.len() + CRLF.len())
        + CONNECTION_CLOSE.len()
        + CRLF.len();

    if head_len > max_head_bytes {
        return Err(WardenError::InvalidArgument(format!(
            "Request headers too large ({head_len} bytes, limit {max_head_bytes})"
        )));
    }

    let total = head_len + body.len();
    let mut bytes = Vec::new();
    bytes
        .try_reserve_exact(total)
        .map_err(|_| WardenError::OutOfMemory { requested: total })?;

    bytes.extend_from_slice(method.as_str().as_bytes());
    bytes.push(b' ');
    bytes.extend_from_slice(path.as_bytes());
    bytes.extend_from_slice(VERSION_SUFFIX);
    bytes.extend_from_slice(HOST_PREFIX);
    bytes.extend_from_slice(host.as_bytes());
    bytes.extend_from_slice(CRLF);
    for (name, value) in headers.iter() {
        bytes.extend_from_slice(name.as_bytes());
        bytes.extend_from_slice(b": ");
        bytes.extend_from_slice(value.as_bytes());
        bytes.extend_from_slice(CRLF);
    }
    if let Some(n) = &content_length {
        bytes.extend_from_slice(CONTENT_LENGTH_PREFIX);
        bytes.extend_from_slice(n.as_bytes());
        bytes.extend_from_slice(CRLF);
    }
    bytes.extend_from_slice(CONNECTION_CLOSE);
    bytes.extend_from_slice(CRLF);
    bytes.extend_from_slice(body);

    debug_assert_eq!(bytes.len(), total);
    Ok(FramedRequest { bytes, head_len })
}
