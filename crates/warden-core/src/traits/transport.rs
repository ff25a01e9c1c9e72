// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport collaborators for the two request paths.

use std::time::Duration;

use async_trait::async_trait;

use crate::buffer::ResponseBuffer;
use crate::error::WardenError;
use crate::types::{HttpRequest, TunnelTarget};

/// A library-managed HTTP client that performs TLS itself (the direct path).
#[async_trait]
pub trait NativeClient: Send + Sync {
    /// Performs `request` and streams the response body into `sink`.
    ///
    /// Implementations must use [`ResponseBuffer::append_whole`] so that a
    /// chunk which does not fit is dropped as a unit. Returns the numeric HTTP
    /// status code.
    async fn execute(
        &self,
        request: &HttpRequest,
        sink: &mut ResponseBuffer,
        timeout: Duration,
    ) -> Result<u16, WardenError>;
}

/// Opens raw byte-stream tunnels to a destination (the proxy path).
#[async_trait]
pub trait TunnelConnector: Send + Sync {
    /// Opens a tunnel to `target`, failing with [`WardenError::ConnectFailure`].
    async fn open(
        &self,
        target: &TunnelTarget,
        timeout: Duration,
    ) -> Result<Box<dyn TunnelConnection>, WardenError>;
}

/// An open tunnel carrying raw HTTP/1.1 bytes.
#[async_trait]
pub trait TunnelConnection: Send {
    /// Writes all of `bytes`, returning the number written.
    async fn write(&mut self, bytes: &[u8]) -> Result<usize, WardenError>;

    /// Reads into `buf`. `Ok(0)` means the peer closed the stream.
    async fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, WardenError>;

    /// Closes the tunnel. Errors during shutdown are not reported.
    async fn close(&mut self);
}
