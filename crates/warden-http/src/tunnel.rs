// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Proxy path transport: an HTTP CONNECT tunnel through an upstream proxy.
//!
//! The connector opens TCP to the proxy, asks it to `CONNECT host:port`, and
//! for `https` targets wraps the tunnel in TLS so the framed request travels
//! encrypted end to end.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::{debug, info};
use warden_config::model::ProxyConfig;
use warden_core::{Scheme, TunnelConnection, TunnelConnector, TunnelTarget, WardenError};

use crate::deframe::parse_status;

/// Largest CONNECT reply head accepted from the proxy.
const MAX_CONNECT_REPLY: usize = 8192;

trait TunnelStream: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> TunnelStream for T {}

/// [`TunnelConnector`] that tunnels through an HTTP CONNECT proxy.
pub struct ConnectProxyConnector {
    proxy_host: String,
    proxy_port: u16,
    tls: TlsConnector,
}

impl ConnectProxyConnector {
    /// Create a connector for the proxy at `proxy_host:proxy_port`, verifying
    /// destination certificates against the bundled webpki roots.
    pub fn new(proxy_host: impl Into<String>, proxy_port: u16) -> Result<Self, WardenError> {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        Self::with_roots(proxy_host, proxy_port, roots)
    }

    /// Create a connector that trusts only `roots`.
    pub fn with_roots(
        proxy_host: impl Into<String>,
        proxy_port: u16,
        roots: RootCertStore,
    ) -> Result<Self, WardenError> {
        let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
        let tls_config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| WardenError::Config(format!("failed to configure TLS: {e}")))?
            .with_root_certificates(roots)
            .with_no_client_auth();
        Ok(Self {
            proxy_host: proxy_host.into(),
            proxy_port,
            tls: TlsConnector::from(Arc::new(tls_config)),
        })
    }

    /// Create a connector from the `[proxy]` section.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, WardenError> {
        let host = config
            .host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| WardenError::Config("proxy.host is not set".to_string()))?;
        Self::new(host, config.port)
    }

    async fn handshake(
        &self,
        stream: &mut TcpStream,
        target: &TunnelTarget,
        timeout: Duration,
    ) -> Result<(), WardenError> {
        let request = format!("CONNECT {target} HTTP/1.1\r\nHost: {target}\r\n\r\n");
        open_step(
            target,
            "failed to send CONNECT",
            timeout,
            stream.write_all(request.as_bytes()),
        )
        .await?;

        let mut reply = Vec::with_capacity(512);
        let mut chunk = [0u8; 512];
        while !reply.windows(4).any(|w| w == b"\r\n\r\n") {
            if reply.len() >= MAX_CONNECT_REPLY {
                return Err(WardenError::connect(format!(
                    "{target}: proxy reply exceeds {MAX_CONNECT_REPLY} bytes"
                )));
            }
            let n = open_step(
                target,
                "failed to read CONNECT reply",
                timeout,
                stream.read(&mut chunk),
            )
            .await?;
            if n == 0 {
                return Err(WardenError::connect(format!(
                    "{target}: proxy closed the connection during CONNECT"
                )));
            }
            reply.extend_from_slice(&chunk[..n]);
        }

        let status = parse_status(&reply);
        if !(200..300).contains(&status) {
            return Err(WardenError::connect(format!(
                "{target}: proxy refused CONNECT with status {status}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl TunnelConnector for ConnectProxyConnector {
    async fn open(
        &self,
        target: &TunnelTarget,
        timeout: Duration,
    ) -> Result<Box<dyn TunnelConnection>, WardenError> {
        let proxy = format!("{}:{}", self.proxy_host, self.proxy_port);
        let mut stream = open_step(
            target,
            &format!("failed to reach proxy {proxy}"),
            timeout,
            TcpStream::connect(&proxy),
        )
        .await?;
        self.handshake(&mut stream, target, timeout).await?;

        let stream: Box<dyn TunnelStream> = match target.scheme {
            Scheme::Http => Box::new(stream),
            Scheme::Https => {
                let server_name = ServerName::try_from(target.host.clone()).map_err(|_| {
                    WardenError::connect(format!("{target}: invalid TLS server name"))
                })?;
                let tls = open_step(
                    target,
                    "TLS handshake failed",
                    timeout,
                    self.tls.connect(server_name, stream),
                )
                .await?;
                Box::new(tls)
            }
        };

        info!(destination = %target, proxy = %proxy, "tunnel established");
        Ok(Box::new(ProxyTunnel {
            stream,
            timeout,
            target: target.to_string(),
        }))
    }
}

/// [`TunnelConnector`] used when no upstream proxy is configured. Every
/// `open` fails, so enabling proxy mode without a proxy cannot fall back to a
/// direct connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProxyConnector;

#[async_trait]
impl TunnelConnector for NoProxyConnector {
    async fn open(
        &self,
        target: &TunnelTarget,
        _timeout: Duration,
    ) -> Result<Box<dyn TunnelConnection>, WardenError> {
        Err(WardenError::connect(format!(
            "{target}: proxy mode is enabled but no proxy is configured"
        )))
    }
}

/// An established tunnel, plain or TLS-wrapped.
struct ProxyTunnel {
    stream: Box<dyn TunnelStream>,
    timeout: Duration,
    target: String,
}

#[async_trait]
impl TunnelConnection for ProxyTunnel {
    async fn write(&mut self, bytes: &[u8]) -> Result<usize, WardenError> {
        let write = async {
            self.stream.write_all(bytes).await?;
            self.stream.flush().await
        };
        match tokio::time::timeout(self.timeout, write).await {
            Ok(Ok(())) => Ok(bytes.len()),
            Ok(Err(e)) => Err(WardenError::WriteFailure {
                message: format!("{}: {e}", self.target),
                source: Some(Box::new(e)),
            }),
            Err(_) => Err(WardenError::WriteFailure {
                message: format!("{}: write timed out after {:?}", self.target, self.timeout),
                source: None,
            }),
        }
    }

    async fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, WardenError> {
        with_timeout(timeout, self.stream.read(buf))
            .await?
            .map_err(|e| WardenError::transport(format!("{}: read failed", self.target), e))
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.shutdown().await {
            debug!(destination = %self.target, error = %e, "tunnel shutdown failed");
        }
    }
}

async fn with_timeout<F: std::future::Future>(
    timeout: Duration,
    future: F,
) -> Result<F::Output, WardenError> {
    tokio::time::timeout(timeout, future)
        .await
        .map_err(|_| WardenError::Timeout { duration: timeout })
}

/// Run one phase of opening a tunnel. Both I/O errors and timeouts surface
/// as `ConnectFailure`.
async fn open_step<T, F>(
    target: &TunnelTarget,
    context: &str,
    timeout: Duration,
    future: F,
) -> Result<T, WardenError>
where
    F: std::future::Future<Output = std::io::Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(WardenError::ConnectFailure {
            message: format!("{target}: {context}: {e}"),
            source: Some(Box::new(e)),
        }),
        Err(_) => Err(WardenError::connect(format!(
            "{target}: {context}: timed out after {timeout:?}"
        ))),
    }
}
