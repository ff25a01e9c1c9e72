// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request dispatch: validate, classify, then route to the direct or tunnel path.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use warden_config::model::{HttpConfig, WardenConfig};
use warden_core::{
    HttpRequest, NativeClient, ResponseBuffer, Scheme, TunnelConnector, TunnelTarget, WardenError,
};
use warden_security::{extract_host, DestinationClassifier, SystemResolver, Verdict};

use crate::deframe::{deframe, read_to_end};
use crate::direct::ReqwestNativeClient;
use crate::frame::build_request;
use crate::tunnel::{ConnectProxyConnector, NoProxyConnector};
use crate::url::decompose;

/// Shared switch selecting the tunnel path. Read once per dispatch.
#[derive(Debug, Clone, Default)]
pub struct ProxyMode(Arc<AtomicBool>);

impl ProxyMode {
    pub fn new(enabled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(enabled)))
    }

    pub fn enabled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::Relaxed);
    }
}

/// Which transport carried a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Direct,
    Tunnel,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Route::Direct => "direct",
            Route::Tunnel => "tunnel",
        })
    }
}

/// Per-request sizes and the per-operation timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchLimits {
    pub timeout: Duration,
    pub response_buffer_bytes: usize,
    pub read_chunk_bytes: usize,
    pub max_header_bytes: usize,
}

impl From<&HttpConfig> for DispatchLimits {
    fn from(config: &HttpConfig) -> Self {
        Self {
            timeout: config.timeout(),
            response_buffer_bytes: config.response_buffer_bytes,
            read_chunk_bytes: config.read_chunk_bytes,
            max_header_bytes: config.max_header_bytes,
        }
    }
}

impl Default for DispatchLimits {
    fn default() -> Self {
        Self::from(&HttpConfig::default())
    }
}

/// A completed request. `body` holds only the response body on both paths.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub status_code: u16,
    pub route: Route,
    pub body: ResponseBuffer,
}

/// Executes requests after the destination has been cleared.
pub struct Dispatcher {
    classifier: Arc<DestinationClassifier>,
    native: Arc<dyn NativeClient>,
    tunnel: Arc<dyn TunnelConnector>,
    proxy_mode: ProxyMode,
    limits: DispatchLimits,
}

impl Dispatcher {
    pub fn new(
        classifier: Arc<DestinationClassifier>,
        native: Arc<dyn NativeClient>,
        tunnel: Arc<dyn TunnelConnector>,
        proxy_mode: ProxyMode,
        limits: DispatchLimits,
    ) -> Self {
        Self {
            classifier,
            native,
            tunnel,
            proxy_mode,
            limits,
        }
    }

    /// Wire up the production collaborators from configuration: the system
    /// resolver, the hardened reqwest client, and a CONNECT tunnel to
    /// `proxy.host` when one is set.
    pub fn from_config(config: &WardenConfig) -> Result<Self, WardenError> {
        let limits = DispatchLimits::from(&config.http);
        let resolver = Arc::new(SystemResolver::new(limits.timeout));
        let classifier = DestinationClassifier::from_config(&config.security, resolver);
        let native = ReqwestNativeClient::new(&config.http)?;
        let tunnel: Arc<dyn TunnelConnector> = match config.proxy.host.as_deref() {
            Some(host) if !host.trim().is_empty() => {
                Arc::new(ConnectProxyConnector::from_config(&config.proxy)?)
            }
            _ => Arc::new(NoProxyConnector),
        };
        Ok(Self::new(
            Arc::new(classifier),
            Arc::new(native),
            tunnel,
            ProxyMode::new(config.proxy.enabled),
            limits,
        ))
    }

    pub fn proxy_mode(&self) -> &ProxyMode {
        &self.proxy_mode
    }

    pub fn limits(&self) -> &DispatchLimits {
        &self.limits
    }

    /// Validate, classify and perform `request`.
    ///
    /// Nothing touches the network until the URL scheme, the headers and the
    /// destination host have all been accepted.
    pub async fn execute(&self, request: &HttpRequest) -> Result<DispatchOutcome, WardenError> {
        if Scheme::detect(&request.url).is_none() {
            return Err(WardenError::InvalidArgument(
                "URL must start with http:// or https://".to_string(),
            ));
        }
        request.headers.validate()?;

        let host = extract_host(&request.url)?;
        if let Verdict::Blocked(reason) = self.classifier.classify(&host).await {
            warn!(host = %host, reason = %reason, "Blocked request");
            return Err(WardenError::BlockedDestination {
                host,
                reason: reason.to_string(),
            });
        }

        let mut body = ResponseBuffer::with_capacity(self.limits.response_buffer_bytes)?;
        let route = if self.proxy_mode.enabled() {
            Route::Tunnel
        } else {
            Route::Direct
        };
        info!(method = %request.method, url = %request.url, route = %route, "HTTP request");

        let status_code = match route {
            Route::Direct => {
                self.native
                    .execute(request, &mut body, self.limits.timeout)
                    .await?
            }
            Route::Tunnel => self.execute_tunnel(request, &host, &mut body).await?,
        };

        debug!(status_code, len = body.len(), truncated = body.is_truncated(), "request completed");
        Ok(DispatchOutcome {
            status_code,
            route,
            body,
        })
    }

    async fn execute_tunnel(
        &self,
        request: &HttpRequest,
        classified_host: &str,
        body: &mut ResponseBuffer,
    ) -> Result<u16, WardenError> {
        let parsed = decompose(&request.url)?;
        // The host runs to the first '/' or ':', so a bare query or fragment
        // would be sent to the proxy as part of the host.
        if parsed.host.contains(['?', '#']) {
            return Err(WardenError::InvalidArgument(
                "Proxied URLs need a '/' path before any query or fragment".to_string(),
            ));
        }
        // The tunnel must reach exactly the host that was classified.
        let tunnel_host = parsed.host.strip_suffix('.').unwrap_or(&parsed.host);
        if !tunnel_host.eq_ignore_ascii_case(classified_host) {
            return Err(WardenError::InvalidArgument(format!(
                "URL host '{}' is not in canonical form (expected '{classified_host}')",
                parsed.host.escape_debug()
            )));
        }

        let host_header = if parsed.port == parsed.scheme.default_port() {
            parsed.host.clone()
        } else {
            format!("{}:{}", parsed.host, parsed.port)
        };
        let framed = build_request(
            request.method,
            &parsed.path,
            &host_header,
            &request.headers,
            request.body_bytes(),
            self.limits.max_header_bytes,
        )?;

        let target = TunnelTarget {
            host: parsed.host,
            port: parsed.port,
            scheme: parsed.scheme,
        };
        let mut conn = self.tunnel.open(&target, self.limits.timeout).await?;

        match conn.write(framed.as_bytes()).await {
            Ok(n) if n == framed.len() => {}
            Ok(n) => {
                conn.close().await;
                return Err(WardenError::WriteFailure {
                    message: format!("{target}: short write ({n} of {} bytes)", framed.len()),
                    source: None,
                });
            }
            Err(e) => {
                conn.close().await;
                return Err(e);
            }
        }

        let received = read_to_end(
            conn.as_mut(),
            body,
            self.limits.read_chunk_bytes,
            self.limits.timeout,
        )
        .await;
        conn.close().await;
        debug!(destination = %target, received, "tunnel response read");

        Ok(deframe(body).status_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tracing_test::traced_test;
    use warden_core::Method;
    use warden_test_utils::{MockNativeClient, MockTunnelConnector, StaticResolver};

    struct Harness {
        dispatcher: Dispatcher,
        resolver: Arc<StaticResolver>,
        native: Arc<MockNativeClient>,
        tunnel: Arc<MockTunnelConnector>,
    }

    fn harness(native: MockNativeClient, tunnel: MockTunnelConnector, proxy: bool) -> Harness {
        let resolver = Arc::new(
            StaticResolver::new()
                .with("example.com", Ipv4Addr::new(93, 184, 216, 34))
                .with("intranet.lan", Ipv4Addr::new(192, 168, 1, 10))
                .with("localhost", Ipv4Addr::LOCALHOST),
        );
        let native = Arc::new(native);
        let tunnel = Arc::new(tunnel);
        let dispatcher = Dispatcher::new(
            Arc::new(DestinationClassifier::new(resolver.clone())),
            native.clone(),
            tunnel.clone(),
            ProxyMode::new(proxy),
            DispatchLimits::default(),
        );
        Harness {
            dispatcher,
            resolver,
            native,
            tunnel,
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn metadata_endpoint_blocked_before_io() {
        let h = harness(MockNativeClient::new(200, "x"), MockTunnelConnector::default(), false);
        let request = HttpRequest::new(Method::Get, "http://169.254.169.254/latest/meta-data");
        let err = h.dispatcher.execute(&request).await.unwrap_err();
        match err {
            WardenError::BlockedDestination { host, reason } => {
                assert_eq!(host, "169.254.169.254");
                assert_eq!(reason, "blocklisted");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(h.native.requests().await.is_empty());
        assert!(h.tunnel.targets().await.is_empty());
        assert_eq!(h.resolver.calls(), 0);
        assert!(logs_contain("Blocked request"));
    }

    #[tokio::test]
    async fn resolved_loopback_is_blocked() {
        let h = harness(MockNativeClient::new(200, "x"), MockTunnelConnector::default(), true);
        let request = HttpRequest::new(Method::Get, "http://localhost:8080/admin");
        assert!(matches!(
            h.dispatcher.execute(&request).await,
            Err(WardenError::BlockedDestination { .. })
        ));
        assert!(h.tunnel.targets().await.is_empty());
    }

    #[tokio::test]
    async fn private_network_goes_direct() {
        let h = harness(
            MockNativeClient::new(200, "hello"),
            MockTunnelConnector::default(),
            false,
        );
        let request = HttpRequest::new(Method::Get, "http://intranet.lan/status");
        let outcome = h.dispatcher.execute(&request).await.unwrap();
        assert_eq!(outcome.status_code, 200);
        assert_eq!(outcome.route, Route::Direct);
        assert_eq!(outcome.body.as_bytes(), b"hello");
        assert_eq!(h.native.requests().await, vec![request]);
    }

    #[tokio::test]
    async fn tunnel_path_frames_and_deframes() {
        let h = harness(
            MockNativeClient::new(200, "unused"),
            MockTunnelConnector::new(b"HTTP/1.1 404 Not Found\r\nServer: t\r\n\r\nnot found".to_vec()),
            true,
        );
        let request = HttpRequest::new(Method::Get, "https://example.com/a?b=1");
        let outcome = h.dispatcher.execute(&request).await.unwrap();
        assert_eq!(outcome.route, Route::Tunnel);
        assert_eq!(outcome.status_code, 404);
        assert_eq!(outcome.body.as_bytes(), b"not found");

        assert_eq!(
            h.tunnel.targets().await,
            vec![TunnelTarget {
                host: "example.com".to_string(),
                port: 443,
                scheme: Scheme::Https,
            }]
        );
        assert_eq!(
            h.tunnel.written().await,
            b"GET /a?b=1 HTTP/1.1\r\nHost: example.com\r\nConnection: close\r\n\r\n"
        );
        assert_eq!(h.tunnel.close_count(), 1);
        assert!(h.native.requests().await.is_empty());
    }

    #[tokio::test]
    async fn numeric_loopback_spellings_are_blocked_on_both_paths() {
        for proxy in [false, true] {
            let h = harness(MockNativeClient::new(200, "x"), MockTunnelConnector::default(), proxy);
            for url in [
                "http://127.0.0.1./",
                "http://2130706433./",
                "http://127.1./admin",
                "http://0x7f.1/",
                "http://169.254.169.254./latest/meta-data",
            ] {
                let err = h
                    .dispatcher
                    .execute(&HttpRequest::new(Method::Get, url))
                    .await
                    .unwrap_err();
                assert!(
                    matches!(err, WardenError::BlockedDestination { .. }),
                    "{url}: {err}"
                );
            }
            assert!(h.native.requests().await.is_empty());
            assert!(h.tunnel.targets().await.is_empty());
            assert_eq!(h.resolver.calls(), 0);
        }
    }

    #[tokio::test]
    async fn tunnel_requires_canonical_host() {
        let h = harness(
            MockNativeClient::new(200, ""),
            MockTunnelConnector::new(b"HTTP/1.1 200 OK\r\n\r\n".to_vec()),
            true,
        );
        // 134744072 is 8.8.8.8, which is allowed but not spelled canonically.
        let err = h
            .dispatcher
            .execute(&HttpRequest::new(Method::Get, "http://134744072/"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("canonical"), "{err}");
        assert!(h.tunnel.targets().await.is_empty());

        let outcome = h
            .dispatcher
            .execute(&HttpRequest::new(Method::Get, "http://Example.com./"))
            .await
            .unwrap();
        assert_eq!(outcome.route, Route::Tunnel);
    }

    #[tokio::test]
    async fn query_without_path_is_direct_only() {
        let request = HttpRequest::new(Method::Get, "http://example.com?q=1");

        let h = harness(MockNativeClient::new(200, "ok"), MockTunnelConnector::default(), true);
        let err = h.dispatcher.execute(&request).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Proxied URLs need a '/' path before any query or fragment"
        );
        let err = h
            .dispatcher
            .execute(&HttpRequest::new(Method::Get, "http://example.com#top"))
            .await
            .unwrap_err();
        assert!(matches!(err, WardenError::InvalidArgument(_)));
        assert!(h.tunnel.targets().await.is_empty());

        let h = harness(MockNativeClient::new(200, "ok"), MockTunnelConnector::default(), false);
        let outcome = h.dispatcher.execute(&request).await.unwrap();
        assert_eq!(outcome.route, Route::Direct);
        assert_eq!(outcome.body.as_bytes(), b"ok");
    }

    #[tokio::test]
    async fn non_default_port_is_carried_in_host_header() {
        let h = harness(
            MockNativeClient::new(200, ""),
            MockTunnelConnector::new(b"HTTP/1.1 200 OK\r\n\r\n".to_vec()),
            true,
        );
        let request = HttpRequest::new(Method::Post, "http://example.com:8080/submit")
            .with_header("Content-Type", "text/plain")
            .with_body("abc");
        h.dispatcher.execute(&request).await.unwrap();
        assert_eq!(
            h.tunnel.written().await,
            b"POST /submit HTTP/1.1\r\nHost: example.com:8080\r\nContent-Type: text/plain\r\n\
              Content-Length: 3\r\nConnection: close\r\n\r\nabc"
        );
        assert_eq!(h.tunnel.targets().await[0].port, 8080);
    }

    #[tokio::test]
    async fn tunnel_response_truncates_at_buffer_capacity() {
        let mut response = b"HTTP/1.1 200 OK\r\n\r\n".to_vec();
        response.extend(std::iter::repeat_n(b'z', 40_000));
        let h = harness(
            MockNativeClient::new(200, ""),
            MockTunnelConnector::new(response),
            true,
        );
        let outcome = h
            .dispatcher
            .execute(&HttpRequest::new(Method::Get, "http://example.com/big"))
            .await
            .unwrap();
        assert_eq!(outcome.status_code, 200);
        assert_eq!(outcome.body.len(), 16 * 1024 - 1 - 19);
        assert!(outcome.body.is_truncated());
    }

    #[tokio::test]
    async fn connect_failure_is_reported() {
        let h = harness(
            MockNativeClient::new(200, ""),
            MockTunnelConnector::default().fail_open(),
            true,
        );
        let result = h
            .dispatcher
            .execute(&HttpRequest::new(Method::Get, "http://example.com/"))
            .await;
        assert!(matches!(result, Err(WardenError::ConnectFailure { .. })));
    }

    #[tokio::test]
    async fn write_failure_closes_tunnel() {
        let h = harness(
            MockNativeClient::new(200, ""),
            MockTunnelConnector::default().fail_write(),
            true,
        );
        let result = h
            .dispatcher
            .execute(&HttpRequest::new(Method::Get, "http://example.com/"))
            .await;
        assert!(matches!(result, Err(WardenError::WriteFailure { .. })));
        assert_eq!(h.tunnel.close_count(), 1);
    }

    #[tokio::test]
    async fn header_injection_rejected_before_classification() {
        let h = harness(MockNativeClient::new(200, ""), MockTunnelConnector::default(), false);
        let request = HttpRequest::new(Method::Get, "http://example.com/")
            .with_header("X-Evil", "1\r\nHost: 127.0.0.1");
        assert!(matches!(
            h.dispatcher.execute(&request).await,
            Err(WardenError::InvalidArgument(_))
        ));
        assert_eq!(h.resolver.calls(), 0);
        assert!(h.native.requests().await.is_empty());
    }

    #[tokio::test]
    async fn unsupported_scheme_is_rejected() {
        let h = harness(MockNativeClient::new(200, ""), MockTunnelConnector::default(), false);
        let result = h
            .dispatcher
            .execute(&HttpRequest::new(Method::Get, "ftp://example.com/"))
            .await;
        assert!(matches!(result, Err(WardenError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn proxy_flag_is_read_per_dispatch() {
        let h = harness(
            MockNativeClient::new(200, "direct"),
            MockTunnelConnector::new(b"HTTP/1.1 200 OK\r\n\r\ntunnel".to_vec()),
            false,
        );
        let request = HttpRequest::new(Method::Get, "http://example.com/");
        let first = h.dispatcher.execute(&request).await.unwrap();
        assert_eq!(first.route, Route::Direct);

        h.dispatcher.proxy_mode().set(true);
        let second = h.dispatcher.execute(&request).await.unwrap();
        assert_eq!(second.route, Route::Tunnel);
        assert_eq!(second.body.as_bytes(), b"tunnel");
    }

    #[test]
    fn from_config_honours_proxy_flag() {
        let mut config = WardenConfig::default();
        let dispatcher = Dispatcher::from_config(&config).unwrap();
        assert!(!dispatcher.proxy_mode().enabled());

        config.proxy.enabled = true;
        config.proxy.host = Some("proxy.lan".to_string());
        config.http.response_buffer_bytes = 4096;
        let dispatcher = Dispatcher::from_config(&config).unwrap();
        assert!(dispatcher.proxy_mode().enabled());
        assert_eq!(dispatcher.limits().response_buffer_bytes, 4096);
    }

    #[tokio::test]
    async fn native_failure_propagates() {
        let h = harness(
            MockNativeClient::failing("tls handshake failed"),
            MockTunnelConnector::default(),
            false,
        );
        let err = h
            .dispatcher
            .execute(&HttpRequest::new(Method::Get, "https://example.com/"))
            .await
            .unwrap_err();
        assert!(err.is_request_failure());
    }
}
