// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System DNS resolution for the destination classifier.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use warden_core::HostResolver;

/// Resolves names through the operating system resolver.
///
/// Each lookup is bounded by `timeout`; a lookup that errors, times out, or
/// yields no IPv4 address resolves to `None`.
#[derive(Debug, Clone)]
pub struct SystemResolver {
    timeout: Duration,
}

impl SystemResolver {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl HostResolver for SystemResolver {
    async fn resolve_ipv4(&self, host: &str) -> Option<Ipv4Addr> {
        let target = format!("{host}:0");
        let addrs = match tokio::time::timeout(self.timeout, tokio::net::lookup_host(target)).await
        {
            Ok(Ok(addrs)) => addrs,
            Ok(Err(e)) => {
                debug!(host = %host, error = %e, "name resolution failed");
                return None;
            }
            Err(_) => {
                debug!(host = %host, timeout = ?self.timeout, "name resolution timed out");
                return None;
            }
        };

        addrs
            .map(|addr| addr.ip())
            .find_map(|ip| match ip {
                IpAddr::V4(v4) => Some(v4),
                IpAddr::V6(_) => None,
            })
    }
}
