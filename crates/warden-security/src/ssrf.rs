// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connect-time address filtering for the native client.
//!
//! The pre-flight classifier resolves a host once; the native client resolves
//! it again when it connects. [`GuardedResolver`] implements
//! `reqwest::dns::Resolve` and drops any address the classifier would block,
//! so a name that re-resolves to an internal address between the two lookups
//! cannot be reached.

use std::net::{IpAddr, SocketAddr};

use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use tracing::warn;

use crate::classifier::{classify_ipv4, BlockReason};

/// DNS resolver for reqwest that removes unsafe IPv4 addresses.
#[derive(Debug, Clone, Default)]
pub struct GuardedResolver;

impl GuardedResolver {
    pub fn new() -> Self {
        Self
    }

    /// Block reason for a resolved socket address, if any.
    ///
    /// IPv6 addresses are only checked when they embed an IPv4 address.
    pub fn check(ip: &IpAddr) -> Option<BlockReason> {
        match ip {
            IpAddr::V4(v4) => classify_ipv4(*v4),
            IpAddr::V6(v6) => v6.to_ipv4_mapped().and_then(classify_ipv4),
        }
    }

    /// Keep only addresses that pass [`GuardedResolver::check`].
    pub fn filter(host: &str, addrs: impl IntoIterator<Item = SocketAddr>) -> Vec<SocketAddr> {
        addrs
            .into_iter()
            .filter(|addr| match Self::check(&addr.ip()) {
                Some(reason) => {
                    warn!(host = %host, ip = %addr.ip(), reason = %reason, "dropping unsafe address at connect time");
                    false
                }
                None => true,
            })
            .collect()
    }
}

impl Resolve for GuardedResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let hostname = name.as_str().to_string();

        Box::pin(async move {
            let addrs: Vec<SocketAddr> = tokio::net::lookup_host(format!("{hostname}:0"))
                .await
                .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })?
                .collect();

            let filtered = GuardedResolver::filter(&hostname, addrs);
            if filtered.is_empty() {
                let err: Box<dyn std::error::Error + Send + Sync> =
                    format!("{hostname} resolves only to blocked addresses").into();
                return Err(err);
            }

            let addrs: Addrs = Box::new(filtered.into_iter());
            Ok(addrs)
        })
    }
}
