// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Name resolution used by the destination safety classifier.

use std::net::Ipv4Addr;

use async_trait::async_trait;

/// Resolves a hostname to at most one IPv4 address.
///
/// Resolution failures are not errors: the classifier treats an unresolvable
/// name as allowed, so implementations return `None` for NXDOMAIN, timeouts,
/// and IPv6-only names alike.
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Returns the first IPv4 address `host` resolves to, if any.
    async fn resolve_ipv4(&self, host: &str) -> Option<Ipv4Addr>;
}
