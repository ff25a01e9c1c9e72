// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-table resolver for deterministic classification tests.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use warden_core::HostResolver;

/// Resolves names from a static table and counts lookups.
///
/// Names missing from the table resolve to `None`, like NXDOMAIN.
#[derive(Debug, Default)]
pub struct StaticResolver {
    entries: HashMap<String, Ipv4Addr>,
    calls: AtomicUsize,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a name to the table. Names are matched case-insensitively.
    pub fn with(mut self, host: &str, ip: Ipv4Addr) -> Self {
        self.entries.insert(host.to_ascii_lowercase(), ip);
        self
    }

    /// Number of lookups performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostResolver for StaticResolver {
    async fn resolve_ipv4(&self, host: &str) -> Option<Ipv4Addr> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entries.get(&host.to_ascii_lowercase()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_known_names_and_counts_calls() {
        let resolver = StaticResolver::new().with("Example.COM", Ipv4Addr::new(93, 184, 216, 34));
        assert_eq!(
            resolver.resolve_ipv4("example.com").await,
            Some(Ipv4Addr::new(93, 184, 216, 34))
        );
        assert_eq!(resolver.resolve_ipv4("missing.test").await, None);
        assert_eq!(resolver.calls(), 2);
    }
}
