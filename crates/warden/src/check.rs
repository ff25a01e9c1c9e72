// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `warden check`: classify a host without contacting it.

use std::sync::Arc;

use warden_config::WardenConfig;
use warden_security::{DestinationClassifier, SystemResolver, Verdict};

/// Print the verdict for `host`. Exits 0 when allowed, 1 when blocked.
pub async fn run(config: &WardenConfig, host: &str) -> i32 {
    let resolver = Arc::new(SystemResolver::new(config.http.timeout()));
    let classifier = DestinationClassifier::from_config(&config.security, resolver);
    match classifier.classify(host).await {
        Verdict::Allowed => {
            println!("{host}: allowed");
            0
        }
        Verdict::Blocked(reason) => {
            println!("{host}: blocked ({reason})");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blocklisted_host_is_reported_blocked() {
        assert_eq!(run(&WardenConfig::default(), "metadata.internal").await, 1);
    }

    #[tokio::test]
    async fn configured_extra_host_is_blocked() {
        let mut config = WardenConfig::default();
        config.security.extra_blocked_hosts = vec!["vault.corp".to_string()];
        assert_eq!(run(&config, "VAULT.corp").await, 1);
    }

    #[tokio::test]
    async fn loopback_literal_is_blocked() {
        assert_eq!(run(&WardenConfig::default(), "127.0.0.1").await, 1);
    }

    #[tokio::test]
    async fn numeric_loopback_spellings_are_blocked() {
        for host in ["127.0.0.1.", "2130706433", "127.1"] {
            assert_eq!(run(&WardenConfig::default(), host).await, 1, "{host}");
        }
    }

    #[tokio::test]
    async fn private_literal_is_allowed() {
        assert_eq!(run(&WardenConfig::default(), "10.1.2.3").await, 0);
    }
}
