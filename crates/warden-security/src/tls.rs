// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hardened reqwest client for the direct request path.

use std::sync::Arc;

use tracing::error;
use warden_config::model::HttpConfig;
use warden_core::WardenError;

use crate::ssrf::GuardedResolver;

/// Build the reqwest::Client used by the direct path.
///
/// - Minimum TLS 1.2 with certificate verification.
/// - Redirects are not followed, so a response can never move the request to
///   a host the classifier has not seen.
/// - Connect and per-read timeouts from `http.timeout_ms`.
/// - Connect-time address filtering via [`GuardedResolver`].
pub fn build_native_client(config: &HttpConfig) -> Result<reqwest::Client, WardenError> {
    reqwest::Client::builder()
        .min_tls_version(reqwest::tls::Version::TLS_1_2)
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(config.timeout())
        .read_timeout(config.timeout())
        .dns_resolver(Arc::new(GuardedResolver::new()))
        .build()
        .map_err(|e| {
            error!("failed to build native HTTP client: {e}");
            WardenError::Config(format!("failed to build native HTTP client: {e}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_native_client_succeeds() {
        assert!(build_native_client(&HttpConfig::default()).is_ok());
    }

    #[test]
    fn build_native_client_accepts_short_timeouts() {
        let config = HttpConfig {
            timeout_ms: 1,
            ..HttpConfig::default()
        };
        assert!(build_native_client(&config).is_ok());
    }
}
