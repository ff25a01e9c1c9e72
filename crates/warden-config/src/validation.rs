// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-zero timeouts and a proxy host being present when the tunnel
//! path is enabled.

use crate::diagnostic::ConfigError;
use crate::model::WardenConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &WardenConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.http.timeout_ms == 0 {
        fail("http.timeout_ms must be greater than 0".to_string());
    }

    // One byte of every buffer is reserved for the terminator.
    if config.http.response_buffer_bytes < 2 {
        fail(format!(
            "http.response_buffer_bytes must be at least 2, got {}",
            config.http.response_buffer_bytes
        ));
    }

    if config.http.read_chunk_bytes == 0 {
        fail("http.read_chunk_bytes must be greater than 0".to_string());
    }

    if config.http.max_header_bytes < 64 {
        fail(format!(
            "http.max_header_bytes must be at least 64, got {}",
            config.http.max_header_bytes
        ));
    }

    if config.http.output_limit_bytes < 2 {
        fail(format!(
            "http.output_limit_bytes must be at least 2, got {}",
            config.http.output_limit_bytes
        ));
    }

    if config.proxy.enabled {
        match config.proxy.host.as_deref().map(str::trim) {
            None | Some("") => {
                fail("proxy.host must be set when proxy.enabled is true".to_string())
            }
            Some(host) if host.contains(['/', ' ']) => fail(format!(
                "proxy.host `{host}` must be a bare hostname or IP address"
            )),
            Some(_) => {}
        }
        if config.proxy.port == 0 {
            fail("proxy.port must be greater than 0".to_string());
        }
    }

    for (i, host) in config.security.extra_blocked_hosts.iter().enumerate() {
        if host.trim().is_empty() {
            fail(format!("security.extra_blocked_hosts[{i}] must not be empty"));
        }
    }

    if !LOG_LEVELS.contains(&config.logging.level.to_ascii_lowercase().as_str()) {
        fail(format!(
            "logging.level `{}` is not one of {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&WardenConfig::default()).is_ok());
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let mut config = WardenConfig::default();
        config.http.timeout_ms = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "timeout_ms"));
    }

    #[test]
    fn enabled_proxy_requires_host() {
        let mut config = WardenConfig::default();
        config.proxy.enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "proxy.host must be set"));

        config.proxy.host = Some("proxy.lan".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn disabled_proxy_ignores_missing_host() {
        let mut config = WardenConfig::default();
        config.proxy.port = 0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = WardenConfig::default();
        config.http.timeout_ms = 0;
        config.http.response_buffer_bytes = 1;
        config.logging.level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(has_error(&errors, "logging.level"));
    }

    #[test]
    fn empty_extra_blocked_host_fails_validation() {
        let mut config = WardenConfig::default();
        config.security.extra_blocked_hosts = vec!["ok.internal".into(), "  ".into()];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "extra_blocked_hosts[1]"));
    }
}
