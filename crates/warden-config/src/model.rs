// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Warden egress guard.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Warden configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WardenConfig {
    /// Request execution limits.
    #[serde(default)]
    pub http: HttpConfig,

    /// Upstream proxy tunnel settings.
    #[serde(default)]
    pub proxy: ProxyConfig,

    /// Destination safety settings.
    #[serde(default)]
    pub security: SecurityConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Request execution limits shared by the direct and tunnel paths.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Timeout applied to each resolve, connect, write, and read individually.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Capacity of the per-request response buffer, including the reserved terminator byte.
    #[serde(default = "default_response_buffer_bytes")]
    pub response_buffer_bytes: usize,

    /// Size of each read from the tunnel.
    #[serde(default = "default_read_chunk_bytes")]
    pub read_chunk_bytes: usize,

    /// Upper bound on the rendered request head on the tunnel path.
    #[serde(default = "default_max_header_bytes")]
    pub max_header_bytes: usize,

    /// Size of the tool's text output, including the reserved terminator byte.
    #[serde(default = "default_output_limit_bytes")]
    pub output_limit_bytes: usize,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            response_buffer_bytes: default_response_buffer_bytes(),
            read_chunk_bytes: default_read_chunk_bytes(),
            max_header_bytes: default_max_header_bytes(),
            output_limit_bytes: default_output_limit_bytes(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_response_buffer_bytes() -> usize {
    16 * 1024
}

fn default_read_chunk_bytes() -> usize {
    4096
}

fn default_max_header_bytes() -> usize {
    2048
}

fn default_output_limit_bytes() -> usize {
    16 * 1024
}

/// Upstream proxy used for the tunnel path.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProxyConfig {
    /// Route requests through the tunnel instead of the native client.
    #[serde(default)]
    pub enabled: bool,

    /// Proxy hostname or IP. Required when `enabled` is true.
    #[serde(default)]
    pub host: Option<String>,

    /// Proxy port.
    #[serde(default = "default_proxy_port")]
    pub port: u16,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: None,
            port: default_proxy_port(),
        }
    }
}

fn default_proxy_port() -> u16 {
    8080
}

/// Destination safety configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    /// Hostnames blocked in addition to the built-in metadata blocklist.
    #[serde(default)]
    pub extra_blocked_hosts: Vec<String>,
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
