// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./warden.toml` > `~/.config/warden/warden.toml` > `/etc/warden/warden.toml`
//! with environment variable overrides via `WARDEN_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use tracing::debug;

use crate::model::WardenConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/warden/warden.toml` (system-wide)
/// 3. `~/.config/warden/warden.toml` (user XDG config)
/// 4. `./warden.toml` (local directory)
/// 5. `WARDEN_*` environment variables
pub fn load_config() -> Result<WardenConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<WardenConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WardenConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<WardenConfig, figment::Error> {
    debug!(path = %path.display(), "loading configuration file");
    Figment::new()
        .merge(Serialized::defaults(WardenConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for the XDG hierarchy before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(WardenConfig::default()))
        .merge(Toml::file("/etc/warden/warden.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("warden/warden.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("warden.toml"))
        .merge(env_provider())
}

/// Environment provider mapping `WARDEN_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys themselves
/// contain underscores: `WARDEN_HTTP_TIMEOUT_MS` must become
/// `http.timeout_ms`, not `http.timeout.ms`.
fn env_provider() -> Env {
    Env::prefixed("WARDEN_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("http_", "http.", 1)
            .replacen("proxy_", "proxy.", 1)
            .replacen("security_", "security.", 1)
            .replacen("logging_", "logging.", 1);
        mapped.into()
    })
}
