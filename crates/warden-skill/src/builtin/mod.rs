// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in tools.

pub mod http;

pub use http::HttpRequestTool;

use std::sync::Arc;

use warden_config::model::WardenConfig;
use warden_core::WardenError;

use crate::ToolRegistry;

/// Registers all built-in tools into the given registry.
pub fn register_builtins(
    registry: &mut ToolRegistry,
    config: &WardenConfig,
) -> Result<(), WardenError> {
    registry.register(Arc::new(HttpRequestTool::from_config(config)?));
    Ok(())
}
