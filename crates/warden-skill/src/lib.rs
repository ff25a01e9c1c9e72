// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool surface for the Warden egress guard.
//!
//! Exposes the guarded HTTP engine to an agent runtime as a JSON-in,
//! text-out tool named `http_request`.

pub mod builtin;
pub mod tool;

pub use builtin::{register_builtins, HttpRequestTool};
pub use tool::{Tool, ToolOutput, ToolRegistry};
