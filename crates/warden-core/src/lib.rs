// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Warden egress guard.
//!
//! This crate provides the error type, the request types shared across the
//! workspace, the bounded [`ResponseBuffer`], and the collaborator traits the
//! dispatcher is written against. Concrete resolvers and transports live in
//! `warden-security` and `warden-http`.

pub mod buffer;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use buffer::ResponseBuffer;
pub use error::WardenError;
pub use types::{HeaderSet, HttpRequest, Method, Scheme, TunnelTarget};

pub use traits::{HostResolver, NativeClient, TunnelConnection, TunnelConnector};
