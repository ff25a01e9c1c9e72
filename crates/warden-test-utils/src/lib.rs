// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Warden integration tests.
//!
//! Provides scripted collaborators so the classifier, dispatcher and tool can
//! be exercised without DNS, sockets, or a real proxy.

pub mod mock_native;
pub mod mock_resolver;
pub mod mock_tunnel;

pub use mock_native::MockNativeClient;
pub use mock_resolver::StaticResolver;
pub use mock_tunnel::{MockTunnelConnection, MockTunnelConnector};
