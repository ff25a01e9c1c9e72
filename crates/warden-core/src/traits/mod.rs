// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits consumed by the dispatcher and the classifier.
//!
//! All traits use `#[async_trait]` so implementations can be held as
//! `Arc<dyn ...>` and swapped for scripted mocks in tests.

pub mod resolver;
pub mod transport;

pub use resolver::HostResolver;
pub use transport::{NativeClient, TunnelConnection, TunnelConnector};
