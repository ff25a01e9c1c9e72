// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Destination safety enforcement for the Warden egress guard.
//!
//! Provides the pre-flight destination classifier (static blocklist plus
//! resolved-IPv4 classification), the system resolver it uses, and a
//! hardened reqwest client that re-checks addresses at connect time.

pub mod classifier;
pub mod resolver;
pub mod ssrf;
pub mod tls;

pub use classifier::{
    classify_ipv4, extract_host, BlockReason, DestinationClassifier, Verdict, BLOCKED_HOSTS,
};
pub use resolver::SystemResolver;
pub use ssrf::GuardedResolver;
pub use tls::build_native_client;
