// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pre-flight destination safety classification.
//!
//! Every outbound request passes through [`DestinationClassifier::classify`]
//! exactly once before any connection is attempted. A host is blocked when it
//! matches the metadata blocklist (case-insensitively, without resolving it)
//! or when its first resolved IPv4 address falls in an internal range.
//! Hosts that fail to resolve, or resolve only to IPv6, are allowed.

use std::net::Ipv4Addr;
use std::sync::Arc;

use strum::Display;
use tracing::debug;
use url::{Host, Url};
use warden_config::model::SecurityConfig;
use warden_core::{HostResolver, WardenError};

/// Cloud metadata and cluster-internal endpoints that are never reachable.
pub const BLOCKED_HOSTS: &[&str] = &[
    "metadata.google.internal",
    "169.254.169.254",
    "metadata.internal",
    "kubernetes.default.svc",
    "100.100.100.200",
];

/// Longest host accepted by [`extract_host`].
const MAX_HOST_LEN: usize = 255;

/// Why a destination was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum BlockReason {
    /// Host matched the blocklist.
    Blocklisted,
    /// 127.0.0.0/8
    Loopback,
    /// 169.254.0.0/16
    LinkLocal,
    /// 100.64.0.0/10
    CarrierGradeNat,
    /// 0.0.0.0/8
    ThisNetwork,
    /// 224.0.0.0 and above.
    MulticastOrReserved,
}

/// Outcome of classifying a destination host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Blocked(BlockReason),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed)
    }

    pub fn is_blocked(&self) -> bool {
        !self.is_allowed()
    }
}

/// Classify a resolved IPv4 address, returning the reason it is unsafe.
///
/// RFC 1918 private ranges are deliberately allowed.
pub fn classify_ipv4(ip: Ipv4Addr) -> Option<BlockReason> {
    let [a, b, _, _] = ip.octets();
    match (a, b) {
        (127, _) => Some(BlockReason::Loopback),
        (169, 254) => Some(BlockReason::LinkLocal),
        (100, 64..=127) => Some(BlockReason::CarrierGradeNat),
        (0, _) => Some(BlockReason::ThisNetwork),
        (224..=255, _) => Some(BlockReason::MulticastOrReserved),
        _ => None,
    }
}

/// Extract the host the classifier checks from an absolute URL.
///
/// The URL is parsed with the same WHATWG rules the native client applies, so
/// numeric hosts such as `2130706433`, `127.1` or `127.0.0.1.` come back as
/// the dotted IPv4 address they denote. Domain names are lowercased and lose
/// one trailing dot.
///
/// URLs with credentials, IPv6 literals or control characters are rejected.
/// So are empty hosts, oversized hosts and hosts with characters outside
/// `[A-Za-z0-9._-]`.
pub fn extract_host(url: &str) -> Result<String, WardenError> {
    if url.bytes().any(|b| b.is_ascii_control()) {
        return Err(invalid("URL must not contain control characters"));
    }
    let rest = match url.split_once("://") {
        Some(("http" | "https", rest)) => rest,
        _ => return Err(invalid("URL must start with http:// or https://")),
    };

    let authority_end = rest.find(['/', '\\', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..authority_end];
    if authority.is_empty() {
        return Err(invalid("URL has no host"));
    }
    if authority.contains('@') {
        return Err(invalid("URL must not contain credentials"));
    }

    let parsed = Url::parse(url)
        .map_err(|e| WardenError::InvalidArgument(format!("Invalid URL: {e}")))?;
    let host = match parsed.host() {
        Some(Host::Ipv4(ip)) => return Ok(ip.to_string()),
        Some(Host::Ipv6(_)) => return Err(invalid("IPv6 literal hosts are not supported")),
        Some(Host::Domain(domain)) => domain.strip_suffix('.').unwrap_or(domain),
        None => return Err(invalid("URL has no host")),
    };

    if host.is_empty() {
        return Err(invalid("URL has no host"));
    }
    if host.len() > MAX_HOST_LEN {
        return Err(WardenError::InvalidArgument(format!(
            "URL host exceeds {MAX_HOST_LEN} bytes"
        )));
    }
    if !host
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_'))
    {
        return Err(WardenError::InvalidArgument(format!(
            "Invalid host '{}' in URL",
            host.escape_debug()
        )));
    }

    Ok(host.to_string())
}

/// Rewrite a bare host the way URL parsing would: numeric IPv4 forms become
/// dotted quads and names lose one trailing dot.
fn canonical_host(host: &str) -> String {
    match Host::parse(host) {
        Ok(Host::Ipv4(ip)) => ip.to_string(),
        _ => host.strip_suffix('.').unwrap_or(host).to_string(),
    }
}

fn invalid(message: &str) -> WardenError {
    WardenError::InvalidArgument(message.to_string())
}

/// Decides whether a destination host may be contacted.
///
/// The blocklist is fixed at construction. Classification holds no locks and
/// is safe to call from many tasks at once.
pub struct DestinationClassifier {
    resolver: Arc<dyn HostResolver>,
    blocked: Vec<String>,
}

impl DestinationClassifier {
    /// Create a classifier using the built-in blocklist.
    pub fn new(resolver: Arc<dyn HostResolver>) -> Self {
        Self {
            resolver,
            blocked: BLOCKED_HOSTS.iter().map(|h| h.to_string()).collect(),
        }
    }

    /// Create a classifier with the built-in blocklist plus the configured extras.
    pub fn from_config(config: &SecurityConfig, resolver: Arc<dyn HostResolver>) -> Self {
        Self::new(resolver).with_extra_blocked_hosts(&config.extra_blocked_hosts)
    }

    /// Extend the blocklist. Entries are trimmed and compared case-insensitively.
    pub fn with_extra_blocked_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for host in hosts {
            let host = host.as_ref().trim();
            if !host.is_empty() && !self.is_blocklisted(host) {
                self.blocked.push(host.to_ascii_lowercase());
            }
        }
        self
    }

    /// Whether `host` matches a blocklist entry exactly, ignoring ASCII case.
    pub fn is_blocklisted(&self, host: &str) -> bool {
        self.blocked.iter().any(|b| b.eq_ignore_ascii_case(host))
    }

    /// Classify `host`, resolving it only if it is not blocklisted.
    ///
    /// The host is canonicalised first, so `127.1`, `2130706433.` and
    /// `metadata.google.internal.` are judged as the destinations they name.
    pub async fn classify(&self, host: &str) -> Verdict {
        let host = canonical_host(host);
        let host = host.as_str();
        if self.is_blocklisted(host) {
            debug!(host = %host, "host is blocklisted");
            return Verdict::Blocked(BlockReason::Blocklisted);
        }

        let ip = match host.parse::<Ipv4Addr>() {
            Ok(literal) => literal,
            Err(_) => match self.resolver.resolve_ipv4(host).await {
                Some(ip) => ip,
                None => {
                    debug!(host = %host, "no IPv4 address resolved, allowing");
                    return Verdict::Allowed;
                }
            },
        };

        match classify_ipv4(ip) {
            Some(reason) => {
                debug!(host = %host, ip = %ip, reason = %reason, "resolved to unsafe address");
                Verdict::Blocked(reason)
            }
            None => Verdict::Allowed,
        }
    }
}
