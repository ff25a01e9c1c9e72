// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request types shared by the dispatcher, the transports, and the tool surface.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::WardenError;

/// HTTP methods the tool surface accepts.
///
/// Parsing is case-sensitive: `"get"` is rejected just like `"OPTIONS"`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
}

impl Method {
    /// Human-readable list used in validation messages.
    pub const SUPPORTED: &'static str = "GET, POST, PUT, DELETE, PATCH, HEAD";

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
        }
    }
}

/// URL schemes Warden will dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn default_port(&self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            Scheme::Http => "http://",
            Scheme::Https => "https://",
        }
    }

    /// Recognise the scheme prefix of a URL, if any.
    pub fn detect(url: &str) -> Option<Scheme> {
        if url.starts_with("https://") {
            Some(Scheme::Https)
        } else if url.starts_with("http://") {
            Some(Scheme::Http)
        } else {
            None
        }
    }
}

/// Ordered header pairs forwarded to the destination.
///
/// Duplicates are kept and input order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<(String, String)>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reject header names and values that would corrupt the request framing.
    ///
    /// Names must be non-empty and free of whitespace, control characters and
    /// `:`. Values must not contain CR, LF or NUL.
    pub fn validate(&self) -> Result<(), WardenError> {
        for (name, value) in &self.entries {
            if name.is_empty() {
                return Err(WardenError::InvalidArgument(
                    "Header name must not be empty".to_string(),
                ));
            }
            if name
                .bytes()
                .any(|b| b == b':' || b.is_ascii_whitespace() || b.is_ascii_control())
            {
                return Err(WardenError::InvalidArgument(format!(
                    "Invalid header name '{}'",
                    name.escape_debug()
                )));
            }
            if value.bytes().any(|b| matches!(b, b'\r' | b'\n' | 0)) {
                return Err(WardenError::InvalidArgument(format!(
                    "Header '{name}' contains a line break"
                )));
            }
        }
        Ok(())
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for HeaderSet {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}

/// A validated outbound request as handed to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderSet,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderSet::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Body bytes, treating an empty string the same as no body.
    pub fn body_bytes(&self) -> &[u8] {
        self.body.as_deref().map(str::as_bytes).unwrap_or_default()
    }
}

/// Destination handed to the tunnel transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelTarget {
    pub host: String,
    pub port: u16,
    pub scheme: Scheme,
}

impl std::fmt::Display for TunnelTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
