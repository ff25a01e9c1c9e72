// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! URL decomposition for the tunnel path.
//!
//! Deliberately lenient: only the scheme is validated. The port is read with
//! leading-digit semantics and oversized hosts and paths are truncated, not
//! rejected. Host safety is decided earlier by the classifier.

use warden_core::{Scheme, WardenError};

const MAX_HOST_BYTES: usize = 127;
const MAX_PATH_BYTES: usize = 511;

/// A URL split into the parts needed to open a tunnel and frame a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    /// Path and query, always starting with `/`.
    pub path: String,
}

/// Split `url` into scheme, host, port and path.
///
/// - The host runs to the first `/` or `:`.
/// - A `:` before any `/` introduces a port; anything that is not a leading
///   run of digits in range yields port 0.
/// - The path starts at the first `/`, or is `/` if there is none.
pub fn decompose(url: &str) -> Result<ParsedUrl, WardenError> {
    let scheme = Scheme::detect(url).ok_or_else(|| {
        WardenError::InvalidArgument("URL must start with http:// or https://".to_string())
    })?;
    let rest = &url[scheme.prefix().len()..];

    let host_end = rest.find(['/', ':']).unwrap_or(rest.len());
    let host = truncate(&rest[..host_end], MAX_HOST_BYTES);

    let port = match rest[host_end..].strip_prefix(':') {
        Some(after_colon) => {
            let port_end = after_colon.find('/').unwrap_or(after_colon.len());
            leading_port(&after_colon[..port_end])
        }
        None => scheme.default_port(),
    };

    let path = match rest.find('/') {
        Some(start) => truncate(&rest[start..], MAX_PATH_BYTES),
        None => "/",
    };

    Ok(ParsedUrl {
        scheme,
        host: host.to_string(),
        port,
        path: path.to_string(),
    })
}

/// Parse the leading decimal digits of `text`; 0 if there are none or the
/// value does not fit in a port.
fn leading_port(text: &str) -> u16 {
    let digits_end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text[..digits_end].parse().unwrap_or(0)
}

/// Longest prefix of `s` that is at most `max` bytes and ends on a char boundary.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_port_overrides_scheme_default() {
        let parsed = decompose("https://example.com:8443/x?y=1").unwrap();
        assert_eq!(
            parsed,
            ParsedUrl {
                scheme: Scheme::Https,
                host: "example.com".to_string(),
                port: 8443,
                path: "/x?y=1".to_string(),
            }
        );
    }

    #[test]
    fn bare_host_gets_root_path() {
        let parsed = decompose("http://example.com").unwrap();
        assert_eq!(parsed.host, "example.com");
        assert_eq!(parsed.port, 80);
        assert_eq!(parsed.path, "/");
    }

    #[test]
    fn https_defaults_to_443() {
        let parsed = decompose("https://api.example.com/v1/items").unwrap();
        assert_eq!(parsed.port, 443);
        assert_eq!(parsed.path, "/v1/items");
    }

    #[test]
    fn unknown_scheme_is_rejected() {
        for url in ["ftp://example.com/", "example.com", "HTTP://example.com"] {
            assert!(matches!(
                decompose(url),
                Err(WardenError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn port_parsing_is_lenient() {
        assert_eq!(decompose("http://h:abc/").unwrap().port, 0);
        assert_eq!(decompose("http://h:/").unwrap().port, 0);
        assert_eq!(decompose("http://h:99999/").unwrap().port, 0);
        assert_eq!(decompose("http://h:81x/").unwrap().port, 81);
        assert_eq!(decompose("http://h:8080").unwrap().port, 8080);
    }

    #[test]
    fn colon_after_slash_is_part_of_path() {
        let parsed = decompose("http://h/a:b").unwrap();
        assert_eq!(parsed.host, "h");
        assert_eq!(parsed.port, 80);
        assert_eq!(parsed.path, "/a:b");
    }

    #[test]
    fn oversized_parts_are_truncated() {
        let host = "h".repeat(200);
        let path = format!("/{}", "p".repeat(600));
        let parsed = decompose(&format!("http://{host}{path}")).unwrap();
        assert_eq!(parsed.host.len(), MAX_HOST_BYTES);
        assert_eq!(parsed.path.len(), MAX_PATH_BYTES);
        assert!(parsed.path.starts_with('/'));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let path = format!("/{}", "é".repeat(400));
        let parsed = decompose(&format!("http://h{path}")).unwrap();
        assert!(parsed.path.len() <= MAX_PATH_BYTES);
        assert!(parsed.path.len() >= MAX_PATH_BYTES - 1);
    }
}
