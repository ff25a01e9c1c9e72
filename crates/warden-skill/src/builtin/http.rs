// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in `http_request` tool.
//!
//! Parses the agent's JSON request, runs it through the guarded dispatcher,
//! and renders either `Status: <code>\n\n<body>` or `Error: <message>`. The
//! rendered text never exceeds `output_limit - 1` bytes; one byte of the
//! limit is reserved for the caller's terminator.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};
use warden_config::model::WardenConfig;
use warden_core::{HeaderSet, HttpRequest, Method, Scheme, WardenError};
use warden_http::Dispatcher;

use crate::tool::{Tool, ToolOutput};

/// Makes guarded HTTP requests on behalf of the agent.
pub struct HttpRequestTool {
    dispatcher: Arc<Dispatcher>,
    output_limit: usize,
}

impl HttpRequestTool {
    pub fn new(dispatcher: Arc<Dispatcher>, output_limit: usize) -> Self {
        Self {
            dispatcher,
            output_limit,
        }
    }

    /// Build the tool with production collaborators.
    pub fn from_config(config: &WardenConfig) -> Result<Self, WardenError> {
        Ok(Self::new(
            Arc::new(Dispatcher::from_config(config)?),
            config.http.output_limit_bytes,
        ))
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Turn tool input into a request, validating everything that does not
    /// need the network.
    pub fn parse_request(input: &Value) -> Result<HttpRequest, WardenError> {
        // Non-object input has no fields, so it fails on the missing url.
        let url = match input.get("url").and_then(Value::as_str) {
            Some(url) if !url.is_empty() => url,
            _ => return Err(WardenError::InvalidArgument("Missing 'url' field".to_string())),
        };
        if Scheme::detect(url).is_none() {
            return Err(WardenError::InvalidArgument(
                "URL must start with http:// or https://".to_string(),
            ));
        }

        let method = match input.get("method").and_then(Value::as_str) {
            None | Some("") => Method::Get,
            Some(name) => Method::from_str(name).map_err(|_| {
                WardenError::InvalidArgument(format!(
                    "Unsupported method '{name}'. Supported: {}",
                    Method::SUPPORTED
                ))
            })?,
        };

        let headers: HeaderSet = input
            .get("headers")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(name, value)| value.as_str().map(|v| (name.as_str(), v)))
                    .collect()
            })
            .unwrap_or_default();

        let body = input
            .get("body")
            .and_then(Value::as_str)
            .filter(|b| !b.is_empty())
            .map(str::to_string);

        Ok(HttpRequest {
            method,
            url: url.to_string(),
            headers,
            body,
        })
    }

    /// Render `Status: <code>` followed by as much of `body` as fits.
    pub fn render_response(&self, status_code: u16, body: &[u8]) -> String {
        let mut text = format!("Status: {status_code}\n\n");
        text.push_str(&String::from_utf8_lossy(body));
        bounded(text, self.output_limit)
    }

    /// Render an error the way the agent sees it.
    pub fn render_error(&self, err: &WardenError) -> String {
        let message = match err {
            WardenError::OutOfMemory { .. } => "Out of memory".to_string(),
            e if e.is_request_failure() => format!("HTTP request failed ({}: {e})", e.code()),
            e => e.to_string(),
        };
        bounded(format!("Error: {message}"), self.output_limit)
    }
}

/// Truncate `text` to at most `limit - 1` bytes on a char boundary.
fn bounded(mut text: String, limit: usize) -> String {
    let max = limit.saturating_sub(1);
    if text.len() > max {
        let mut end = max;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
    }
    text
}

#[async_trait]
impl Tool for HttpRequestTool {
    fn name(&self) -> &str {
        "http_request"
    }

    fn description(&self) -> &str {
        "Make an HTTP request to an external URL. Requests to cloud metadata, loopback, \
         link-local and other internal addresses are refused."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Absolute http:// or https:// URL"
                },
                "method": {
                    "type": "string",
                    "enum": ["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD"],
                    "default": "GET",
                    "description": "HTTP method"
                },
                "headers": {
                    "type": "object",
                    "additionalProperties": { "type": "string" },
                    "description": "Request headers as name/value pairs"
                },
                "body": {
                    "type": "string",
                    "description": "Request body"
                }
            },
            "required": ["url"]
        })
    }

    async fn invoke(&self, input: Value) -> Result<ToolOutput, WardenError> {
        let request = match Self::parse_request(&input) {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, "rejected http_request input");
                return Ok(ToolOutput {
                    content: self.render_error(&e),
                    is_error: true,
                });
            }
        };

        match self.dispatcher.execute(&request).await {
            Ok(outcome) => Ok(ToolOutput::success(
                self.render_response(outcome.status_code, outcome.body.as_bytes()),
            )),
            Err(e) => {
                if e.is_request_failure() {
                    warn!(url = %request.url, error = %e, "HTTP request failed");
                }
                Ok(ToolOutput {
                    content: self.render_error(&e),
                    is_error: true,
                })
            }
        }
    }
}
