// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `warden request`: run one request through the `http_request` tool.

use clap::Args;
use serde_json::{Map, Value};
use warden_config::WardenConfig;
use warden_skill::{register_builtins, ToolRegistry};

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Target URL (http:// or https://).
    #[arg(long, required_unless_present = "json", conflicts_with = "json")]
    url: Option<String>,

    /// HTTP method.
    #[arg(long, conflicts_with = "json")]
    method: Option<String>,

    /// Request header as `Name: value`. May be repeated.
    #[arg(long = "header", short = 'H', value_parser = parse_header, conflicts_with = "json")]
    headers: Vec<(String, String)>,

    /// Request body.
    #[arg(long, conflicts_with = "json")]
    body: Option<String>,

    /// Raw tool input JSON, passed through unchanged.
    #[arg(long)]
    json: Option<String>,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("header `{raw}` must be in `Name: value` form"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header `{raw}` has an empty name"));
    }
    Ok((name.to_string(), value.trim_start().to_string()))
}

impl RequestArgs {
    /// The JSON the tool receives.
    fn tool_input(&self) -> String {
        if let Some(raw) = &self.json {
            return raw.clone();
        }
        let mut input = Map::new();
        if let Some(url) = &self.url {
            input.insert("url".into(), Value::String(url.clone()));
        }
        if let Some(method) = &self.method {
            input.insert("method".into(), Value::String(method.clone()));
        }
        if !self.headers.is_empty() {
            let headers: Map<String, Value> = self
                .headers
                .iter()
                .map(|(n, v)| (n.clone(), Value::String(v.clone())))
                .collect();
            input.insert("headers".into(), Value::Object(headers));
        }
        if let Some(body) = &self.body {
            input.insert("body".into(), Value::String(body.clone()));
        }
        Value::Object(input).to_string()
    }
}

/// Execute the request and print the tool output. Returns the exit code.
pub async fn run(config: &WardenConfig, args: RequestArgs) -> i32 {
    let mut registry = ToolRegistry::new();
    if let Err(e) = register_builtins(&mut registry, config) {
        eprintln!("warden: {e}");
        return 1;
    }

    let output = registry
        .execute_json("http_request", &args.tool_input())
        .await;
    println!("{}", output.content);
    if output.is_error { 1 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(url: &str) -> RequestArgs {
        RequestArgs {
            url: Some(url.to_string()),
            method: None,
            headers: Vec::new(),
            body: None,
            json: None,
        }
    }

    #[test]
    fn parse_header_splits_on_first_colon() {
        assert_eq!(
            parse_header("Authorization: Bearer a:b").unwrap(),
            ("Authorization".to_string(), "Bearer a:b".to_string())
        );
        assert!(parse_header("no-colon").is_err());
        assert!(parse_header(": value").is_err());
    }

    #[test]
    fn tool_input_from_flags_keeps_header_order() {
        let mut a = args("https://example.com/");
        a.method = Some("POST".into());
        a.headers = vec![("Z".into(), "1".into()), ("A".into(), "2".into())];
        a.body = Some("hi".into());
        assert_eq!(
            a.tool_input(),
            r#"{"url":"https://example.com/","method":"POST","headers":{"Z":"1","A":"2"},"body":"hi"}"#
        );
    }

    #[test]
    fn raw_json_passes_through() {
        let mut a = args("ignored");
        a.json = Some("{not json".into());
        assert_eq!(a.tool_input(), "{not json");
    }

    #[tokio::test]
    async fn blocked_destination_exits_non_zero() {
        let code = run(&WardenConfig::default(), args("http://169.254.169.254/")).await;
        assert_eq!(code, 1);
    }
}
