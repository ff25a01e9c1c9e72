// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Direct path: requests performed by reqwest, which handles TLS itself.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use warden_config::model::HttpConfig;
use warden_core::{HttpRequest, Method, NativeClient, ResponseBuffer, WardenError};
use warden_security::build_native_client;

/// [`NativeClient`] backed by a hardened `reqwest::Client`.
pub struct ReqwestNativeClient {
    client: reqwest::Client,
}

impl ReqwestNativeClient {
    /// Build a client from the `[http]` configuration.
    pub fn new(config: &HttpConfig) -> Result<Self, WardenError> {
        Ok(Self {
            client: build_native_client(config)?,
        })
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Patch => reqwest::Method::PATCH,
        Method::Head => reqwest::Method::HEAD,
    }
}

#[async_trait]
impl NativeClient for ReqwestNativeClient {
    async fn execute(
        &self,
        request: &HttpRequest,
        sink: &mut ResponseBuffer,
        timeout: Duration,
    ) -> Result<u16, WardenError> {
        let mut builder = self
            .client
            .request(reqwest_method(request.method), &request.url);
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        let body = request.body_bytes();
        if !body.is_empty() {
            builder = builder.body(body.to_vec());
        }

        let mut response = tokio::time::timeout(timeout, builder.send())
            .await
            .map_err(|_| WardenError::Timeout { duration: timeout })?
            .map_err(|e| WardenError::transport(format!("request to {} failed", request.url), e))?;

        let status = response.status().as_u16();

        loop {
            let chunk = tokio::time::timeout(timeout, response.chunk())
                .await
                .map_err(|_| WardenError::Timeout { duration: timeout })?
                .map_err(|e| WardenError::transport("failed to read response body", e))?;
            match chunk {
                Some(bytes) => {
                    sink.append_whole(&bytes);
                }
                None => break,
            }
        }

        debug!(status, kept = sink.len(), truncated = sink.is_truncated(), "direct response received");
        Ok(status)
    }
}
