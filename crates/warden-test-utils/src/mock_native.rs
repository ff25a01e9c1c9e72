// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted native client for direct-path tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use warden_core::{HttpRequest, NativeClient, ResponseBuffer, WardenError};

enum Script {
    Respond { status: u16, chunks: Vec<Vec<u8>> },
    Fail(String),
}

/// A native client that replays a fixed response.
///
/// Body chunks are delivered through [`ResponseBuffer::append_whole`], the
/// same way the real client delivers them. Every request is recorded.
pub struct MockNativeClient {
    script: Script,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockNativeClient {
    /// Respond with `status` and a single body chunk.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::with_chunks(status, vec![body.into()])
    }

    /// Respond with `status`, delivering the body as the given chunks.
    pub fn with_chunks(status: u16, chunks: Vec<Vec<u8>>) -> Self {
        Self {
            script: Script::Respond { status, chunks },
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail every request with a transport error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            script: Script::Fail(message.into()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Requests received so far, in order.
    pub async fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl NativeClient for MockNativeClient {
    async fn execute(
        &self,
        request: &HttpRequest,
        sink: &mut ResponseBuffer,
        _timeout: Duration,
    ) -> Result<u16, WardenError> {
        self.requests.lock().await.push(request.clone());
        match &self.script {
            Script::Respond { status, chunks } => {
                for chunk in chunks {
                    sink.append_whole(chunk);
                }
                Ok(*status)
            }
            Script::Fail(message) => Err(WardenError::Transport {
                message: message.clone(),
                source: None,
            }),
        }
    }
}
