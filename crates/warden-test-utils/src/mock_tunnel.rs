// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted tunnel transport for proxy-path tests.
//!
//! `MockTunnelConnector` hands out connections that replay pre-configured
//! response chunks and capture everything written to them. State is shared
//! with the connector so tests can inspect it after the dispatcher has
//! dropped the connection.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use warden_core::{TunnelConnection, TunnelConnector, TunnelTarget, WardenError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum FailAt {
    #[default]
    Never,
    Open,
    Write,
    ReadAfterScript,
}

#[derive(Default)]
struct Shared {
    targets: Mutex<Vec<TunnelTarget>>,
    written: Mutex<Vec<u8>>,
    closes: AtomicUsize,
}

/// Connector returning scripted [`MockTunnelConnection`]s.
#[derive(Clone, Default)]
pub struct MockTunnelConnector {
    chunks: Vec<Vec<u8>>,
    fail: FailAt,
    shared: Arc<Shared>,
}

impl MockTunnelConnector {
    /// A connector whose connections return `response` in a single read.
    pub fn new(response: impl Into<Vec<u8>>) -> Self {
        Self::with_chunks(vec![response.into()])
    }

    /// A connector whose connections return each chunk from a separate read.
    pub fn with_chunks(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks,
            ..Self::default()
        }
    }

    /// Make `open` fail with a connect error.
    pub fn fail_open(mut self) -> Self {
        self.fail = FailAt::Open;
        self
    }

    /// Make every write fail.
    pub fn fail_write(mut self) -> Self {
        self.fail = FailAt::Write;
        self
    }

    /// Make reads fail once the scripted chunks are exhausted instead of
    /// reporting end of stream.
    pub fn fail_read_after_script(mut self) -> Self {
        self.fail = FailAt::ReadAfterScript;
        self
    }

    /// Targets passed to `open`, in order.
    pub async fn targets(&self) -> Vec<TunnelTarget> {
        self.shared.targets.lock().await.clone()
    }

    /// All bytes written across every connection.
    pub async fn written(&self) -> Vec<u8> {
        self.shared.written.lock().await.clone()
    }

    /// Number of times `close` was called.
    pub fn close_count(&self) -> usize {
        self.shared.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TunnelConnector for MockTunnelConnector {
    async fn open(
        &self,
        target: &TunnelTarget,
        _timeout: Duration,
    ) -> Result<Box<dyn TunnelConnection>, WardenError> {
        self.shared.targets.lock().await.push(target.clone());
        if self.fail == FailAt::Open {
            return Err(WardenError::connect(format!("{target}: connection refused")));
        }
        Ok(Box::new(MockTunnelConnection {
            pending: self.chunks.iter().cloned().collect(),
            fail: self.fail,
            shared: Arc::clone(&self.shared),
        }))
    }
}

/// A tunnel connection replaying scripted chunks.
pub struct MockTunnelConnection {
    pending: VecDeque<Vec<u8>>,
    fail: FailAt,
    shared: Arc<Shared>,
}

#[async_trait]
impl TunnelConnection for MockTunnelConnection {
    async fn write(&mut self, bytes: &[u8]) -> Result<usize, WardenError> {
        if self.fail == FailAt::Write {
            return Err(WardenError::WriteFailure {
                message: "broken pipe".to_string(),
                source: None,
            });
        }
        self.shared.written.lock().await.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    async fn read(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize, WardenError> {
        let Some(mut chunk) = self.pending.pop_front() else {
            if self.fail == FailAt::ReadAfterScript {
                return Err(WardenError::Transport {
                    message: "connection reset".to_string(),
                    source: None,
                });
            }
            return Ok(0);
        };
        if chunk.len() > buf.len() {
            let rest = chunk.split_off(buf.len());
            self.pending.push_front(rest);
        }
        buf[..chunk.len()].copy_from_slice(&chunk);
        Ok(chunk.len())
    }

    async fn close(&mut self) {
        self.shared.closes.fetch_add(1, Ordering::SeqCst);
    }
}
