// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Warden egress guard.

use thiserror::Error;

/// The primary error type used across Warden collaborator traits and core operations.
#[derive(Debug, Error)]
pub enum WardenError {
    /// Caller input was rejected (missing URL, bad scheme, unsupported method,
    /// malformed JSON, unsafe header).
    #[error("{0}")]
    InvalidArgument(String),

    /// The destination failed the safety classifier.
    #[error("Access to '{host}' is blocked for security reasons")]
    BlockedDestination { host: String, reason: String },

    /// The tunnel transport could not open a connection.
    #[error("connect failed: {message}")]
    ConnectFailure {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Writing the framed request into the tunnel failed.
    #[error("write failed: {message}")]
    WriteFailure {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The native client failed (DNS, TLS, connection, or body read error).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A response or request buffer could not be allocated.
    #[error("out of memory allocating {requested} bytes")]
    OutOfMemory { requested: usize },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Configuration errors detected at runtime.
    #[error("configuration error: {0}")]
    Config(String),
}

impl WardenError {
    /// Stable snake_case identifier for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            WardenError::InvalidArgument(_) => "invalid_argument",
            WardenError::BlockedDestination { .. } => "blocked_destination",
            WardenError::ConnectFailure { .. } => "connect_failure",
            WardenError::WriteFailure { .. } => "write_failure",
            WardenError::Transport { .. } => "transport",
            WardenError::OutOfMemory { .. } => "out_of_memory",
            WardenError::Timeout { .. } => "timeout",
            WardenError::Config(_) => "config",
        }
    }

    /// Whether the error came from the network path rather than from input
    /// validation or policy.
    ///
    /// These are reported to the agent as a generic "request failed" message.
    pub fn is_request_failure(&self) -> bool {
        matches!(
            self,
            WardenError::ConnectFailure { .. }
                | WardenError::WriteFailure { .. }
                | WardenError::Transport { .. }
                | WardenError::Timeout { .. }
        )
    }

    pub fn connect(message: impl Into<String>) -> Self {
        WardenError::ConnectFailure {
            message: message.into(),
            source: None,
        }
    }

    pub fn transport<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        WardenError::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
