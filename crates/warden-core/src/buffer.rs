// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-capacity response accumulator.
//!
//! [`ResponseBuffer`] never grows past the capacity it was created with. The
//! last byte of capacity is reserved for a terminator, so at most
//! `capacity - 1` bytes of payload are ever stored. Writes that do not fit are
//! dropped silently; both append methods return the number of bytes accepted
//! so callers can observe truncation.
//!
//! Two acceptance policies exist because the two request paths have always
//! behaved differently:
//!
//! - [`ResponseBuffer::append_whole`] (direct client path) takes a chunk only
//!   if all of it fits.
//! - [`ResponseBuffer::append_partial`] (tunnel path) takes as much of a chunk
//!   as fits.

use tracing::debug;

use crate::error::WardenError;

/// Append-only byte buffer with a hard capacity.
#[derive(Debug)]
pub struct ResponseBuffer {
    storage: Vec<u8>,
    capacity: usize,
    dropped: usize,
}

impl ResponseBuffer {
    /// Allocate a buffer holding at most `capacity - 1` payload bytes.
    ///
    /// The allocation is made up front; failure is reported as
    /// [`WardenError::OutOfMemory`] instead of aborting.
    pub fn with_capacity(capacity: usize) -> Result<Self, WardenError> {
        if capacity < 2 {
            return Err(WardenError::InvalidArgument(format!(
                "response buffer capacity must be at least 2 bytes, got {capacity}"
            )));
        }
        let mut storage = Vec::new();
        storage
            .try_reserve_exact(capacity)
            .map_err(|_| WardenError::OutOfMemory {
                requested: capacity,
            })?;
        Ok(Self {
            storage,
            capacity,
            dropped: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Payload bytes that can still be accepted.
    pub fn remaining(&self) -> usize {
        self.capacity - 1 - self.storage.len()
    }

    /// Whether any appended bytes have been discarded.
    pub fn is_truncated(&self) -> bool {
        self.dropped > 0
    }

    /// Total number of bytes discarded by appends.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.storage
    }

    /// Accept `chunk` only if it fits entirely; otherwise accept nothing.
    pub fn append_whole(&mut self, chunk: &[u8]) -> usize {
        if chunk.len() > self.remaining() {
            self.record_drop(chunk.len());
            return 0;
        }
        self.storage.extend_from_slice(chunk);
        chunk.len()
    }

    /// Accept as much of `chunk` as fits.
    pub fn append_partial(&mut self, chunk: &[u8]) -> usize {
        let take = chunk.len().min(self.remaining());
        self.storage.extend_from_slice(&chunk[..take]);
        if take < chunk.len() {
            self.record_drop(chunk.len() - take);
        }
        take
    }

    /// Move the bytes from `offset` onward to the start of the buffer and
    /// shrink the length to match. The allocation is reused.
    pub fn retain_from(&mut self, offset: usize) {
        let len = self.storage.len();
        let offset = offset.min(len);
        self.storage.copy_within(offset..len, 0);
        self.storage.truncate(len - offset);
    }

    fn record_drop(&mut self, n: usize) {
        if self.dropped == 0 {
            debug!(
                capacity = self.capacity,
                "response exceeds buffer capacity, truncating"
            );
        }
        self.dropped += n;
    }
}
