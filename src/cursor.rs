//! Read cursor over a flat record buffer.
//!
//! The cursor is the only mutable state of a decode pass. Its offset starts
//! at zero, only moves forward, and never passes the end of the buffer.

use crate::error::{DecodeError, Result};
use crate::schema::FieldDescriptor;
use tracing::trace;

/// A forward-only read position into a byte buffer.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Current read offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Returns true once every byte has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.offset == self.data.len()
    }

    /// Extract the next chunk for `field` and advance past it.
    pub fn next_chunk(&mut self, field: &FieldDescriptor) -> Result<&'a [u8]> {
        let start = self.offset;
        let chunk = match field.separator {
            None => self.take_fixed(field.cap())?,
            Some(sep) => self.take_separated(sep, field.cap()),
        };
        trace!(
            field = %field.name,
            offset = start,
            len = chunk.len(),
            next = self.offset,
            "chunk"
        );
        Ok(chunk)
    }

    /// Length-bounded read of exactly `length` bytes.
    fn take_fixed(&mut self, length: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if remaining < length {
            return Err(DecodeError::BufferUnderrun {
                offset: self.offset,
                needed: length,
                remaining,
            });
        }

        let chunk = &self.data[self.offset..self.offset + length];
        self.offset += length;
        Ok(chunk)
    }

    /// Separator-bounded read, capped at `cap` bytes when `cap > 0`.
    ///
    /// 1. Separator found before the cap: chunk excludes it, the separator is consumed.
    /// 2. Cap reached without a separator: chunk is `cap` bytes, nothing else consumed.
    /// 3. End of buffer reached first: chunk is the rest of the buffer.
    fn take_separated(&mut self, sep: char, cap: usize) -> &'a [u8] {
        let mut encoded = [0u8; 4];
        let needle: &[u8] = sep.encode_utf8(&mut encoded).as_bytes();

        let rest = &self.data[self.offset..];
        let limit = if cap > 0 { cap.min(rest.len()) } else { rest.len() };

        if let Some(i) = find(rest, needle, limit) {
            self.offset += i + needle.len();
            return &rest[..i];
        }

        if cap > 0 && rest.len() >= cap {
            self.offset += cap;
            return &rest[..cap];
        }

        self.offset = self.data.len();
        rest
    }
}

/// Position of the first occurrence of `needle` in `haystack` that starts
/// before `limit`.
fn find(haystack: &[u8], needle: &[u8], limit: usize) -> Option<usize> {
    if needle.len() == 1 {
        return haystack[..limit].iter().position(|&b| b == needle[0]);
    }
    (0..limit).find(|&i| haystack[i..].starts_with(needle))
}
