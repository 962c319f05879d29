//! Bounded accumulator for console output.
//!
//! Console output arrives in arbitrary chunks (partial escape sequences, menu
//! redraws), so the buffer is byte oriented and never assumes line structure.

use std::collections::VecDeque;
use std::fmt;

/// Default buffer capacity (1 MB).
pub const DEFAULT_CAPACITY: usize = 1024 * 1024;

/// A ring buffer for accumulating console output.
///
/// When the maximum size is reached the oldest bytes are discarded.
#[derive(Clone)]
pub struct RingBuffer {
    data: VecDeque<u8>,
    max_size: usize,
    /// Bytes discarded due to overflow.
    bytes_discarded: usize,
}

impl RingBuffer {
    /// Create a new ring buffer with the specified maximum size.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            data: VecDeque::with_capacity(max_size.min(DEFAULT_CAPACITY)),
            max_size: max_size.max(1),
            bytes_discarded: 0,
        }
    }

    /// Append data, discarding the oldest bytes on overflow.
    pub fn append(&mut self, data: &[u8]) {
        if data.len() >= self.max_size {
            self.bytes_discarded += self.data.len() + data.len() - self.max_size;
            self.data.clear();
            self.data.extend(&data[data.len() - self.max_size..]);
            return;
        }

        let overflow = (self.data.len() + data.len()).saturating_sub(self.max_size);
        if overflow > 0 {
            self.bytes_discarded += overflow;
            self.data.drain(..overflow);
        }

        self.data.extend(data);
    }

    /// Current contents as a contiguous slice.
    #[must_use]
    pub fn as_slice(&mut self) -> &[u8] {
        self.data.make_contiguous()
    }

    /// Current contents as a string (lossy UTF-8 conversion).
    #[must_use]
    pub fn as_str_lossy(&mut self) -> String {
        String::from_utf8_lossy(self.as_slice()).into_owned()
    }

    /// Number of buffered bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes dropped because the buffer overflowed.
    #[must_use]
    pub const fn bytes_discarded(&self) -> usize {
        self.bytes_discarded
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Remove and return the first `n` bytes.
    pub fn consume(&mut self, n: usize) -> Vec<u8> {
        let n = n.min(self.data.len());
        self.data.drain(..n).collect()
    }

    /// Remove the first `pos` bytes and return them as a string.
    pub fn consume_before(&mut self, pos: usize) -> String {
        let data = self.consume(pos);
        String::from_utf8_lossy(&data).into_owned()
    }

    /// Copy of the last `n` bytes.
    #[must_use]
    pub fn tail(&mut self, n: usize) -> Vec<u8> {
        let data = self.as_slice();
        let start = data.len().saturating_sub(n);
        data[start..].to_vec()
    }
}

impl Default for RingBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("len", &self.data.len())
            .field("max_size", &self.max_size)
            .field("bytes_discarded", &self.bytes_discarded)
            .finish()
    }
}
