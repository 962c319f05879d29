//! Pattern matching engine for expect operations.
//!
//! The matcher owns the accumulated console text. Incoming bytes are decoded
//! incrementally so a multi-byte character split across two reads is not
//! mangled, and the buffer always holds valid UTF-8: match offsets computed on
//! the text can be used directly to consume bytes.

use super::buffer::{DEFAULT_CAPACITY, RingBuffer};
use super::pattern::PatternSet;
use crate::types::Match;

/// The pattern matching engine.
#[derive(Debug)]
pub struct Matcher {
    buffer: RingBuffer,
    /// Trailing bytes of an incomplete UTF-8 sequence from the last chunk.
    pending: Vec<u8>,
}

impl Matcher {
    /// Create a new matcher with the specified buffer size.
    #[must_use]
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer: RingBuffer::new(buffer_size),
            pending: Vec::new(),
        }
    }

    /// Append raw console bytes; returns the newly decoded text.
    pub fn append(&mut self, data: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(data);

        let mut decoded = String::with_capacity(bytes.len());
        let mut rest = bytes.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    decoded.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    decoded.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        Some(len) => {
                            decoded.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }

        self.buffer.append(decoded.as_bytes());
        self.drop_partial_front();
        decoded
    }

    /// Overflow may cut a character in half at the front; drop the remains.
    fn drop_partial_front(&mut self) {
        let partial = self
            .buffer
            .as_slice()
            .iter()
            .take_while(|b| (**b & 0b1100_0000) == 0b1000_0000)
            .count();
        if partial > 0 {
            self.buffer.consume(partial);
        }
    }

    /// Get the current buffer contents as a string.
    #[must_use]
    pub fn buffer_str(&mut self) -> String {
        self.buffer.as_str_lossy()
    }

    /// The last `n` bytes of the buffer, for diagnostics.
    #[must_use]
    pub fn tail(&mut self, n: usize) -> String {
        String::from_utf8_lossy(&self.buffer.tail(n)).into_owned()
    }

    /// Number of buffered bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Discard everything buffered so far.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.pending.clear();
    }

    /// Try to match a pattern set against the buffer, in priority order.
    #[must_use]
    pub fn try_match_any(&mut self, patterns: &PatternSet) -> Option<MatchResult> {
        let text = self.buffer.as_str_lossy();
        patterns
            .find_match(&text)
            .map(|(pattern_index, m)| MatchResult {
                pattern_index,
                start: m.start,
                end: m.end,
            })
    }

    /// Remove everything up to and including the match and return it.
    pub fn consume_match(&mut self, result: &MatchResult, patterns: &PatternSet) -> Match {
        let before = self.buffer.consume_before(result.start);
        let matched_bytes = self.buffer.consume(result.end - result.start);
        let matched = String::from_utf8_lossy(&matched_bytes).into_owned();
        let name = patterns
            .get(result.pattern_index)
            .map(|p| p.name.clone())
            .unwrap_or_default();

        Match::new(result.pattern_index, name, matched, before)
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Location of a pattern match inside the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    /// Index of the pattern that matched.
    pub pattern_index: usize,
    /// Start position in the buffer.
    pub start: usize,
    /// End position in the buffer.
    pub end: usize,
}
