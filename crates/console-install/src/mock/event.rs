//! Scripted events replayed by a mock console.

use std::time::Duration;

/// One step of a mock console's output timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    /// Bytes the console prints.
    Output(Vec<u8>),
    /// Silence before the next event.
    Delay(Duration),
    /// The console closes the stream.
    Eof,
    /// The next read fails with this message.
    Error(String),
}

impl MockEvent {
    /// Create an output event from bytes.
    pub fn output(data: impl Into<Vec<u8>>) -> Self {
        Self::Output(data.into())
    }

    /// Create an output event from a string.
    #[must_use]
    pub fn output_str(s: &str) -> Self {
        Self::Output(s.as_bytes().to_vec())
    }

    /// Create a delay event.
    #[must_use]
    pub const fn delay(duration: Duration) -> Self {
        Self::Delay(duration)
    }

    /// Create a delay event from seconds.
    #[must_use]
    pub const fn delay_secs(secs: u64) -> Self {
        Self::Delay(Duration::from_secs(secs))
    }

    /// Create an EOF event.
    #[must_use]
    pub const fn eof() -> Self {
        Self::Eof
    }

    /// Create a read error event.
    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error(msg.into())
    }

    /// Check if this is an output event.
    #[must_use]
    pub const fn is_output(&self) -> bool {
        matches!(self, Self::Output(_))
    }

    /// Check if this is an EOF event.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }
}
