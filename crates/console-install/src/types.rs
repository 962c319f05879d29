//! Common types shared by the session and the driver.

use std::fmt;
use std::time::Duration;

/// A successful pattern match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Index of the pattern that matched.
    pub pattern_index: usize,

    /// Name of the pattern that matched.
    pub name: String,

    /// The full text that matched.
    pub matched: String,

    /// Text consumed before the match.
    pub before: String,
}

impl Match {
    /// Create a new match result.
    #[must_use]
    pub fn new(
        pattern_index: usize,
        name: impl Into<String>,
        matched: impl Into<String>,
        before: impl Into<String>,
    ) -> Self {
        Self {
            pattern_index,
            name: name.into(),
            matched: matched.into(),
            before: before.into(),
        }
    }

    /// Get the full matched text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.matched
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.matched)
    }
}

/// Result of one expectation round.
///
/// Timeout and end-of-stream are ordinary alternatives here, not errors: the
/// driver decides what each means in the phase it is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectOutcome {
    /// A pattern matched.
    Matched(Match),

    /// The deadline elapsed first.
    Timeout {
        /// The duration that elapsed.
        duration: Duration,
        /// Buffer contents at timeout.
        buffer: String,
    },

    /// The console stream closed first.
    Eof {
        /// Buffer contents when the stream closed.
        buffer: String,
    },
}

impl ExpectOutcome {
    /// Check if this is a successful match.
    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }

    /// Check if this is an end-of-stream.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::Eof { .. })
    }

    /// Check if this is a timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Index of the matched pattern, if any.
    #[must_use]
    pub const fn matched_index(&self) -> Option<usize> {
        match self {
            Self::Matched(m) => Some(m.pattern_index),
            _ => None,
        }
    }

    /// Get the buffer contents (for EOF or timeout).
    #[must_use]
    pub fn buffer(&self) -> Option<&str> {
        match self {
            Self::Eof { buffer } | Self::Timeout { buffer, .. } => Some(buffer),
            Self::Matched(_) => None,
        }
    }
}

/// Lifecycle state of a console session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connected and usable.
    Running,

    /// The remote side closed the stream.
    Eof,

    /// The transport has been released.
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Running => "running",
            Self::Eof => "eof",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_predicates() {
        let matched = ExpectOutcome::Matched(Match::new(2, "grub", "GNU GRUB", ""));
        assert!(matched.is_match());
        assert_eq!(matched.matched_index(), Some(2));
        assert!(matched.buffer().is_none());

        let timeout = ExpectOutcome::Timeout {
            duration: Duration::from_secs(1),
            buffer: "noise".into(),
        };
        assert!(timeout.is_timeout());
        assert_eq!(timeout.buffer(), Some("noise"));

        let eof = ExpectOutcome::Eof { buffer: String::new() };
        assert!(eof.is_eof());
        assert_eq!(eof.matched_index(), None);
    }

    #[test]
    fn session_state_display() {
        assert_eq!(SessionState::Closed.to_string(), "closed");
    }
}
