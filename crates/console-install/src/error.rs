//! Error types for console-install.
//!
//! Two layers live here. [`ExpectError`] covers the console plumbing (spawning
//! the helper, reading, writing, pattern compilation, configuration), while
//! [`InstallError`] is the run-level taxonomy that every failed automation run
//! is folded into before it is reported.

use thiserror::Error;

use crate::report::Outcome;

/// Maximum length of buffer content to display in error messages.
const MAX_BUFFER_DISPLAY: usize = 500;

/// Lines of console output kept when the buffer is too large to show whole.
const TAIL_LINES: usize = 6;

/// Format buffer content for display, keeping only the tail if necessary.
pub(crate) fn format_buffer_snippet(buffer: &str) -> String {
    if buffer.is_empty() {
        return "(empty buffer)".to_string();
    }

    let lines: Vec<&str> = buffer.lines().collect();

    if buffer.len() <= MAX_BUFFER_DISPLAY || lines.len() <= TAIL_LINES {
        return format!(
            "┌─ buffer ({} bytes) ──────────────────────\n│ {}\n└────────────────────────────────────────",
            buffer.len(),
            lines.join("\n│ ")
        );
    }

    let tail = &lines[lines.len() - TAIL_LINES..];
    format!(
        "┌─ buffer ({} bytes, {} lines) ─────────────\n│ ... ({} lines hidden)\n│ {}\n└────────────────────────────────────────",
        buffer.len(),
        lines.len(),
        lines.len() - TAIL_LINES,
        tail.join("\n│ ")
    )
}

/// Errors raised by the console session and its supporting modules.
#[derive(Debug, Error)]
pub enum ExpectError {
    /// Failed to start the console helper.
    #[error("failed to start console helper: {0}")]
    Spawn(#[from] SpawnError),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An I/O error occurred with additional context.
    #[error("{context}: {source}")]
    IoWithContext {
        /// What operation was being performed.
        context: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid pattern specification.
    #[error("invalid pattern: {message}")]
    InvalidPattern {
        /// Description of what's wrong with the pattern.
        message: String,
    },

    /// Invalid regex pattern.
    #[error("invalid regex pattern: {0}")]
    Regex(#[from] regex::Error),

    /// The session was already closed.
    #[error("session is closed")]
    SessionClosed,

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

/// Errors related to starting the console helper process.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// Command not found on `PATH` or at the given location.
    #[error("command not found: {command}")]
    CommandNotFound {
        /// The command that was not found.
        command: String,
    },

    /// The command exists but is not executable.
    #[error("permission denied: {path}")]
    PermissionDenied {
        /// The path that could not be executed.
        path: String,
    },

    /// Invalid command or argument.
    #[error("invalid {kind}: {reason}")]
    InvalidArgument {
        /// The kind of invalid input (e.g., "command", "argument").
        kind: String,
        /// The reason it's invalid.
        reason: String,
    },

    /// General I/O error during spawn.
    #[error("I/O error during spawn: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for console operations.
pub type Result<T> = std::result::Result<T, ExpectError>;

impl ExpectError {
    /// Create an invalid pattern error.
    pub fn invalid_pattern(message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io_context(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoWithContext {
            context: context.into(),
            source,
        }
    }
}

impl SpawnError {
    /// Create a command not found error.
    pub fn command_not_found(command: impl Into<String>) -> Self {
        Self::CommandNotFound {
            command: command.into(),
        }
    }

    /// Create a permission denied error.
    pub fn permission_denied(path: impl Into<String>) -> Self {
        Self::PermissionDenied { path: path.into() }
    }

    /// True when the helper binary itself is missing or not executable.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::CommandNotFound { .. } | Self::PermissionDenied { .. }
        )
    }
}

/// Terminal failure of one automation run.
///
/// Every variant maps to exactly one [`Outcome`]; none of them is retried by
/// the driver itself.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The invocation itself was malformed.
    #[error("usage error: {0}")]
    Usage(String),

    /// The console helper binary is missing or not executable.
    #[error("console transport unavailable: {0}")]
    TransportUnavailable(String),

    /// The console connection could not be established.
    #[error("console unreachable: {cause}")]
    ConsoleUnreachable {
        /// What went wrong while connecting.
        cause: String,
    },

    /// Bad credentials, or the login exchange never completed.
    #[error("login failed: {reason}")]
    LoginFailed {
        /// Why the login is considered failed.
        reason: String,
    },

    /// The boot menu or a readiness step never showed up in time.
    #[error("install failed: {step}")]
    InstallFailed {
        /// The step that did not complete.
        step: String,
    },

    /// Unknown state: I/O broke down or output could not be interpreted.
    #[error("internal error: {message}\n{}", format_buffer_snippet(buffer_tail))]
    Internal {
        /// What went wrong.
        message: String,
        /// Tail of the console buffer for diagnosis.
        buffer_tail: String,
    },
}

impl InstallError {
    /// Create a console unreachable error.
    pub fn unreachable(cause: impl Into<String>) -> Self {
        Self::ConsoleUnreachable {
            cause: cause.into(),
        }
    }

    /// Create a login failure.
    pub fn login_failed(reason: impl Into<String>) -> Self {
        Self::LoginFailed {
            reason: reason.into(),
        }
    }

    /// Create an install failure naming the step that timed out.
    pub fn install_failed(step: impl Into<String>) -> Self {
        Self::InstallFailed { step: step.into() }
    }

    /// Create an internal error with the console buffer tail attached.
    pub fn internal(message: impl Into<String>, buffer_tail: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            buffer_tail: buffer_tail.into(),
        }
    }

    /// The outcome this error is reported as.
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        match self {
            Self::Usage(_) => Outcome::UsageError,
            Self::TransportUnavailable(_) => Outcome::TransportUnavailable,
            Self::ConsoleUnreachable { .. } => Outcome::ConsoleUnreachable,
            Self::LoginFailed { .. } => Outcome::LoginFailed,
            Self::InstallFailed { .. } => Outcome::InstallFailed,
            Self::Internal { .. } => Outcome::InternalError,
        }
    }
}

impl From<SpawnError> for InstallError {
    fn from(err: SpawnError) -> Self {
        if err.is_unavailable() {
            Self::TransportUnavailable(err.to_string())
        } else {
            Self::unreachable(format!("console helper did not start: {err}"))
        }
    }
}

impl From<ExpectError> for InstallError {
    fn from(err: ExpectError) -> Self {
        match err {
            ExpectError::Spawn(spawn) => spawn.into(),
            ExpectError::Config { message } => Self::Usage(message),
            other => Self::internal(other.to_string(), String::new()),
        }
    }
}
