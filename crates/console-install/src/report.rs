//! Run outcomes and their one-time reporting.

use std::fmt;
use std::process::ExitCode;

use crate::error::InstallError;

/// Terminal result of one automation run.
///
/// The numeric codes are stable and used as the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Install mode reached (and, if requested, the system reported ready).
    Success,
    /// The invocation was malformed.
    UsageError,
    /// The console connection could not be established.
    ConsoleUnreachable,
    /// Login was rejected or never completed.
    LoginFailed,
    /// The boot menu or a readiness step did not show up in time.
    InstallFailed,
    /// The console helper binary is missing or not executable.
    TransportUnavailable,
    /// I/O broke down or the console state could not be interpreted.
    InternalError,
}

impl Outcome {
    /// Every outcome, in exit-code order.
    pub const ALL: [Self; 7] = [
        Self::Success,
        Self::UsageError,
        Self::ConsoleUnreachable,
        Self::LoginFailed,
        Self::InstallFailed,
        Self::TransportUnavailable,
        Self::InternalError,
    ];

    /// The process exit code for this outcome.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::UsageError => 1,
            Self::ConsoleUnreachable => 2,
            Self::LoginFailed => 3,
            Self::InstallFailed => 4,
            Self::TransportUnavailable => 5,
            Self::InternalError => 6,
        }
    }

    /// Look an outcome up by exit code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::UsageError),
            2 => Some(Self::ConsoleUnreachable),
            3 => Some(Self::LoginFailed),
            4 => Some(Self::InstallFailed),
            5 => Some(Self::TransportUnavailable),
            6 => Some(Self::InternalError),
            _ => None,
        }
    }

    /// Check if this is a success.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Short name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::UsageError => "usage-error",
            Self::ConsoleUnreachable => "console-unreachable",
            Self::LoginFailed => "login-failed",
            Self::InstallFailed => "install-failed",
            Self::TransportUnavailable => "transport-unavailable",
            Self::InternalError => "internal-error",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        Self::from(outcome.code())
    }
}

/// Emits the single diagnostic line that closes a run.
///
/// Only the first call to [`Reporter::report`] logs; later calls return the
/// outcome already reported. Callers release the session before reporting.
#[derive(Debug)]
pub struct Reporter {
    device: String,
    reported: Option<Outcome>,
}

impl Reporter {
    /// Create a reporter for `device`.
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            reported: None,
        }
    }

    /// The outcome reported so far, if any.
    #[must_use]
    pub const fn reported(&self) -> Option<Outcome> {
        self.reported
    }

    /// Report the end of a run and return its outcome.
    pub fn report(&mut self, result: &Result<(), InstallError>) -> Outcome {
        if let Some(outcome) = self.reported {
            return outcome;
        }

        let outcome = match result {
            Ok(()) => {
                tracing::info!(device = %self.device, "install automation finished: {}", Outcome::Success);
                Outcome::Success
            }
            Err(err) => {
                let outcome = err.outcome();
                tracing::error!(device = %self.device, "{outcome}: {err}");
                outcome
            }
        };
        self.reported = Some(outcome);
        outcome
    }
}
