//! The install driver.
//!
//! One run walks a fixed sequence of phases over a single console session:
//!
//! ```text
//! Connect -> [Login] -> GrubSelect <-> InstallConfirm -> [ReadinessPoll] -> Done
//! ```
//!
//! Login runs only when credentials are given; ReadinessPoll only when the
//! caller asked to wait for the installed system. Each phase is a function of
//! the session and its own deadline returning a [`Transition`]; the loop in
//! [`InstallDriver::run`] is the only place that dispatches on the current
//! phase.

mod phase;

use std::fmt;

use crate::backend::ConsoleTransport;
use crate::config::AutomationConfig;
use crate::error::InstallError;
use crate::session::Session;

pub use phase::{Phase, PhasePatterns, Transition};

/// Login credentials for reboot-via-login mode.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account name sent at the login prompt.
    pub username: String,
    /// Password sent at the password prompt.
    pub password: String,
}

impl Credentials {
    /// Create a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// How the device is brought back into its boot menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The device is power-cycled externally; no login is attempted.
    PowerReset,
    /// Log in over the console and issue a reboot command.
    RebootViaLogin,
}

impl Mode {
    /// Select the mode from the presence of credentials.
    #[must_use]
    pub const fn from_credentials(credentials: Option<&Credentials>) -> Self {
        match credentials {
            Some(_) => Self::RebootViaLogin,
            None => Self::PowerReset,
        }
    }

    /// Check whether the Login phase runs in this mode.
    #[must_use]
    pub const fn needs_login(self) -> bool {
        matches!(self, Self::RebootViaLogin)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PowerReset => f.write_str("power-reset"),
            Self::RebootViaLogin => f.write_str("reboot-via-login"),
        }
    }
}

/// What one automation run is asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    /// Device whose console is driven.
    pub device: String,
    /// Credentials; `None` selects power-reset mode.
    pub credentials: Option<Credentials>,
    /// Wait for the installed system to report ready.
    pub wait_ready: bool,
}

impl InstallRequest {
    /// A request in power-reset mode that stops after install mode is entered.
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            credentials: None,
            wait_ready: false,
        }
    }

    /// Log in with these credentials and reboot.
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Wait (or not) for the installed system to become ready.
    #[must_use]
    pub const fn wait_ready(mut self, wait_ready: bool) -> Self {
        self.wait_ready = wait_ready;
        self
    }

    /// The mode this request selects.
    #[must_use]
    pub fn mode(&self) -> Mode {
        Mode::from_credentials(self.credentials.as_ref())
    }
}

/// Drives one console session from connect to a terminal state.
#[derive(Debug)]
pub struct InstallDriver<'a> {
    config: &'a AutomationConfig,
    patterns: PhasePatterns,
    credentials: Option<Credentials>,
    wait_ready: bool,
}

impl<'a> InstallDriver<'a> {
    /// Prepare a driver for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Usage`] if a configured pattern does not
    /// compile.
    pub fn new(config: &'a AutomationConfig, request: &InstallRequest) -> Result<Self, InstallError> {
        let compiled = config.patterns.compile()?;
        Ok(Self {
            config,
            patterns: PhasePatterns::new(&compiled),
            credentials: request.credentials.clone(),
            wait_ready: request.wait_ready,
        })
    }

    /// The mode selected for this run.
    #[must_use]
    pub fn mode(&self) -> Mode {
        Mode::from_credentials(self.credentials.as_ref())
    }

    /// Run every phase until `Done` or the first failure.
    ///
    /// The session is left open; releasing it is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns the [`InstallError`] that ended the run. Transport I/O errors
    /// become [`InstallError::Internal`] carrying the buffer tail.
    pub async fn run<T: ConsoleTransport>(
        &self,
        session: &mut Session<T>,
    ) -> Result<(), InstallError> {
        let mut grub = phase::GrubState::default();
        let mut phase = Phase::Connect;

        tracing::debug!(device = %session.device(), mode = %self.mode(), "starting install run");

        loop {
            tracing::debug!(device = %session.device(), %phase, "entering phase");

            let step = match phase {
                Phase::Connect => phase::connect(session, self).await,
                Phase::Login => phase::login(session, self).await,
                Phase::GrubSelect => phase::grub_select(session, self, &mut grub).await,
                Phase::InstallConfirm => phase::install_confirm(session, self, &mut grub).await,
                Phase::ReadinessPoll => phase::readiness_poll(session, self).await,
                Phase::Done => return Ok(()),
            };

            match step {
                Ok(Transition::Next(next)) => phase = next,
                Ok(Transition::Fail(err)) => return Err(err),
                Err(err) => {
                    let tail = session.buffer_tail(phase::DIAGNOSTIC_TAIL);
                    return Err(InstallError::internal(format!("{phase}: {err}"), tail));
                }
            }
        }
    }
}
