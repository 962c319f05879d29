//! Configuration types for console-install.
//!
//! Everything environment specific lives here: how to reach a console, how
//! long each phase may take, which keystrokes navigate the boot menu, and the
//! text patterns the driver reacts to. The defaults target an ONIE based
//! switch reached through the `hhfab vlab serial` helper.

pub mod env;
pub mod file;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ExpectError, Result};
use crate::expect::{Pattern, PatternSpec};

/// Placeholder replaced by the device name in helper arguments.
pub const DEVICE_PLACEHOLDER: &str = "{device}";

/// Default buffer size (1 MB).
pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Complete configuration for one automation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
    /// How to reach the console.
    pub console: ConsoleConfig,
    /// Per-phase deadlines.
    pub timeouts: PhaseTimeouts,
    /// Bytes sent to navigate menus and log in.
    pub keys: Keystrokes,
    /// Text patterns the driver reacts to.
    pub patterns: PatternTable,
}

impl AutomationConfig {
    /// Check the configuration for values that would make a run meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`ExpectError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.console.command.trim().is_empty() {
            return Err(ExpectError::config("console command is empty"));
        }
        if self.console.buffer_size == 0 {
            return Err(ExpectError::config("buffer size must be non-zero"));
        }
        self.timeouts.validate()?;
        self.keys.validate()?;
        self.patterns.compile().map(|_| ())
    }
}

/// How the console helper is started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Helper program that attaches to a device console.
    pub command: String,
    /// Arguments; [`DEVICE_PLACEHOLDER`] is replaced with the device name.
    pub args: Vec<String>,
    /// Appended by `send_line`.
    pub line_ending: String,
    /// Maximum bytes of console output kept for matching.
    pub buffer_size: usize,
    /// Log complete console lines at info level while waiting.
    pub echo_output: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            command: "hhfab".to_string(),
            args: ["vlab", "serial", "-n", DEVICE_PLACEHOLDER]
                .into_iter()
                .map(String::from)
                .collect(),
            line_ending: "\r".to_string(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            echo_output: true,
        }
    }
}

impl ConsoleConfig {
    /// Create a console config for the given helper command.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            ..Default::default()
        }
    }

    /// Set the helper arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Arguments with the device placeholder substituted.
    #[must_use]
    pub fn args_for(&self, device: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace(DEVICE_PLACEHOLDER, device))
            .collect()
    }
}

/// Deadlines for every phase and sub-wait of the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseTimeouts {
    /// Waiting for the console helper's banner.
    #[serde(with = "duration_secs")]
    pub connect: Duration,
    /// The whole login/reboot exchange.
    #[serde(with = "duration_secs")]
    pub login: Duration,
    /// Boot menu appearance plus cursor search; doubles as the retry budget.
    #[serde(with = "duration_secs")]
    pub grub: Duration,
    /// One cursor position in the menu search.
    #[serde(with = "duration_secs")]
    pub menu_step: Duration,
    /// Grace period for the install-mode confirmation message.
    #[serde(with = "duration_secs")]
    pub install_mode_grace: Duration,
    /// Pause after rebooting out of a rescue prompt.
    #[serde(with = "duration_secs")]
    pub rescue_pause: Duration,
    /// Readiness: service discovery started.
    #[serde(with = "duration_secs")]
    pub discovery: Duration,
    /// Readiness: installer reports success.
    #[serde(with = "duration_secs")]
    pub install_success: Duration,
    /// Readiness: installed system shows its login prompt.
    #[serde(with = "duration_secs")]
    pub installed_login: Duration,
    /// Readiness: ready message.
    #[serde(with = "duration_secs")]
    pub ready: Duration,
}

impl Default for PhaseTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            login: Duration::from_secs(60),
            grub: Duration::from_secs(150),
            menu_step: Duration::from_secs(2),
            install_mode_grace: Duration::from_secs(10),
            rescue_pause: Duration::from_secs(2),
            discovery: Duration::from_secs(60),
            install_success: Duration::from_secs(300),
            installed_login: Duration::from_secs(300),
            ready: Duration::from_secs(300),
        }
    }
}

impl PhaseTimeouts {
    fn validate(&self) -> Result<()> {
        let named = [
            ("connect", self.connect),
            ("login", self.login),
            ("grub", self.grub),
            ("menu_step", self.menu_step),
            ("install_mode_grace", self.install_mode_grace),
            ("discovery", self.discovery),
            ("install_success", self.install_success),
            ("installed_login", self.installed_login),
            ("ready", self.ready),
        ];
        if let Some((name, _)) = named.iter().find(|(_, d)| d.is_zero()) {
            return Err(ExpectError::config(format!("timeout '{name}' must be non-zero")));
        }
        if self.menu_step > self.grub {
            return Err(ExpectError::config(
                "menu_step timeout cannot exceed the grub timeout",
            ));
        }
        Ok(())
    }
}

/// Keystrokes and commands sent to the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Keystrokes {
    /// Moves the menu cursor to the first entry.
    pub menu_top: String,
    /// Moves the menu cursor one entry down.
    pub menu_down: String,
    /// Activates the highlighted entry.
    pub select: String,
    /// Sent when the install-mode message never showed up.
    pub confirm_install: String,
    /// Shell command that reboots an authenticated system.
    pub reboot_command: String,
}

impl Default for Keystrokes {
    fn default() -> Self {
        Self {
            menu_top: "\x1b[H".to_string(),
            menu_down: "\x1b[B".to_string(),
            select: "\r".to_string(),
            confirm_install: "\r".to_string(),
            reboot_command: "sudo reboot".to_string(),
        }
    }
}

impl Keystrokes {
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("menu_top", &self.menu_top),
            ("menu_down", &self.menu_down),
            ("select", &self.select),
            ("reboot_command", &self.reboot_command),
        ] {
            if value.is_empty() {
                return Err(ExpectError::config(format!("keystroke '{name}' is empty")));
            }
        }
        Ok(())
    }
}

/// Named console patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternTable {
    /// Console helper banner announcing the suspend hot key.
    pub suspend_banner: PatternSpec,
    /// Console helper banner announcing the escape sequence.
    pub escape_banner: PatternSpec,
    /// Console helper could not connect.
    pub connection_unsuccessful: PatternSpec,
    /// Credentials were rejected.
    pub login_incorrect: PatternSpec,
    /// Username prompt.
    pub login_prompt: PatternSpec,
    /// Password prompt.
    pub password_prompt: PatternSpec,
    /// Authenticated shell prompt.
    pub shell_prompt: PatternSpec,
    /// Boot loader rescue prompt.
    pub rescue_prompt: PatternSpec,
    /// Boot menu banner.
    pub grub_banner: PatternSpec,
    /// Target entry highlighted at the cursor.
    pub menu_target: PatternSpec,
    /// Nested "install OS" entry highlighted at the cursor.
    pub install_entry: PatternSpec,
    /// Installer confirms it entered install mode.
    pub install_mode: PatternSpec,
    /// Readiness step 1.
    pub service_discovery: PatternSpec,
    /// Readiness step 2.
    pub install_success: PatternSpec,
    /// Readiness step 3.
    pub installed_login: PatternSpec,
    /// Readiness step 4.
    pub ready: PatternSpec,
}

impl Default for PatternTable {
    fn default() -> Self {
        Self {
            suspend_banner: PatternSpec::literal("Type the hot key to suspend the connection"),
            escape_banner: PatternSpec::literal("Escape character is '^]'"),
            connection_unsuccessful: PatternSpec::regex(r"(?i)connection unsuccessful"),
            login_incorrect: PatternSpec::literal("Login incorrect"),
            login_prompt: PatternSpec::regex(r"(?m)^[\w.-]*\s*login:\s*$"),
            password_prompt: PatternSpec::literal("Password:"),
            shell_prompt: PatternSpec::regex(r"[\w.-]+@[\w.-]+:[^\r\n]*[$#]"),
            rescue_prompt: PatternSpec::literal("grub rescue>"),
            grub_banner: PatternSpec::literal("GNU GRUB"),
            menu_target: PatternSpec::regex(r"\*ONIE\s"),
            install_entry: PatternSpec::literal("*ONIE: Install OS"),
            install_mode: PatternSpec::literal("ONIE: OS Install Mode"),
            service_discovery: PatternSpec::literal("Starting ONIE Service Discovery"),
            install_success: PatternSpec::literal("ONIE: NOS install successful"),
            installed_login: PatternSpec::literal("login:"),
            ready: PatternSpec::literal("System is ready"),
        }
    }
}

impl PatternTable {
    /// Compile every entry.
    ///
    /// # Errors
    ///
    /// Returns [`ExpectError::Config`] naming the entry that failed.
    pub fn compile(&self) -> Result<CompiledPatterns> {
        let c = |name: &str, spec: &PatternSpec| {
            spec.compile()
                .map_err(|e| ExpectError::config(format!("pattern '{name}': {e}")))
        };
        Ok(CompiledPatterns {
            suspend_banner: c("suspend_banner", &self.suspend_banner)?,
            escape_banner: c("escape_banner", &self.escape_banner)?,
            connection_unsuccessful: c("connection_unsuccessful", &self.connection_unsuccessful)?,
            login_incorrect: c("login_incorrect", &self.login_incorrect)?,
            login_prompt: c("login_prompt", &self.login_prompt)?,
            password_prompt: c("password_prompt", &self.password_prompt)?,
            shell_prompt: c("shell_prompt", &self.shell_prompt)?,
            rescue_prompt: c("rescue_prompt", &self.rescue_prompt)?,
            grub_banner: c("grub_banner", &self.grub_banner)?,
            menu_target: c("menu_target", &self.menu_target)?,
            install_entry: c("install_entry", &self.install_entry)?,
            install_mode: c("install_mode", &self.install_mode)?,
            service_discovery: c("service_discovery", &self.service_discovery)?,
            install_success: c("install_success", &self.install_success)?,
            installed_login: c("installed_login", &self.installed_login)?,
            ready: c("ready", &self.ready)?,
        })
    }
}

/// [`PatternTable`] with every entry compiled.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub struct CompiledPatterns {
    pub suspend_banner: Pattern,
    pub escape_banner: Pattern,
    pub connection_unsuccessful: Pattern,
    pub login_incorrect: Pattern,
    pub login_prompt: Pattern,
    pub password_prompt: Pattern,
    pub shell_prompt: Pattern,
    pub rescue_prompt: Pattern,
    pub grub_banner: Pattern,
    pub menu_target: Pattern,
    pub install_entry: Pattern,
    pub install_mode: Pattern,
    pub service_discovery: Pattern,
    pub install_success: Pattern,
    pub installed_login: Pattern,
    pub ready: Pattern,
}

/// Durations as (fractional) seconds in config files.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(AutomationConfig::default().validate().is_ok());
    }

    #[test]
    fn login_prompt_is_line_anchored() {
        let prompt = PatternTable::default().login_prompt.compile().unwrap();
        assert!(prompt.matches("\r\nleaf-01 login: ").is_some());
        assert!(prompt.matches("login: ").is_some());
        assert!(
            prompt
                .matches("\r\nLast login: Mon Oct 12 10:00:00 on ttyS0\r\nadmin@leaf-01:~$ ")
                .is_none()
        );
    }

    #[test]
    fn default_phase_deadlines() {
        let t = PhaseTimeouts::default();
        assert_eq!(t.grub, Duration::from_secs(150));
        assert_eq!(t.discovery, Duration::from_secs(60));
        assert_eq!(t.install_success, Duration::from_secs(300));
        assert_eq!(t.installed_login, Duration::from_secs(300));
        assert_eq!(t.ready, Duration::from_secs(300));
    }

    #[test]
    fn device_placeholder_substitution() {
        let console = ConsoleConfig::default();
        assert_eq!(
            console.args_for("leaf-01"),
            vec!["vlab", "serial", "-n", "leaf-01"]
        );
    }

    #[test]
    fn empty_command_rejected() {
        let mut config = AutomationConfig::default();
        config.console.command = "  ".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("command"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut config = AutomationConfig::default();
        config.timeouts.ready = Duration::ZERO;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ready"));
    }

    #[test]
    fn menu_step_bounded_by_grub() {
        let mut config = AutomationConfig::default();
        config.timeouts.menu_step = Duration::from_secs(200);
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_regex_names_the_entry() {
        let mut config = AutomationConfig::default();
        config.patterns.shell_prompt = PatternSpec::regex("([");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("shell_prompt"));
    }
}
