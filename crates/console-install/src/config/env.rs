//! Environment-based configuration overrides.

use std::collections::HashMap;
use std::time::Duration;

use super::AutomationConfig;
use crate::error::{ExpectError, Result};

/// Environment configuration prefix.
pub const DEFAULT_PREFIX: &str = "CONSOLE_INSTALL";

/// Environment variable reader.
///
/// Reads from the process environment by default; tests inject a fixed map so
/// they never have to mutate global state.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    prefix: String,
    vars: Option<HashMap<String, String>>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl EnvConfig {
    /// Create a reader over the process environment.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            vars: None,
        }
    }

    /// Create a reader over a fixed set of variables.
    #[must_use]
    pub fn from_vars<I, K, V>(prefix: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            prefix: prefix.into(),
            vars: Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }

    fn var_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_uppercase()
        } else {
            format!("{}_{}", self.prefix, name.to_uppercase())
        }
    }

    /// Get a string value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        let var_name = self.var_name(name);
        match &self.vars {
            Some(vars) => vars.get(&var_name).cloned(),
            None => std::env::var(&var_name).ok(),
        }
    }

    /// Get a duration given in (fractional) seconds.
    ///
    /// # Errors
    ///
    /// Returns a config error when the variable is set but not a duration.
    pub fn duration_secs(&self, name: &str) -> Result<Option<Duration>> {
        self.get(name)
            .map(|raw| {
                raw.trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                    .ok_or_else(|| {
                        ExpectError::config(format!(
                            "{} is not a duration in seconds: {raw:?}",
                            self.var_name(name)
                        ))
                    })
            })
            .transpose()
    }

    /// Apply the recognised overrides to `config`.
    ///
    /// | variable                    | field                    |
    /// |-----------------------------|--------------------------|
    /// | `<PREFIX>_COMMAND`          | `console.command`        |
    /// | `<PREFIX>_CONNECT_TIMEOUT`  | `timeouts.connect`       |
    /// | `<PREFIX>_LOGIN_TIMEOUT`    | `timeouts.login`         |
    /// | `<PREFIX>_GRUB_TIMEOUT`     | `timeouts.grub`          |
    /// | `<PREFIX>_READY_TIMEOUT`    | `timeouts.ready`         |
    pub fn apply(&self, config: &mut AutomationConfig) -> Result<()> {
        if let Some(command) = self.get("command") {
            config.console.command = command;
        }
        let timeouts = &mut config.timeouts;
        for (name, slot) in [
            ("connect_timeout", &mut timeouts.connect),
            ("login_timeout", &mut timeouts.login),
            ("grub_timeout", &mut timeouts.grub),
            ("ready_timeout", &mut timeouts.ready),
        ] {
            if let Some(value) = self.duration_secs(name)? {
                *slot = value;
            }
        }
        Ok(())
    }
}
