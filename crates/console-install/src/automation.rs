//! Entry points for one automation run.
//!
//! A run opens the console, drives it to a terminal state, releases it, and
//! only then reports. The outcome is the single value handed back to the
//! caller.

use crate::backend::{Connector, ProcessConnector};
use crate::config::AutomationConfig;
use crate::config::env::EnvConfig;
use crate::driver::{Credentials, InstallDriver, InstallRequest};
use crate::error::{ExpectError, InstallError};
use crate::report::{Outcome, Reporter};
use crate::session::Session;

/// Run the install automation for `device` with the default configuration,
/// environment overrides, and the console helper process.
///
/// Credentials select reboot-via-login mode; without them the device is
/// expected to be power-cycled externally. `wait_ready` adds the readiness
/// poll after install mode is entered.
pub async fn run_install_automation(
    device: &str,
    credentials: Option<Credentials>,
    wait_ready: bool,
) -> Outcome {
    let mut config = AutomationConfig::default();
    if let Err(err) = EnvConfig::default().apply(&mut config) {
        return Reporter::new(device).report(&Err(err.into()));
    }

    let request = InstallRequest {
        device: device.to_string(),
        credentials,
        wait_ready,
    };
    let connector = ProcessConnector::new(config.console.clone());
    run_with(&connector, &config, &request).await
}

/// Run the install automation through any connector.
pub async fn run_with<C: Connector>(
    connector: &C,
    config: &AutomationConfig,
    request: &InstallRequest,
) -> Outcome {
    let result = execute(connector, config, request).await;
    Reporter::new(&request.device).report(&result)
}

/// Drive one run; the session is closed before this returns.
async fn execute<C: Connector>(
    connector: &C,
    config: &AutomationConfig,
    request: &InstallRequest,
) -> Result<(), InstallError> {
    if request.device.trim().is_empty() {
        return Err(InstallError::Usage("device name is empty".to_string()));
    }
    config.validate()?;
    let driver = InstallDriver::new(config, request)?;

    let mut session = Session::open(connector, &request.device, &config.console)
        .await
        .map_err(|err| match err {
            ExpectError::Spawn(spawn) => InstallError::from(spawn),
            other => InstallError::unreachable(other.to_string()),
        })?;

    let result = driver.run(&mut session).await;

    if let Err(err) = session.close() {
        tracing::debug!(device = %request.device, "releasing console: {err}");
    }
    result
}
