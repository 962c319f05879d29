//! Multi-device bring-up and the hand-off to a connectivity check.
//!
//! Each device gets its own driver and session; runs proceed concurrently and
//! share nothing but the read-only configuration and connector.

use std::fmt;
use std::future::Future;

use futures::future::join_all;
use thiserror::Error;

use crate::automation::run_with;
use crate::backend::Connector;
use crate::config::AutomationConfig;
use crate::driver::{Credentials, InstallRequest};
use crate::report::Outcome;

/// One device to bring up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRequest {
    /// Device name, as understood by the console helper.
    pub name: String,
    /// Credentials; `None` selects power-reset mode.
    pub credentials: Option<Credentials>,
}

impl DeviceRequest {
    /// A device in power-reset mode.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            credentials: None,
        }
    }

    /// Log in with these credentials and reboot.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

/// Outcome of one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceResult {
    /// The device.
    pub device: String,
    /// How its run ended.
    pub outcome: Outcome,
}

/// Aggregated outcomes of a multi-device bring-up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FleetReport {
    /// Per-device results, in request order.
    pub results: Vec<DeviceResult>,
}

impl FleetReport {
    /// True when every device succeeded.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.results.iter().all(|r| r.outcome.is_success())
    }

    /// Devices that did not succeed.
    pub fn failures(&self) -> impl Iterator<Item = &DeviceResult> {
        self.results.iter().filter(|r| !r.outcome.is_success())
    }

    /// `device: outcome` for each failed device, or `None` when all passed.
    #[must_use]
    pub fn failure_detail(&self) -> Option<String> {
        let failed: Vec<String> = self
            .failures()
            .map(|r| format!("{}: {}", r.device, r.outcome))
            .collect();
        (!failed.is_empty()).then(|| failed.join(", "))
    }

    /// Outcome of `device`, if it was part of the run.
    #[must_use]
    pub fn outcome(&self, device: &str) -> Option<Outcome> {
        self.results
            .iter()
            .find(|r| r.device == device)
            .map(|r| r.outcome)
    }
}

impl fmt::Display for FleetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.failure_detail() {
            None => write!(f, "{} device(s) ready", self.results.len()),
            Some(detail) => write!(f, "failed: {detail}"),
        }
    }
}

/// Bring up every device concurrently and collect the outcomes.
pub async fn ensure_devices_ready<C: Connector>(
    connector: &C,
    config: &AutomationConfig,
    devices: &[DeviceRequest],
    wait_ready: bool,
) -> FleetReport {
    let runs = devices.iter().map(|device| async move {
        let request = InstallRequest {
            device: device.name.clone(),
            credentials: device.credentials.clone(),
            wait_ready,
        };
        let outcome = run_with(connector, config, &request).await;
        DeviceResult {
            device: device.name.clone(),
            outcome,
        }
    });

    FleetReport {
        results: join_all(runs).await,
    }
}

/// Failure detail of a connectivity check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CheckFailure(pub String);

/// An opaque pass/fail step run once the fabric is up.
pub trait ConnectivityCheck: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Run the check.
    fn run(&self) -> impl Future<Output = Result<(), CheckFailure>> + Send;
}

/// Why [`run_after_ready`] failed.
#[derive(Debug, Error)]
pub enum OrchestrationError {
    /// At least one device did not come up; the check was not run.
    #[error("devices not ready: {detail}")]
    DevicesNotReady {
        /// Failing devices and their outcomes.
        detail: String,
        /// The full bring-up report.
        report: FleetReport,
    },

    /// All devices came up but the check failed.
    #[error("connectivity check '{name}' failed: {source}")]
    CheckFailed {
        /// The check that failed.
        name: String,
        /// What the check reported.
        source: CheckFailure,
    },
}

/// Bring up every device, then run `check` if and only if all succeeded.
pub async fn run_after_ready<C, K>(
    connector: &C,
    config: &AutomationConfig,
    devices: &[DeviceRequest],
    wait_ready: bool,
    check: &K,
) -> Result<FleetReport, OrchestrationError>
where
    C: Connector,
    K: ConnectivityCheck,
{
    let report = ensure_devices_ready(connector, config, devices, wait_ready).await;
    if let Some(detail) = report.failure_detail() {
        return Err(OrchestrationError::DevicesNotReady { detail, report });
    }

    tracing::info!(check = check.name(), "{report}, running connectivity check");
    check
        .run()
        .await
        .map_err(|source| OrchestrationError::CheckFailed {
            name: check.name().to_string(),
            source,
        })?;
    Ok(report)
}
