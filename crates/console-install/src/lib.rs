//! console-install: unattended switch OS installs over a serial console
//!
//! This crate drives a device's console from connection to a known terminal
//! state: it optionally logs in and reboots, walks the boot menu to the
//! installer entry, confirms install mode, and optionally follows the install
//! until the new system reports ready. Every run ends in exactly one
//! [`Outcome`] with a stable exit code.
//!
//! # Features
//!
//! - **Explicit phase state machine** with a deadline per phase
//! - **Priority pattern matching** over literal and regex patterns
//! - **Configurable pattern tables** loaded from TOML or JSON
//! - **Mock console** for testing without hardware (feature: `mock`)
//!
//! # Example
//!
//! ```no_run
//! use console_install::{Credentials, run_install_automation};
//!
//! #[tokio::main]
//! async fn main() -> std::process::ExitCode {
//!     let credentials = Credentials::new("admin", "admin");
//!     run_install_automation("leaf-01", Some(credentials), true)
//!         .await
//!         .into()
//! }
//! ```

pub mod automation;
pub mod backend;
pub mod config;
pub mod diag;
pub mod driver;
pub mod error;
pub mod expect;
pub mod orchestrate;
pub mod prelude;
pub mod report;
pub mod session;
pub mod types;
pub mod util;

/// Scripted consoles for testing.
#[cfg(feature = "mock")]
pub mod mock;

pub use automation::{run_install_automation, run_with};
pub use backend::{ConsoleTransport, Connector, ProcessConnector, ProcessTransport};
pub use config::env::EnvConfig;
pub use config::file::{ConfigFormat, ConfigLoader};
pub use config::{AutomationConfig, ConsoleConfig, Keystrokes, PatternTable, PhaseTimeouts};
pub use driver::{Credentials, InstallDriver, InstallRequest, Mode, Phase, Transition};
pub use error::{ExpectError, InstallError, Result, SpawnError};
pub use expect::{Matcher, Pattern, PatternSet, PatternSpec, RingBuffer};
#[cfg(feature = "mock")]
pub use mock::{MockBuilder, MockConnector, MockEvent, MockTransport};
pub use orchestrate::{
    CheckFailure, ConnectivityCheck, DeviceRequest, DeviceResult, FleetReport,
    OrchestrationError, ensure_devices_ready, run_after_ready,
};
pub use report::{Outcome, Reporter};
pub use session::Session;
pub use types::{ExpectOutcome, Match, SessionState};
pub use util::Deadline;
