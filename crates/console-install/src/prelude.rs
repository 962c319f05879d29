//! Convenient re-exports for common console-install usage.
//!
//! ```ignore
//! use console_install::prelude::*;
//! ```

// Entry points
pub use crate::automation::{run_install_automation, run_with};
pub use crate::orchestrate::{DeviceRequest, FleetReport, ensure_devices_ready, run_after_ready};

// Configuration
pub use crate::config::{AutomationConfig, ConsoleConfig, PhaseTimeouts};

// Driver
pub use crate::driver::{Credentials, InstallRequest, Mode};

// Error handling and outcomes
pub use crate::error::{ExpectError, InstallError, Result};
pub use crate::report::Outcome;

// Console plumbing
pub use crate::backend::{ConsoleTransport, Connector, ProcessConnector};
pub use crate::session::Session;
pub use crate::types::ExpectOutcome;
