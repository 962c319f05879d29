//! Connector handing out mock transports.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::transport::MockTransport;
use crate::backend::{Connector, spawn_error};
use crate::error::{ExpectError, Result};

/// Opens scripted consoles instead of starting a helper process.
///
/// Transports are handed out as clones, so the connector can still report
/// how often each one was closed after the session is gone.
#[derive(Debug, Default)]
pub struct MockConnector {
    default: Option<MockTransport>,
    devices: HashMap<String, MockTransport>,
    failure: Option<io::ErrorKind>,
    opens: AtomicUsize,
}

impl MockConnector {
    /// A connector that serves `transport` for any device.
    #[must_use]
    pub fn new(transport: MockTransport) -> Self {
        Self {
            default: Some(transport),
            ..Self::default()
        }
    }

    /// A connector with one transport per device.
    #[must_use]
    pub fn per_device<I, S>(transports: I) -> Self
    where
        I: IntoIterator<Item = (S, MockTransport)>,
        S: Into<String>,
    {
        Self {
            devices: transports.into_iter().map(|(d, t)| (d.into(), t)).collect(),
            ..Self::default()
        }
    }

    /// A connector whose helper fails to start with `kind`.
    #[must_use]
    pub fn failing_with(kind: io::ErrorKind) -> Self {
        Self {
            failure: Some(kind),
            ..Self::default()
        }
    }

    /// Number of successful opens.
    #[must_use]
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Total `close` calls across every transport this connector serves.
    #[must_use]
    pub fn closes(&self) -> usize {
        self.default
            .iter()
            .chain(self.devices.values())
            .map(MockTransport::close_count)
            .sum()
    }

    /// The transport served for `device`, if any.
    #[must_use]
    pub fn transport(&self, device: &str) -> Option<&MockTransport> {
        self.devices.get(device).or(self.default.as_ref())
    }
}

impl Connector for MockConnector {
    type Transport = MockTransport;

    async fn open(&self, device: &str) -> Result<MockTransport> {
        if let Some(kind) = self.failure {
            return Err(ExpectError::Spawn(spawn_error(
                "mock-console",
                io::Error::from(kind),
            )));
        }

        let transport = self.transport(device).cloned().ok_or_else(|| {
            ExpectError::io_context(
                format!("opening console of {device}"),
                io::Error::new(io::ErrorKind::NotConnected, "no mock console for device"),
            )
        })?;
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(transport)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
