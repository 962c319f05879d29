//! Backends that provide the raw console byte stream.
//!
//! A [`Connector`] turns a device name into a [`ConsoleTransport`]. The
//! production connector starts a helper subprocess; the mock connector in
//! [`crate::mock`] hands out scripted transports for tests.

mod process;

use std::future::Future;
use std::io;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::Result;

pub use process::{ProcessConnector, ProcessTransport, resolve_command, spawn_error};

/// A bidirectional console stream that can be released synchronously.
///
/// `close` must be idempotent: the session calls it on the normal path and
/// again from `Drop` if a run unwinds early.
pub trait ConsoleTransport: AsyncRead + AsyncWrite + Unpin + Send {
    /// Release the underlying resource.
    fn close(&mut self) -> io::Result<()>;
}

/// Opens console transports for named devices.
pub trait Connector: Send + Sync {
    /// The transport type produced by this connector.
    type Transport: ConsoleTransport;

    /// Open the console of `device`.
    ///
    /// Fails with [`crate::ExpectError::Spawn`] when the transport itself
    /// could not be started.
    fn open(&self, device: &str) -> impl Future<Output = Result<Self::Transport>> + Send;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}
