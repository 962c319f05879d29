//! Session handle for a single device console.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::echo::LineEcho;
use crate::backend::{ConsoleTransport, Connector};
use crate::config::ConsoleConfig;
use crate::error::{ExpectError, Result};
use crate::expect::{Matcher, PatternSet};
use crate::types::{ExpectOutcome, SessionState};
use crate::util::Deadline;

/// Read size for one transport read.
const READ_CHUNK: usize = 4096;

/// An open console connection to one device.
///
/// The transport is released by [`Session::close`]; if the session is
/// dropped without being closed, `Drop` releases it instead, so every exit
/// path leaves no helper process behind.
pub struct Session<T: ConsoleTransport> {
    device: String,
    transport: T,
    line_ending: String,
    matcher: Matcher,
    state: SessionState,
    echo: Option<LineEcho>,
}

impl<T: ConsoleTransport> Session<T> {
    /// Wrap an already opened transport.
    pub fn new(device: impl Into<String>, transport: T, config: &ConsoleConfig) -> Self {
        Self {
            device: device.into(),
            transport,
            line_ending: config.line_ending.clone(),
            matcher: Matcher::new(config.buffer_size),
            state: SessionState::Running,
            echo: config.echo_output.then(LineEcho::new),
        }
    }

    /// Open the console of `device` through `connector`.
    ///
    /// # Errors
    ///
    /// Returns [`ExpectError::Spawn`] if the transport could not be started.
    pub async fn open<C>(connector: &C, device: &str, config: &ConsoleConfig) -> Result<Self>
    where
        C: Connector<Transport = T>,
    {
        let transport = connector.open(device).await?;
        tracing::debug!(device = %device, backend = connector.name(), "console opened");
        Ok(Self::new(device, transport, config))
    }

    /// The device this session is attached to.
    #[must_use]
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// The last `n` bytes of buffered output.
    #[must_use]
    pub fn buffer_tail(&mut self, n: usize) -> String {
        self.matcher.tail(n)
    }

    /// Discard all buffered output.
    pub fn clear_buffer(&mut self) {
        self.matcher.clear();
    }

    /// Send raw bytes to the console.
    ///
    /// # Errors
    ///
    /// Returns [`ExpectError::SessionClosed`] after `close`, or an I/O error
    /// if the write fails.
    pub async fn send(&mut self, data: &[u8]) -> Result<()> {
        if self.state == SessionState::Closed {
            return Err(ExpectError::SessionClosed);
        }

        self.transport
            .write_all(data)
            .await
            .map_err(|e| ExpectError::io_context("writing to console", e))?;
        self.transport
            .flush()
            .await
            .map_err(|e| ExpectError::io_context("flushing console input", e))?;
        Ok(())
    }

    /// Send a string to the console as is.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn send_str(&mut self, s: &str) -> Result<()> {
        self.send(s.as_bytes()).await
    }

    /// Send a line followed by the configured line ending.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn send_line(&mut self, line: &str) -> Result<()> {
        let data = format!("{line}{}", self.line_ending);
        self.send(data.as_bytes()).await
    }

    /// Wait until one of `patterns` matches, the stream ends, or `timeout`
    /// elapses, whichever comes first.
    ///
    /// Already buffered output is checked before anything is read, so a zero
    /// timeout still reports a pattern that is present. When several patterns
    /// match, the one listed first wins. The matched text and everything
    /// before it are consumed from the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ExpectError::SessionClosed`] after `close`, or an I/O error
    /// if reading fails. Timeout and end-of-stream are not errors.
    pub async fn expect_any(
        &mut self,
        patterns: &PatternSet,
        timeout: Duration,
    ) -> Result<ExpectOutcome> {
        if self.state == SessionState::Closed {
            return Err(ExpectError::SessionClosed);
        }

        let deadline = Deadline::from_now(timeout);
        loop {
            if let Some(result) = self.matcher.try_match_any(patterns) {
                let m = self.matcher.consume_match(&result, patterns);
                tracing::trace!(device = %self.device, pattern = %m.name, "pattern matched");
                return Ok(ExpectOutcome::Matched(m));
            }

            if self.state == SessionState::Eof {
                return Ok(ExpectOutcome::Eof {
                    buffer: self.matcher.buffer_str(),
                });
            }

            if deadline.is_expired() {
                tracing::trace!(
                    device = %self.device,
                    patterns = %patterns.describe(),
                    ?timeout,
                    "expectation timed out"
                );
                return Ok(ExpectOutcome::Timeout {
                    duration: timeout,
                    buffer: self.matcher.buffer_str(),
                });
            }

            self.read_with_timeout(deadline.remaining()).await?;
        }
    }

    /// Read one chunk, waiting at most `timeout`. Elapsing is not an error.
    async fn read_with_timeout(&mut self, timeout: Duration) -> Result<()> {
        let mut buf = [0u8; READ_CHUNK];

        match tokio::time::timeout(timeout, self.transport.read(&mut buf)).await {
            Ok(Ok(0)) => {
                tracing::debug!(device = %self.device, "console stream closed");
                self.state = SessionState::Eof;
                self.flush_echo();
                Ok(())
            }
            Ok(Ok(n)) => {
                let text = self.matcher.append(&buf[..n]);
                if let Some(echo) = self.echo.as_mut() {
                    for line in echo.feed(&text) {
                        tracing::info!(device = %self.device, "{line}");
                    }
                }
                Ok(())
            }
            Ok(Err(e)) => Err(ExpectError::io_context("reading from console", e)),
            Err(_) => Ok(()),
        }
    }

    fn flush_echo(&mut self) {
        if let Some(line) = self.echo.as_mut().and_then(LineEcho::finish) {
            tracing::info!(device = %self.device, "{line}");
        }
    }

    /// Release the transport. Calling it again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport reports a failure while closing; the
    /// session counts as closed either way.
    pub fn close(&mut self) -> Result<()> {
        if self.state == SessionState::Closed {
            return Ok(());
        }
        self.flush_echo();
        self.state = SessionState::Closed;
        tracing::debug!(device = %self.device, "closing console");
        self.transport
            .close()
            .map_err(|e| ExpectError::io_context("closing console", e))
    }
}

impl<T: ConsoleTransport> Drop for Session<T> {
    fn drop(&mut self) {
        if self.state != SessionState::Closed {
            self.state = SessionState::Closed;
            let _ = self.transport.close();
        }
    }
}

impl<T: ConsoleTransport> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("device", &self.device)
            .field("state", &self.state)
            .field("buffered", &self.matcher.len())
            .finish_non_exhaustive()
    }
}
