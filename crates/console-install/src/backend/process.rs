//! Console helper subprocess backend.
//!
//! The helper's stdout and stderr are pumped by two tasks into one channel so
//! the session sees a single combined stream. The channel closes once both
//! pipes have closed, which the session reads as end-of-stream.

use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;
use std::task::{Context, Poll};

use bytes::{Buf, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, ReadBuf};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;

use super::{ConsoleTransport, Connector};
use crate::config::ConsoleConfig;
use crate::error::{ExpectError, Result, SpawnError};

/// Chunks buffered between the pipe readers and the session.
const CHANNEL_DEPTH: usize = 64;

/// Read size for each pipe.
const READ_CHUNK: usize = 4096;

/// Map an I/O error from spawning `command` into a [`SpawnError`].
#[must_use]
pub fn spawn_error(command: &str, err: io::Error) -> SpawnError {
    match err.kind() {
        io::ErrorKind::NotFound => SpawnError::command_not_found(command),
        io::ErrorKind::PermissionDenied => SpawnError::permission_denied(command),
        _ => SpawnError::Io(err),
    }
}

/// Locate `command` and check that it is executable.
///
/// Commands containing a path separator are checked as given; bare names are
/// searched on `PATH`.
pub fn resolve_command(command: &str) -> std::result::Result<PathBuf, SpawnError> {
    if command.is_empty() || command.contains('\0') {
        return Err(SpawnError::InvalidArgument {
            kind: "command".to_string(),
            reason: "command is empty or contains a null byte".to_string(),
        });
    }

    if command.contains(std::path::MAIN_SEPARATOR) {
        let path = PathBuf::from(command);
        return check_executable(&path).map(|()| path);
    }

    let mut found_unexecutable = None;
    if let Some(paths) = std::env::var_os("PATH") {
        for dir in std::env::split_paths(&paths) {
            let candidate = dir.join(command);
            match check_executable(&candidate) {
                Ok(()) => return Ok(candidate),
                Err(SpawnError::PermissionDenied { .. }) => {
                    found_unexecutable.get_or_insert(candidate);
                }
                Err(_) => {}
            }
        }
    }

    Err(found_unexecutable.map_or_else(
        || SpawnError::command_not_found(command),
        |path| SpawnError::permission_denied(path.display().to_string()),
    ))
}

fn check_executable(path: &Path) -> std::result::Result<(), SpawnError> {
    let metadata = std::fs::metadata(path)
        .map_err(|_| SpawnError::command_not_found(path.display().to_string()))?;
    if !metadata.is_file() {
        return Err(SpawnError::command_not_found(path.display().to_string()));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(SpawnError::permission_denied(path.display().to_string()));
        }
    }

    Ok(())
}

/// Starts the configured console helper for a device.
#[derive(Debug, Clone)]
pub struct ProcessConnector {
    config: ConsoleConfig,
}

impl ProcessConnector {
    /// Create a connector for the given console configuration.
    #[must_use]
    pub const fn new(config: ConsoleConfig) -> Self {
        Self { config }
    }
}

impl Connector for ProcessConnector {
    type Transport = ProcessTransport;

    async fn open(&self, device: &str) -> Result<ProcessTransport> {
        let program = resolve_command(&self.config.command)?;
        let args = self.config.args_for(device);
        tracing::debug!(
            device = %device,
            program = %program.display(),
            ?args,
            "starting console helper"
        );

        let child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExpectError::Spawn(spawn_error(&self.config.command, e)))?;

        ProcessTransport::from_child(child)
    }

    fn name(&self) -> &'static str {
        "process"
    }
}

/// Combined stdout/stderr stream of a console helper process.
#[derive(Debug)]
pub struct ProcessTransport {
    child: Child,
    stdin: Option<ChildStdin>,
    rx: mpsc::Receiver<Bytes>,
    pending: Bytes,
    closed: bool,
}

impl ProcessTransport {
    /// Wrap a spawned child whose stdio are all piped.
    pub fn from_child(mut child: Child) -> Result<Self> {
        let missing = |what: &str| {
            ExpectError::io_context(
                format!("console helper {what}"),
                io::Error::new(io::ErrorKind::BrokenPipe, "pipe not captured"),
            )
        };
        let stdin = child.stdin.take().ok_or_else(|| missing("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| missing("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| missing("stderr"))?;

        let (tx, rx) = mpsc::channel(CHANNEL_DEPTH);
        tokio::spawn(pump(stdout, tx.clone()));
        tokio::spawn(pump(stderr, tx));

        Ok(Self {
            child,
            stdin: Some(stdin),
            rx,
            pending: Bytes::new(),
            closed: false,
        })
    }

    /// Process ID of the helper, if it is still running.
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }
}

async fn pump<R>(mut pipe: R, tx: mpsc::Sender<Bytes>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = BytesMut::with_capacity(READ_CHUNK);
    loop {
        buf.reserve(READ_CHUNK);
        match pipe.read_buf(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                if tx.send(buf.split().freeze()).await.is_err() {
                    break;
                }
            }
        }
    }
}

impl AsyncRead for ProcessTransport {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if self.pending.is_empty() {
            match self.rx.poll_recv(cx) {
                Poll::Ready(Some(chunk)) => self.pending = chunk,
                Poll::Ready(None) => return Poll::Ready(Ok(())),
                Poll::Pending => return Poll::Pending,
            }
        }

        let n = buf.remaining().min(self.pending.len());
        buf.put_slice(&self.pending[..n]);
        self.pending.advance(n);
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for ProcessTransport {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.stdin.as_mut() {
            Some(stdin) => Pin::new(stdin).poll_write(cx, buf),
            None => Poll::Ready(Err(io::ErrorKind::BrokenPipe.into())),
        }
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.stdin.as_mut() {
            Some(stdin) => Pin::new(stdin).poll_flush(cx),
            None => Poll::Ready(Ok(())),
        }
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.stdin.as_mut() {
            Some(stdin) => Pin::new(stdin).poll_shutdown(cx),
            None => Poll::Ready(Ok(())),
        }
    }
}

impl ConsoleTransport for ProcessTransport {
    fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.stdin = None;
        self.rx.close();

        match self.child.try_wait()? {
            Some(_) => Ok(()),
            None => self.child.start_kill(),
        }
    }
}
