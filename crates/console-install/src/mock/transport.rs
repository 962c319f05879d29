//! Scripted in-memory console transport.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, Waker};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::time::Sleep;

use super::event::MockEvent;
use crate::backend::ConsoleTransport;

/// Reacts to one write; `None` lets the next responder try.
pub type Responder = Box<dyn FnMut(&[u8]) -> Option<Vec<MockEvent>> + Send>;

struct MockState {
    timeline: VecDeque<MockEvent>,
    output: VecDeque<u8>,
    delay: Option<Pin<Box<Sleep>>>,
    read_waker: Option<Waker>,
    eof: bool,
    error: Option<String>,
    responders: Vec<Responder>,
    writes: Vec<Vec<u8>>,
    closes: usize,
}

impl MockState {
    fn new(timeline: VecDeque<MockEvent>, responders: Vec<Responder>) -> Self {
        Self {
            timeline,
            output: VecDeque::new(),
            delay: None,
            read_waker: None,
            eof: false,
            error: None,
            responders,
            writes: Vec::new(),
            closes: 0,
        }
    }

    fn wake_reader(&mut self) {
        if let Some(waker) = self.read_waker.take() {
            waker.wake();
        }
    }

    fn respond(&mut self, data: &[u8]) {
        let reply = self.responders.iter_mut().find_map(|r| r(data));
        if let Some(events) = reply {
            self.timeline.extend(events);
            self.wake_reader();
        }
    }
}

/// A console transport that replays a scripted timeline.
///
/// Output events are served in order; `Delay` events hold back the rest of
/// the timeline on the tokio clock, so tests with a paused clock run through
/// long silences instantly. Writes are recorded and offered to the
/// responders, whose replies are appended to the timeline.
///
/// Clones share state: keep one handle to inspect what the session wrote
/// and how often it closed the transport.
#[derive(Clone)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a transport with a timeline and responders.
    #[must_use]
    pub fn new(events: impl IntoIterator<Item = MockEvent>, responders: Vec<Responder>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::new(
                events.into_iter().collect(),
                responders,
            ))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append events to the timeline.
    pub fn push(&self, events: impl IntoIterator<Item = MockEvent>) {
        let mut state = self.lock();
        state.timeline.extend(events);
        state.wake_reader();
    }

    /// Every write made so far, one entry per write call.
    #[must_use]
    pub fn writes(&self) -> Vec<String> {
        self.lock()
            .writes
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }

    /// All written bytes concatenated.
    #[must_use]
    pub fn written(&self) -> String {
        let state = self.lock();
        let bytes: Vec<u8> = state.writes.concat();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Number of times `close` was called.
    #[must_use]
    pub fn close_count(&self) -> usize {
        self.lock().closes
    }

    /// Check if the transport has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.close_count() > 0
    }
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("MockTransport")
            .field("pending_events", &state.timeline.len())
            .field("buffered", &state.output.len())
            .field("responders", &state.responders.len())
            .field("writes", &state.writes.len())
            .field("closes", &state.closes)
            .finish()
    }
}

impl AsyncRead for MockTransport {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let mut state = self.lock();

        loop {
            if let Some(error) = state.error.take() {
                return Poll::Ready(Err(io::Error::other(error)));
            }

            if !state.output.is_empty() {
                let n = buf.remaining().min(state.output.len());
                let chunk: Vec<u8> = state.output.drain(..n).collect();
                buf.put_slice(&chunk);
                return Poll::Ready(Ok(()));
            }

            if let Some(delay) = state.delay.as_mut() {
                if delay.as_mut().poll(cx).is_pending() {
                    state.read_waker = Some(cx.waker().clone());
                    return Poll::Pending;
                }
                state.delay = None;
            }

            if state.eof || state.closes > 0 {
                return Poll::Ready(Ok(()));
            }

            match state.timeline.pop_front() {
                Some(MockEvent::Output(data)) => state.output.extend(data),
                Some(MockEvent::Delay(d)) => state.delay = Some(Box::pin(tokio::time::sleep(d))),
                Some(MockEvent::Eof) => state.eof = true,
                Some(MockEvent::Error(msg)) => state.error = Some(msg),
                None => {
                    state.read_waker = Some(cx.waker().clone());
                    return Poll::Pending;
                }
            }
        }
    }
}

impl AsyncWrite for MockTransport {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let mut state = self.lock();
        if state.closes > 0 {
            return Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()));
        }
        state.writes.push(buf.to_vec());
        state.respond(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

impl ConsoleTransport for MockTransport {
    fn close(&mut self) -> io::Result<()> {
        let mut state = self.lock();
        state.closes += 1;
        state.wake_reader();
        Ok(())
    }
}
