//! Scripted consoles for exercising the automation without hardware.
//!
//! - [`MockTransport`]: an in-memory console replaying a timeline
//! - [`MockBuilder`]: fluent construction of timelines and responders
//! - [`MockConnector`]: hands mock transports to the session layer
//!
//! ```rust
//! use console_install::mock::MockBuilder;
//!
//! let transport = MockBuilder::new()
//!     .output("Type the hot key to suspend the connection: <CTRL>Z\r\n")
//!     .output("leaf-01 login: ")
//!     .on_write("admin\r", "Password: ")
//!     .build();
//! ```

mod connector;
mod event;
mod menu;
mod transport;

use std::time::Duration;

pub use connector::MockConnector;
pub use event::MockEvent;
pub use menu::{MenuAction, MenuItem, MockMenu};
pub use transport::{MockTransport, Responder};

/// Builder for creating mock transports fluently.
#[derive(Default)]
pub struct MockBuilder {
    events: Vec<MockEvent>,
    responders: Vec<Responder>,
}

impl MockBuilder {
    /// Create a new mock builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Print text.
    #[must_use]
    pub fn output(mut self, data: &str) -> Self {
        self.events.push(MockEvent::output_str(data));
        self
    }

    /// Print raw bytes.
    #[must_use]
    pub fn output_bytes(mut self, data: &[u8]) -> Self {
        self.events.push(MockEvent::output(data.to_vec()));
        self
    }

    /// Stay silent for a while.
    #[must_use]
    pub fn delay(mut self, duration: Duration) -> Self {
        self.events.push(MockEvent::delay(duration));
        self
    }

    /// Close the stream.
    #[must_use]
    pub fn eof(mut self) -> Self {
        self.events.push(MockEvent::eof());
        self
    }

    /// Fail the next read.
    #[must_use]
    pub fn error(mut self, msg: &str) -> Self {
        self.events.push(MockEvent::error(msg));
        self
    }

    /// Append an arbitrary event.
    #[must_use]
    pub fn event(mut self, event: MockEvent) -> Self {
        self.events.push(event);
        self
    }

    /// Print `reply` every time exactly `trigger` is written.
    #[must_use]
    pub fn on_write(self, trigger: &str, reply: &str) -> Self {
        self.on_write_events(trigger, vec![vec![MockEvent::output_str(reply)]])
    }

    /// Reply with the next event list each time exactly `trigger` is
    /// written; the last list repeats once the others are used up.
    #[must_use]
    pub fn on_write_events(mut self, trigger: &str, replies: Vec<Vec<MockEvent>>) -> Self {
        let trigger = trigger.as_bytes().to_vec();
        let mut fired = 0usize;
        self.responders.push(Box::new(move |data: &[u8]| {
            if data != trigger.as_slice() || replies.is_empty() {
                return None;
            }
            let reply = replies[fired.min(replies.len() - 1)].clone();
            fired += 1;
            Some(reply)
        }));
        self
    }

    /// Add a custom responder; it sees every write and may reply.
    #[must_use]
    pub fn respond_with<F>(mut self, responder: F) -> Self
    where
        F: FnMut(&[u8]) -> Option<Vec<MockEvent>> + Send + 'static,
    {
        self.responders.push(Box::new(responder));
        self
    }

    /// Show `menu` now and let it react to navigation keystrokes.
    #[must_use]
    pub fn menu(mut self, mut menu: MockMenu) -> Self {
        self.events.push(MockEvent::output_str(&menu.render()));
        self.responders.push(Box::new(move |data: &[u8]| menu.handle(data)));
        self
    }

    /// Let `menu` react to navigation keystrokes without drawing it yet.
    #[must_use]
    pub fn hidden_menu(mut self, mut menu: MockMenu) -> Self {
        self.responders.push(Box::new(move |data: &[u8]| menu.handle(data)));
        self
    }

    /// Build the transport.
    #[must_use]
    pub fn build(self) -> MockTransport {
        MockTransport::new(self.events, self.responders)
    }
}

impl std::fmt::Debug for MockBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockBuilder")
            .field("events", &self.events)
            .field("responders", &self.responders.len())
            .finish()
    }
}
