//! Diagnostic line formatting.
//!
//! Every line written to stderr has the shape
//! `HH:MM:SS LVL device: message`, where `LVL` is `INF` or `ERR` and left out
//! for other levels.

use std::fmt::{self, Write as _};

use chrono::NaiveTime;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "CONSOLE_INSTALL_LOG";

/// Severity label for a level; empty for levels without one.
#[must_use]
pub fn level_label(level: &Level) -> &'static str {
    match *level {
        Level::INFO => "INF",
        Level::ERROR => "ERR",
        _ => "",
    }
}

/// Render one diagnostic line.
///
/// An empty `device` drops the `device: ` prefix.
#[must_use]
pub fn format_line(time: NaiveTime, level: &Level, device: &str, message: &str) -> String {
    let mut line = time.format("%H:%M:%S").to_string();
    let label = level_label(level);
    if !label.is_empty() {
        line.push(' ');
        line.push_str(label);
    }
    line.push(' ');
    if !device.is_empty() {
        line.push_str(device);
        line.push_str(": ");
    }
    line.push_str(message);
    line
}

#[derive(Default)]
struct LineFields {
    message: String,
    device: String,
    extra: String,
}

impl Visit for LineFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message.push_str(value),
            "device" => self.device.push_str(value),
            name => {
                let _ = write!(self.extra, " {name}={value}");
            }
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => {
                let _ = write!(self.message, "{value:?}");
            }
            "device" => {
                let _ = write!(self.device, "{value:?}");
            }
            name => {
                let _ = write!(self.extra, " {name}={value:?}");
            }
        }
    }
}

/// `tracing-subscriber` event format producing [`format_line`] output.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticFormat {
    clock: fn() -> NaiveTime,
}

impl DiagnosticFormat {
    /// Format with the local wall clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            clock: || chrono::Local::now().time(),
        }
    }

    /// Format with a custom clock.
    #[must_use]
    pub const fn with_clock(clock: fn() -> NaiveTime) -> Self {
        Self { clock }
    }
}

impl Default for DiagnosticFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, N> FormatEvent<S, N> for DiagnosticFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut fields = LineFields::default();
        event.record(&mut fields);
        fields.message.push_str(&fields.extra);

        let line = format_line(
            (self.clock)(),
            event.metadata().level(),
            &fields.device,
            &fields.message,
        );
        writeln!(writer, "{line}")
    }
}

/// Install the diagnostic subscriber on stderr.
///
/// Filter directives come from `CONSOLE_INSTALL_LOG` and default to `info`.
/// Returns `false` if a global subscriber was already set.
pub fn init() -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .event_format(DiagnosticFormat::new())
        .try_init()
        .is_ok()
}
