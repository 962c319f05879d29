//! Utility helpers shared across the crate.

mod ansi;
mod timeout;

pub use ansi::{printable_line, strip_ansi};
pub use timeout::Deadline;
