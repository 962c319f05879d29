//! Console session management.
//!
//! A [`Session`] owns one open console transport together with the matcher
//! that accumulates its output. It is the only component that talks to the
//! transport; the driver sees nothing but expectation outcomes.

mod echo;
mod handle;

pub use echo::LineEcho;
pub use handle::Session;
