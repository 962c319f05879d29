//! Expect pattern matching module.
//!
//! This module provides the pattern types, the bounded output buffer and the
//! matching engine that the console session evaluates on every read.

mod buffer;
mod matcher;
mod pattern;

pub use buffer::{DEFAULT_CAPACITY, RingBuffer};
pub use matcher::{MatchResult, Matcher};
pub use pattern::{CompiledRegex, NamedPattern, Pattern, PatternMatch, PatternSet, PatternSpec};
