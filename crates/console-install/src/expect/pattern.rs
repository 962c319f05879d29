//! Pattern types for expect operations.
//!
//! A [`PatternSet`] is an ordered list of named literal or regex patterns.
//! Matching is priority based: the earliest pattern *in the list* that matches
//! anywhere in the text wins, even if a later pattern matches at an earlier
//! offset. The driver relies on this to rank, for example, an "incorrect
//! credentials" message above a login prompt that follows it.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ExpectError, Result};

/// A pattern that can be matched against console output.
#[derive(Clone)]
pub enum Pattern {
    /// Match an exact substring.
    Literal(String),

    /// Match a regular expression.
    Regex(CompiledRegex),
}

impl Pattern {
    /// Create a literal pattern.
    #[must_use]
    pub fn literal(s: impl Into<String>) -> Self {
        Self::Literal(s.into())
    }

    /// Create a regex pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the regex pattern is invalid.
    pub fn regex(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)?;
        Ok(Self::Regex(CompiledRegex::new(pattern.to_string(), regex)))
    }

    /// The pattern source, for display purposes.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(s) => s,
            Self::Regex(r) => r.pattern(),
        }
    }

    /// Find this pattern in `text`, returning the byte span of the first hit.
    #[must_use]
    pub fn matches(&self, text: &str) -> Option<PatternMatch> {
        match self {
            Self::Literal(s) if s.is_empty() => None,
            Self::Literal(s) => text.find(s.as_str()).map(|pos| PatternMatch {
                start: pos,
                end: pos + s.len(),
            }),
            Self::Regex(r) => r.find(text).map(|m| PatternMatch {
                start: m.start(),
                end: m.end(),
            }),
        }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(s) => write!(f, "Literal({s:?})"),
            Self::Regex(r) => write!(f, "Regex({:?})", r.pattern()),
        }
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self {
        Self::Literal(s.to_string())
    }
}

impl From<String> for Pattern {
    fn from(s: String) -> Self {
        Self::Literal(s)
    }
}

/// Serializable description of a pattern, as it appears in config files.
///
/// ```toml
/// login_prompt = { literal = "login:" }
/// shell_prompt = { regex = '[\w.-]+@[\w.-]+:[^\r\n]*[$#]' }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternSpec {
    /// Exact substring.
    Literal(String),
    /// Regular expression.
    Regex(String),
}

impl PatternSpec {
    /// Literal spec helper.
    pub fn literal(s: impl Into<String>) -> Self {
        Self::Literal(s.into())
    }

    /// Regex spec helper.
    pub fn regex(s: impl Into<String>) -> Self {
        Self::Regex(s.into())
    }

    /// Compile into a matchable [`Pattern`].
    pub fn compile(&self) -> Result<Pattern> {
        match self {
            Self::Literal(s) if s.is_empty() => {
                Err(ExpectError::invalid_pattern("literal pattern is empty"))
            }
            Self::Literal(s) => Ok(Pattern::literal(s.clone())),
            Self::Regex(s) => Pattern::regex(s),
        }
    }
}

/// A compiled regular expression with its source pattern.
#[derive(Clone)]
pub struct CompiledRegex {
    pattern: String,
    regex: Regex,
}

impl CompiledRegex {
    /// Create a new compiled regex.
    #[must_use]
    pub const fn new(pattern: String, regex: Regex) -> Self {
        Self { pattern, regex }
    }

    /// Get the source pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Find the first match in the text.
    #[must_use]
    pub fn find<'a>(&self, text: &'a str) -> Option<regex::Match<'a>> {
        self.regex.find(text)
    }
}

/// Byte span of a successful pattern match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternMatch {
    /// Start position of the match in the text.
    pub start: usize,
    /// End position of the match in the text.
    pub end: usize,
}

/// A pattern with a name, as stored in a [`PatternSet`].
#[derive(Debug, Clone)]
pub struct NamedPattern {
    /// The pattern.
    pub pattern: Pattern,
    /// Name used in logs and timeout messages.
    pub name: String,
}

/// An ordered set of patterns; earlier entries take priority.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<NamedPattern>,
}

impl PatternSet {
    /// Create a new empty pattern set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pattern set from unnamed patterns; each is named after its source.
    #[must_use]
    pub fn from_patterns(patterns: Vec<Pattern>) -> Self {
        let patterns = patterns
            .into_iter()
            .map(|pattern| NamedPattern {
                name: pattern.as_str().to_string(),
                pattern,
            })
            .collect();
        Self { patterns }
    }

    /// Add a pattern named after its source.
    pub fn add(&mut self, pattern: Pattern) -> &mut Self {
        let name = pattern.as_str().to_string();
        self.patterns.push(NamedPattern { pattern, name });
        self
    }

    /// Add a named pattern.
    pub fn add_named(&mut self, name: impl Into<String>, pattern: Pattern) -> &mut Self {
        self.patterns.push(NamedPattern {
            pattern,
            name: name.into(),
        });
        self
    }

    /// Get the number of patterns in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Check if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Find the highest-priority pattern that matches anywhere in `text`.
    ///
    /// Returns the pattern index and its match span.
    #[must_use]
    pub fn find_match(&self, text: &str) -> Option<(usize, PatternMatch)> {
        self.patterns
            .iter()
            .enumerate()
            .find_map(|(idx, named)| named.pattern.matches(text).map(|m| (idx, m)))
    }

    /// Get a pattern by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&NamedPattern> {
        self.patterns.get(index)
    }

    /// Comma separated pattern names, for logs and timeout errors.
    #[must_use]
    pub fn describe(&self) -> String {
        self.patterns
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Get iterator over patterns.
    pub fn iter(&self) -> impl Iterator<Item = &NamedPattern> {
        self.patterns.iter()
    }
}
