//! String selectors for branch and tag names.
//!
//! A matcher is either a literal (plain equality) or a regular
//! expression. The textual form wraps regex patterns in slashes:
//! `/v[0-9]+/` is a pattern, `main` is a literal. An empty matcher
//! matches every input.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error raised when a matcher pattern fails to compile.
#[derive(Debug, Error)]
#[error("failed to compile pattern '{spec}': {source}")]
pub struct MatcherError {
    pub spec: String,
    #[source]
    source: regex::Error,
}

#[derive(Debug, Clone)]
enum Repr {
    Literal(String),
    Pattern { spec: String, compiled: Regex },
}

/// A literal or regex selector over ref short-names.
///
/// Immutable after construction. The compiled pattern is never exposed;
/// callers interact through [`Matcher::matches`] and the textual
/// round-trip form.
#[derive(Debug, Clone)]
pub struct Matcher(Repr);

impl Matcher {
    /// The empty matcher, which matches every input.
    pub fn empty() -> Self {
        Matcher(Repr::Literal(String::new()))
    }

    /// Build a regex matcher directly from a pattern (no slash wrapping).
    pub fn from_pattern(spec: &str) -> Result<Self, MatcherError> {
        let compiled = Regex::new(spec).map_err(|source| MatcherError {
            spec: spec.to_string(),
            source,
        })?;
        Ok(Matcher(Repr::Pattern {
            spec: spec.to_string(),
            compiled,
        }))
    }

    pub fn is_empty(&self) -> bool {
        matches!(&self.0, Repr::Literal(s) if s.is_empty())
    }

    pub fn uses_regex(&self) -> bool {
        matches!(&self.0, Repr::Pattern { .. })
    }

    /// Test an input against the selector. Empty matchers match all
    /// inputs; literals compare for equality; patterns search for a
    /// match anywhere in the input.
    pub fn matches(&self, input: &str) -> bool {
        match &self.0 {
            Repr::Literal(s) if s.is_empty() => true,
            Repr::Literal(s) => s == input,
            Repr::Pattern { compiled, .. } => compiled.is_match(input),
        }
    }
}

/// True when at least one matcher in the slice matches the input.
pub fn match_any(matchers: &[Matcher], input: &str) -> bool {
    matchers.iter().any(|m| m.matches(input))
}

impl FromStr for Matcher {
    type Err = MatcherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() >= 2 && s.starts_with('/') && s.ends_with('/') {
            return Matcher::from_pattern(&s[1..s.len() - 1]);
        }
        Ok(Matcher(Repr::Literal(s.to_string())))
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Repr::Literal(s) => f.write_str(s),
            Repr::Pattern { spec, .. } => write!(f, "/{spec}/"),
        }
    }
}

impl PartialEq for Matcher {
    fn eq(&self, other: &Self) -> bool {
        self.uses_regex() == other.uses_regex() && self.to_string() == other.to_string()
    }
}

impl Eq for Matcher {}

impl Default for Matcher {
    fn default() -> Self {
        Matcher::empty()
    }
}

impl Serialize for Matcher {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Accepts either the textual form or the legacy object form
/// `{"spec": "...", "useRegex": bool}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum MatcherInput {
    Text(String),
    Form {
        #[serde(default)]
        spec: String,
        #[serde(default, rename = "useRegex")]
        use_regex: bool,
    },
}

impl<'de> Deserialize<'de> for Matcher {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match MatcherInput::deserialize(deserializer)? {
            MatcherInput::Text(s) => s.parse().map_err(D::Error::custom),
            MatcherInput::Form { spec, use_regex } => {
                if use_regex {
                    Matcher::from_pattern(&spec).map_err(D::Error::custom)
                } else {
                    Ok(Matcher(Repr::Literal(spec)))
                }
            }
        }
    }
}
