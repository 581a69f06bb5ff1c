//! `${NAME}` variable substitution for configuration strings.
//!
//! `$${NAME}` escapes the expansion and produces the literal `${NAME}`.
//! Unknown variables expand to the empty string; the caller receives
//! the full set of missing keys and decides whether that is fatal.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use thiserror::Error;

static SUBST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$?\$\{([^}]+)\}").expect("substitution pattern compiles"));

/// Reported when one or more `${NAME}` references had no value.
#[derive(Debug, Error)]
#[error("no value found for keys: {}", keys.iter().cloned().collect::<Vec<_>>().join(", "))]
pub struct MissingKeysError {
    keys: BTreeSet<String>,
}

impl MissingKeysError {
    pub fn missing_keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

/// Expand `${NAME}` references in `text` using `lookup`.
///
/// Always returns the substituted text. Unknown keys expand empty and
/// are reported through the second element.
pub fn substitute<'a, F>(text: &str, lookup: F) -> (String, Option<MissingKeysError>)
where
    F: Fn(&str) -> Option<&'a str>,
{
    let mut missing = BTreeSet::new();
    let replaced = SUBST_RE.replace_all(text, |caps: &Captures<'_>| {
        let whole = caps.get(0).expect("full match").as_str();
        if whole.starts_with("$$") {
            return whole[1..].to_string();
        }
        let key = caps.get(1).expect("key group").as_str().trim();
        match lookup(key) {
            Some(value) => value.to_string(),
            None => {
                missing.insert(key.to_string());
                String::new()
            }
        }
    });

    let error = if missing.is_empty() {
        None
    } else {
        Some(MissingKeysError { keys: missing })
    };
    (replaced.into_owned(), error)
}
