//! Name preprocessing and word-level comparison
//!
//! Identifiers are compared as word lists: `OrderServiceImpl`,
//! `order_service_impl` and `order-service-impl` all split into
//! `["order", "service", "impl"]`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Words dropped by [`PreprocessingMethod::SplitFiltered`] unless configured otherwise
pub const DEFAULT_STOP_WORDS: &[&str] = &["a", "an", "the", "of", "and", "for", "impl", "default", "abstract"];

/// How names are turned into words before comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreprocessingMethod {
    /// The whole lower-cased name is one word
    None,
    /// Split camel/snake/kebab case, lower-case every word
    Split,
    /// Split, then drop stop words
    #[default]
    SplitFiltered,
}

impl std::fmt::Display for PreprocessingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Split => "split",
            Self::SplitFiltered => "split_filtered",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for PreprocessingMethod {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "split" => Ok(Self::Split),
            "split_filtered" | "splitfiltered" => Ok(Self::SplitFiltered),
            other => Err(format!("unknown preprocessing method: {}", other)),
        }
    }
}

/// Turns names into comparable word lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePreprocessor {
    method: PreprocessingMethod,
    stop_words: BTreeSet<String>,
}

impl NamePreprocessor {
    pub fn new(method: PreprocessingMethod) -> Self {
        Self {
            method,
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Replace the stop-word set (compared case-insensitively)
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stop_words = words.into_iter().map(|w| w.as_ref().to_lowercase()).collect();
        self
    }

    pub fn method(&self) -> PreprocessingMethod {
        self.method
    }

    /// Words of a name under this preprocessing method.
    ///
    /// Filtering never empties a name: if every word is a stop word the
    /// unfiltered words are kept.
    pub fn words(&self, name: &str) -> Vec<String> {
        match self.method {
            PreprocessingMethod::None => {
                let whole = name.trim().to_lowercase();
                if whole.is_empty() {
                    Vec::new()
                } else {
                    vec![whole]
                }
            }
            PreprocessingMethod::Split => split_identifier(name),
            PreprocessingMethod::SplitFiltered => {
                let words = split_identifier(name);
                let filtered: Vec<String> = words
                    .iter()
                    .filter(|w| !self.stop_words.contains(*w))
                    .cloned()
                    .collect();
                if filtered.is_empty() {
                    words
                } else {
                    filtered
                }
            }
        }
    }
}

/// Split an identifier at case changes, letter/digit changes and separators.
///
/// `HTTPServerConfig` → `["http", "server", "config"]`,
/// `order_service2` → `["order", "service", "2"]`.
pub fn split_identifier(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &ch) in chars.iter().enumerate() {
        if !ch.is_alphanumeric() {
            flush(&mut current, &mut words);
            continue;
        }
        if let Some(prev) = current.chars().last() {
            let next = chars.get(i + 1).copied();
            let boundary = (prev.is_lowercase() && ch.is_uppercase())
                || (prev.is_alphabetic() != ch.is_alphabetic())
                || (prev.is_uppercase()
                    && ch.is_uppercase()
                    && next.map(|n| n.is_lowercase()).unwrap_or(false));
            if boundary {
                flush(&mut current, &mut words);
            }
        }
        current.push(ch);
    }
    flush(&mut current, &mut words);
    words
}

fn flush(current: &mut String, words: &mut Vec<String>) {
    if !current.is_empty() {
        words.push(current.to_lowercase());
        current.clear();
    }
}

/// Whether every word of `needle` occurs in `haystack`
pub fn is_contained(needle: &[String], haystack: &[String]) -> bool {
    !needle.is_empty() && needle.iter().all(|w| haystack.contains(w))
}

/// Share of the longer word list covered by the shorter one, capped at 1
pub fn ratio(needle: &[String], haystack: &[String]) -> f64 {
    if needle.is_empty() || haystack.is_empty() {
        return 0.0;
    }
    (needle.len() as f64 / haystack.len() as f64).min(1.0)
}

/// Fraction of `needle` words that occur in `haystack`
pub fn contained_ratio(needle: &[String], haystack: &[String]) -> f64 {
    if needle.is_empty() {
        return 0.0;
    }
    let found = needle.iter().filter(|w| haystack.contains(w)).count();
    found as f64 / needle.len() as f64
}

/// Words of a name with the given (lower-cased) words removed
pub fn remove_words(name: &str, words: &BTreeSet<String>) -> Vec<String> {
    split_identifier(name)
        .into_iter()
        .filter(|w| !words.contains(w))
        .collect()
}
