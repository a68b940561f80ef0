//! Run configuration
//!
//! A [`TraceConfig`] holds every tunable of the standard tree, the executor
//! and the exporter. It is resolved once, before a tree is built, from one of:
//!
//! - a YAML file ([`TraceConfig::from_yaml_file`]) with the field names below;
//! - flat `Class::field` key/value pairs ([`TraceConfig::from_pairs`]), where
//!   list values are comma separated.
//!
//! ```yaml
//! threshold: 0.6
//! preprocessing: split
//! common_words: [Test, Impl]
//! weights: [0.8, 0.2]
//! parallelism: sequential
//! deadline_ms: 5000
//! ```

use crate::computation::{TraceError, TraceResult};
use crate::export::TraceLinkExporter;
use crate::heuristics::names::DEFAULT_STOP_WORDS;
use crate::heuristics::{NamePreprocessor, PreprocessingMethod, DEFAULT_COMMON_WORDS};
use crate::tree::{CancellationToken, Parallelism, TreeExecutor};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Flat configuration keys understood by [`TraceConfig::apply`]
pub mod keys {
    pub const THRESHOLD: &str = "TraceLinkExporter::threshold";
    pub const PREPROCESSING: &str = "NameResemblance::preprocessing";
    pub const STOP_WORDS: &str = "NameResemblance::stopWords";
    pub const COMMON_WORDS: &str = "SiblingResemblance::commonWords";
    pub const WEIGHTS: &str = "StandardTree::weights";
    pub const PARALLELISM: &str = "TreeExecutor::parallelism";
    pub const DEADLINE_MS: &str = "TreeExecutor::deadlineMs";
}

const LIST_SEPARATOR: char = ',';

/// Tunables of one evaluation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Minimum root confidence for a tuple to become a trace link
    pub threshold: f64,
    /// Name preprocessing of every name resemblance heuristic
    pub preprocessing: PreprocessingMethod,
    /// Words dropped by `split_filtered` preprocessing
    pub stop_words: Vec<String>,
    /// Companion suffixes of the sibling resemblance heuristic
    pub common_words: Vec<String>,
    /// Weights of name and path resemblance in the standard tree
    pub weights: Vec<f64>,
    pub parallelism: Parallelism,
    /// Abort the run when it takes longer than this
    pub deadline_ms: Option<u64>,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            preprocessing: PreprocessingMethod::default(),
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            common_words: DEFAULT_COMMON_WORDS.iter().map(|w| w.to_string()).collect(),
            weights: vec![0.7, 0.3],
            parallelism: Parallelism::default(),
            deadline_ms: None,
        }
    }
}

impl TraceConfig {
    pub fn from_yaml_str(yaml: &str) -> TraceResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> TraceResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "loading configuration");
        Self::from_yaml_str(&yaml)
    }

    /// Defaults overridden by flat `Class::field` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> TraceResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in pairs {
            config.apply(key.as_ref(), value.as_ref())?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Resolve a run's configuration in layers: the YAML file (or the
    /// defaults), then `KEY=VALUE` overrides in order, then `threshold`.
    pub fn layered<S: AsRef<str>>(
        path: Option<&Path>,
        overrides: &[S],
        threshold: Option<f64>,
    ) -> TraceResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(overrides)?;
        if let Some(threshold) = threshold {
            config.threshold = threshold;
        }
        config.validate()?;
        Ok(config)
    }

    /// Apply `KEY=VALUE` overrides in order; a later override wins
    pub fn apply_overrides<S: AsRef<str>>(&mut self, overrides: &[S]) -> TraceResult<()> {
        for pair in overrides {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| TraceError::Config(format!("override '{}' is not KEY=VALUE", pair)))?;
            self.apply(key.trim(), value)?;
        }
        Ok(())
    }

    /// Apply one flat key. Unknown keys are ignored; malformed values fail.
    pub fn apply(&mut self, key: &str, value: &str) -> TraceResult<()> {
        let value = value.trim();
        match key {
            keys::THRESHOLD => self.threshold = parse_number(key, value)?,
            keys::PREPROCESSING => {
                self.preprocessing = value.parse().map_err(|_| {
                    TraceError::Config(format!("{}: unknown preprocessing method '{}'", key, value))
                })?
            }
            keys::STOP_WORDS => self.stop_words = split_list(value),
            keys::COMMON_WORDS => self.common_words = split_list(value),
            keys::WEIGHTS => {
                self.weights = split_list(value)
                    .iter()
                    .map(|w| parse_number(key, w))
                    .collect::<TraceResult<_>>()?
            }
            keys::PARALLELISM => self.parallelism = value.parse()?,
            keys::DEADLINE_MS => {
                self.deadline_ms = if value.is_empty() {
                    None
                } else {
                    Some(value.parse().map_err(|_| {
                        TraceError::Config(format!("{}: expected milliseconds, got '{}'", key, value))
                    })?)
                }
            }
            unknown => debug!(key = unknown, "ignoring unknown configuration key"),
        }
        Ok(())
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> TraceResult<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(TraceError::Config(format!(
                "threshold must be between 0 and 1, got {}",
                self.threshold
            )));
        }
        if self.weights.len() != 2 {
            return Err(TraceError::Config(format!(
                "expected 2 weights (name, path), got {}",
                self.weights.len()
            )));
        }
        if self.weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(TraceError::Config(format!(
                "weights must be finite and non-negative, got {:?}",
                self.weights
            )));
        }
        Ok(())
    }

    /// The name preprocessor every name resemblance heuristic shares
    pub fn name_preprocessor(&self) -> NamePreprocessor {
        NamePreprocessor::new(self.preprocessing).with_stop_words(&self.stop_words)
    }

    /// An executor honouring the parallelism and deadline settings.
    ///
    /// The deadline is counted from the start of each run.
    pub fn executor(&self) -> TreeExecutor {
        let mut token = CancellationToken::new();
        if let Some(ms) = self.deadline_ms {
            token = token.with_timeout(Duration::from_millis(ms));
        }
        TreeExecutor::new()
            .with_parallelism(self.parallelism)
            .with_cancellation(token)
    }

    pub fn exporter(&self) -> TraceResult<TraceLinkExporter> {
        TraceLinkExporter::new(self.threshold)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_number(key: &str, value: &str) -> TraceResult<f64> {
    value
        .trim()
        .parse()
        .map_err(|_| TraceError::Config(format!("{}: expected a number, got '{}'", key, value)))
}
