//! Engine tuning parameters.
//!
//! Every field has a default, so a JSON config file only needs to name the
//! values it overrides.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Thresholds, generation lengths, sampling parameters and capacities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sampling temperature; must be positive.
    pub temperature: f64,
    /// Nucleus mass, in `(0, 1]`.
    pub top_p: f64,
    /// Below this top score there is no usable match.
    pub min_score: f64,
    /// Above this top score the engine generates instead of asking for detail.
    pub generate_threshold: f64,
    /// Above this top score a short-form query gets the entry verbatim.
    pub verbatim_threshold: f64,
    /// A meta query uses local memory when its top score beats this.
    pub meta_threshold: f64,
    pub standard_length: usize,
    pub standard_context: usize,
    pub long_form_length: usize,
    pub long_form_context: usize,
    pub session_cache_capacity: usize,
    pub knowledge_cache_capacity: usize,
    pub recent_outputs_capacity: usize,
    pub history_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            temperature: 0.8,
            top_p: 0.9,
            min_score: 0.1,
            generate_threshold: 0.15,
            verbatim_threshold: 0.85,
            meta_threshold: 0.5,
            standard_length: 50,
            standard_context: 7,
            long_form_length: 150,
            long_form_context: 15,
            session_cache_capacity: 100,
            knowledge_cache_capacity: 50,
            recent_outputs_capacity: 5,
            history_capacity: 10,
        }
    }
}

impl EngineConfig {
    /// Load and validate a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: EngineConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check parameter ranges and that the score thresholds are ordered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.temperature.is_finite() && self.temperature > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "temperature must be positive, got {}",
                self.temperature
            )));
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "top_p must be in (0, 1], got {}",
                self.top_p
            )));
        }
        for (name, value) in [
            ("min_score", self.min_score),
            ("generate_threshold", self.generate_threshold),
            ("verbatim_threshold", self.verbatim_threshold),
            ("meta_threshold", self.meta_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        if !(self.min_score <= self.generate_threshold
            && self.generate_threshold <= self.verbatim_threshold)
        {
            return Err(ConfigError::Invalid(format!(
                "thresholds must satisfy min_score <= generate_threshold <= verbatim_threshold, \
                 got {} / {} / {}",
                self.min_score, self.generate_threshold, self.verbatim_threshold
            )));
        }
        for (name, value) in [
            ("standard_length", self.standard_length),
            ("standard_context", self.standard_context),
            ("long_form_length", self.long_form_length),
            ("long_form_context", self.long_form_context),
            ("session_cache_capacity", self.session_cache_capacity),
            ("knowledge_cache_capacity", self.knowledge_cache_capacity),
            ("recent_outputs_capacity", self.recent_outputs_capacity),
            ("history_capacity", self.history_capacity),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be at least 1")));
            }
        }
        Ok(())
    }
}
