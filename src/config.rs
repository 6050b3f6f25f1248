//! Configuration for the query engine.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DocQueryError, Result};
use crate::query::{Locale, MlAnalysisMode, Operator};

/// Configuration for [`QueryEngine`](crate::search::QueryEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryEngineConfig {
    /// Language-analysis mode used when a request names none.
    pub default_ml_analysis_mode: MlAnalysisMode,

    /// Search locale used when a request lists none.
    pub default_locale: Locale,

    /// Operator joining full-text terms.
    pub default_operator: Operator,

    /// Whether selectors are executed concurrently.
    pub parallel_execution: bool,

    /// Thread pool size for parallel execution.
    /// If None, uses the number of CPU cores.
    pub thread_pool_size: Option<usize>,

    /// Page size used when a query does not set one.
    pub default_max_items: usize,
}

impl Default for QueryEngineConfig {
    fn default() -> Self {
        Self {
            default_ml_analysis_mode: MlAnalysisMode::LocaleAndAll,
            default_locale: Locale::default(),
            default_operator: Operator::Or,
            parallel_execution: true,
            thread_pool_size: None,
            default_max_items: 100,
        }
    }
}

impl QueryEngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_ml_analysis_mode(mut self, mode: MlAnalysisMode) -> Self {
        self.default_ml_analysis_mode = mode;
        self
    }

    pub fn with_default_locale(mut self, locale: Locale) -> Self {
        self.default_locale = locale;
        self
    }

    pub fn with_default_operator(mut self, operator: Operator) -> Self {
        self.default_operator = operator;
        self
    }

    pub fn with_parallel_execution(mut self, enabled: bool) -> Self {
        self.parallel_execution = enabled;
        self
    }

    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }

    pub fn with_default_max_items(mut self, max_items: usize) -> Self {
        self.default_max_items = max_items;
        self
    }

    /// Parse a configuration from JSON. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        if self.thread_pool_size == Some(0) {
            return Err(DocQueryError::invalid_config(
                "thread_pool_size must be greater than zero",
            ));
        }
        if self.default_max_items == 0 {
            return Err(DocQueryError::invalid_config(
                "default_max_items must be greater than zero",
            ));
        }
        if self.default_locale.language().is_empty() {
            return Err(DocQueryError::invalid_config("default_locale has no language"));
        }
        Ok(())
    }

    /// Effective thread pool size.
    pub fn threads(&self) -> usize {
        self.thread_pool_size.unwrap_or_else(num_cpus::get)
    }
}
