//! Engine configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum rows per batch for tables registered through the context.
    pub batch_size: usize,

    /// Run the rule-based optimizer before physical planning.
    pub optimize: bool,

    /// Optional cap on rows returned by a query (wraps the root in a limit).
    pub max_output_rows: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: 1024,
            optimize: true,
            max_output_rows: None,
        }
    }
}

impl EngineConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `QUARRY_BATCH_SIZE`: rows per batch
    /// - `QUARRY_OPTIMIZE`: `true`/`false`
    /// - `QUARRY_MAX_OUTPUT_ROWS`: row cap for query results
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("QUARRY_BATCH_SIZE") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.batch_size = v;
            }
        }

        if let Ok(s) = std::env::var("QUARRY_OPTIMIZE") {
            if let Ok(v) = s.parse::<bool>() {
                cfg.optimize = v;
            }
        }

        if let Ok(s) = std::env::var("QUARRY_MAX_OUTPUT_ROWS") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.max_output_rows = Some(v);
            }
        }

        cfg
    }

    /// Parse a JSON document; absent keys keep their defaults.
    pub fn from_json(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be positive".into()));
        }
        Ok(())
    }
}
