//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Tunables of the interpretation and search pipeline.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// let config = detective::EngineConfig::from_json(r#"{"match_ratio": 0.75}"#).unwrap();
/// assert_eq!(config.object_search_limit, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Minimum similarity ratio for a fuzzy label match, in `[0, 1]`.
    pub match_ratio: f64,
    /// Hits kept per literal object search.
    pub object_search_limit: usize,
    /// Page size when a request carries no `limit`.
    pub default_page_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            match_ratio: 0.6,
            object_search_limit: 5,
            default_page_limit: 20,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.match_ratio) {
            return Err(Error::Config(format!(
                "match_ratio must be within [0, 1], got {}", self.match_ratio
            )));
        }
        if self.default_page_limit == 0 {
            return Err(Error::Config("default_page_limit must be positive".into()));
        }
        Ok(())
    }
}
