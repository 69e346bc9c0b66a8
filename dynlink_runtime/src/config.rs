//! Dispatch configuration
//!
//! Read from TOML text:
//!
//! ```toml
//! [inline_cache]
//! megamorphic_threshold = 8
//! ```
//!
//! or from the `DYNLINK_MEGAMORPHIC_THRESHOLD` environment variable.

use serde::Deserialize;
use thiserror::Error;

use crate::cache::RelinkPolicy;

/// Environment variable overriding the megamorphic threshold
pub const MEGAMORPHIC_THRESHOLD_ENV: &str = "DYNLINK_MEGAMORPHIC_THRESHOLD";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid dispatch config: {0}")]
    Parse(String),

    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: String, value: String },
}

/// Top-level dispatch configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    pub inline_cache: InlineCacheConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InlineCacheConfig {
    /// Relinks tolerated per call site before it stops caching
    pub megamorphic_threshold: Option<u64>,
}

impl DispatchConfig {
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        toml::from_str(src).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        threshold_from_env_value(std::env::var(MEGAMORPHIC_THRESHOLD_ENV).ok().as_deref())
    }

    pub fn relink_policy(&self) -> RelinkPolicy {
        RelinkPolicy {
            megamorphic_threshold: self.inline_cache.megamorphic_threshold,
        }
    }
}

fn threshold_from_env_value(value: Option<&str>) -> Result<DispatchConfig, ConfigError> {
    let megamorphic_threshold = match value.map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<u64>().map_err(|_| ConfigError::InvalidEnv {
            var: MEGAMORPHIC_THRESHOLD_ENV.to_string(),
            value: raw.to_string(),
        })?),
    };
    Ok(DispatchConfig {
        inline_cache: InlineCacheConfig {
            megamorphic_threshold,
        },
    })
}
