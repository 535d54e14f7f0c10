use std::fmt;
use std::str::FromStr;

use fscache_base::{FsCacheError, FsCacheResult};
use serde::Deserialize;

/// How a [`PathCache`](crate::PathCache) treats repeated loads.
///
/// Fixed when the cache is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// Content is cached after the first read and served from memory afterwards.
    #[default]
    #[serde(alias = "prod")]
    Production,
    /// Every load reads the file again so edits show up immediately.
    #[serde(alias = "dev")]
    Development,
}

impl CacheMode {
    pub fn from_production_flag(is_production: bool) -> Self {
        if is_production {
            CacheMode::Production
        } else {
            CacheMode::Development
        }
    }

    pub fn is_production(self) -> bool {
        self == CacheMode::Production
    }
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheMode::Production => write!(f, "production"),
            CacheMode::Development => write!(f, "development"),
        }
    }
}

impl FromStr for CacheMode {
    type Err = Box<FsCacheError>;

    fn from_str(s: &str) -> FsCacheResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(CacheMode::Production),
            "development" | "dev" => Ok(CacheMode::Development),
            other => Err(fscache_base::err!(
                "Unknown cache mode '{}', expected 'production' or 'development'",
                other
            )),
        }
    }
}
