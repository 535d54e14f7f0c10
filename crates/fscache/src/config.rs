use std::path::Path;

use fscache_base::{ErrorKind, FsCacheError, FsCacheResult, PalHandle};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::mode::CacheMode;

/// File name the CLI looks for in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "fscache.toml";

/// Configuration for a [`PathCache`](crate::PathCache).
///
/// ```toml
/// mode = "development"
/// preload = ["templates/base.html", "static/app.css"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Production unless stated otherwise.
    #[serde(default)]
    pub mode: CacheMode,
    /// Paths warmed with a single batch preload when the cache is built.
    #[serde(default)]
    pub preload: Vec<String>,
}

/// Read and parse a TOML config file through the PAL.
#[instrument(skip(pal), fields(path = %path.display()))]
pub fn load_config(pal: &PalHandle, path: &Path) -> FsCacheResult<CacheConfig> {
    let resolved = pal.resolve_absolute(path)?;
    let bytes = pal.read_to_bytes(&resolved)?;
    let text = String::from_utf8(bytes).map_err(|_| {
        Box::new(FsCacheError::new(ErrorKind::Config {
            path: resolved.as_path().to_path_buf(),
            message: "file is not valid UTF-8".to_string(),
        }))
    })?;
    let config = parse_config(&text, resolved.as_path())?;
    debug!(mode = %config.mode, preload = config.preload.len(), "config loaded");
    Ok(config)
}

/// Parse TOML config text; `origin` only labels errors.
pub fn parse_config(text: &str, origin: &Path) -> FsCacheResult<CacheConfig> {
    toml::from_str(text).map_err(|e| {
        Box::new(FsCacheError::new(ErrorKind::Config {
            path: origin.to_path_buf(),
            message: e.message().to_string(),
        }))
    })
}
