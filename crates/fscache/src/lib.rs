pub mod cache;
mod cache_tests;
pub mod config;
pub mod mode;
pub mod stats;

pub use cache::PathCache;
pub use config::{CacheConfig, DEFAULT_CONFIG_FILE, load_config, parse_config};
pub use mode::CacheMode;
pub use stats::CacheStats;
