/* 📖 # Why is the CLI minimal and hardcoded?

The CLI is a thin driver for the cache with no argument parsing. Every
argument is a path to load:

1. Looks for `fscache.toml` in the current directory (defaults if absent)
2. Builds a PathCache over the real filesystem and preloads configured paths
3. Loads each argument and prints its size
4. Prints the cache statistics

Exit codes:
- 0: Success (every path loaded)
- 1: Error (config invalid, preload failed, or a path could not be loaded)
*/

use std::env;
use std::path::Path;
use std::process;

use fscache::{CacheConfig, DEFAULT_CONFIG_FILE, PathCache, load_config};
use fscache_base::tracing::init_tracing;
use fscache_base::{PalHandle, RealPal};
use tracing::info;

fn main() {
    if let Err(e) = init_tracing() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let pal = PalHandle::new(RealPal::new());

    let config_path = Path::new(DEFAULT_CONFIG_FILE);
    let config = if config_path.exists() {
        match load_config(&pal, config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: Failed to load config from {}: {}", DEFAULT_CONFIG_FILE, e);
                process::exit(1);
            }
        }
    } else {
        CacheConfig::default()
    };

    info!(mode = %config.mode, preload = config.preload.len(), "starting");

    let cache = match PathCache::from_config(pal, &config) {
        Ok(cache) => cache,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let mut failures = 0;
    for path in env::args().skip(1) {
        match cache.load(&path) {
            Ok(content) => println!("  + {}: {} bytes", path, content.len()),
            Err(e) => {
                failures += 1;
                eprintln!("  - {}: {}", path, e);
            }
        }
    }

    let stats = cache.stats();
    println!(
        "\n{} cached entries, {} hits, {} misses, {} uncached reads, {} preloaded",
        cache.len(),
        stats.hits,
        stats.misses,
        stats.bypassed_reads,
        stats.preloaded
    );

    if failures > 0 {
        process::exit(1);
    }
}
