/* 📖 # How does PathCache decide between memory and disk?

Every operation first resolves the path to an absolute, normalized key and
stats it, so a missing file is reported the same way in both modes.

- **Production** loads check the store under a shared lock, read the file
  outside any lock on a miss, then insert under the exclusive lock. Two
  threads missing on the same path may both read it; the last insert wins and
  both got the same bytes.
- **Development** loads always read the file and never look at the store.

Preloads are mode independent. They hold the exclusive lock for the whole
operation and overwrite whatever is stored. A batch preload takes the lock
once, stops at the first failure and keeps what it inserted before it.
*/

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use fscache_base::{FsCacheResult, PalHandle, RealPal, ResolvedPath, ResultExt};
use parking_lot::RwLock;
use tracing::{debug, instrument, trace};

use crate::config::CacheConfig;
use crate::mode::CacheMode;
use crate::stats::{CacheStats, StatCounters};

type Store = HashMap<ResolvedPath, Arc<[u8]>>;

/// Read-through cache for file contents keyed by resolved absolute path.
///
/// Entries are never evicted; they live as long as the cache.
///
/// # Example
///
/// ```
/// use fscache::{CacheMode, PathCache};
/// use fscache_base::{MockPal, PalHandle};
///
/// let mock = MockPal::new().with_current_dir("/srv/site");
/// mock.add_file("index.html", b"<h1>hello</h1>".to_vec());
///
/// let cache = PathCache::with_pal(PalHandle::new(mock.clone()), CacheMode::Production);
/// assert_eq!(&*cache.load("index.html").unwrap(), b"<h1>hello</h1>");
/// assert_eq!(&*cache.load("/srv/site/./index.html").unwrap(), b"<h1>hello</h1>");
/// assert_eq!(mock.read_count("/srv/site/index.html"), 1);
/// ```
#[derive(Debug)]
pub struct PathCache {
    pal: PalHandle,
    mode: CacheMode,
    store: RwLock<Store>,
    stats: StatCounters,
}

impl PathCache {
    /// Create an empty cache over the real filesystem.
    pub fn new(mode: CacheMode) -> Self {
        Self::with_pal(PalHandle::new(RealPal::new()), mode)
    }

    /// Create an empty cache over the given PAL. No I/O is performed.
    pub fn with_pal(pal: PalHandle, mode: CacheMode) -> Self {
        Self {
            pal,
            mode,
            store: RwLock::new(HashMap::new()),
            stats: StatCounters::default(),
        }
    }

    /// Create a cache for `config` and warm it with the configured preload paths.
    pub fn from_config(pal: PalHandle, config: &CacheConfig) -> FsCacheResult<Self> {
        let cache = Self::with_pal(pal, config.mode);
        if !config.preload.is_empty() {
            cache
                .preload_batch(&config.preload)
                .context("Failed to preload configured paths")?;
        }
        Ok(cache)
    }

    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    /// Returns the content of the file at `path`.
    ///
    /// # Errors
    /// * `PathResolution` - the path cannot be made absolute
    /// * `NotFound` - the resolved path cannot be stat'ed
    /// * `Read` - the file exists but reading it failed
    #[instrument(skip(self, path), fields(path = %path.as_ref().display(), mode = %self.mode))]
    pub fn load(&self, path: impl AsRef<Path>) -> FsCacheResult<Arc<[u8]>> {
        let resolved = self.resolve_existing(path.as_ref())?;

        if self.mode == CacheMode::Development {
            self.stats.record_bypass();
            debug!(path = %resolved, "development mode, reading from storage");
            return Ok(self.pal.read_to_bytes(&resolved)?.into());
        }

        let cached = self.store.read().get(&resolved).cloned();
        if let Some(content) = cached {
            self.stats.record_hit();
            debug!(path = %resolved, "cache hit");
            return Ok(content);
        }

        self.stats.record_miss();
        debug!(path = %resolved, "cache miss, reading from storage");
        let content: Arc<[u8]> = self.pal.read_to_bytes(&resolved)?.into();
        self.store.write().insert(resolved, Arc::clone(&content));
        Ok(content)
    }

    /// Like [`load`](Self::load) but validates the content as UTF-8.
    pub fn load_to_string(&self, path: impl AsRef<Path>) -> FsCacheResult<String> {
        let path = path.as_ref();
        let content = self.load(path)?;
        String::from_utf8(content.to_vec())
            .map_err(|_e| fscache_base::err!("File is not valid UTF-8: {}", path.display()))
    }

    /// Reads `path` into the store, overwriting any existing entry.
    ///
    /// Works in both modes, though development loads never consult the store.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn preload(&self, path: impl AsRef<Path>) -> FsCacheResult<()> {
        let mut store = self.store.write();
        trace!("acquired write lock");
        self.preload_locked(&mut store, path.as_ref())
    }

    /// Preloads every path in order while holding the write lock once.
    ///
    /// Stops at the first failing path and returns its error. Entries inserted
    /// before the failure stay in the store.
    #[instrument(skip_all)]
    pub fn preload_batch<I>(&self, paths: I) -> FsCacheResult<()>
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        let mut store = self.store.write();
        trace!("acquired write lock");
        for (index, path) in paths.into_iter().enumerate() {
            let path = path.as_ref();
            self.preload_locked(&mut store, path)
                .with_context(|| format!("Preload batch stopped at entry {}", index))?;
        }
        Ok(())
    }

    /// Core of both preload operations. Taking the store by `&mut` means the
    /// caller already holds the write lock.
    fn preload_locked(&self, store: &mut Store, path: &Path) -> FsCacheResult<()> {
        let resolved = self.resolve_existing(path)?;
        let content: Arc<[u8]> = self.pal.read_to_bytes(&resolved)?.into();
        debug!(path = %resolved, bytes = content.len(), "preloaded");
        store.insert(resolved, content);
        self.stats.record_preload();
        Ok(())
    }

    fn resolve_existing(&self, path: &Path) -> FsCacheResult<ResolvedPath> {
        let resolved = self.pal.resolve_absolute(path)?;
        self.pal.stat(&resolved)?;
        Ok(resolved)
    }

    /// Whether the store holds an entry for `path`. Only resolves the path,
    /// the file itself is not touched.
    pub fn contains(&self, path: impl AsRef<Path>) -> FsCacheResult<bool> {
        let resolved = self.pal.resolve_absolute(path.as_ref())?;
        Ok(self.store.read().contains_key(&resolved))
    }

    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }

    /// All cached keys, sorted.
    pub fn cached_paths(&self) -> Vec<ResolvedPath> {
        let mut paths: Vec<_> = self.store.read().keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }
}
