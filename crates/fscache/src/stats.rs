use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of a cache's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Production loads served from memory.
    pub hits: u64,
    /// Production loads that had to read the file.
    pub misses: u64,
    /// Development loads, which always read the file.
    pub bypassed_reads: u64,
    /// Entries written by preload or preload_batch.
    pub preloaded: u64,
}

#[derive(Debug, Default)]
pub(crate) struct StatCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    bypassed_reads: AtomicU64,
    preloaded: AtomicU64,
}

// Relaxed is enough, the counters are informational and never order other memory.
impl StatCounters {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_bypass(&self) {
        self.bypassed_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_preload(&self) {
        self.preloaded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            bypassed_reads: self.bypassed_reads.load(Ordering::Relaxed),
            preloaded: self.preloaded.load(Ordering::Relaxed),
        }
    }
}
