use std::collections::HashMap;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::{FsCacheError, FsCacheResult};

use super::resolved_path::ResolvedPath;
use super::traits::{FileMetadata, Pal, ReadSeek};

/* 📖 # Why use HashMap for MockPal storage?

MockPal uses in-memory storage with Arc<Mutex<T>> for several reasons:
1. **Speed**: No filesystem I/O, deterministic and fast for unit tests
2. **Isolation**: No side effects on the real filesystem
3. **Control**: Easy to inject errors or specific test scenarios
4. **Observability**: Every stat and read is counted per path, which is how
   tests tell a cache hit from a fresh read

Clones share the same state, so a test keeps one clone for assertions while
the cache under test owns another.
*/

#[derive(Debug, Clone)]
enum MockEntry {
    File(Vec<u8>),
    Directory,
    /// stat fails with PermissionDenied
    Forbidden,
    /// stat succeeds, read fails
    Unreadable,
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    reads: HashMap<PathBuf, usize>,
    stats: HashMap<PathBuf, usize>,
}

/// In-memory PAL implementation for testing.
///
/// Relative paths resolve against a configurable working directory (`/` by
/// default). Paths passed to the setup and counter methods go through the
/// same resolution, so tests may use any spelling.
///
/// # Examples
///
/// ```
/// use fscache_base::{MockPal, Pal};
/// use std::path::Path;
///
/// let mock = MockPal::new().with_current_dir("/srv");
/// mock.add_file("site/index.html", b"<html>".to_vec());
///
/// let path = mock.resolve_absolute(Path::new("site/./index.html")).unwrap();
/// assert_eq!(mock.read_to_bytes(&path).unwrap(), b"<html>");
/// assert_eq!(mock.read_count("/srv/site/index.html"), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockPal {
    state: Arc<Mutex<MockState>>,
    current_dir: Option<PathBuf>,
}

impl MockPal {
    /// Create a new empty MockPal with `/` as working directory.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            current_dir: Some(PathBuf::from("/")),
        }
    }

    /// Use `dir` as the working directory for relative paths.
    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Simulate a process whose working directory cannot be determined.
    pub fn without_current_dir(mut self) -> Self {
        self.current_dir = None;
        self
    }

    fn key(&self, path: impl AsRef<Path>) -> PathBuf {
        let base = self.current_dir.as_deref().unwrap_or(Path::new("/"));
        ResolvedPath::resolve(base, path.as_ref()).into_path_buf()
    }

    fn insert(&self, path: impl AsRef<Path>, entry: MockEntry) {
        let key = self.key(path);
        self.state.lock().entries.insert(key, entry);
    }

    /// Add a file, replacing any existing entry.
    pub fn add_file(&self, path: impl AsRef<Path>, content: Vec<u8>) {
        self.insert(path, MockEntry::File(content));
    }

    pub fn add_directory(&self, path: impl AsRef<Path>) {
        self.insert(path, MockEntry::Directory);
    }

    /// Add an entry whose stat fails with a permission error.
    pub fn add_forbidden(&self, path: impl AsRef<Path>) {
        self.insert(path, MockEntry::Forbidden);
    }

    /// Add an entry that can be stat'ed but fails every read.
    pub fn add_unreadable(&self, path: impl AsRef<Path>) {
        self.insert(path, MockEntry::Unreadable);
    }

    /// Remove an entry, simulating a deleted file.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let key = self.key(path);
        self.state.lock().entries.remove(&key);
    }

    /// Number of times `read_file` was called for the path.
    pub fn read_count(&self, path: impl AsRef<Path>) -> usize {
        let key = self.key(path);
        self.state.lock().reads.get(&key).copied().unwrap_or(0)
    }

    /// Number of times `stat` was called for the path.
    pub fn stat_count(&self, path: impl AsRef<Path>) -> usize {
        let key = self.key(path);
        self.state.lock().stats.get(&key).copied().unwrap_or(0)
    }

    /// Number of `read_file` calls across all paths.
    pub fn total_reads(&self) -> usize {
        self.state.lock().reads.values().sum()
    }
}

impl Default for MockPal {
    fn default() -> Self {
        Self::new()
    }
}

impl Pal for MockPal {
    fn resolve_absolute(&self, path: &Path) -> FsCacheResult<ResolvedPath> {
        if path.is_absolute() {
            return Ok(ResolvedPath::resolve(Path::new("/"), path));
        }
        let base = self.current_dir.as_deref().ok_or_else(|| {
            Box::new(FsCacheError::path_resolution(
                path,
                io::Error::new(
                    io::ErrorKind::NotFound,
                    "current working directory is unavailable",
                ),
            ))
        })?;
        Ok(ResolvedPath::resolve(base, path))
    }

    fn stat(&self, path: &ResolvedPath) -> FsCacheResult<FileMetadata> {
        let mut state = self.state.lock();
        *state.stats.entry(path.as_path().to_path_buf()).or_default() += 1;
        trace!(path = %path, "mock stat");
        match state.entries.get(path.as_path()) {
            Some(MockEntry::File(content)) => Ok(FileMetadata {
                len: content.len() as u64,
                is_dir: false,
            }),
            Some(MockEntry::Directory) => Ok(FileMetadata {
                len: 0,
                is_dir: true,
            }),
            Some(MockEntry::Unreadable) => Ok(FileMetadata {
                len: 0,
                is_dir: false,
            }),
            Some(MockEntry::Forbidden) => Err(Box::new(FsCacheError::not_found(
                path.as_path(),
                io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
            ))),
            None => Err(Box::new(FsCacheError::not_found(
                path.as_path(),
                io::Error::new(io::ErrorKind::NotFound, "no such file or directory"),
            ))),
        }
    }

    fn read_file(&self, path: &ResolvedPath) -> FsCacheResult<Box<dyn ReadSeek + 'static>> {
        let mut state = self.state.lock();
        *state.reads.entry(path.as_path().to_path_buf()).or_default() += 1;
        trace!(path = %path, "mock read");
        let failure = match state.entries.get(path.as_path()) {
            Some(MockEntry::File(content)) => return Ok(Box::new(Cursor::new(content.clone()))),
            Some(MockEntry::Directory) => {
                io::Error::new(io::ErrorKind::IsADirectory, "is a directory")
            }
            Some(MockEntry::Unreadable) => io::Error::other("simulated read failure"),
            Some(MockEntry::Forbidden) => {
                io::Error::new(io::ErrorKind::PermissionDenied, "permission denied")
            }
            None => io::Error::new(io::ErrorKind::NotFound, "no such file or directory"),
        };
        Err(Box::new(FsCacheError::read(path.as_path(), failure)))
    }
}
