use std::io::{Read, Seek};
use std::path::Path;
use std::sync::Arc;

use crate::{FsCacheError, FsCacheResult};

use super::resolved_path::ResolvedPath;

/// Trait combining Read + Seek for file operations.
///
/// This trait enables returning opaque file handles that support both reading
/// and seeking, useful for different implementations (real files, in-memory buffers, etc.)
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// The subset of file metadata the cache needs from a successful stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadata {
    pub len: u64,
    pub is_dir: bool,
}

/* 📖 # Why is Pal a trait instead of a struct?

Using a trait enables two key benefits:
1. **Testability**: MockPal counts every stat and read, so tests can prove a
   cache hit performed no I/O
2. **Flexibility**: The cache depends on the abstraction, not on std::fs

This is the Dependency Inversion Principle applied to filesystem operations.
*/

/// Platform Abstraction Layer (PAL) trait providing the filesystem primitives
/// the cache consumes.
///
/// Two implementations are provided:
/// - `RealPal`: Uses the real filesystem via `std::fs`
/// - `MockPal`: In-memory implementation for testing
pub trait Pal: std::fmt::Debug + Send + Sync + 'static {
    /// Turn `path` into an absolute, normalized path.
    ///
    /// Fails with `ErrorKind::PathResolution` when no base directory is available.
    fn resolve_absolute(&self, path: &Path) -> FsCacheResult<ResolvedPath>;

    /// Check that the path exists and can be stat'ed.
    ///
    /// Fails with `ErrorKind::NotFound` carrying the underlying io error,
    /// whatever its kind.
    fn stat(&self, path: &ResolvedPath) -> FsCacheResult<FileMetadata>;

    /// Open a file for reading.
    ///
    /// Fails with `ErrorKind::Read`.
    fn read_file(&self, path: &ResolvedPath) -> FsCacheResult<Box<dyn ReadSeek + 'static>>;

    /// Read entire file contents into memory.
    ///
    /// This is a convenience method with a default implementation on top of `read_file`.
    fn read_to_bytes(&self, path: &ResolvedPath) -> FsCacheResult<Vec<u8>> {
        let mut reader = self.read_file(path)?;
        let mut contents = Vec::new();
        reader
            .read_to_end(&mut contents)
            .map_err(|e| Box::new(FsCacheError::read(path.as_path(), e)))?;
        Ok(contents)
    }
}

/* 📖 # Why use Arc<dyn Pal> with PalHandle?

Arc enables cheap cloning of the entire PAL implementation, allowing it to be
shared across multiple parts of the application (thread-safe via dyn Pal bounds).
PalHandle wraps this for ergonomic Deref access and Clone support.
*/

/// Handle to a PAL implementation, enabling shared ownership.
///
/// # Examples
///
/// ```no_run
/// use fscache_base::{PalHandle, RealPal};
///
/// let pal = PalHandle::new(RealPal::new());
/// let pal_clone = pal.clone(); // Cheap clone, shares the same implementation
/// ```
#[derive(Debug, Clone)]
pub struct PalHandle(Arc<dyn Pal>);

impl PalHandle {
    /// Create a new PalHandle from a Pal implementation.
    pub fn new(pal: impl Pal + 'static) -> Self {
        Self(Arc::new(pal))
    }
}

impl std::ops::Deref for PalHandle {
    type Target = dyn Pal;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}
