use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::{FsCacheError, FsCacheResult};

use super::resolved_path::ResolvedPath;
use super::traits::{FileMetadata, Pal, ReadSeek};

/* 📖 # Why use std::fs instead of async or other crates?

The cache API is synchronous, callers block briefly on a lock or a read.
std::fs is:
- Sufficient for synchronous file operations
- Requires no external dependencies beyond what we already use
- Easy to understand and maintain
- Well-tested and reliable
*/

/// Concrete PAL implementation using the real filesystem via std::fs.
///
/// Relative paths resolve against a fixed base directory when one is
/// configured, otherwise against the process working directory at call time.
#[derive(Debug, Default)]
pub struct RealPal {
    base_dir: Option<PathBuf>,
}

impl RealPal {
    /// Create a RealPal resolving relative paths against the working directory.
    pub fn new() -> Self {
        Self { base_dir: None }
    }

    /// Create a RealPal resolving relative paths against `base_dir`.
    ///
    /// # Arguments
    /// * `base_dir` - Must be absolute; relative paths will be joined onto it
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self {
            base_dir: Some(base_dir),
        }
    }

    fn base_dir(&self, path: &Path) -> FsCacheResult<PathBuf> {
        match &self.base_dir {
            Some(base_dir) => Ok(base_dir.clone()),
            None => std::env::current_dir().map_err(|e| {
                debug!(error = %e, "failed to get current directory");
                Box::new(FsCacheError::path_resolution(path, e))
            }),
        }
    }
}

impl Pal for RealPal {
    #[instrument(skip(self), fields(path = %path.display()))]
    fn resolve_absolute(&self, path: &Path) -> FsCacheResult<ResolvedPath> {
        if path.is_absolute() {
            return Ok(ResolvedPath::resolve(Path::new("/"), path));
        }
        let base_dir = self.base_dir(path)?;
        let resolved = ResolvedPath::resolve(&base_dir, path);
        debug!(resolved = %resolved, "resolved path");
        Ok(resolved)
    }

    #[instrument(skip(self), fields(path = %path))]
    fn stat(&self, path: &ResolvedPath) -> FsCacheResult<FileMetadata> {
        let metadata = fs::metadata(path.as_path()).map_err(|e| {
            debug!(error = %e, "stat failed");
            Box::new(FsCacheError::not_found(path.as_path(), e))
        })?;
        Ok(FileMetadata {
            len: metadata.len(),
            is_dir: metadata.is_dir(),
        })
    }

    #[instrument(skip(self), fields(path = %path))]
    fn read_file(&self, path: &ResolvedPath) -> FsCacheResult<Box<dyn ReadSeek + 'static>> {
        debug!("opening file for reading");
        let file = fs::File::open(path.as_path()).map_err(|e| {
            debug!(error = %e, "failed to open file");
            Box::new(FsCacheError::read(path.as_path(), e))
        })?;
        Ok(Box::new(file))
    }

    /// Reads with `fs::read`, which sizes the buffer from the file length up front.
    #[instrument(skip(self), fields(path = %path))]
    fn read_to_bytes(&self, path: &ResolvedPath) -> FsCacheResult<Vec<u8>> {
        let content = fs::read(path.as_path()).map_err(|e| {
            debug!(error = %e, "failed to read file");
            Box::new(FsCacheError::read(path.as_path(), e))
        })?;
        debug!(bytes = content.len(), "file read");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_real_pal_reads_file_from_base_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"content").unwrap();
        let pal = RealPal::with_base_dir(dir.path().to_path_buf());

        let path = pal.resolve_absolute(Path::new("./sub/../a.txt")).unwrap();
        assert_eq!(path.as_path(), dir.path().join("a.txt"));
        assert_eq!(pal.stat(&path).unwrap().len, 7);
        assert_eq!(pal.read_to_bytes(&path).unwrap(), b"content");
    }

    #[test]
    fn test_real_pal_absolute_path_ignores_base_dir() {
        let dir = TempDir::new().unwrap();
        let pal = RealPal::with_base_dir(PathBuf::from("/nonexistent-base"));
        let file = dir.path().join("b.txt");
        fs::write(&file, b"b").unwrap();

        let path = pal.resolve_absolute(&file).unwrap();
        assert_eq!(path.as_path(), file);
    }

    #[test]
    fn test_real_pal_stat_missing_file() {
        let dir = TempDir::new().unwrap();
        let pal = RealPal::with_base_dir(dir.path().to_path_buf());

        let path = pal.resolve_absolute(Path::new("missing.txt")).unwrap();
        let err = pal.stat(&path).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.path(), Some(dir.path().join("missing.txt").as_path()));
    }

    #[test]
    fn test_real_pal_read_directory_fails_after_stat() {
        let dir = TempDir::new().unwrap();
        let pal = RealPal::with_base_dir(dir.path().to_path_buf());

        let path = pal.resolve_absolute(Path::new("")).unwrap();
        assert!(pal.stat(&path).unwrap().is_dir);
        assert!(pal.read_to_bytes(&path).unwrap_err().is_read());
    }

    #[test]
    fn test_real_pal_default_uses_working_directory() {
        let pal = RealPal::new();
        let path = pal.resolve_absolute(Path::new("Cargo.toml")).unwrap();
        assert_eq!(
            path.as_path(),
            std::env::current_dir().unwrap().join("Cargo.toml")
        );
    }
}
