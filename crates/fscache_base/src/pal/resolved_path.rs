use std::path::{Component, Path, PathBuf};

/* 📖 # Why a ResolvedPath newtype instead of plain PathBuf?

Cache keys must be absolute and normalized, otherwise `docs/../a.txt` and
`/work/a.txt` would be cached twice. Only `ResolvedPath::resolve` builds one,
so any ResolvedPath handed to the cache already satisfies that invariant and
the type system keeps unresolved paths out of the store.

Normalization is lexical: `.` segments are dropped and `..` removes the
previous segment. Symbolic links are not followed, which keeps resolution
free of I/O and lets it succeed for paths that do not exist yet.
*/

/// An absolute, lexically normalized filesystem path used as a cache key.
///
/// # Examples
///
/// ```
/// use fscache_base::ResolvedPath;
/// use std::path::Path;
///
/// let resolved = ResolvedPath::resolve(Path::new("/srv/site"), Path::new("./css/../index.html"));
/// assert_eq!(resolved.as_path(), Path::new("/srv/site/index.html"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolvedPath(PathBuf);

impl ResolvedPath {
    /// Resolves `path` against `base` and normalizes the result.
    ///
    /// Absolute paths ignore `base`. An empty path resolves to `base` itself.
    /// `base` is expected to be absolute.
    pub fn resolve(base: &Path, path: &Path) -> Self {
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            base.join(path)
        };
        Self(normalize_lexically(&joined))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                // popping at the root is a no-op, so ".." never escapes it
                if matches!(normalized.components().next_back(), Some(Component::Normal(_))) {
                    normalized.pop();
                }
            }
            Component::Normal(segment) => normalized.push(segment),
        }
    }
    normalized
}

impl std::fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}
