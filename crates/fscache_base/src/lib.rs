/* 📖 # Why have fscache_base as a separate crate?
fscache_base provides the error type, tracing setup and the filesystem
abstraction the cache is built on. The cache crate and the CLI share them,
and tests get the instrumented MockPal without pulling in the cache itself.
*/

pub mod error;
pub mod pal;
pub mod tracing;

// Re-export commonly used types for convenience
pub use error::{ErrorKind, FsCacheError, FsCacheResult, ResultExt};
pub use pal::{FileMetadata, MockPal, Pal, PalHandle, ReadSeek, RealPal, ResolvedPath};
