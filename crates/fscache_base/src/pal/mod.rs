/* 📖 # What is the Platform Abstraction Layer?

The PAL provides a trait-based abstraction over the filesystem primitives the
cache consumes: resolving a path, checking it exists and reading it.
Key benefits:
- Testability: MockPal counts reads, so cache hits can be proven I/O free
- Flexibility: Switch between real filesystem and in-memory implementations
- Consistency: All filesystem failures map onto the same error kinds

This follows the Dependency Inversion Principle—code depends on abstractions (Pal trait),
not concrete implementations (RealPal or MockPal).
*/

pub mod mock;
pub mod real_pal;
mod resolved_path;
mod traits;

pub use mock::MockPal;
pub use real_pal::RealPal;
pub use resolved_path::ResolvedPath;
pub use traits::{FileMetadata, Pal, PalHandle, ReadSeek};
