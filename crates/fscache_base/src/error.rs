use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use tracing_error::{SpanTrace, SpanTraceStatus};

/* 📖 # Why a custom error type and not use anyhow/eyre/thiserror etc?

- Better control over error handling
- No dependencies to compile and integrate
- More transparency into error handling logic
 */

/// Error variants that can occur in fscache operations.
/// Each variant represents a specific error category with its associated context.
#[derive(Debug)]
pub enum ErrorKind {
    /// The path could not be turned into an absolute path
    PathResolution { path: PathBuf, source: io::Error },

    /// The resolved path failed the existence check
    NotFound { path: PathBuf, source: io::Error },

    /// The file exists but its content could not be read
    Read { path: PathBuf, source: io::Error },

    /// A configuration file could not be parsed
    Config { path: PathBuf, message: String },

    /// Catch-all for other errors with a message
    Message { message: String },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::PathResolution { path, source } => {
                write!(f, "Failed to resolve path '{}': {}", path.display(), source)
            }
            ErrorKind::NotFound { path, source } => {
                write!(f, "File not found at {}: {}", path.display(), source)
            }
            ErrorKind::Read { path, source } => {
                write!(f, "Failed to read file {}: {}", path.display(), source)
            }
            ErrorKind::Config { path, message } => {
                write!(f, "Invalid configuration in {}: {}", path.display(), message)
            }
            ErrorKind::Message { message } => write!(f, "{}", message),
        }
    }
}

/* 📖 # Why separate ErrorKind and FsCacheError?
This two-layer design provides a clear separation of concerns:
- ErrorKind: structural variants with specific contexts (file paths, io sources)
- FsCacheError: wraps ErrorKind with runtime context strings, an optional cause
  and the span trace captured at construction

Callers match on ErrorKind (or use the is_* helpers) to tell a missing file
from an unreadable one, while propagation code only ever attaches context.
*/

/// Error type wrapping ErrorKind with context, cause and span trace.
pub struct FsCacheError {
    kind: ErrorKind,
    context: Vec<String>,
    cause: Option<Box<FsCacheError>>,
    span_trace: SpanTrace,
}

impl FsCacheError {
    /// Creates a new error from an ErrorKind, capturing the current span trace.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: vec![],
            cause: None,
            span_trace: SpanTrace::capture(),
        }
    }

    /// Creates a catch-all error carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Message {
            message: message.into(),
        })
    }

    pub fn path_resolution(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::new(ErrorKind::PathResolution {
            path: path.into(),
            source,
        })
    }

    pub fn not_found(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::new(ErrorKind::NotFound {
            path: path.into(),
            source,
        })
    }

    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::new(ErrorKind::Read {
            path: path.into(),
            source,
        })
    }

    /// Attaches context to an error.
    /// Context is displayed before the error message.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Attaches context using lazy evaluation.
    pub fn with_context<F>(mut self, f: F) -> Self
    where
        F: FnOnce() -> String,
    {
        self.context.push(f());
        self
    }

    /// Records the error that led to this one.
    pub fn caused_by(mut self, cause: FsCacheError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Returns a reference to the underlying ErrorKind.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the attached context strings, oldest first.
    pub fn get_context(&self) -> &[String] {
        &self.context
    }

    pub fn cause(&self) -> Option<&FsCacheError> {
        self.cause.as_deref()
    }

    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// The path the failing operation was working on, if any.
    pub fn path(&self) -> Option<&Path> {
        match &self.kind {
            ErrorKind::PathResolution { path, .. }
            | ErrorKind::NotFound { path, .. }
            | ErrorKind::Read { path, .. }
            | ErrorKind::Config { path, .. } => Some(path),
            ErrorKind::Message { .. } => None,
        }
    }

    pub fn is_path_resolution(&self) -> bool {
        matches!(self.kind, ErrorKind::PathResolution { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::NotFound { .. })
    }

    pub fn is_read(&self) -> bool {
        matches!(self.kind, ErrorKind::Read { .. })
    }

    /// Returns the innermost error in the chain.
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        let mut current: &(dyn StdError + 'static) = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }

    fn fmt_children(&self, f: &mut fmt::Formatter<'_>, prefix: &str) -> fmt::Result {
        let total = self.context.len() + usize::from(self.cause.is_some());
        for (index, context) in self.context.iter().enumerate() {
            let branch = if index + 1 == total { "└─" } else { "├─" };
            writeln!(f, "{}{} {}", prefix, branch, context)?;
        }
        if let Some(cause) = &self.cause {
            writeln!(f, "{}└─ cause: {}", prefix, cause.kind)?;
            cause.fmt_children(f, &format!("{}   ", prefix))?;
        }
        Ok(())
    }
}

impl From<ErrorKind> for FsCacheError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl StdError for FsCacheError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.kind {
            ErrorKind::PathResolution { source, .. }
            | ErrorKind::NotFound { source, .. }
            | ErrorKind::Read { source, .. } => Some(source),
            ErrorKind::Config { .. } | ErrorKind::Message { .. } => self
                .cause
                .as_deref()
                .map(|cause| cause as &(dyn StdError + 'static)),
        }
    }
}

impl fmt::Display for FsCacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ctx in &self.context {
            write!(f, "{}: ", ctx)?;
        }
        write!(f, "{}", self.kind)
    }
}

/* 📖 # Why a hand-written Debug impl?

Errors end up in logs and test failures via `{:?}`. The derived output buries
the message inside nested structs, so Debug renders a tree instead: the
message, its context, the chain of causes and finally the span trace when
an ErrorLayer was active at construction.
*/
impl fmt::Debug for FsCacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.kind)?;
        self.fmt_children(f, "")?;
        if self.span_trace.status() == SpanTraceStatus::CAPTURED {
            writeln!(f, "Trace: {}", self.span_trace)?;
        }
        Ok(())
    }
}

/* 📖 # Why use Box<FsCacheError> in the result type?

Boxing the error reduces the size of the result type, making it more efficient to return in the common case.
Cache hits return an Arc pointer, so the Ok path stays two words wide.
*/

/// Standard result type for fscache operations.
pub type FsCacheResult<T> = std::result::Result<T, Box<FsCacheError>>;

/// Extension trait for attaching context to Results.
pub trait ResultExt<T> {
    /// Attaches context to an error, consuming and re-wrapping it.
    fn context(self, context: impl Into<String>) -> FsCacheResult<T>;

    /// Attaches context using lazy evaluation.
    /// Context is only evaluated if the result is an error.
    fn with_context<F>(self, f: F) -> FsCacheResult<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for FsCacheResult<T> {
    fn context(self, context: impl Into<String>) -> FsCacheResult<T> {
        self.map_err(|err| Box::new(err.context(context)))
    }

    fn with_context<F>(self, f: F) -> FsCacheResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| Box::new(err.with_context(f)))
    }
}

/// Builds a boxed message error from format arguments.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        Box::new($crate::error::FsCacheError::message(format!($($arg)*)))
    };
}

/// Returns early with a boxed message error.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::err!($($arg)*))
    };
}
