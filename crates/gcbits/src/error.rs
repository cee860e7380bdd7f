//! Error types for bitmap construction and address resolution.

use std::error::Error;
use std::fmt;
use std::io;

/// The raw memory allocator could not satisfy a bitmap storage request.
///
/// Fatal to the requesting span-creation operation; the bitmap layer never
/// retries. Retry policy, if any, belongs to the span/heap layer above.
#[derive(Debug)]
pub struct AllocError {
    source: io::Error,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bitmap storage allocation failed: {}", self.source)
    }
}

impl Error for AllocError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

impl From<io::Error> for AllocError {
    fn from(source: io::Error) -> Self {
        Self { source }
    }
}

/// Failure to resolve a heap address to a mark bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    /// The address does not fall inside any known span.
    ///
    /// Whether this is a root-scan bug or an ignorable interior pointer is
    /// collector policy, decided by the caller.
    NotFound,
    /// The span's bitmap does not begin at a word boundary.
    ///
    /// This indicates a bug in the span-layout logic upstream and should be
    /// treated as a non-recoverable internal-consistency failure.
    UnalignedSpanStart,
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "address does not belong to any known span"),
            Self::UnalignedSpanStart => write!(f, "span bitmap does not start at a word boundary"),
        }
    }
}

impl Error for ResolveError {}

#[cfg(test)]
mod tests {
    use super::{AllocError, ResolveError};
    use std::error::Error;
    use std::io;

    #[test]
    fn alloc_error_preserves_source() {
        let err = AllocError::from(io::Error::from(io::ErrorKind::OutOfMemory));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("allocation failed"));
    }

    #[test]
    fn resolve_error_display() {
        assert!(ResolveError::NotFound.to_string().contains("span"));
        assert!(ResolveError::UnalignedSpanStart
            .to_string()
            .contains("word boundary"));
    }
}
