//! Error types for cache operations.

use std::path::PathBuf;

use crate::content::ContextId;

/// Errors that can occur during cache operations.
///
/// Most cache lookups are fail-safe: a missing file or entry is a cache miss
/// rather than an error. This enum covers the cases a caller must handle.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A file's metadata could not be read.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A content entry was used after its context was retired.
    #[error("no content cache registered for context {id}")]
    UnknownContext {
        /// The retired or never-registered context.
        id: ContextId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = CacheError::Io {
            path: PathBuf::from("/tmp/project/src/app.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cache I/O error"));
        assert!(msg.contains("app.json"));
    }

    #[test]
    fn unknown_context_display() {
        let err = CacheError::UnknownContext { id: ContextId::from_raw(7) };
        assert_eq!(err.to_string(), "no content cache registered for context #7");
    }
}
