//! Error types for build cycles and per-file extraction.

use std::path::PathBuf;

use tessera_cache::CacheError;
use tessera_common::InternalError;
use tessera_config::ConfigError;

/// Errors that abort a build operation.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// No configuration file was supplied and none could be discovered.
    #[error("could not find {file} in {cwd} or any parent directory", file = tessera_config::CONFIG_FILE)]
    ConfigNotFound {
        /// Directory the search started from.
        cwd: PathBuf,
    },

    /// An operation needed a loaded context before `setup()` succeeded.
    #[error("builder has no loaded context; call setup() first")]
    Uninitialized,

    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A file could not be read or written.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A background task failed.
    #[error(transparent)]
    Internal(#[from] InternalError),

    /// Generated artifacts could not be produced.
    #[error("failed to emit {path}: {reason}")]
    Emit {
        /// The artifact being written.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },
}

/// Errors isolated to a single source file during extraction.
///
/// These never abort a batch; they are collected into the extraction summary
/// and the file is retried on the next cycle.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The file could not be read or stat'ed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file being extracted.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The file contents were not understood.
    #[error("failed to parse {path}: {reason}")]
    Parse {
        /// The file being extracted.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// CSS generation hit a broken invariant.
    #[error(transparent)]
    Internal(#[from] InternalError),

    /// The result could not be stored.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The extraction limiter was shut down.
    #[error("extraction limiter closed")]
    LimiterClosed,
}
