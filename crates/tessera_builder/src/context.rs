//! The loaded build context as seen by the builder.

use std::path::{Path, PathBuf};

/// Events delivered to a context's hook listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEvent {
    /// The configuration was reloaded because a dependency changed.
    ConfigChange {
        /// The configuration file.
        config_path: PathBuf,
        /// Dependency files that were new or newer than last time.
        changed: Vec<PathBuf>,
    },
}

/// A watch registration emitted by [`Builder::register_dependency`].
///
/// [`Builder::register_dependency`]: crate::Builder::register_dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyMessage {
    /// A single file.
    Dependency {
        /// Absolute path of the file.
        file: PathBuf,
    },
    /// Every file under `dir` matching `glob`.
    DirDependency {
        /// Absolute directory the glob is rooted at.
        dir: PathBuf,
        /// Glob relative to `dir`.
        glob: String,
    },
}

/// Fully resolved configuration, produced by a [`BuildHost`](crate::BuildHost).
///
/// Contexts are shared through the config cache, so mutation goes through
/// `&self`.
pub trait BuildContext: Send + Sync {
    /// Directory relative paths of this context resolve against.
    fn cwd(&self) -> &Path;

    /// Extra files the context depends on, beyond the configuration files.
    fn dependencies(&self) -> Vec<PathBuf>;

    /// Include patterns or plain file paths.
    fn include(&self) -> Vec<String>;

    /// Source files currently in scope.
    fn files(&self) -> Vec<PathBuf>;

    /// Rescans the file system for files in scope. May block; the builder
    /// runs it on the blocking pool.
    fn refresh_files(&self);

    /// Resolves accumulated per-file fragments into the final CSS text.
    fn css(&self, fragments: &[String]) -> String;

    /// Returns `true` if `params` of an `@layer` rule match this context's layers.
    fn is_valid_layer_rule(&self, params: &str) -> bool;

    /// Notifies hook listeners.
    fn call_hook(&self, event: HookEvent);
}
