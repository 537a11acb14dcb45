//! Collaborators the builder delegates to.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::context::BuildContext;
use crate::css;
use crate::error::{BuildError, ExtractError};

/// Loads contexts, extracts files and writes artifacts on behalf of a
/// [`Builder`](crate::Builder).
///
/// [`ProjectHost`](crate::ProjectHost) is the implementation backed by
/// `tessera.toml`; tests and embedders provide their own.
#[async_trait]
pub trait BuildHost: Send + Sync {
    /// The context this host loads.
    type Context: BuildContext + 'static;

    /// Looks for a configuration file starting at `cwd`.
    async fn find_config(&self, cwd: &Path) -> Option<PathBuf>;

    /// Loads a fresh context from `config_path`.
    async fn load_context(&self, config_path: &Path) -> Result<Self::Context, BuildError>;

    /// Every file the configuration at `config_path` is assembled from.
    async fn config_dependencies(&self, config_path: &Path) -> Result<Vec<PathBuf>, BuildError>;

    /// Forgets anything cached about `paths` before a reload.
    fn invalidate_modules(&self, _paths: &[PathBuf]) {}

    /// Extracts `path` into a CSS fragment, or `None` if it has no style usage.
    async fn extract_file(
        &self,
        ctx: &Self::Context,
        path: &Path,
    ) -> Result<Option<String>, ExtractError>;

    /// Writes generated support files for `ctx`.
    async fn emit_artifacts(&self, ctx: &Self::Context) -> Result<(), BuildError>;

    /// Combines a file's previous fragment with its new one.
    fn merge_css(&self, old: &str, new: &str) -> String {
        css::merge_css(old, new)
    }

    /// Final pass over CSS written back into a host stylesheet.
    fn optimize_css(&self, raw: &str) -> String {
        css::optimize_css(raw, &[])
    }
}
