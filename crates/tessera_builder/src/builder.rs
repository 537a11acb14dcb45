//! The incremental build orchestrator.
//!
//! A [`Builder`] holds at most one loaded context at a time. Each cycle runs
//! [`setup`](Builder::setup) to decide whether the configuration must be
//! reloaded, then [`extract`](Builder::extract) to regenerate CSS for source
//! files whose modification time moved, and finally reads the merged result
//! with [`to_css`](Builder::to_css) or [`write`](Builder::write).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;
use tessera_cache::{
    detect_changes, snapshot, stat_mtime, CacheError, Caches, ConfigData, ContextId,
};
use tessera_common::InternalError;
use tessera_config::normalize_path;
use tracing::{debug, info, warn};

use crate::context::{BuildContext, DependencyMessage, HookEvent};
use crate::error::{BuildError, ExtractError};
use crate::host::BuildHost;
use crate::limiter::ExtractLimiter;
use crate::root::CssRoot;

/// What one [`Builder::extract`] call did.
#[derive(Debug, Default)]
pub struct ExtractSummary {
    /// Files in scope.
    pub scanned: usize,
    /// Files skipped because their mtime matched the cache.
    pub unchanged: usize,
    /// Files that produced a CSS fragment.
    pub extracted: usize,
    /// Files that were extracted but had no style usage.
    pub empty: usize,
    /// Files that failed, with the reason. They are retried next cycle.
    pub failed: Vec<(PathBuf, ExtractError)>,
}

impl ExtractSummary {
    /// Returns `true` if no file failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

enum FileOutcome {
    Unchanged,
    Extracted,
    Empty,
}

#[derive(Debug)]
struct Active<C> {
    config_path: PathBuf,
    id: ContextId,
    context: Arc<C>,
}

/// Incremental CSS builder over a [`BuildHost`].
pub struct Builder<H: BuildHost> {
    host: H,
    caches: Caches<H::Context>,
    limiter: ExtractLimiter,
    cwd: PathBuf,
    config_path: Option<PathBuf>,
    active: Option<Active<H::Context>>,
    config_deps: BTreeSet<PathBuf>,
    config_changed: bool,
    has_emitted: bool,
}

impl<H: BuildHost> Builder<H> {
    /// Creates a builder with private caches and the default extraction limit.
    pub fn new(host: H, cwd: impl Into<PathBuf>) -> Self {
        Self {
            host,
            caches: Caches::new(),
            limiter: ExtractLimiter::default(),
            cwd: normalize_path(&cwd.into()),
            config_path: None,
            active: None,
            config_deps: BTreeSet::new(),
            config_changed: false,
            has_emitted: false,
        }
    }

    /// Uses `caches`, typically shared with other builders.
    pub fn with_caches(mut self, caches: Caches<H::Context>) -> Self {
        self.caches = caches;
        self
    }

    /// Uses `limiter` to bound extraction.
    pub fn with_limiter(mut self, limiter: ExtractLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    /// Uses `path` instead of searching for a configuration file.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// The collaborator this builder delegates to.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The caches this builder reads and writes.
    pub fn caches(&self) -> &Caches<H::Context> {
        &self.caches
    }

    /// The extraction limiter.
    pub fn limiter(&self) -> &ExtractLimiter {
        &self.limiter
    }

    /// Returns `true` if the last `setup()` found the configuration changed.
    pub fn config_changed(&self) -> bool {
        self.config_changed
    }

    /// The loaded context.
    pub fn context(&self) -> Result<&Arc<H::Context>, BuildError> {
        self.active().map(|active| &active.context)
    }

    /// Identity of the loaded context, if any.
    pub fn context_id(&self) -> Option<ContextId> {
        self.active.as_ref().map(|active| active.id)
    }

    /// Configuration file of the loaded context, if any.
    pub fn config_path(&self) -> Option<&Path> {
        self.active.as_ref().map(|active| active.config_path.as_path())
    }

    /// Loads the context, or reuses the cached one if no configuration
    /// dependency changed since it was loaded.
    pub async fn setup(&mut self) -> Result<(), BuildError> {
        let config_path = self.resolve_config_path().await?;
        let config_deps = self.config_dependencies(&config_path).await?;

        let cached = self.caches.lock_config().get(&config_path).cloned();
        let mut tracked = config_deps.clone();
        if let Some(data) = &cached {
            tracked.extend(data.deps.iter().cloned());
        }

        let paths: Vec<PathBuf> = tracked.into_iter().collect();
        let stamps = snapshot(paths.iter().map(PathBuf::as_path)).await;
        let changes = detect_changes(
            &paths,
            &stamps,
            cached.as_ref().map(|data| &data.deps_modified),
        );
        for missing in &changes.missing_files {
            debug!(file = %missing.display(), "configuration dependency missing, skipped");
        }
        self.config_changed = !changes.is_empty();

        match cached {
            Some(data) if !self.config_changed => {
                debug!(config = %config_path.display(), "configuration unchanged, reusing context");
                self.config_deps = config_deps;
                refresh_files(&data.context).await?;
                self.activate(config_path, &data);
            }
            previous => {
                let changed: Vec<PathBuf> = changes.dirty().cloned().collect();
                let reloading = previous.is_some();
                if reloading {
                    for file in &changed {
                        info!(file = %file.display(), "configuration dependency changed");
                    }
                    self.host.invalidate_modules(&changed);
                }

                let context = Arc::new(self.host.load_context(&config_path).await?);

                // The reload may have added or dropped presets.
                let config_deps = self.config_dependencies(&config_path).await?;
                let base = context.cwd().to_path_buf();
                let mut tracked = config_deps.clone();
                tracked.extend(
                    context
                        .dependencies()
                        .iter()
                        .map(|path| absolute(&base, path)),
                );
                let stamps = snapshot(tracked.iter().map(PathBuf::as_path)).await;
                self.config_deps = config_deps;

                let data = ConfigData::new(Arc::clone(&context), tracked, stamps);
                self.store(&config_path, &data);
                if reloading {
                    context.call_hook(HookEvent::ConfigChange {
                        config_path: config_path.clone(),
                        changed,
                    });
                }
                info!(
                    config = %config_path.display(),
                    context = %data.id,
                    reloaded = reloading,
                    "context loaded"
                );
                self.activate(config_path, &data);
            }
        }
        Ok(())
    }

    /// Regenerates CSS for every in-scope file whose mtime changed.
    ///
    /// At most [`ExtractLimiter::capacity`] files are in flight at once. A
    /// failing file is reported in the summary and does not stop the others;
    /// its mtime is not recorded, so it is retried on the next call.
    pub async fn extract(&self) -> Result<ExtractSummary, BuildError> {
        let active = self.active()?;
        let files = active.context.files();
        let outcomes = join_all(files.iter().map(|path| self.extract_file(active, path))).await;

        let mut summary = ExtractSummary {
            scanned: files.len(),
            ..ExtractSummary::default()
        };
        for (path, outcome) in files.into_iter().zip(outcomes) {
            match outcome {
                Ok(FileOutcome::Unchanged) => summary.unchanged += 1,
                Ok(FileOutcome::Extracted) => summary.extracted += 1,
                Ok(FileOutcome::Empty) => summary.empty += 1,
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "extraction failed");
                    summary.failed.push((path, err));
                }
            }
        }
        debug!(
            scanned = summary.scanned,
            unchanged = summary.unchanged,
            extracted = summary.extracted,
            empty = summary.empty,
            failed = summary.failed.len(),
            "extraction finished"
        );
        Ok(summary)
    }

    /// The final CSS for every fragment accumulated so far.
    pub fn to_css(&self) -> Result<String, BuildError> {
        let active = self.active()?;
        let fragments = self.caches.lock_content().fragments(active.id);
        Ok(active.context.css(&fragments))
    }

    /// Replaces the contents of `root` with its original contents followed by
    /// the generated CSS, passed through the host's optimizer.
    pub fn write(&self, root: &mut CssRoot) -> Result<(), BuildError> {
        let css = self.to_css()?;
        let original = root.to_css();
        root.remove_all();
        root.append(&self.host.optimize_css(&format!("{original}\n{css}")));
        Ok(())
    }

    /// Returns `true` if `root` declares the layers of the loaded context.
    pub fn is_valid_root(&self, root: &CssRoot) -> Result<bool, BuildError> {
        let context = self.context()?;
        Ok(root
            .layer_params()
            .iter()
            .any(|params| context.is_valid_layer_rule(params)))
    }

    /// Emits artifacts if a previous call already happened in this builder
    /// and the last `setup()` found the configuration changed.
    ///
    /// The first call never emits; it only records that emission happened.
    /// Returns `true` if artifacts were written.
    pub async fn emit(&mut self) -> Result<bool, BuildError> {
        let emitted = if self.has_emitted && self.config_changed {
            let context = self.context()?;
            self.host.emit_artifacts(context).await?;
            info!("artifacts emitted");
            true
        } else {
            false
        };
        self.has_emitted = true;
        Ok(emitted)
    }

    /// Reports every file and directory a watcher should track.
    ///
    /// Include globs are reported as directory dependencies, plain include
    /// paths, context dependencies and configuration dependencies as files.
    pub fn register_dependency(
        &self,
        mut callback: impl FnMut(DependencyMessage),
    ) -> Result<(), BuildError> {
        let context = self.context()?;
        let cwd = context.cwd();
        for pattern in context.include() {
            match split_glob(&pattern) {
                Some((base, glob)) => callback(DependencyMessage::DirDependency {
                    dir: absolute(cwd, Path::new(&base)),
                    glob,
                }),
                None => callback(DependencyMessage::Dependency {
                    file: absolute(cwd, Path::new(&pattern)),
                }),
            }
        }
        for file in context.dependencies() {
            callback(DependencyMessage::Dependency {
                file: absolute(cwd, &file),
            });
        }
        for file in &self.config_deps {
            callback(DependencyMessage::Dependency { file: file.clone() });
        }
        Ok(())
    }

    fn active(&self) -> Result<&Active<H::Context>, BuildError> {
        self.active.as_ref().ok_or(BuildError::Uninitialized)
    }

    async fn resolve_config_path(&self) -> Result<PathBuf, BuildError> {
        let path = match &self.config_path {
            Some(path) => path.clone(),
            None => self
                .host
                .find_config(&self.cwd)
                .await
                .ok_or_else(|| BuildError::ConfigNotFound {
                    cwd: self.cwd.clone(),
                })?,
        };
        Ok(absolute(&self.cwd, &path))
    }

    /// The configuration file and everything the host says it depends on.
    async fn config_dependencies(
        &self,
        config_path: &Path,
    ) -> Result<BTreeSet<PathBuf>, BuildError> {
        let mut deps: BTreeSet<PathBuf> = self
            .host
            .config_dependencies(config_path)
            .await?
            .iter()
            .map(|path| absolute(&self.cwd, path))
            .collect();
        deps.insert(config_path.to_path_buf());
        Ok(deps)
    }

    fn store(&self, config_path: &Path, data: &ConfigData<H::Context>) {
        let replaced = self
            .caches
            .lock_config()
            .insert(config_path.to_path_buf(), data.clone());
        let mut content = self.caches.lock_content();
        content.register(data.id);
        if let Some(old) = replaced {
            debug!(context = %old.id, "retiring replaced context");
            content.retire(old.id);
        }
    }

    fn activate(&mut self, config_path: PathBuf, data: &ConfigData<H::Context>) {
        self.active = Some(Active {
            config_path,
            id: data.id,
            context: Arc::clone(&data.context),
        });
    }

    async fn extract_file(
        &self,
        active: &Active<H::Context>,
        path: &Path,
    ) -> Result<FileOutcome, ExtractError> {
        let _permit = self.limiter.acquire().await?;

        let mtime = stat_mtime(path).await.map_err(|err| match err {
            CacheError::Io { path, source } => ExtractError::Io { path, source },
            other => ExtractError::Cache(other),
        })?;
        let unchanged = self
            .caches
            .lock_content()
            .is_unchanged(active.id, path, mtime);
        if unchanged {
            return Ok(FileOutcome::Unchanged);
        }

        let css = self.host.extract_file(&active.context, path).await?;
        let outcome = match &css {
            Some(css) if !css.trim().is_empty() => FileOutcome::Extracted,
            _ => FileOutcome::Empty,
        };
        self.caches
            .lock_content()
            .record(active.id, path, mtime, css, |old, new| {
                self.host.merge_css(old, new)
            })?;
        Ok(outcome)
    }
}

/// Rescans the context's source files on the blocking pool.
async fn refresh_files<C: BuildContext + 'static>(context: &Arc<C>) -> Result<(), BuildError> {
    let context = Arc::clone(context);
    tokio::task::spawn_blocking(move || context.refresh_files())
        .await
        .map_err(|err| InternalError::new(format!("file scan task failed: {err}")))?;
    Ok(())
}

/// Resolves `path` against `base` and removes `.` and `..` components.
fn absolute(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    }
}

/// Splits a glob into its literal directory prefix and the remaining pattern.
///
/// Returns `None` for plain paths.
fn split_glob(pattern: &str) -> Option<(String, String)> {
    let is_magic = |segment: &str| segment.contains(['*', '?', '[', ']', '{', '}', '!']);
    let segments: Vec<&str> = pattern.split('/').collect();
    let first_magic = segments.iter().position(|&segment| is_magic(segment))?;
    let base = segments[..first_magic].join("/");
    let glob = segments[first_magic..].join("/");
    let base = if base.is_empty() { ".".to_string() } else { base };
    Some((base, glob))
}
