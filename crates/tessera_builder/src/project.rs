//! The default host: projects described by a `tessera.toml` file.
//!
//! Source files are JSON-serialized [`ExtractResult`]s produced by an
//! upstream parser. Each one is collected into a forked [`HashFactory`] and
//! rendered with [`generate_css`].

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde_json::{json, Map, Value};
use tessera_atomic::{generate_css, CollectorContext, ExtractResult, HashFactory};
use tessera_common::InternalError;
use tessera_config::{ConfigError, ConfigLoader, LoadedConfig, ProjectConfig};
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::context::{BuildContext, HookEvent};
use crate::css::optimize_css;
use crate::error::{BuildError, ExtractError};
use crate::host::BuildHost;

type HookFn = Box<dyn Fn(&HookEvent) + Send + Sync>;

/// A loaded `tessera.toml` project.
pub struct ProjectContext {
    config_path: PathBuf,
    cwd: PathBuf,
    config: ProjectConfig,
    factory: HashFactory,
    include: GlobSet,
    exclude: GlobSet,
    files: Mutex<Vec<PathBuf>>,
    hooks: Mutex<Vec<HookFn>>,
}

impl fmt::Debug for ProjectContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectContext")
            .field("config_path", &self.config_path)
            .field("cwd", &self.cwd)
            .field("name", &self.config.project.name)
            .finish_non_exhaustive()
    }
}

impl ProjectContext {
    /// Builds a context from a loaded configuration and scans its files.
    ///
    /// The scan walks the project directory synchronously.
    pub fn new(loaded: LoadedConfig) -> Result<Self, BuildError> {
        let cwd = loaded
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let collector = CollectorContext::from_config(&loaded.config);
        let context = Self {
            include: glob_set(&loaded.config.project.include)?,
            exclude: glob_set(&loaded.config.project.exclude)?,
            factory: HashFactory::new(Arc::new(collector)),
            config_path: loaded.path,
            cwd,
            config: loaded.config,
            files: Mutex::new(Vec::new()),
            hooks: Mutex::new(Vec::new()),
        };
        context.refresh_files();
        Ok(context)
    }

    /// The parsed configuration.
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// The configuration file this context was loaded from.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The root factory. Extraction works on forks of it.
    pub fn factory(&self) -> &HashFactory {
        &self.factory
    }

    /// Directory generated artifacts are written to.
    pub fn outdir(&self) -> PathBuf {
        self.cwd.join(&self.config.project.outdir)
    }

    /// Registers a listener for hook events.
    pub fn on_hook(&self, hook: impl Fn(&HookEvent) + Send + Sync + 'static) {
        self.hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(hook));
    }

    /// Walks the project directory for files matching the include patterns.
    /// Blocks on directory I/O.
    pub fn scan_files(&self) -> Vec<PathBuf> {
        let outdir = self.outdir();
        let mut files: Vec<PathBuf> = WalkDir::new(&self.cwd)
            .into_iter()
            .filter_entry(|entry| {
                let hidden =
                    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.');
                !hidden && entry.path() != outdir.as_path()
            })
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(&self.cwd).ok()?;
                (self.include.is_match(relative) && !self.exclude.is_match(relative))
                    .then(|| entry.path().to_path_buf())
            })
            .collect();
        files.sort();
        files
    }
}

impl BuildContext for ProjectContext {
    fn cwd(&self) -> &Path {
        &self.cwd
    }

    fn dependencies(&self) -> Vec<PathBuf> {
        self.config
            .project
            .dependencies
            .iter()
            .map(PathBuf::from)
            .collect()
    }

    fn include(&self) -> Vec<String> {
        self.config.project.include.clone()
    }

    fn files(&self) -> Vec<PathBuf> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn refresh_files(&self) {
        let files = self.scan_files();
        debug!(count = files.len(), "source files scanned");
        *self.files.lock().unwrap_or_else(PoisonError::into_inner) = files;
    }

    fn css(&self, fragments: &[String]) -> String {
        optimize_css(&fragments.join("\n"), &self.config.layers.ordered())
    }

    fn is_valid_layer_rule(&self, params: &str) -> bool {
        let declared: BTreeSet<&str> = params.split(',').map(str::trim).collect();
        let expected: BTreeSet<&str> = self.config.layers.ordered().into_iter().collect();
        declared == expected
    }

    fn call_hook(&self, event: HookEvent) {
        trace!(?event, "calling hooks");
        for hook in self
            .hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
        {
            hook(&event);
        }
    }
}

/// [`BuildHost`] for `tessera.toml` projects.
#[derive(Debug, Default)]
pub struct ProjectHost {
    loader: ConfigLoader,
}

impl ProjectHost {
    /// Creates a host with an empty configuration cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The configuration loader and its parsed-file cache.
    pub fn loader(&self) -> &ConfigLoader {
        &self.loader
    }
}

#[async_trait]
impl BuildHost for ProjectHost {
    type Context = ProjectContext;

    async fn find_config(&self, cwd: &Path) -> Option<PathBuf> {
        tessera_config::find_config(cwd)
    }

    async fn load_context(&self, config_path: &Path) -> Result<ProjectContext, BuildError> {
        let loaded = self.loader.load(config_path)?;
        tokio::task::spawn_blocking(move || ProjectContext::new(loaded))
            .await
            .map_err(|err| InternalError::new(format!("file scan task failed: {err}")))?
    }

    async fn config_dependencies(&self, config_path: &Path) -> Result<Vec<PathBuf>, BuildError> {
        Ok(self.loader.dependencies(config_path)?)
    }

    fn invalidate_modules(&self, paths: &[PathBuf]) {
        let removed = self.loader.invalidate(paths);
        debug!(removed, "configuration cache invalidated");
    }

    async fn extract_file(
        &self,
        ctx: &ProjectContext,
        path: &Path,
    ) -> Result<Option<String>, ExtractError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ExtractError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let result: ExtractResult =
            serde_json::from_str(&text).map_err(|err| ExtractError::Parse {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;
        if result.is_empty() {
            return Ok(None);
        }

        let mut factory = ctx.factory.fork();
        factory.collect(&result);
        if factory.is_empty() {
            return Ok(None);
        }
        let css = generate_css(&factory)?;
        Ok((!css.is_empty()).then_some(css))
    }

    async fn emit_artifacts(&self, ctx: &ProjectContext) -> Result<(), BuildError> {
        let outdir = ctx.outdir();
        tokio::fs::create_dir_all(&outdir)
            .await
            .map_err(|source| BuildError::Io {
                path: outdir.clone(),
                source,
            })?;
        for (name, artifact) in artifacts(ctx) {
            let path = outdir.join(name);
            let text = serde_json::to_string_pretty(&artifact).map_err(|err| BuildError::Emit {
                path: path.clone(),
                reason: err.to_string(),
            })?;
            tokio::fs::write(&path, text)
                .await
                .map_err(|source| BuildError::Io {
                    path: path.clone(),
                    source,
                })?;
            debug!(artifact = %path.display(), "artifact written");
        }
        Ok(())
    }
}

fn glob_set(patterns: &[String]) -> Result<GlobSet, BuildError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|err| {
            ConfigError::ValidationError(format!("invalid glob `{pattern}`: {err}"))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|err| ConfigError::ValidationError(err.to_string()).into())
}

fn artifacts(ctx: &ProjectContext) -> [(&'static str, Value); 3] {
    let collector = ctx.factory.context();
    let breakpoints: Map<String, Value> = collector
        .conditions
        .breakpoints()
        .iter()
        .map(|(name, width)| (name.clone(), Value::String(width.clone())))
        .collect();
    let conditions = json!({
        "conditions": collector.conditions.named(),
        "breakpoints": breakpoints,
    });

    let config = ctx.config();
    let recipes: Map<String, Value> = config
        .recipes
        .iter()
        .map(|(name, recipe)| {
            let variants: Map<String, Value> = recipe
                .variants
                .iter()
                .map(|(axis, values)| (axis.clone(), json!(values.keys().collect::<Vec<_>>())))
                .collect();
            let entry = json!({
                "className": recipe.class_name_or(name),
                "variants": variants,
                "defaultVariants": recipe.default_variants,
            });
            (name.clone(), entry)
        })
        .collect();
    let slot_recipes: Map<String, Value> = config
        .slot_recipes
        .iter()
        .map(|(name, recipe)| {
            let variants: Map<String, Value> = recipe
                .variants
                .iter()
                .map(|(axis, values)| (axis.clone(), json!(values.keys().collect::<Vec<_>>())))
                .collect();
            let entry = json!({
                "className": recipe.class_name_or(name),
                "slots": recipe.slots,
                "variants": variants,
                "defaultVariants": recipe.default_variants,
            });
            (name.clone(), entry)
        })
        .collect();

    let patterns: Map<String, Value> = config
        .patterns
        .iter()
        .map(|(name, pattern)| {
            let entry = json!({
                "jsx": pattern.jsx,
                "properties": pattern.properties,
            });
            (name.clone(), entry)
        })
        .collect();

    [
        ("conditions.json", conditions),
        (
            "recipes.json",
            json!({ "recipes": recipes, "slotRecipes": slot_recipes }),
        ),
        ("patterns.json", json!({ "patterns": patterns })),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[project]
name = "demo"
include = ["src/**/*.json"]
exclude = ["src/ignored/**"]
dependencies = ["theme.css"]

[recipes.button]
base = { fontWeight = "bold" }

[recipes.button.variants.size.sm]
fontSize = "12px"

[patterns.stack]
jsx = "Stack"
properties = { gap = "gap" }
defaults = { display = "flex" }
"#;

    fn project() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("tessera.toml");
        std::fs::write(&config, CONFIG).unwrap();
        std::fs::create_dir_all(dir.path().join("src/ignored")).unwrap();
        std::fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        std::fs::write(dir.path().join("src/app.json"), "{}").unwrap();
        std::fs::write(dir.path().join("src/nested/card.json"), "{}").unwrap();
        std::fs::write(dir.path().join("src/ignored/skip.json"), "{}").unwrap();
        std::fs::write(dir.path().join("src/readme.md"), "").unwrap();
        (dir, config)
    }

    async fn load(config: &Path) -> ProjectContext {
        ProjectHost::new().load_context(config).await.unwrap()
    }

    #[tokio::test]
    async fn files_follow_include_and_exclude() {
        let (dir, config) = project();
        let ctx = load(&config).await;
        assert_eq!(
            ctx.files(),
            vec![
                dir.path().join("src/app.json"),
                dir.path().join("src/nested/card.json"),
            ]
        );
    }

    #[tokio::test]
    async fn refresh_sees_new_files() {
        let (dir, config) = project();
        let ctx = load(&config).await;
        std::fs::write(dir.path().join("src/late.json"), "{}").unwrap();
        assert_eq!(ctx.files().len(), 2);
        ctx.refresh_files();
        assert_eq!(ctx.files().len(), 3);
    }

    #[tokio::test]
    async fn extract_renders_usage() {
        let (dir, config) = project();
        let host = ProjectHost::new();
        let ctx = host.load_context(&config).await.unwrap();
        let file = dir.path().join("src/app.json");
        std::fs::write(
            &file,
            r#"{
                "css": [{ "fontSize": "14px", "notAProp": 1 }],
                "recipe": { "button": [{ "size": "sm" }] }
            }"#,
        )
        .unwrap();

        let css = host.extract_file(&ctx, &file).await.unwrap().unwrap();
        assert!(css.contains("@layer utilities"));
        assert!(css.contains("font-size: 14px;"));
        assert!(css.contains("@layer recipes"));
        assert!(css.contains(".button--size_sm"));
        assert!(css.contains("font-weight: bold;"));
        assert!(!css.contains("notAProp"));
        assert!(ctx.factory().is_empty());
    }

    #[tokio::test]
    async fn extract_without_usage_is_none() {
        let (dir, config) = project();
        let host = ProjectHost::new();
        let ctx = host.load_context(&config).await.unwrap();
        let file = dir.path().join("src/app.json");
        assert!(host.extract_file(&ctx, &file).await.unwrap().is_none());

        std::fs::write(&file, r#"{ "recipe": { "unknown": [{ "size": "sm" }] } }"#).unwrap();
        assert!(host.extract_file(&ctx, &file).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn extract_reports_bad_json() {
        let (dir, config) = project();
        let host = ProjectHost::new();
        let ctx = host.load_context(&config).await.unwrap();
        let file = dir.path().join("src/app.json");
        std::fs::write(&file, "{ not json").unwrap();
        let err = host.extract_file(&ctx, &file).await.unwrap_err();
        assert!(matches!(err, ExtractError::Parse { .. }));
    }

    #[tokio::test]
    async fn css_orders_layers() {
        let (_dir, config) = project();
        let ctx = load(&config).await;
        let css = ctx.css(&[
            "@layer utilities { .a { x: 1; } }".to_string(),
            "@layer recipes { .b { x: 1; } }".to_string(),
        ]);
        assert!(css.starts_with("@layer reset, base, tokens, recipes, utilities;\n@layer recipes"));
    }

    #[tokio::test]
    async fn layer_rule_must_name_every_layer() {
        let (_dir, config) = project();
        let ctx = load(&config).await;
        assert!(ctx.is_valid_layer_rule("reset, base, tokens, recipes, utilities"));
        assert!(ctx.is_valid_layer_rule("utilities,recipes,tokens,base,reset"));
        assert!(!ctx.is_valid_layer_rule("reset, base"));
    }

    #[tokio::test]
    async fn hooks_receive_events() {
        let (_dir, config) = project();
        let ctx = load(&config).await;
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        ctx.on_hook(move |event| sink.lock().unwrap().push(event.clone()));

        let event = HookEvent::ConfigChange {
            config_path: config.clone(),
            changed: vec![config.clone()],
        };
        ctx.call_hook(event.clone());
        assert_eq!(*seen.lock().unwrap(), vec![event]);
    }

    #[tokio::test]
    async fn emit_writes_artifacts() {
        let (dir, config) = project();
        let host = ProjectHost::new();
        let ctx = host.load_context(&config).await.unwrap();
        host.emit_artifacts(&ctx).await.unwrap();

        let outdir = dir.path().join("styled-system");
        let recipes: Value =
            serde_json::from_str(&std::fs::read_to_string(outdir.join("recipes.json")).unwrap())
                .unwrap();
        assert_eq!(recipes["recipes"]["button"]["className"], "button");
        assert_eq!(recipes["recipes"]["button"]["variants"]["size"], json!(["sm"]));

        let conditions: Value =
            serde_json::from_str(&std::fs::read_to_string(outdir.join("conditions.json")).unwrap())
                .unwrap();
        assert_eq!(conditions["breakpoints"]["md"], "48em");

        let patterns: Value =
            serde_json::from_str(&std::fs::read_to_string(outdir.join("patterns.json")).unwrap())
                .unwrap();
        assert_eq!(patterns["patterns"]["stack"]["jsx"], "Stack");
    }

    #[tokio::test]
    async fn invalid_glob_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("tessera.toml");
        std::fs::write(&config, "[project]\nname = \"x\"\ninclude = [\"src/[\"]\n").unwrap();
        let err = ProjectHost::new().load_context(&config).await.unwrap_err();
        assert!(matches!(
            err,
            BuildError::Config(ConfigError::ValidationError(_))
        ));
    }
}
