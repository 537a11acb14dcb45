//! Configuration file discovery, loading, preset resolution and validation.

use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use toml::Table;

use crate::error::ConfigError;
use crate::merge::merge_tables;
use crate::types::ProjectConfig;

/// File name looked up by [`find_config`].
pub const CONFIG_FILE: &str = "tessera.toml";

/// A configuration together with every file it was assembled from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Path of the root configuration file.
    pub path: PathBuf,
    /// The merged, validated configuration.
    pub config: ProjectConfig,
    /// The root file followed by every preset it pulled in, transitively.
    pub dependencies: Vec<PathBuf>,
}

/// Walks up from `start` looking for the nearest `tessera.toml`.
///
/// Returns the path of the configuration file, or `None` if no directory up
/// to the filesystem root contains one.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Loads, merges and validates the configuration at `path`.
pub fn load_config(path: &Path) -> Result<ProjectConfig, ConfigError> {
    Ok(ConfigLoader::new().load(path)?.config)
}

/// Parses and validates a configuration from a string.
///
/// Presets are not resolved since there is no file to resolve them against.
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let table: Table = content
        .parse()
        .map_err(|e: toml::de::Error| ConfigError::ParseError(e.to_string()))?;
    from_table(table)
}

/// Returns the configuration file and all presets it depends on.
pub fn config_dependencies(path: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    ConfigLoader::new().dependencies(path)
}

/// Loads configuration files, caching every parsed file by path.
///
/// The cache plays the role of a module-resolution cache: a rebuild that
/// reloads configuration must [`invalidate`](Self::invalidate) the files that
/// changed, otherwise the previously parsed contents are reused.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    tables: Mutex<HashMap<PathBuf, Table>>,
}

impl ConfigLoader {
    /// Creates a loader with an empty file cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the configuration at `path`, merging presets underneath it.
    pub fn load(&self, path: &Path) -> Result<LoadedConfig, ConfigError> {
        let path = normalize_path(path);
        let mut dependencies = Vec::new();
        let table = self.resolve(&path, &mut Vec::new(), &mut dependencies)?;
        let config = from_table(table)?;
        Ok(LoadedConfig {
            path,
            config,
            dependencies,
        })
    }

    /// Returns the configuration file at `path` and every preset it extends.
    pub fn dependencies(&self, path: &Path) -> Result<Vec<PathBuf>, ConfigError> {
        let mut dependencies = Vec::new();
        self.resolve(&normalize_path(path), &mut Vec::new(), &mut dependencies)?;
        Ok(dependencies)
    }

    /// Drops cached contents for `paths`. Returns how many entries were removed.
    pub fn invalidate(&self, paths: &[PathBuf]) -> usize {
        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        paths
            .iter()
            .filter(|path| tables.remove(&normalize_path(path)).is_some())
            .count()
    }

    /// Returns the number of files currently cached.
    pub fn cached_len(&self) -> usize {
        self.tables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn read_table(&self, path: &Path) -> Result<Table, ConfigError> {
        if let Some(table) = self
            .tables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
        {
            return Ok(table.clone());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table: Table = content
            .parse()
            .map_err(|e: toml::de::Error| ConfigError::ParseError(e.to_string()))?;

        self.tables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_path_buf(), table.clone());
        Ok(table)
    }

    fn resolve(
        &self,
        path: &Path,
        chain: &mut Vec<PathBuf>,
        dependencies: &mut Vec<PathBuf>,
    ) -> Result<Table, ConfigError> {
        if chain.iter().any(|p| p == path) {
            return Err(ConfigError::PresetCycle(path.to_path_buf()));
        }
        chain.push(path.to_path_buf());
        if !dependencies.iter().any(|p| p == path) {
            dependencies.push(path.to_path_buf());
        }

        let own = self.read_table(path)?;
        let mut merged = Table::new();
        for preset in preset_paths(&own, path) {
            let table = self.resolve(&preset, chain, dependencies)?;
            merge_tables(&mut merged, table);
        }
        merge_tables(&mut merged, own);

        chain.pop();
        Ok(merged)
    }
}

/// Lexically normalizes a path, removing `.` and resolving `..` components.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn preset_paths(table: &Table, path: &Path) -> Vec<PathBuf> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    table
        .get("project")
        .and_then(|project| project.get("presets"))
        .and_then(|presets| presets.as_array())
        .map(|presets| {
            presets
                .iter()
                .filter_map(|preset| preset.as_str())
                .map(|preset| normalize_path(&dir.join(preset)))
                .collect()
        })
        .unwrap_or_default()
}

fn from_table(table: Table) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig = toml::Value::Table(table)
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and definitions are consistent.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.project.include.is_empty() {
        return Err(ConfigError::MissingField("project.include".to_string()));
    }

    for (name, width) in &config.breakpoints {
        if width.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "breakpoint '{name}' has an empty width"
            )));
        }
    }

    let mut shorthands = HashSet::new();
    for (name, utility) in &config.utilities {
        for alias in &utility.shorthand {
            if !shorthands.insert(alias.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "shorthand '{alias}' of utility '{name}' is declared more than once"
                )));
            }
        }
    }

    for (name, recipe) in &config.slot_recipes {
        let slots: HashSet<&str> = recipe.slots.iter().map(String::as_str).collect();
        let base_slots = recipe.base.keys();
        let variant_slots = recipe
            .variants
            .values()
            .flat_map(|values| values.values())
            .flat_map(|styles| styles.keys());
        for slot in base_slots.chain(variant_slots) {
            if !slots.contains(slot.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "slot recipe '{name}' styles undeclared slot '{slot}'"
                )));
            }
        }
    }

    Ok(())
}
