//! Config cache: one loaded build context per configuration file.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::content::ContextId;
use crate::stamp::Stamps;

/// A loaded context plus what it was loaded from.
#[derive(Debug)]
pub struct ConfigData<C> {
    /// Identity of the context, also the key of its content entry.
    pub id: ContextId,
    /// The loaded context.
    pub context: Arc<C>,
    /// Every file the configuration was assembled from.
    pub deps: BTreeSet<PathBuf>,
    /// Modification times of `deps` at load time.
    pub deps_modified: Stamps,
}

impl<C> ConfigData<C> {
    /// Creates an entry with a freshly allocated [`ContextId`].
    pub fn new(context: Arc<C>, deps: BTreeSet<PathBuf>, deps_modified: Stamps) -> Self {
        Self {
            id: ContextId::next(),
            context,
            deps,
            deps_modified,
        }
    }
}

// Manual impl so `C` does not need to be `Clone`.
impl<C> Clone for ConfigData<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            context: Arc::clone(&self.context),
            deps: self.deps.clone(),
            deps_modified: self.deps_modified.clone(),
        }
    }
}

/// Loaded contexts keyed by configuration path.
#[derive(Debug)]
pub struct ConfigCache<C> {
    entries: HashMap<PathBuf, ConfigData<C>>,
}

impl<C> Default for ConfigCache<C> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<C> ConfigCache<C> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `config_path`.
    pub fn get(&self, config_path: &Path) -> Option<&ConfigData<C>> {
        self.entries.get(config_path)
    }

    /// Stores `data`, returning the entry it replaced.
    pub fn insert(&mut self, config_path: PathBuf, data: ConfigData<C>) -> Option<ConfigData<C>> {
        self.entries.insert(config_path, data)
    }

    /// Removes and returns the entry for `config_path`.
    pub fn remove(&mut self, config_path: &Path) -> Option<ConfigData<C>> {
        self.entries.remove(config_path)
    }

    /// Returns the number of cached configurations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
