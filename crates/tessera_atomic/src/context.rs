//! Read-only state shared by a hash factory and all of its forks.

use std::sync::Arc;

use tessera_config::{LayerNames, ProjectConfig, Syntax};

use crate::condition::{Conditions, CONDITION_SEPARATOR};
use crate::provider::{ConfigRecipes, PatternProvider, PatternRegistry, RecipeProvider};
use crate::utility::Utilities;

/// Everything the hash factory needs to know about a project.
#[derive(Debug, Clone)]
pub struct CollectorContext {
    /// Known conditions and breakpoints.
    pub conditions: Conditions,
    /// Known style properties and shorthands.
    pub utilities: Utilities,
    /// Recipe definitions.
    pub recipes: Arc<dyn RecipeProvider>,
    /// Pattern transforms.
    pub patterns: Arc<dyn PatternProvider>,
    /// Style-call syntax; template literals arrive pre-filtered.
    pub syntax: Syntax,
    /// Separator between condition path segments.
    pub separator: String,
    /// Cascade layer names.
    pub layers: LayerNames,
}

impl Default for CollectorContext {
    fn default() -> Self {
        Self {
            conditions: Conditions::default(),
            utilities: Utilities::default(),
            recipes: Arc::new(ConfigRecipes::default()),
            patterns: Arc::new(PatternRegistry::default()),
            syntax: Syntax::default(),
            separator: CONDITION_SEPARATOR.to_string(),
            layers: LayerNames::default(),
        }
    }
}

impl CollectorContext {
    /// Builds the context described by a project configuration.
    pub fn from_config(config: &ProjectConfig) -> Self {
        Self {
            conditions: Conditions::from_config(config),
            utilities: Utilities::new(config.utilities.clone()),
            recipes: Arc::new(ConfigRecipes::from_config(config)),
            patterns: Arc::new(PatternRegistry::from_config(config)),
            syntax: config.project.syntax,
            separator: CONDITION_SEPARATOR.to_string(),
            layers: config.layers.clone(),
        }
    }

    /// Replaces the recipe provider.
    pub fn with_recipes(mut self, recipes: impl RecipeProvider + 'static) -> Self {
        self.recipes = Arc::new(recipes);
        self
    }

    /// Replaces the pattern provider.
    pub fn with_patterns(mut self, patterns: impl PatternProvider + 'static) -> Self {
        self.patterns = Arc::new(patterns);
        self
    }

    /// Returns `true` if `key` denotes a condition.
    pub fn is_condition(&self, key: &str) -> bool {
        self.conditions.is_condition(key)
    }
}
