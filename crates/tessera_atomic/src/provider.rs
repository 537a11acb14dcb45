//! Lookup seams for recipe and pattern definitions.
//!
//! The hash factory never owns recipe or pattern configuration; it asks a
//! provider by name and silently does nothing when the provider has no answer.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tessera_config::{PatternConfig, ProjectConfig, RecipeConfig, SlotRecipeConfig, StyleObject};

/// Supplies recipe definitions by name.
pub trait RecipeProvider: Send + Sync + fmt::Debug {
    /// Returns the plain recipe called `name`.
    fn recipe(&self, name: &str) -> Option<&RecipeConfig>;

    /// Returns the slot recipe called `name`.
    fn slot_recipe(&self, name: &str) -> Option<&SlotRecipeConfig>;
}

/// Recipe definitions taken from project configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigRecipes {
    /// Plain recipes by name.
    pub recipes: BTreeMap<String, RecipeConfig>,
    /// Slot recipes by name.
    pub slot_recipes: BTreeMap<String, SlotRecipeConfig>,
}

impl ConfigRecipes {
    /// Collects the recipes declared in `config`.
    pub fn from_config(config: &ProjectConfig) -> Self {
        Self {
            recipes: config.recipes.clone(),
            slot_recipes: config.slot_recipes.clone(),
        }
    }
}

impl RecipeProvider for ConfigRecipes {
    fn recipe(&self, name: &str) -> Option<&RecipeConfig> {
        self.recipes.get(name)
    }

    fn slot_recipe(&self, name: &str) -> Option<&SlotRecipeConfig> {
        self.slot_recipes.get(name)
    }
}

/// Whether a pattern was used through its function or its JSX component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// `stack({ ... })`
    Pattern,
    /// `<Stack ... />`
    JsxPattern,
}

/// Supplies pattern transforms by name.
pub trait PatternProvider: Send + Sync + fmt::Debug {
    /// Returns the pattern a JSX component name aliases.
    fn find_by_jsx(&self, jsx_name: &str) -> Option<&str>;

    /// Applies pattern `name` to `props`, producing style props.
    fn transform(&self, name: &str, props: &StyleObject) -> Option<StyleObject>;
}

/// A user-supplied pattern transform.
pub type TransformFn = dyn Fn(&StyleObject) -> StyleObject + Send + Sync;

#[derive(Clone)]
enum Transform {
    Declarative(PatternConfig),
    Custom(Arc<TransformFn>),
}

#[derive(Clone)]
struct Pattern {
    jsx: Option<String>,
    transform: Transform,
}

/// Pattern transforms keyed by name.
#[derive(Clone, Default)]
pub struct PatternRegistry {
    patterns: BTreeMap<String, Pattern>,
}

impl fmt::Debug for PatternRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.patterns.keys()).finish()
    }
}

impl PatternRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every `[patterns]` entry of `config` as a declarative pattern.
    pub fn from_config(config: &ProjectConfig) -> Self {
        let mut registry = Self::new();
        for (name, pattern) in &config.patterns {
            registry.register_config(name, pattern.clone());
        }
        registry
    }

    /// Registers a declarative pattern.
    pub fn register_config(&mut self, name: &str, config: PatternConfig) {
        self.patterns.insert(
            name.to_string(),
            Pattern {
                jsx: config.jsx.clone(),
                transform: Transform::Declarative(config),
            },
        );
    }

    /// Registers a pattern backed by a closure.
    pub fn register(
        &mut self,
        name: &str,
        jsx: Option<&str>,
        transform: impl Fn(&StyleObject) -> StyleObject + Send + Sync + 'static,
    ) {
        self.patterns.insert(
            name.to_string(),
            Pattern {
                jsx: jsx.map(str::to_string),
                transform: Transform::Custom(Arc::new(transform)),
            },
        );
    }

    /// Declarative configurations, for artifact generation.
    pub fn configs(&self) -> impl Iterator<Item = (&str, &PatternConfig)> {
        self.patterns.iter().filter_map(|(name, pattern)| match &pattern.transform {
            Transform::Declarative(config) => Some((name.as_str(), config)),
            Transform::Custom(_) => None,
        })
    }
}

impl PatternProvider for PatternRegistry {
    fn find_by_jsx(&self, jsx_name: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|(_, pattern)| pattern.jsx.as_deref() == Some(jsx_name))
            .map(|(name, _)| name.as_str())
    }

    fn transform(&self, name: &str, props: &StyleObject) -> Option<StyleObject> {
        let pattern = self.patterns.get(name)?;
        Some(match &pattern.transform {
            Transform::Declarative(config) => apply_declarative(config, props),
            Transform::Custom(transform) => transform(props),
        })
    }
}

/// Defaults first, then every prop: mapped props are renamed, the rest pass
/// through unchanged.
fn apply_declarative(config: &PatternConfig, props: &StyleObject) -> StyleObject {
    let mut styles = config.defaults.clone();
    for (key, value) in props {
        if value.is_null() {
            continue;
        }
        let target = config.properties.get(key).unwrap_or(key);
        styles.insert(target.clone(), value.clone());
    }
    styles
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn object(value: Value) -> StyleObject {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn stack() -> PatternConfig {
        PatternConfig {
            jsx: Some("Stack".to_string()),
            properties: [("direction".to_string(), "flexDirection".to_string())]
                .into_iter()
                .collect(),
            defaults: object(json!({ "display": "flex", "flexDirection": "column" })),
        }
    }

    #[test]
    fn declarative_transform() {
        let mut registry = PatternRegistry::new();
        registry.register_config("stack", stack());
        let out = registry
            .transform("stack", &object(json!({ "direction": "row", "gap": 4 })))
            .unwrap();
        assert_eq!(
            Value::Object(out),
            json!({ "display": "flex", "flexDirection": "row", "gap": 4 })
        );
    }

    #[test]
    fn closure_transform() {
        let mut registry = PatternRegistry::new();
        registry.register("center", None, |props| {
            let mut out = object(json!({ "display": "flex", "alignItems": "center" }));
            if let Some(inline) = props.get("inline") {
                if inline == &json!(true) {
                    out.insert("display".to_string(), json!("inline-flex"));
                }
            }
            out
        });
        let out = registry
            .transform("center", &object(json!({ "inline": true })))
            .unwrap();
        assert_eq!(out["display"], json!("inline-flex"));
        assert_eq!(registry.configs().count(), 0);
    }

    #[test]
    fn jsx_lookup() {
        let mut registry = PatternRegistry::new();
        registry.register_config("stack", stack());
        assert_eq!(registry.find_by_jsx("Stack"), Some("stack"));
        assert_eq!(registry.find_by_jsx("Grid"), None);
    }

    #[test]
    fn unknown_pattern() {
        assert!(PatternRegistry::new().transform("grid", &StyleObject::new()).is_none());
    }

    #[test]
    fn recipes_from_config() {
        let config = tessera_config::load_config_from_str(
            r#"
[project]
name = "demo"
include = ["src/**"]

[recipes.button.variants.size.sm]
fontSize = "12px"

[slot_recipes.card]
slots = ["root"]
"#,
        )
        .unwrap();
        let recipes = ConfigRecipes::from_config(&config);
        assert!(recipes.recipe("button").is_some());
        assert!(recipes.slot_recipe("card").is_some());
        assert!(recipes.recipe("card").is_none());
    }
}
