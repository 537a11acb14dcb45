//! Configuration types deserialized from `tessera.toml`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A nested style object: property or condition keys mapping to values or
/// further style objects.
pub type StyleObject = serde_json::Map<String, Value>;

/// The top-level project configuration parsed from `tessera.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata (name, source globs, output directory).
    pub project: ProjectMeta,
    /// Named conditions without the leading underscore (`hover = "&:hover"`).
    #[serde(default)]
    pub conditions: BTreeMap<String, String>,
    /// Responsive breakpoints mapping a name to its minimum width.
    #[serde(default)]
    pub breakpoints: BTreeMap<String, String>,
    /// Utility definitions keyed by utility name.
    #[serde(default)]
    pub utilities: BTreeMap<String, UtilityConfig>,
    /// Recipe definitions keyed by recipe name.
    #[serde(default)]
    pub recipes: BTreeMap<String, RecipeConfig>,
    /// Slot recipe definitions keyed by recipe name.
    #[serde(default)]
    pub slot_recipes: BTreeMap<String, SlotRecipeConfig>,
    /// Declarative pattern definitions keyed by pattern name.
    #[serde(default)]
    pub patterns: BTreeMap<String, PatternConfig>,
    /// Cascade layer names.
    #[serde(default)]
    pub layers: LayerNames,
}

/// Core project metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// Glob patterns (relative to the config directory) of files to extract from.
    #[serde(default)]
    pub include: Vec<String>,
    /// Glob patterns excluded from `include`.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Directory generated artifacts are written to.
    #[serde(default = "default_outdir")]
    pub outdir: String,
    /// How style calls are written in source files.
    #[serde(default)]
    pub syntax: Syntax,
    /// Other configuration files merged underneath this one.
    #[serde(default)]
    pub presets: Vec<String>,
    /// Extra files the build depends on (tokens, themes, ...).
    #[serde(default)]
    pub dependencies: Vec<String>,
}

fn default_outdir() -> String {
    "styled-system".to_string()
}

/// The style-call syntax used by the project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Syntax {
    /// `css({ color: "red" })`; props are filtered against known properties.
    #[default]
    ObjectLiteral,
    /// ``css`color: red` ``; props arrive pre-filtered.
    TemplateLiteral,
}

/// A utility: a style property the project knows about.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UtilityConfig {
    /// The CSS property this utility writes. Defaults to the kebab-cased name.
    #[serde(default)]
    pub property: Option<String>,
    /// Aliases that normalize to this utility's name.
    #[serde(default)]
    pub shorthand: Vec<String>,
}

/// A named, parameterized bundle of style variants.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RecipeConfig {
    /// Class name used in generated CSS. Defaults to the recipe name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Styles applied regardless of variant selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<StyleObject>,
    /// Variant axis → variant value → styles.
    #[serde(default)]
    pub variants: BTreeMap<String, BTreeMap<String, StyleObject>>,
    /// Selection used when the caller does not choose a value for an axis.
    #[serde(default)]
    pub default_variants: BTreeMap<String, Value>,
    /// Overrides applied when a combination of variant values is active.
    #[serde(default)]
    pub compound_variants: Vec<CompoundVariant>,
}

/// A compound variant of a [`RecipeConfig`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CompoundVariant {
    /// The variant selection this override applies to.
    #[serde(flatten)]
    pub selection: BTreeMap<String, Value>,
    /// The override styles.
    #[serde(default)]
    pub css: StyleObject,
}

/// A recipe whose output spans several named sub-elements.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SlotRecipeConfig {
    /// Class name prefix used in generated CSS. Defaults to the recipe name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Slot names, in declaration order.
    #[serde(default)]
    pub slots: Vec<String>,
    /// Slot → base styles.
    #[serde(default)]
    pub base: BTreeMap<String, StyleObject>,
    /// Variant axis → variant value → slot → styles.
    #[serde(default)]
    pub variants: BTreeMap<String, BTreeMap<String, BTreeMap<String, StyleObject>>>,
    /// Selection used when the caller does not choose a value for an axis.
    #[serde(default)]
    pub default_variants: BTreeMap<String, Value>,
    /// Overrides applied when a combination of variant values is active.
    #[serde(default)]
    pub compound_variants: Vec<SlotCompoundVariant>,
}

/// A compound variant of a [`SlotRecipeConfig`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SlotCompoundVariant {
    /// The variant selection this override applies to.
    #[serde(flatten)]
    pub selection: BTreeMap<String, Value>,
    /// Slot → override styles.
    #[serde(default)]
    pub css: BTreeMap<String, StyleObject>,
}

/// A declarative layout pattern: maps pattern props onto style props.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PatternConfig {
    /// JSX component name that aliases this pattern (e.g. `Stack`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsx: Option<String>,
    /// Pattern prop → style prop it is written to.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    /// Styles always emitted by the pattern.
    #[serde(default)]
    pub defaults: StyleObject,
}

/// Cascade layer names used for generated CSS.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LayerNames {
    /// Layer for reset styles.
    pub reset: String,
    /// Layer for global base styles.
    pub base: String,
    /// Layer for design tokens.
    pub tokens: String,
    /// Layer for recipe styles.
    pub recipes: String,
    /// Layer for atomic utilities.
    pub utilities: String,
}

impl Default for LayerNames {
    fn default() -> Self {
        Self {
            reset: "reset".to_string(),
            base: "base".to_string(),
            tokens: "tokens".to_string(),
            recipes: "recipes".to_string(),
            utilities: "utilities".to_string(),
        }
    }
}

impl LayerNames {
    /// Returns the layer names in cascade order.
    pub fn ordered(&self) -> [&str; 5] {
        [
            &self.reset,
            &self.base,
            &self.tokens,
            &self.recipes,
            &self.utilities,
        ]
    }

    /// Returns `true` if `name` is one of the configured layers.
    pub fn contains(&self, name: &str) -> bool {
        self.ordered().contains(&name)
    }
}

impl RecipeConfig {
    /// Returns the class name, falling back to the recipe name.
    pub fn class_name_or<'a>(&'a self, name: &'a str) -> &'a str {
        self.class_name.as_deref().unwrap_or(name)
    }
}

impl SlotRecipeConfig {
    /// Returns the class name, falling back to the recipe name.
    pub fn class_name_or<'a>(&'a self, name: &'a str) -> &'a str {
        self.class_name.as_deref().unwrap_or(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_order() {
        let layers = LayerNames::default();
        assert_eq!(
            layers.ordered(),
            ["reset", "base", "tokens", "recipes", "utilities"]
        );
        assert!(layers.contains("recipes"));
        assert!(!layers.contains("components"));
    }

    #[test]
    fn recipe_class_name_fallback() {
        let recipe = RecipeConfig::default();
        assert_eq!(recipe.class_name_or("button"), "button");
        let named = RecipeConfig {
            class_name: Some("btn".to_string()),
            ..RecipeConfig::default()
        };
        assert_eq!(named.class_name_or("button"), "btn");
    }

    #[test]
    fn compound_variant_flattens_selection() {
        let json = r#"{ "size": "sm", "visual": "solid", "css": { "color": "red" } }"#;
        let cv: CompoundVariant = serde_json::from_str(json).unwrap();
        assert_eq!(cv.selection.len(), 2);
        assert_eq!(cv.selection["size"], Value::from("sm"));
        assert_eq!(cv.css["color"], Value::from("red"));
    }

    #[test]
    fn syntax_kebab_case() {
        let s: Syntax = serde_json::from_str(r#""template-literal""#).unwrap();
        assert_eq!(s, Syntax::TemplateLiteral);
        assert_eq!(Syntax::default(), Syntax::ObjectLiteral);
    }
}
