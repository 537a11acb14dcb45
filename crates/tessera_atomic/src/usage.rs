//! Style usage found in one source file, and how it reaches the registries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tessera_config::{RecipeConfig, SlotRecipeConfig, StyleObject};

use crate::factory::HashFactory;
use crate::provider::PatternKind;

/// Every style call a parser found in one file.
///
/// This is the interchange format between a source parser and the hash
/// factory; the default project host reads it from JSON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractResult {
    /// Arguments of `css()` calls.
    pub css: Vec<StyleObject>,
    /// Style props passed to JSX style factories.
    pub jsx: Vec<StyleObject>,
    /// Inline recipe definitions (`cva`).
    pub cva: Vec<RecipeConfig>,
    /// Inline slot recipe definitions (`sva`).
    pub sva: Vec<SlotRecipeConfig>,
    /// Recipe name → variant selections it was called with.
    pub recipe: BTreeMap<String, Vec<StyleObject>>,
    /// Pattern name → its usages.
    pub pattern: BTreeMap<String, Vec<PatternUsage>>,
}

/// One use of a pattern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternUsage {
    /// Props passed to the pattern.
    #[serde(default)]
    pub data: StyleObject,
    /// JSX component name when used as an element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsx: Option<String>,
}

impl ExtractResult {
    /// Returns `true` if the file contained no style usage.
    pub fn is_empty(&self) -> bool {
        self.css.is_empty()
            && self.jsx.is_empty()
            && self.cva.is_empty()
            && self.sva.is_empty()
            && self.recipe.is_empty()
            && self.pattern.is_empty()
    }
}

impl HashFactory {
    /// Feeds every usage in `result` to the matching processing entry point.
    pub fn collect(&mut self, result: &ExtractResult) {
        for props in result.css.iter().chain(&result.jsx) {
            self.process_style_props(props);
        }
        for recipe in &result.cva {
            self.process_atomic_recipe(recipe);
        }
        for recipe in &result.sva {
            self.process_atomic_slot_recipe(recipe);
        }
        for (name, selections) in &result.recipe {
            let is_slot_recipe = self.context().recipes.slot_recipe(name).is_some();
            for selection in selections {
                if is_slot_recipe {
                    self.process_slot_recipe(name, selection);
                } else {
                    self.process_recipe(name, selection);
                }
            }
        }
        for (name, usages) in &result.pattern {
            for usage in usages {
                let kind = if usage.jsx.is_some() {
                    PatternKind::JsxPattern
                } else {
                    PatternKind::Pattern
                };
                self.process_pattern(name, &usage.data, kind, usage.jsx.as_deref());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CollectorContext;
    use crate::entry::{EntryBase, StyleEntry};
    use serde_json::json;
    use std::sync::Arc;

    const PROJECT: &str = r#"
[project]
name = "demo"
include = ["src/**"]

[recipes.button.variants.size.sm]
fontSize = "12px"

[slot_recipes.card]
slots = ["root"]

[slot_recipes.card.variants.size.sm.root]
padding = "2px"

[patterns.stack]
jsx = "Stack"
defaults = { display = "flex" }
"#;

    fn factory() -> HashFactory {
        let config = tessera_config::load_config_from_str(PROJECT).unwrap();
        HashFactory::new(Arc::new(CollectorContext::from_config(&config)))
    }

    #[test]
    fn parses_sparse_json() {
        let result: ExtractResult =
            serde_json::from_str(r#"{ "css": [{ "color": "red" }] }"#).unwrap();
        assert_eq!(result.css.len(), 1);
        assert!(result.recipe.is_empty());
        assert!(!result.is_empty());
        assert!(ExtractResult::default().is_empty());
    }

    #[test]
    fn collect_routes_every_kind() {
        let result: ExtractResult = serde_json::from_value(json!({
            "css": [{ "color": "red" }],
            "jsx": [{ "margin": 2, "onClick": "x" }],
            "cva": [{ "base": { "opacity": 0.5 } }],
            "recipe": {
                "button": [{ "size": "sm" }],
                "card": [{ "size": "sm" }],
                "missing": [{}]
            },
            "pattern": {
                "stack": [{ "data": { "gap": 4 } }, { "data": {}, "jsx": "Stack" }]
            }
        }))
        .unwrap();

        let mut f = factory();
        f.collect(&result);
        let r = f.registries();

        let plain =
            |prop: &str, value| StyleEntry::new(prop, value, "", &EntryBase::default()).hash();
        assert!(r.atomic.contains(&plain("color", json!("red"))));
        assert!(r.atomic.contains(&plain("margin", json!(2))));
        assert!(r.atomic.contains(&plain("opacity", json!(0.5))));
        assert!(r.atomic.contains(&plain("display", json!("flex"))));
        assert!(r.atomic.contains(&plain("gap", json!(4))));
        assert_eq!(r.atomic.len(), 5);

        assert_eq!(r.recipes.keys().collect::<Vec<_>>(), vec!["button"]);
        assert_eq!(r.recipes_slots.keys().collect::<Vec<_>>(), vec!["card:root"]);
    }
}
