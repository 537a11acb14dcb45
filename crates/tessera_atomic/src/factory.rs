//! The hash factory: deduplicating registries of atomic and recipe styles.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde_json::Value;
use tessera_config::{RecipeConfig, SlotRecipeConfig, StyleObject, Syntax};
use tracing::trace;

use crate::context::CollectorContext;
use crate::entry::{EntryBase, StyleEntry};
use crate::normalize::normalize_style_object;
use crate::provider::PatternKind;
use crate::traverse::walk_style;

/// Key of the nested style object accepted by [`HashFactory::process_style_props`].
pub const CSS_KEY: &str = "css";

/// Content-addressed sets of entry hashes, one per output category.
///
/// Membership is the only record of what will be emitted: inserting a hash
/// that is already present changes nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashRegistries {
    /// Plain utility entries, including compound-variant overrides.
    pub atomic: BTreeSet<String>,
    /// Recipe name → variant selections in use.
    pub recipes: BTreeMap<String, BTreeSet<String>>,
    /// Recipe name → base style entries. Filled at most once per recipe.
    pub recipes_base: BTreeMap<String, BTreeSet<String>>,
    /// `recipe:slot` → variant selections in use for that slot.
    pub recipes_slots: BTreeMap<String, BTreeSet<String>>,
    /// `recipe:slot` → base style entries. Filled at most once per key.
    pub recipes_slots_base: BTreeMap<String, BTreeSet<String>>,
    /// Recipes whose compound variants were already atomized.
    pub compound_variants: BTreeSet<String>,
}

impl HashRegistries {
    /// Returns `true` if every registry is empty.
    pub fn is_empty(&self) -> bool {
        self.atomic.is_empty()
            && self.recipes.is_empty()
            && self.recipes_base.is_empty()
            && self.recipes_slots.is_empty()
            && self.recipes_slots_base.is_empty()
            && self.compound_variants.is_empty()
    }
}

/// Registry key of one slot of a slot recipe.
pub fn slot_key(recipe: &str, slot: &str) -> String {
    format!("{recipe}:{slot}")
}

/// Hashes every leaf of `styles` into `set`, tagging entries with `base`.
///
/// Shorthand keys are resolved only when `resolve_shorthands` is set; variant
/// selections are hashed without it since their keys are variant axes.
pub fn hash_style_object(
    ctx: &CollectorContext,
    set: &mut BTreeSet<String>,
    styles: &StyleObject,
    base: &EntryBase,
    resolve_shorthands: bool,
) {
    let utilities = resolve_shorthands.then_some(&ctx.utilities);
    let normalized = normalize_style_object(styles, &ctx.conditions, utilities);
    walk_style(&normalized, &ctx.conditions, &ctx.separator, &mut |leaf| {
        set.insert(StyleEntry::new(leaf.prop, leaf.value, leaf.cond, base).hash());
    });
}

/// Collects style usage into deduplicated registries.
#[derive(Debug, Clone)]
pub struct HashFactory {
    ctx: Arc<CollectorContext>,
    registries: HashRegistries,
}

impl HashFactory {
    /// Creates a factory with empty registries.
    pub fn new(ctx: Arc<CollectorContext>) -> Self {
        Self {
            ctx,
            registries: HashRegistries::default(),
        }
    }

    /// A fresh factory sharing this one's context but none of its registries.
    pub fn fork(&self) -> Self {
        Self::new(Arc::clone(&self.ctx))
    }

    /// The shared collector context.
    pub fn context(&self) -> &Arc<CollectorContext> {
        &self.ctx
    }

    /// The registries collected so far.
    pub fn registries(&self) -> &HashRegistries {
        &self.registries
    }

    /// Returns `true` if nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.registries.is_empty()
    }

    /// Atomizes the style props of a `css()` call or JSX element.
    ///
    /// Unknown props are dropped unless the project uses template-literal
    /// syntax. A nested `css` object (or array of objects) is atomized first.
    pub fn process_style_props(&mut self, props: &StyleObject) {
        let mut styles = StyleObject::new();
        let mut nested = None;
        for (key, value) in props {
            if value.is_null() {
                continue;
            }
            if key == CSS_KEY {
                nested = Some(value);
                continue;
            }
            if self.ctx.syntax == Syntax::ObjectLiteral && !self.is_style_key(key) {
                continue;
            }
            styles.insert(key.clone(), value.clone());
        }

        match nested {
            Some(Value::Object(css)) => self.process_atomic(css),
            Some(Value::Array(items)) => {
                for item in items {
                    if let Value::Object(css) = item {
                        self.process_atomic(css);
                    }
                }
            }
            _ => {}
        }
        self.process_atomic(&styles);
    }

    /// Atomizes `styles` into the atomic registry.
    pub fn process_atomic(&mut self, styles: &StyleObject) {
        hash_style_object(
            &self.ctx,
            &mut self.registries.atomic,
            styles,
            &EntryBase::default(),
            true,
        );
    }

    /// Records a use of recipe `name` with the given variant selection.
    ///
    /// Defaults are overlaid by the selection and only declared variant axes
    /// are kept. The recipe base and its compound variants are atomized the
    /// first time the recipe is seen. Unknown recipes are ignored.
    pub fn process_recipe(&mut self, name: &str, selection: &StyleObject) {
        let ctx = Arc::clone(&self.ctx);
        let Some(recipe) = ctx.recipes.recipe(name) else {
            trace!(recipe = name, "unknown recipe, skipping");
            return;
        };
        let base = EntryBase::recipe(name);

        let merged = merge_selection(&recipe.default_variants, selection, |axis| {
            recipe.variants.contains_key(axis)
        });
        let set = self.registries.recipes.entry(name.to_string()).or_default();
        hash_style_object(&ctx, set, &merged, &base, false);

        if let Some(styles) = &recipe.base {
            if !self.registries.recipes_base.contains_key(name) {
                let set = self.registries.recipes_base.entry(name.to_string()).or_default();
                hash_style_object(&ctx, set, styles, &base, true);
            }
        }

        if !recipe.compound_variants.is_empty()
            && self.registries.compound_variants.insert(name.to_string())
        {
            for compound in &recipe.compound_variants {
                self.process_atomic(&compound.css);
            }
        }
    }

    /// Records a use of slot recipe `name` with the given variant selection.
    ///
    /// Every declared slot gets its own `recipe:slot` entries, so slots never
    /// share a hash. Unknown slot recipes are ignored.
    pub fn process_slot_recipe(&mut self, name: &str, selection: &StyleObject) {
        let ctx = Arc::clone(&self.ctx);
        let Some(recipe) = ctx.recipes.slot_recipe(name) else {
            trace!(recipe = name, "unknown slot recipe, skipping");
            return;
        };

        let merged = merge_selection(&recipe.default_variants, selection, |axis| {
            recipe.variants.contains_key(axis)
        });
        for slot in &recipe.slots {
            let key = slot_key(name, slot);
            let base = EntryBase::slot(name, slot);

            let set = self.registries.recipes_slots.entry(key.clone()).or_default();
            hash_style_object(&ctx, set, &merged, &base, false);

            if let Some(styles) = recipe.base.get(slot) {
                if !self.registries.recipes_slots_base.contains_key(&key) {
                    let set = self.registries.recipes_slots_base.entry(key).or_default();
                    hash_style_object(&ctx, set, styles, &base, true);
                }
            }
        }

        if !recipe.compound_variants.is_empty()
            && self.registries.compound_variants.insert(name.to_string())
        {
            for compound in &recipe.compound_variants {
                for styles in compound.css.values() {
                    self.process_atomic(styles);
                }
            }
        }
    }

    /// Expands a pattern into style props and atomizes them.
    ///
    /// JSX usages are resolved through the component name first and fall back
    /// to `name`. Unknown patterns are ignored.
    pub fn process_pattern(
        &mut self,
        name: &str,
        props: &StyleObject,
        kind: PatternKind,
        jsx_name: Option<&str>,
    ) {
        let ctx = Arc::clone(&self.ctx);
        let resolved = match kind {
            PatternKind::Pattern => name,
            PatternKind::JsxPattern => jsx_name
                .and_then(|jsx| ctx.patterns.find_by_jsx(jsx))
                .unwrap_or(name),
        };
        let Some(styles) = ctx.patterns.transform(resolved, props) else {
            trace!(pattern = resolved, "unknown pattern, skipping");
            return;
        };
        self.process_style_props(&styles);
    }

    /// Atomizes every style an inline recipe can produce, whatever variants
    /// are selected at runtime.
    pub fn process_atomic_recipe(&mut self, recipe: &RecipeConfig) {
        if let Some(base) = &recipe.base {
            self.process_atomic(base);
        }
        for values in recipe.variants.values() {
            for styles in values.values() {
                self.process_atomic(styles);
            }
        }
        for compound in &recipe.compound_variants {
            self.process_atomic(&compound.css);
        }
    }

    /// Slot-recipe counterpart of [`process_atomic_recipe`](Self::process_atomic_recipe).
    pub fn process_atomic_slot_recipe(&mut self, recipe: &SlotRecipeConfig) {
        for styles in recipe.base.values() {
            self.process_atomic(styles);
        }
        for values in recipe.variants.values() {
            for slots in values.values() {
                for styles in slots.values() {
                    self.process_atomic(styles);
                }
            }
        }
        for compound in &recipe.compound_variants {
            for styles in compound.css.values() {
                self.process_atomic(styles);
            }
        }
    }

    fn is_style_key(&self, key: &str) -> bool {
        self.ctx.utilities.is_style_prop(key) || self.ctx.is_condition(key)
    }
}

/// Default variants overlaid with `selection`, restricted to declared axes.
fn merge_selection(
    defaults: &BTreeMap<String, Value>,
    selection: &StyleObject,
    declared: impl Fn(&str) -> bool,
) -> StyleObject {
    let mut merged: StyleObject = defaults
        .iter()
        .filter(|(axis, _)| declared(axis.as_str()))
        .map(|(axis, value)| (axis.clone(), value.clone()))
        .collect();
    for (axis, value) in selection {
        if declared(axis.as_str()) && !value.is_null() {
            merged.insert(axis.clone(), value.clone());
        }
    }
    merged
}
