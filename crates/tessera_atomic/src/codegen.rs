//! CSS generation from a hash factory's registries.
//!
//! Values are written verbatim; resolving tokens to concrete CSS values is
//! left to the consumer of the generated text.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use tessera_common::{ContentHash, InternalError, TesseraResult};
use tessera_config::StyleObject;
use tracing::trace;

use crate::condition::{ConditionKind, BASE_CONDITION};
use crate::context::CollectorContext;
use crate::entry::{value_text, StyleEntry};
use crate::factory::HashFactory;
use crate::normalize::normalize_style_object;
use crate::traverse::walk_style;

/// A class with declarations under a list of conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Rule {
    class: String,
    conds: Vec<String>,
    declarations: Vec<(String, String)>,
}

/// Rules grouped by cascade layer.
#[derive(Debug, Default)]
struct Sheet {
    layers: BTreeMap<String, Vec<Rule>>,
}

impl Sheet {
    fn push(&mut self, layer: &str, rule: Rule) {
        self.layers.entry(layer.to_string()).or_default().push(rule);
    }
}

/// Renders every registry of `factory` as layered CSS.
pub fn generate_css(factory: &HashFactory) -> TesseraResult<String> {
    let ctx = factory.context();
    let registries = factory.registries();
    let mut sheet = Sheet::default();

    for hash in &registries.atomic {
        let entry = decode(hash)?;
        let layer = entry.layer.as_deref().unwrap_or(&ctx.layers.utilities);
        let rule = Rule {
            class: format!(
                "{}{}_{}",
                condition_prefix(ctx, &entry.cond),
                entry.prop,
                entry.value_text()
            ),
            conds: split_conds(ctx, &entry.cond),
            declarations: vec![(ctx.utilities.css_property(&entry.prop), entry.value_text())],
        };
        sheet.push(layer, rule);
    }

    for (name, hashes) in &registries.recipes_base {
        let Some(recipe) = ctx.recipes.recipe(name) else {
            continue;
        };
        let class = recipe.class_name_or(name).to_string();
        for rule in base_rules(ctx, &class, hashes)? {
            sheet.push(&ctx.layers.recipes, rule);
        }
    }

    for (key, hashes) in &registries.recipes_slots_base {
        let Some((name, slot)) = key.split_once(':') else {
            continue;
        };
        let Some(recipe) = ctx.recipes.slot_recipe(name) else {
            continue;
        };
        let class = format!("{}__{slot}", recipe.class_name_or(name));
        for rule in base_rules(ctx, &class, hashes)? {
            sheet.push(&ctx.layers.recipes, rule);
        }
    }

    for (name, hashes) in &registries.recipes {
        let Some(recipe) = ctx.recipes.recipe(name) else {
            continue;
        };
        for hash in hashes {
            let selection = decode(hash)?;
            let styles = recipe
                .variants
                .get(&selection.prop)
                .and_then(|values| values.get(&selection.value_text()));
            let Some(styles) = styles else {
                trace!(recipe = %name, axis = %selection.prop, "selection has no styles");
                continue;
            };
            let class = variant_class(ctx, recipe.class_name_or(name), &selection);
            for rule in style_rules(ctx, &class, &selection.cond, styles) {
                sheet.push(&ctx.layers.recipes, rule);
            }
        }
    }

    for (key, hashes) in &registries.recipes_slots {
        let Some((name, slot)) = key.split_once(':') else {
            continue;
        };
        let Some(recipe) = ctx.recipes.slot_recipe(name) else {
            continue;
        };
        let slot_class = format!("{}__{slot}", recipe.class_name_or(name));
        for hash in hashes {
            let selection = decode(hash)?;
            let styles = recipe
                .variants
                .get(&selection.prop)
                .and_then(|values| values.get(&selection.value_text()))
                .and_then(|slots| slots.get(slot));
            let Some(styles) = styles else {
                continue;
            };
            let class = variant_class(ctx, &slot_class, &selection);
            for rule in style_rules(ctx, &class, &selection.cond, styles) {
                sheet.push(&ctx.layers.recipes, rule);
            }
        }
    }

    Ok(render(ctx, sheet))
}

fn decode(hash: &str) -> TesseraResult<StyleEntry> {
    StyleEntry::from_hash(hash)
        .ok_or_else(|| InternalError::new(format!("undecodable style entry: {hash}")))
}

/// `.{class}` rules for base entries, one per condition.
fn base_rules(
    ctx: &CollectorContext,
    class: &str,
    hashes: &BTreeSet<String>,
) -> TesseraResult<Vec<Rule>> {
    let mut grouped: BTreeMap<String, Vec<(String, String)>> = BTreeMap::new();
    for hash in hashes {
        let entry = decode(hash)?;
        grouped
            .entry(entry.cond.clone())
            .or_default()
            .push((ctx.utilities.css_property(&entry.prop), entry.value_text()));
    }
    Ok(grouped
        .into_iter()
        .map(|(cond, declarations)| Rule {
            class: class.to_string(),
            conds: split_conds(ctx, &cond),
            declarations,
        })
        .collect())
}

/// Rules for a variant's style object, nested under the selection's condition.
fn style_rules(
    ctx: &CollectorContext,
    class: &str,
    outer: &str,
    styles: &StyleObject,
) -> Vec<Rule> {
    let normalized = normalize_style_object(styles, &ctx.conditions, Some(&ctx.utilities));
    let mut grouped: BTreeMap<String, Vec<(String, String)>> = BTreeMap::new();
    walk_style(&normalized, &ctx.conditions, &ctx.separator, &mut |leaf| {
        let cond = match (outer.is_empty(), leaf.cond.is_empty()) {
            (true, _) => leaf.cond,
            (false, true) => outer.to_string(),
            (false, false) => format!("{outer}{}{}", ctx.separator, leaf.cond),
        };
        grouped
            .entry(cond)
            .or_default()
            .push((ctx.utilities.css_property(&leaf.prop), value_text(&leaf.value)));
    });
    grouped
        .into_iter()
        .map(|(cond, declarations)| Rule {
            class: class.to_string(),
            conds: split_conds(ctx, &cond),
            declarations,
        })
        .collect()
}

fn variant_class(ctx: &CollectorContext, class: &str, selection: &StyleEntry) -> String {
    format!(
        "{}{class}--{}_{}",
        condition_prefix(ctx, &selection.cond),
        selection.prop,
        selection.value_text()
    )
}

fn split_conds(ctx: &CollectorContext, cond: &str) -> Vec<String> {
    cond.split(ctx.separator.as_str())
        .filter(|segment| !segment.is_empty() && *segment != BASE_CONDITION)
        .map(str::to_string)
        .collect()
}

/// Class-name prefix naming the conditions of an entry, e.g. `hover:sm:`.
fn condition_prefix(ctx: &CollectorContext, cond: &str) -> String {
    split_conds(ctx, cond)
        .iter()
        .map(|segment| {
            let label = match segment.strip_prefix('_') {
                Some(name) => name.to_string(),
                None if segment.starts_with('@') || segment.contains('&') => {
                    ContentHash::from_text(segment).short()
                }
                None => segment.clone(),
            };
            format!("{label}:")
        })
        .collect()
}

/// Escapes a class name for use in a selector.
pub fn escape_class(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 8);
    for (index, c) in name.chars().enumerate() {
        if index == 0 && c.is_ascii_digit() {
            let _ = write!(out, "\\{:x} ", u32::from(c));
        } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}

struct Rendered {
    order: (usize, usize, String),
    text: String,
}

fn render_rule(ctx: &CollectorContext, rule: &Rule) -> Option<Rendered> {
    let mut selector = format!(".{}", escape_class(&rule.class));
    let mut at_rules = Vec::new();
    let mut breakpoint = 0;
    for cond in &rule.conds {
        let Some(kind) = ctx.conditions.kind(cond) else {
            trace!(
                condition = %cond,
                class = %rule.class,
                "unknown condition, skipping rule"
            );
            return None;
        };
        if let Some(rank) = ctx.conditions.breakpoint_rank(cond) {
            breakpoint = breakpoint.max(rank + 1);
        }
        match kind {
            ConditionKind::Selector(template) => selector = template.replace('&', &selector),
            ConditionKind::AtRule(at_rule) => at_rules.push(at_rule),
        }
    }

    let mut text = String::new();
    write_block(&mut text, &at_rules, &selector, &rule.declarations, 1);
    Some(Rendered {
        order: (breakpoint, rule.conds.len(), rule.class.clone()),
        text,
    })
}

fn write_block(
    out: &mut String,
    at_rules: &[String],
    selector: &str,
    declarations: &[(String, String)],
    depth: usize,
) {
    let pad = "  ".repeat(depth);
    if let Some((at_rule, rest)) = at_rules.split_first() {
        let _ = writeln!(out, "{pad}{at_rule} {{");
        write_block(out, rest, selector, declarations, depth + 1);
        let _ = writeln!(out, "{pad}}}");
        return;
    }
    let _ = writeln!(out, "{pad}{selector} {{");
    for (property, value) in declarations {
        let _ = writeln!(out, "{pad}  {property}: {value};");
    }
    let _ = writeln!(out, "{pad}}}");
}

fn render(ctx: &CollectorContext, sheet: Sheet) -> String {
    let mut layers: Vec<(String, Vec<Rule>)> = sheet.layers.into_iter().collect();
    layers.sort_by_key(|(name, _)| {
        ctx.layers
            .ordered()
            .iter()
            .position(|layer| *layer == name.as_str())
            .unwrap_or(usize::MAX)
    });

    let mut out = String::new();
    for (name, rules) in layers {
        let mut rendered: Vec<Rendered> = rules
            .iter()
            .filter_map(|rule| render_rule(ctx, rule))
            .collect();
        if rendered.is_empty() {
            continue;
        }
        rendered.sort_by(|a, b| a.order.cmp(&b.order));
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(out, "@layer {name} {{");
        for rule in rendered {
            out.push_str(&rule.text);
        }
        out.push_str("}\n");
    }
    out
}
