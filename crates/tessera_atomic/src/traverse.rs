//! Depth-first walk over a normalized style object.
//!
//! Every key is classified into one of four [`Visit`] cases. The walk threads
//! an immutable [`WalkState`] through the recursion; each case derives the
//! next state with a pure transition, so leaving a scope is simply returning
//! to the caller's state.

use serde_json::Value;
use tessera_config::StyleObject;
use tracing::trace;

use crate::condition::{resolve_condition, Conditions};

/// How a key of a style object is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// A condition whose value is an object: descend with the condition active.
    ConditionScope,
    /// A condition whose value is a leaf: emit for the active property.
    ConditionLeaf,
    /// A property whose value is an object: descend with the property active.
    PropertyScope,
    /// A property whose value is a leaf: emit directly.
    PropertyLeaf,
}

/// Classifies `key` given its value.
pub fn classify(key: &str, value: &Value, is_condition: impl Fn(&str) -> bool) -> Visit {
    match (is_condition(key), value.is_object()) {
        (true, true) => Visit::ConditionScope,
        (true, false) => Visit::ConditionLeaf,
        (false, true) => Visit::PropertyScope,
        (false, false) => Visit::PropertyLeaf,
    }
}

/// Traversal state carried from a scope into its children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkState {
    /// The property leaves below this point belong to.
    pub prop: Option<String>,
    /// Condition keys entered so far, outermost first.
    pub cond_path: Vec<String>,
    /// Number of scopes entered.
    pub depth: usize,
    /// Whether any condition scope is active.
    pub in_condition: bool,
}

impl WalkState {
    /// State inside the object value of condition `key`.
    pub fn enter_condition(&self, key: &str) -> Self {
        let mut cond_path = self.cond_path.clone();
        cond_path.push(key.to_string());
        Self {
            prop: self.prop.clone(),
            cond_path,
            depth: self.depth + 1,
            in_condition: true,
        }
    }

    /// State inside the object value of property `key`.
    pub fn enter_property(&self, key: &str) -> Self {
        Self {
            prop: Some(key.to_string()),
            cond_path: self.cond_path.clone(),
            depth: self.depth + 1,
            in_condition: self.in_condition,
        }
    }

    /// Full traversal path for a leaf of `prop`, optionally under one more
    /// condition key.
    pub fn leaf_path(&self, prop: &str, leaf_condition: Option<&str>, separator: &str) -> String {
        std::iter::once(prop)
            .chain(self.cond_path.iter().map(String::as_str))
            .chain(leaf_condition)
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// One emitted leaf: a property, its value and its resolved condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    /// Property the value belongs to.
    pub prop: String,
    /// The leaf value.
    pub value: Value,
    /// Canonical condition identifier; empty for none.
    pub cond: String,
}

/// Walks `styles`, calling `emit` once per leaf value.
///
/// `styles` must already be normalized: arrays turned into responsive objects
/// and nulls removed.
pub fn walk_style(
    styles: &StyleObject,
    conditions: &Conditions,
    separator: &str,
    emit: &mut dyn FnMut(Leaf),
) {
    walk(styles, &WalkState::default(), conditions, separator, emit);
}

fn walk(
    styles: &StyleObject,
    state: &WalkState,
    conditions: &Conditions,
    separator: &str,
    emit: &mut dyn FnMut(Leaf),
) {
    let is_condition = |key: &str| conditions.is_condition(key);
    for (key, value) in styles {
        match classify(key, value, is_condition) {
            Visit::ConditionScope | Visit::PropertyScope => {
                let Value::Object(nested) = value else {
                    continue;
                };
                let next = if is_condition(key) {
                    state.enter_condition(key)
                } else {
                    state.enter_property(key)
                };
                walk(nested, &next, conditions, separator, emit);
            }
            Visit::ConditionLeaf => {
                let Some(prop) = &state.prop else {
                    trace!(
                        condition = %key,
                        depth = state.depth,
                        "condition leaf without a property, skipping"
                    );
                    continue;
                };
                let path = state.leaf_path(prop, Some(key), separator);
                emit(Leaf {
                    prop: prop.clone(),
                    value: value.clone(),
                    cond: resolve_condition(&path, prop, separator, is_condition),
                });
            }
            Visit::PropertyLeaf => {
                let path = state.leaf_path(key, None, separator);
                emit(Leaf {
                    prop: key.clone(),
                    value: value.clone(),
                    cond: resolve_condition(&path, key, separator, is_condition),
                });
            }
        }
    }
}
