//! Style entries and their content-addressed hash keys.
//!
//! A [`StyleEntry`] is one resolved `(property, value)` pair under an optional
//! condition. Registries never store entries directly; they store the string
//! produced by [`StyleEntry::hash`], which is fully reversible through
//! [`StyleEntry::from_hash`] so code generation can recover the entry later.

use serde_json::Value;

/// Separator between the fields of an entry hash.
pub const HASH_SEPARATOR: &str = "]___[";

const RECIPE_TAG: &str = "recipe:";
const SLOT_TAG: &str = "slot:";
const LAYER_TAG: &str = "layer:";

/// Scope fields merged into every entry produced by one traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryBase {
    /// Recipe the entries belong to.
    pub recipe: Option<String>,
    /// Slot of a slot recipe the entries belong to.
    pub slot: Option<String>,
    /// Cascade layer override for the entries.
    pub layer: Option<String>,
}

impl EntryBase {
    /// Scope for entries of a plain recipe.
    pub fn recipe(name: &str) -> Self {
        Self {
            recipe: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Scope for entries of one slot of a slot recipe.
    pub fn slot(name: &str, slot: &str) -> Self {
        Self {
            recipe: Some(name.to_string()),
            slot: Some(slot.to_string()),
            ..Self::default()
        }
    }
}

/// One fully resolved property/value pair under a condition.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleEntry {
    /// Style property, as written (after shorthand resolution).
    pub prop: String,
    /// Raw value.
    pub value: Value,
    /// Canonical condition identifier; empty for "no condition".
    pub cond: String,
    /// Owning recipe, if any.
    pub recipe: Option<String>,
    /// Owning slot, if any.
    pub slot: Option<String>,
    /// Layer override, if any.
    pub layer: Option<String>,
}

impl StyleEntry {
    /// Builds an entry from a traversal leaf and the traversal's scope.
    pub fn new(
        prop: impl Into<String>,
        value: Value,
        cond: impl Into<String>,
        base: &EntryBase,
    ) -> Self {
        Self {
            prop: prop.into(),
            value,
            cond: cond.into(),
            recipe: base.recipe.clone(),
            slot: base.slot.clone(),
            layer: base.layer.clone(),
        }
    }

    /// Returns the content-addressed key of this entry.
    ///
    /// Entries with identical fields always produce identical keys. The value
    /// is encoded as compact JSON so `1` and `"1"` stay distinct.
    pub fn hash(&self) -> String {
        let mut parts = vec![self.prop.clone(), self.value.to_string(), self.cond.clone()];
        if let Some(recipe) = &self.recipe {
            parts.push(format!("{RECIPE_TAG}{recipe}"));
        }
        if let Some(slot) = &self.slot {
            parts.push(format!("{SLOT_TAG}{slot}"));
        }
        if let Some(layer) = &self.layer {
            parts.push(format!("{LAYER_TAG}{layer}"));
        }
        parts.join(HASH_SEPARATOR)
    }

    /// Decodes a key produced by [`hash`](Self::hash).
    ///
    /// Returns `None` for strings that were not produced by `hash`.
    pub fn from_hash(hash: &str) -> Option<Self> {
        let mut parts = hash.split(HASH_SEPARATOR);
        let prop = parts.next()?.to_string();
        let value = serde_json::from_str(parts.next()?).ok()?;
        let cond = parts.next()?.to_string();

        let mut entry = Self {
            prop,
            value,
            cond,
            recipe: None,
            slot: None,
            layer: None,
        };
        for part in parts {
            if let Some(recipe) = part.strip_prefix(RECIPE_TAG) {
                entry.recipe = Some(recipe.to_string());
            } else if let Some(slot) = part.strip_prefix(SLOT_TAG) {
                entry.slot = Some(slot.to_string());
            } else if let Some(layer) = part.strip_prefix(LAYER_TAG) {
                entry.layer = Some(layer.to_string());
            } else {
                return None;
            }
        }
        Some(entry)
    }

    /// Returns the value as it appears in CSS text and class names.
    pub fn value_text(&self) -> String {
        value_text(&self.value)
    }
}

/// Renders a leaf value as CSS text: strings verbatim, everything else as JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_entries_hash_identically() {
        let a = StyleEntry::new("color", json!("red"), "_hover", &EntryBase::default());
        let b = StyleEntry::new("color", json!("red"), "_hover", &EntryBase::default());
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn value_type_is_part_of_the_key() {
        let number = StyleEntry::new("p", json!(4), "", &EntryBase::default());
        let string = StyleEntry::new("p", json!("4"), "", &EntryBase::default());
        assert_ne!(number.hash(), string.hash());
    }

    #[test]
    fn slot_distinguishes_entries() {
        let root = StyleEntry::new("size", json!("sm"), "", &EntryBase::slot("card", "root"));
        let title = StyleEntry::new("size", json!("sm"), "", &EntryBase::slot("card", "title"));
        assert_ne!(root.hash(), title.hash());
    }

    #[test]
    fn decode_recovers_every_field() {
        let entry = StyleEntry {
            prop: "fontSize".to_string(),
            value: json!("12px"),
            cond: "_hover<___>sm".to_string(),
            recipe: Some("button".to_string()),
            slot: Some("label".to_string()),
            layer: Some("components".to_string()),
        };
        assert_eq!(StyleEntry::from_hash(&entry.hash()), Some(entry));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert_eq!(StyleEntry::from_hash("not a hash"), None);
        assert_eq!(StyleEntry::from_hash("p]___[4]___[]___[bogus:1"), None);
    }

    #[test]
    fn value_text_strips_string_quotes() {
        assert_eq!(value_text(&json!("blue.400")), "blue.400");
        assert_eq!(value_text(&json!(1.5)), "1.5");
        assert_eq!(value_text(&json!(true)), "true");
    }
}
