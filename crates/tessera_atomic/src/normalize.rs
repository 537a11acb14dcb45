//! Normalization applied to style objects before traversal.

use serde_json::Value;
use tessera_config::StyleObject;
use tracing::trace;

use crate::condition::Conditions;
use crate::utility::Utilities;

/// Rewrites a style object into the shape the traverser expects.
///
/// Null values are dropped and array values become responsive objects. When
/// `utilities` is given, property keys that are configured shorthands are
/// renamed to their utility; condition keys are never renamed. When a
/// shorthand and its utility both appear, the utility's own key wins; among
/// several shorthands of one utility, the first in key order wins.
pub fn normalize_style_object(
    styles: &StyleObject,
    conditions: &Conditions,
    utilities: Option<&Utilities>,
) -> StyleObject {
    let responsive_keys = conditions.responsive_keys();
    normalize_with(styles, conditions, utilities, &responsive_keys)
}

fn normalize_with(
    styles: &StyleObject,
    conditions: &Conditions,
    utilities: Option<&Utilities>,
    responsive_keys: &[&str],
) -> StyleObject {
    let mut out = StyleObject::new();
    for (original, value) in styles {
        let key = match utilities {
            Some(utilities) if !conditions.is_condition(original) => {
                utilities.resolve_shorthand(original)
            }
            _ => original.as_str(),
        };
        if out.contains_key(key) {
            if key != original.as_str() {
                trace!(shorthand = %original, utility = key, "shorthand shadowed by its utility");
                continue;
            }
            trace!(utility = key, "utility overrides its shorthand");
        }
        let value = match value {
            Value::Null => continue,
            Value::Array(items) => Value::Object(normalize_with(
                &to_responsive_object(items, responsive_keys),
                conditions,
                utilities,
                responsive_keys,
            )),
            Value::Object(nested) => Value::Object(normalize_with(
                nested,
                conditions,
                utilities,
                responsive_keys,
            )),
            leaf => leaf.clone(),
        };
        out.insert(key.to_string(), value);
    }
    out
}

/// Converts a responsive array into an object keyed by `keys` position by
/// position. Null items and items past the last key are dropped.
pub fn to_responsive_object(values: &[Value], keys: &[&str]) -> StyleObject {
    values
        .iter()
        .zip(keys)
        .filter(|(value, _)| !value.is_null())
        .map(|(value, key)| (key.to_string(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;
    use tessera_config::UtilityConfig;

    fn object(value: Value) -> StyleObject {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn responsive_array_positions() {
        let keys = ["base", "sm", "md"];
        let out = to_responsive_object(&[json!(1), Value::Null, json!(3), json!(4)], &keys);
        assert_eq!(Value::Object(out), json!({ "base": 1, "md": 3 }));
    }

    #[test]
    fn arrays_become_objects() {
        let styles = object(json!({ "mx": [1, 2, null, 4] }));
        let out = normalize_style_object(&styles, &Conditions::default(), None);
        assert_eq!(
            Value::Object(out),
            json!({ "mx": { "base": 1, "sm": 2, "lg": 4 } })
        );
    }

    #[test]
    fn nulls_are_dropped() {
        let styles = object(json!({ "color": null, "_hover": { "p": null, "m": 1 } }));
        let out = normalize_style_object(&styles, &Conditions::default(), None);
        assert_eq!(Value::Object(out), json!({ "_hover": { "m": 1 } }));
    }

    #[test]
    fn shorthands_resolve_only_for_properties() {
        let mut configured = BTreeMap::new();
        configured.insert(
            "marginX".to_string(),
            UtilityConfig {
                property: None,
                shorthand: vec!["mx".to_string(), "sm".to_string()],
            },
        );
        let utilities = Utilities::new(configured);
        let styles = object(json!({ "mx": { "sm": 2 } }));
        let out = normalize_style_object(&styles, &Conditions::default(), Some(&utilities));
        assert_eq!(Value::Object(out), json!({ "marginX": { "sm": 2 } }));
    }

    #[test]
    fn utility_key_wins_over_its_shorthand() {
        let mut configured = BTreeMap::new();
        configured.insert(
            "marginX".to_string(),
            UtilityConfig {
                property: None,
                shorthand: vec!["mx".to_string()],
            },
        );
        configured.insert(
            "size".to_string(),
            UtilityConfig {
                property: None,
                shorthand: vec!["boxSize".to_string()],
            },
        );
        let utilities = Utilities::new(configured);

        // `marginX` sorts before `mx`; `boxSize` sorts before `size`.
        let styles = object(json!({ "mx": 1, "marginX": 2, "boxSize": 3, "size": 4 }));
        let out = normalize_style_object(&styles, &Conditions::default(), Some(&utilities));
        assert_eq!(Value::Object(out), json!({ "marginX": 2, "size": 4 }));
    }
}
