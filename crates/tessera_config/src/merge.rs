//! Preset merging: layering a configuration over the presets it extends.

use toml::{Table, Value};

/// Merges `overlay` into `base`, with `overlay` winning.
///
/// Tables present on both sides are merged recursively, so a project can add a
/// single condition without restating the preset's others. Every other value
/// (strings, arrays, numbers) in `overlay` replaces the one in `base`
/// entirely.
pub fn merge_tables(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        let Value::Table(incoming) = value else {
            base.insert(key, value);
            continue;
        };
        if let Some(Value::Table(existing)) = base.get_mut(&key) {
            merge_tables(existing, incoming);
            continue;
        }
        base.insert(key, Value::Table(incoming));
    }
}
