//! Conditions: which keys of a style object are selectors rather than
//! properties, and how a traversal path collapses into a condition identifier.

use std::collections::BTreeMap;

use tessera_config::ProjectConfig;

/// Separator between the segments of a condition path.
pub const CONDITION_SEPARATOR: &str = "<___>";

/// Placeholder responsive key meaning "no condition".
pub const BASE_CONDITION: &str = "base";

const DEFAULT_CONDITIONS: &[(&str, &str)] = &[
    ("hover", "&:hover"),
    ("focus", "&:focus"),
    ("focusVisible", "&:focus-visible"),
    ("focusWithin", "&:focus-within"),
    ("active", "&:active"),
    ("disabled", "&:disabled"),
    ("visited", "&:visited"),
    ("checked", "&:checked"),
    ("first", "&:first-child"),
    ("last", "&:last-child"),
    ("odd", "&:nth-child(odd)"),
    ("even", "&:nth-child(even)"),
    ("placeholder", "&::placeholder"),
    ("groupHover", ".group:hover &"),
    ("peerFocus", ".peer:focus ~ &"),
    ("dark", ".dark &"),
    ("light", ".light &"),
    ("motionReduce", "@media (prefers-reduced-motion: reduce)"),
    ("print", "@media print"),
];

const DEFAULT_BREAKPOINTS: &[(&str, &str)] = &[
    ("sm", "40em"),
    ("md", "48em"),
    ("lg", "64em"),
    ("xl", "80em"),
    ("2xl", "96em"),
];

/// How a condition changes the rule it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionKind {
    /// A selector template; `&` stands for the selector being conditioned.
    Selector(String),
    /// An at-rule wrapping the rule (`@media …`, `@supports …`).
    AtRule(String),
}

/// Named conditions and breakpoints known to a project.
#[derive(Debug, Clone)]
pub struct Conditions {
    named: BTreeMap<String, String>,
    breakpoints: Vec<(String, String)>,
}

impl Default for Conditions {
    fn default() -> Self {
        Self::new(
            DEFAULT_CONDITIONS
                .iter()
                .map(|(name, raw)| (name.to_string(), raw.to_string())),
            DEFAULT_BREAKPOINTS
                .iter()
                .map(|(name, width)| (name.to_string(), width.to_string())),
        )
    }
}

impl Conditions {
    /// Creates a condition set. `named` keys are written without the leading
    /// underscore; breakpoints are ordered by their minimum width.
    pub fn new(
        named: impl IntoIterator<Item = (String, String)>,
        breakpoints: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        let mut breakpoints: Vec<(String, String)> = breakpoints.into_iter().collect();
        breakpoints.sort_by(|a, b| width_in_px(&a.1).total_cmp(&width_in_px(&b.1)));
        Self {
            named: named.into_iter().collect(),
            breakpoints,
        }
    }

    /// Built-in conditions and breakpoints overlaid with the project's own.
    pub fn from_config(config: &ProjectConfig) -> Self {
        let defaults = Self::default();
        let mut named = defaults.named;
        named.extend(config.conditions.clone());
        let mut breakpoints: BTreeMap<String, String> = defaults.breakpoints.into_iter().collect();
        breakpoints.extend(config.breakpoints.clone());
        Self::new(named, breakpoints)
    }

    /// Returns `true` if `key` denotes a condition rather than a property.
    pub fn is_condition(&self, key: &str) -> bool {
        key == BASE_CONDITION
            || key.starts_with('@')
            || key.contains('&')
            || key
                .strip_prefix('_')
                .is_some_and(|name| self.named.contains_key(name))
            || self.breakpoint_rank(key).is_some()
    }

    /// Named conditions, keyed without the leading underscore.
    pub fn named(&self) -> &BTreeMap<String, String> {
        &self.named
    }

    /// Breakpoints ordered from narrowest to widest.
    pub fn breakpoints(&self) -> &[(String, String)] {
        &self.breakpoints
    }

    /// Keys assigned to the positions of a responsive array: `base` first,
    /// then each breakpoint in width order.
    pub fn responsive_keys(&self) -> Vec<&str> {
        std::iter::once(BASE_CONDITION)
            .chain(self.breakpoints.iter().map(|(name, _)| name.as_str()))
            .collect()
    }

    /// Position of a breakpoint in width order.
    pub fn breakpoint_rank(&self, key: &str) -> Option<usize> {
        self.breakpoints.iter().position(|(name, _)| name == key)
    }

    /// Returns how the condition `key` applies, or `None` if it is unknown.
    pub fn kind(&self, key: &str) -> Option<ConditionKind> {
        if let Some(rank) = self.breakpoint_rank(key) {
            let width = &self.breakpoints[rank].1;
            return Some(ConditionKind::AtRule(format!(
                "@media screen and (min-width: {width})"
            )));
        }
        let raw = match key.strip_prefix('_') {
            Some(name) => self.named.get(name)?.as_str(),
            None if key.starts_with('@') || key.contains('&') => key,
            None => return None,
        };
        Some(raw_kind(raw))
    }
}

fn raw_kind(raw: &str) -> ConditionKind {
    if raw.starts_with('@') {
        ConditionKind::AtRule(raw.to_string())
    } else if raw.contains('&') {
        ConditionKind::Selector(raw.to_string())
    } else {
        ConditionKind::Selector(format!("{raw} &"))
    }
}

/// Computes the canonical condition identifier for a leaf.
///
/// `path` is the separator-joined chain of keys that led to the leaf. The
/// first segment is dropped unless it is itself a condition, and `base`
/// markers and segments equal to `prop` are removed. When nothing was
/// removed the original path is returned untouched.
pub fn resolve_condition(
    path: &str,
    prop: &str,
    separator: &str,
    is_condition: impl Fn(&str) -> bool,
) -> String {
    if path.is_empty() {
        return String::new();
    }
    let segments: Vec<&str> = path.split(separator).collect();
    let skip = usize::from(!is_condition(segments[0]));
    let kept: Vec<&str> = segments[skip..]
        .iter()
        .copied()
        .filter(|segment| *segment != BASE_CONDITION && *segment != prop)
        .collect();
    if kept.len() == segments.len() {
        path.to_string()
    } else {
        kept.join(separator)
    }
}

fn width_in_px(width: &str) -> f64 {
    let width = width.trim();
    let split = width
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(width.len());
    let number: f64 = width[..split].parse().unwrap_or(f64::MAX);
    match &width[split..] {
        "em" | "rem" => number * 16.0,
        _ => number,
    }
}
