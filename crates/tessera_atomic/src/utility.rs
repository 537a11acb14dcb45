//! Style property recognition and shorthand resolution.

use std::collections::BTreeMap;

use lightningcss::properties::PropertyId;
use tessera_config::UtilityConfig;

/// Common CSS properties, in camelCase, checked before the full property table.
const CSS_PROPERTIES: &[&str] = &[
    "alignContent", "alignItems", "alignSelf", "animation", "appearance",
    "aspectRatio", "backdropFilter", "background", "backgroundColor",
    "backgroundImage", "backgroundPosition", "backgroundRepeat", "backgroundSize",
    "border", "borderBottom", "borderColor", "borderLeft", "borderRadius",
    "borderRight", "borderStyle", "borderTop", "borderWidth", "bottom",
    "boxShadow", "boxSizing", "color", "columnGap", "content", "cursor",
    "display", "fill", "filter", "flex", "flexBasis", "flexDirection",
    "flexGrow", "flexShrink", "flexWrap", "float", "fontFamily", "fontSize",
    "fontStyle", "fontWeight", "gap", "gridArea", "gridColumn",
    "gridTemplateColumns", "gridTemplateRows", "height", "inset",
    "justifyContent", "justifyItems", "justifySelf", "left", "letterSpacing",
    "lineHeight", "listStyle", "margin", "marginBlock", "marginBottom",
    "marginInline", "marginLeft", "marginRight", "marginTop", "maxHeight",
    "maxWidth", "minHeight", "minWidth", "objectFit", "opacity", "order",
    "outline", "outlineColor", "outlineOffset", "overflow", "overflowX",
    "overflowY", "padding", "paddingBlock", "paddingBottom", "paddingInline",
    "paddingLeft", "paddingRight", "paddingTop", "pointerEvents", "position",
    "right", "rowGap", "stroke", "textAlign", "textDecoration", "textOverflow",
    "textTransform", "top", "transform", "transition", "userSelect",
    "verticalAlign", "visibility", "whiteSpace", "width", "wordBreak", "zIndex",
];

/// Abbreviated property names recognized as-is, with the CSS property they write.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("bg", "background"),
    ("h", "height"),
    ("m", "margin"),
    ("mb", "margin-bottom"),
    ("ml", "margin-left"),
    ("mr", "margin-right"),
    ("mt", "margin-top"),
    ("mx", "margin-inline"),
    ("my", "margin-block"),
    ("p", "padding"),
    ("pb", "padding-bottom"),
    ("pl", "padding-left"),
    ("pr", "padding-right"),
    ("pt", "padding-top"),
    ("px", "padding-inline"),
    ("py", "padding-block"),
    ("w", "width"),
];

/// The set of style properties a project understands.
#[derive(Debug, Clone, Default)]
pub struct Utilities {
    configured: BTreeMap<String, UtilityConfig>,
    shorthands: BTreeMap<String, String>,
}

impl Utilities {
    /// Builds the utility table from `[utilities]` configuration.
    pub fn new(configured: BTreeMap<String, UtilityConfig>) -> Self {
        let shorthands = configured
            .iter()
            .flat_map(|(name, utility)| {
                utility
                    .shorthand
                    .iter()
                    .map(move |alias| (alias.clone(), name.clone()))
            })
            .collect();
        Self {
            configured,
            shorthands,
        }
    }

    /// Resolves a configured shorthand to its utility name.
    pub fn resolve_shorthand<'a>(&'a self, prop: &'a str) -> &'a str {
        self.shorthands.get(prop).map_or(prop, String::as_str)
    }

    /// Returns `true` if `prop` is a style property: a CSS property, a known
    /// abbreviation, a custom property, or a configured utility or shorthand.
    pub fn is_style_prop(&self, prop: &str) -> bool {
        prop.starts_with("--")
            || self.configured.contains_key(prop)
            || self.shorthands.contains_key(prop)
            || abbreviation(prop).is_some()
            || is_css_property(prop)
    }

    /// The CSS property name written for `prop`.
    pub fn css_property(&self, prop: &str) -> String {
        let name = self.resolve_shorthand(prop);
        if let Some(property) = self.configured.get(name).and_then(|u| u.property.as_deref()) {
            return kebab_case(property);
        }
        if let Some(property) = abbreviation(name) {
            return property.to_string();
        }
        kebab_case(name)
    }
}

/// Returns `true` if the kebab form of `prop` names a known CSS property,
/// vendor-prefixed forms included.
pub fn is_css_property(prop: &str) -> bool {
    if CSS_PROPERTIES.binary_search(&prop).is_ok() {
        return true;
    }
    if prop.starts_with('-') || prop.is_empty() {
        return false;
    }
    let name = kebab_case(prop);
    let known = !matches!(PropertyId::from(name.as_str()), PropertyId::Custom(_));
    known
}

fn abbreviation(prop: &str) -> Option<&'static str> {
    ABBREVIATIONS
        .binary_search_by(|(name, _)| name.cmp(&prop))
        .ok()
        .map(|index| ABBREVIATIONS[index].1)
}

/// Converts a camelCase property to kebab-case. Custom properties are
/// returned unchanged. `Webkit`/`Moz`/`ms` prefixes gain their leading dash.
pub fn kebab_case(prop: &str) -> String {
    if prop.starts_with("--") {
        return prop.to_string();
    }
    let mut out = String::with_capacity(prop.len() + 4);
    if prop.starts_with("ms") && prop[2..].starts_with(|c: char| c.is_ascii_uppercase()) {
        out.push('-');
    }
    for c in prop.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> Utilities {
        let mut utilities = BTreeMap::new();
        utilities.insert(
            "marginX".to_string(),
            UtilityConfig {
                property: Some("marginInline".to_string()),
                shorthand: vec!["mx".to_string()],
            },
        );
        utilities.insert("textStyle".to_string(), UtilityConfig::default());
        Utilities::new(utilities)
    }

    #[test]
    fn builtin_tables_are_sorted() {
        assert!(CSS_PROPERTIES.windows(2).all(|w| w[0] < w[1]));
        assert!(ABBREVIATIONS.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn recognizes_builtin_properties() {
        let u = Utilities::default();
        assert!(u.is_style_prop("color"));
        assert!(u.is_style_prop("fontSize"));
        assert!(u.is_style_prop("mx"));
        assert!(u.is_style_prop("--brand-color"));
        assert!(!u.is_style_prop("onClick"));
        assert!(!u.is_style_prop("textStyle"));
    }

    #[test]
    fn recognizes_properties_outside_the_common_list() {
        let u = Utilities::default();
        for prop in [
            "textShadow",
            "borderTopLeftRadius",
            "transitionDuration",
            "backgroundClip",
            "clipPath",
            "WebkitTransform",
            "msTransform",
        ] {
            assert!(u.is_style_prop(prop), "{prop} should be a style prop");
        }
        assert!(!u.is_style_prop("textShadowz"));
        assert!(!u.is_style_prop("-webkit-transform"));
    }

    #[test]
    fn vendor_prefixes_keep_their_dash() {
        assert_eq!(kebab_case("WebkitTransform"), "-webkit-transform");
        assert_eq!(kebab_case("MozAppearance"), "-moz-appearance");
        assert_eq!(kebab_case("msTransform"), "-ms-transform");
        assert_eq!(kebab_case("msgColor"), "msg-color");
    }

    #[test]
    fn recognizes_configured_utilities() {
        let u = configured();
        assert!(u.is_style_prop("textStyle"));
        assert!(u.is_style_prop("marginX"));
    }

    #[test]
    fn shorthand_resolution() {
        assert_eq!(Utilities::default().resolve_shorthand("mx"), "mx");
        assert_eq!(configured().resolve_shorthand("mx"), "marginX");
        assert_eq!(configured().resolve_shorthand("color"), "color");
    }

    #[test]
    fn css_property_names() {
        let u = configured();
        assert_eq!(u.css_property("mx"), "margin-inline");
        assert_eq!(u.css_property("marginX"), "margin-inline");
        assert_eq!(u.css_property("fontSize"), "font-size");
        assert_eq!(u.css_property("textStyle"), "text-style");
        assert_eq!(Utilities::default().css_property("py"), "padding-block");
        assert_eq!(u.css_property("--gap"), "--gap");
    }
}
