//! A host tool's stylesheet, rewritten in place by [`Builder::write`].
//!
//! [`Builder::write`]: crate::Builder::write

use crate::css::Stylesheet;

/// Parsed root of a CSS file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssRoot {
    sheet: Stylesheet,
}

impl CssRoot {
    /// Parses `text`.
    pub fn parse(text: &str) -> Self {
        Self {
            sheet: Stylesheet::parse(text),
        }
    }

    /// Serializes the root back to text.
    pub fn to_css(&self) -> String {
        self.sheet.to_css()
    }

    /// Removes every node.
    pub fn remove_all(&mut self) {
        self.sheet.clear();
    }

    /// Parses `css` and appends its nodes.
    pub fn append(&mut self, css: &str) {
        self.sheet.merge(Stylesheet::parse(css));
    }

    /// Params of the root's `@layer` rules.
    pub fn layer_params(&self) -> Vec<String> {
        self.sheet.layer_params()
    }

    /// Returns `true` if the root has no nodes.
    pub fn is_empty(&self) -> bool {
        self.sheet.is_empty()
    }
}
