//! Just enough CSS handling to merge fragments and order cascade layers.
//!
//! This is not a CSS parser. Text is split into top-level statements and
//! blocks (quote aware, comments dropped), whitespace inside each item is
//! collapsed, and `@layer name { … }` blocks keep their children so that
//! same-named layers from different fragments can be merged.

use std::fmt::Write;

/// One top-level item of a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// `prelude;`, e.g. `@import "x.css"` or `@layer a, b`.
    Statement(String),
    /// `prelude { body }` with whitespace collapsed.
    Block {
        /// Selector or at-rule prelude.
        prelude: String,
        /// Everything between the braces.
        body: String,
    },
    /// A named cascade layer and its children.
    Layer {
        /// Layer name.
        name: String,
        /// Items inside the layer.
        nodes: Vec<Node>,
    },
}

/// An ordered list of top-level CSS items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    nodes: Vec<Node>,
}

impl Stylesheet {
    /// Splits `text` into top-level items.
    pub fn parse(text: &str) -> Self {
        Self {
            nodes: parse_nodes(&strip_comments(text)),
        }
    }

    /// The parsed items in source order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns `true` if there are no items.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Removes every item.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Appends the items of `other` that are not already present.
    ///
    /// Same-named layers are merged recursively instead of repeated.
    pub fn merge(&mut self, other: Stylesheet) {
        for node in other.nodes {
            merge_node(&mut self.nodes, node);
        }
    }

    /// Layer names in the order they are first declared, either by an
    /// `@layer a, b;` statement or by a layer block.
    pub fn layer_order(&self) -> Vec<String> {
        let mut order: Vec<String> = Vec::new();
        let mut push = |name: &str| {
            if !order.iter().any(|known| known == name) {
                order.push(name.to_string());
            }
        };
        for node in &self.nodes {
            match node {
                Node::Statement(text) => {
                    for name in layer_statement_names(text).into_iter().flatten() {
                        push(name);
                    }
                }
                Node::Layer { name, .. } => push(name),
                Node::Block { .. } => {}
            }
        }
        order
    }

    /// Params of every top-level `@layer` rule, statement or block.
    pub fn layer_params(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                Node::Statement(text) => text
                    .strip_prefix("@layer ")
                    .map(|params| params.trim().to_string()),
                Node::Layer { name, .. } => Some(name.clone()),
                Node::Block { .. } => None,
            })
            .collect()
    }

    /// Renders the items, one top-level item per line.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            write_node(&mut out, node, 0);
        }
        out
    }
}

/// Ordered union of two stylesheets: `old` first, then new items of `new`.
pub fn merge_css(old: &str, new: &str) -> String {
    let mut sheet = Stylesheet::parse(old);
    sheet.merge(Stylesheet::parse(new));
    sheet.to_css()
}

/// Deduplicates `raw` and lays it out by cascade layer.
///
/// The output starts with a single `@layer` ordering statement. Layers follow
/// `layer_order`, then any layer the input declares that `layer_order` does
/// not name, in first-seen order. Unlayered items come last.
pub fn optimize_css(raw: &str, layer_order: &[&str]) -> String {
    let mut sheet = Stylesheet::default();
    sheet.merge(Stylesheet::parse(raw));
    if sheet.is_empty() {
        return String::new();
    }

    let mut order: Vec<String> = layer_order.iter().map(|name| name.to_string()).collect();
    for name in sheet.layer_order() {
        if !order.contains(&name) {
            order.push(name);
        }
    }

    let mut layers = Vec::new();
    let mut rest = Vec::new();
    for node in sheet.nodes {
        match node {
            Node::Layer { name, nodes } => layers.push((name, nodes)),
            Node::Statement(text) if layer_statement_names(&text).is_some() => {}
            other => rest.push(other),
        }
    }

    let mut out = String::new();
    if !order.is_empty() {
        let _ = writeln!(out, "@layer {};", order.join(", "));
    }
    for name in &order {
        let Some((_, nodes)) = layers.iter().find(|(layer, _)| layer == name) else {
            continue;
        };
        if nodes.is_empty() {
            continue;
        }
        write_node(
            &mut out,
            &Node::Layer {
                name: name.clone(),
                nodes: nodes.clone(),
            },
            0,
        );
    }
    for node in &rest {
        write_node(&mut out, node, 0);
    }
    out
}

fn merge_node(nodes: &mut Vec<Node>, node: Node) {
    match node {
        Node::Layer { name, nodes: inner } => {
            let existing = nodes.iter_mut().find_map(|candidate| match candidate {
                Node::Layer {
                    name: existing,
                    nodes,
                } if *existing == name => Some(nodes),
                _ => None,
            });
            if let Some(existing) = existing {
                for child in inner {
                    merge_node(existing, child);
                }
            } else {
                let mut fresh = Vec::new();
                for child in inner {
                    merge_node(&mut fresh, child);
                }
                nodes.push(Node::Layer { name, nodes: fresh });
            }
        }
        other => {
            if !nodes.contains(&other) {
                nodes.push(other);
            }
        }
    }
}

/// Names listed by an `@layer a, b` statement, or `None` for other statements.
fn layer_statement_names(text: &str) -> Option<Vec<&str>> {
    let params = text.strip_prefix("@layer ")?;
    Some(
        params
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect(),
    )
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    let pad = "  ".repeat(depth);
    match node {
        Node::Statement(text) => {
            let _ = writeln!(out, "{pad}{text};");
        }
        Node::Block { prelude, body } if body.is_empty() => {
            let _ = writeln!(out, "{pad}{prelude} {{}}");
        }
        Node::Block { prelude, body } => {
            let _ = writeln!(out, "{pad}{prelude} {{ {body} }}");
        }
        Node::Layer { name, nodes } => {
            let _ = writeln!(out, "{pad}@layer {name} {{");
            for child in nodes {
                write_node(out, child, depth + 1);
            }
            let _ = writeln!(out, "{pad}}}");
        }
    }
}

fn parse_nodes(text: &str) -> Vec<Node> {
    let bytes = text.as_bytes();
    let mut nodes = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut open = None;
    let mut quote = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match b {
            b'"' | b'\'' => quote = Some(b),
            b'{' => {
                if depth == 0 {
                    open = Some(i);
                }
                depth += 1;
            }
            b'}' if depth == 0 => start = i + 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    if let Some(open) = open.take() {
                        nodes.push(block(&text[start..open], &text[open + 1..i]));
                    }
                    start = i + 1;
                }
            }
            b';' if depth == 0 => {
                let statement = collapse(&text[start..i]);
                if !statement.is_empty() {
                    nodes.push(Node::Statement(statement));
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    // Unterminated trailing input.
    match open {
        Some(open) if depth > 0 => nodes.push(block(&text[start..open], &text[open + 1..])),
        _ => {
            let statement = collapse(text.get(start..).unwrap_or_default());
            if !statement.is_empty() {
                nodes.push(Node::Statement(statement));
            }
        }
    }
    nodes
}

fn block(prelude: &str, body: &str) -> Node {
    let prelude = collapse(prelude);
    let layer = prelude
        .strip_prefix("@layer ")
        .map(str::trim)
        .filter(|name| !name.is_empty() && !name.contains(','));
    match layer {
        Some(name) => Node::Layer {
            name: name.to_string(),
            nodes: parse_nodes(body),
        },
        None => Node::Block {
            prelude,
            body: collapse(body),
        },
    }
}

/// Collapses whitespace runs outside of quotes into single spaces.
fn collapse(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote = None;
    let mut escaped = false;
    let mut pending_space = false;
    for c in text.trim().chars() {
        if let Some(q) = quote {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        if c == '"' || c == '\'' {
            quote = Some(c);
        }
        out.push(c);
    }
    out
}

fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut quote = None;
    let mut escaped = false;
    while let Some(c) = rest.chars().next() {
        if quote.is_none() && rest.starts_with("/*") {
            rest = match rest[2..].find("*/") {
                Some(end) => &rest[2 + end + 2..],
                None => "",
            };
            out.push(' ');
            continue;
        }
        match quote {
            Some(_) if escaped => escaped = false,
            Some(_) if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None => {}
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}
