//! DOM Operations Adapter
//!
//! Thin helpers over the `dom_query` crate used by the rewrite rules and the
//! renderer, so that attribute access and tag inspection read the same way
//! everywhere.

pub use dom_query::{Document, NodeRef, Selection};

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

// === Attribute Operations ===

/// Get any attribute value of the first node
#[inline]
#[must_use]
pub fn get_attribute(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name).map(|s| s.to_string())
}

/// Set an attribute value on every node of the selection
#[inline]
pub fn set_attribute(sel: &Selection, name: &str, value: &str) {
    sel.set_attr(name, value);
}

/// Remove an attribute from every node of the selection
#[inline]
pub fn remove_attribute(sel: &Selection, name: &str) {
    sel.remove_attr(name);
}

/// Get all attributes of a node as key-value pairs, in document order.
/// Namespaced names keep their prefix (`xlink:href`).
#[must_use]
pub fn attributes(node: &NodeRef) -> Vec<(String, String)> {
    node.attrs()
        .iter()
        .map(|attr| {
            let name = match &attr.name.prefix {
                Some(prefix) => format!("{prefix}:{}", attr.name.local),
                None => attr.name.local.to_string(),
            };
            (name, attr.value.to_string())
        })
        .collect()
}

// === Tag/Node Information ===

/// Get tag name (lowercase) of a node, `None` for non-elements
#[must_use]
pub fn node_tag(node: &NodeRef) -> Option<String> {
    if !node.is_element() {
        return None;
    }
    node.node_name().map(|t| t.to_ascii_lowercase())
}

/// Get tag name (lowercase) of the first node in a selection
#[must_use]
pub fn tag_name(sel: &Selection) -> Option<String> {
    sel.nodes().first().and_then(node_tag)
}

/// Check if a tag is a void element
#[must_use]
pub fn is_void_tag(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

// === Tree Manipulation ===

/// Remove every node of the selection, returning how many were removed.
pub fn remove_all(sel: &Selection) -> usize {
    let count = sel.length();
    if count > 0 {
        sel.remove();
    }
    count
}

/// Append HTML content as the last child of every node of the selection
#[inline]
pub fn append_html(sel: &Selection, html: &str) {
    sel.append_html(html);
}

// === Escaping ===

/// Escape text for use inside a double-quoted attribute value.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

// === Parsing ===

/// Parse HTML string into document. Never fails; malformed markup is
/// repaired the way a browser would.
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}
