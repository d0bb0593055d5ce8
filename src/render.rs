//! Renderer: serialize a rewritten document back to HTML text.
//!
//! [`render`] produces an indented document, one element per line with a
//! two-space indent. Elements whose content is whitespace-sensitive (`pre`,
//! `textarea`) or raw text (`style`, `script`) are emitted verbatim.
//! [`render_compact`] returns the parser's own serialization unchanged.

use crate::dom::{self, NodeRef, Selection};
use crate::rewrite::Document;

const INDENT: &str = "  ";

/// Elements whose content is written out exactly as parsed.
const VERBATIM_ELEMENTS: &[&str] = &["pre", "textarea", "style", "script", "noscript"];

/// Serialize `doc` as indented HTML. Deterministic for a given tree.
///
/// # Example
///
/// ```rust
/// use hidewall::render::render;
/// use hidewall::rewrite::{rewrite, Origin};
///
/// let doc = rewrite(b"<p>Hello</p>", "https://example.com/", Origin::Direct);
/// let html = render(&doc);
/// assert!(html.contains("\n    <p>Hello</p>\n"));
/// ```
#[must_use]
pub fn render(doc: &Document) -> String {
    let mut out = String::new();
    let root = doc.tree().root();
    for child in root.children() {
        write_node(&child, 0, &mut out);
    }
    out
}

/// The parser's own compact serialization of `doc`.
#[must_use]
pub fn render_compact(doc: &Document) -> String {
    doc.tree().html().to_string()
}

fn write_node(node: &NodeRef, depth: usize, out: &mut String) {
    if let Some(tag) = dom::node_tag(node) {
        write_element(node, &tag, depth, out);
    } else if node.is_text() {
        let text = collapse_whitespace(&node.text());
        if !text.is_empty() {
            push_indent(depth, out);
            out.push_str(&escape_text(&text));
            out.push('\n');
        }
    } else {
        // Doctype, comments and other non-element nodes.
        let html = node.html();
        let html = html.trim();
        if !html.is_empty() {
            push_indent(depth, out);
            out.push_str(html);
            out.push('\n');
        }
    }
}

fn write_element(node: &NodeRef, tag: &str, depth: usize, out: &mut String) {
    push_indent(depth, out);
    out.push('<');
    out.push_str(tag);
    for (name, value) in dom::attributes(node) {
        out.push(' ');
        out.push_str(&name);
        out.push_str("=\"");
        out.push_str(&dom::escape_html(&value));
        out.push('"');
    }
    out.push('>');

    if dom::is_void_tag(tag) {
        out.push('\n');
        return;
    }

    if VERBATIM_ELEMENTS.contains(&tag) {
        out.push_str(&Selection::from(*node).inner_html());
        close_tag(tag, out);
        return;
    }

    let children: Vec<NodeRef> = node
        .children()
        .into_iter()
        .filter(|child| !child.is_text() || !is_blank(&child.text()))
        .collect();

    match children.as_slice() {
        [] => close_tag(tag, out),
        [only] if only.is_text() => {
            out.push_str(&escape_text(&collapse_whitespace(&only.text())));
            close_tag(tag, out);
        }
        _ => {
            out.push('\n');
            for child in &children {
                write_node(child, depth + 1, out);
            }
            push_indent(depth, out);
            close_tag(tag, out);
        }
    }
}

fn close_tag(tag: &str, out: &mut String) {
    out.push_str("</");
    out.push_str(tag);
    out.push_str(">\n");
}

fn push_indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

/// Only ASCII whitespace is insignificant; a no-break space is content.
fn is_blank(text: &str) -> bool {
    text.bytes().all(|b| b.is_ascii_whitespace())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_ascii_whitespace().collect::<Vec<_>>().join(" ")
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::{rewrite_html, Origin};

    fn doc(html: &str) -> Document {
        rewrite_html(html, "https://example.com/", Origin::Direct)
    }

    #[test]
    fn test_indented_structure() {
        let html = render(&doc(
            "<!DOCTYPE html><html><head><title>T</title></head><body><div><p>One</p><p>Two</p></div></body></html>",
        ));

        assert_eq!(
            html,
            "<!DOCTYPE html>\n\
             <html>\n\
             \x20 <head>\n\
             \x20   <title>T</title>\n\
             \x20 </head>\n\
             \x20 <body>\n\
             \x20   <div>\n\
             \x20     <p>One</p>\n\
             \x20     <p>Two</p>\n\
             \x20   </div>\n\
             \x20 </body>\n\
             </html>\n"
        );
    }

    #[test]
    fn test_void_elements_and_attribute_escaping() {
        let html = render(&doc(r#"<p>a<br>b<img src="x.png" alt='say "hi"'></p>"#));

        assert!(html.contains("<br>\n"));
        assert!(!html.contains("</br>"));
        assert!(html.contains(r#"<img src="https://example.com/x.png" alt="say &quot;hi&quot;">"#));
        assert!(!html.contains("</img>"));
    }

    #[test]
    fn test_text_is_escaped_and_collapsed() {
        let html = render(&doc("<p>  1 &lt; 2   &amp;\n  3 &gt; 2 </p>"));
        assert!(html.contains("<p>1 &lt; 2 &amp; 3 &gt; 2</p>"));
    }

    #[test]
    fn test_no_break_space_survives() {
        let html = render(&doc("<p>a&nbsp;b</p><p>&nbsp;</p>"));
        assert!(html.contains("<p>a&nbsp;b</p>"));
        assert!(html.contains("<p>&nbsp;</p>"));
    }

    #[test]
    fn test_pre_is_verbatim() {
        let html = render(&doc("<pre>  line 1\n    line 2</pre>"));
        assert!(html.contains("<pre>  line 1\n    line 2</pre>"));
    }

    #[test]
    fn test_style_is_not_escaped() {
        let html = render(&doc("<style>a > b { color: red }</style>"));
        assert!(html.contains("<style>a > b { color: red }</style>"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let d = doc("<div><span>x</span> tail <!-- note --></div>");
        assert_eq!(render(&d), render(&d));
        assert!(render(&d).contains("<!-- note -->"));
    }

    #[test]
    fn test_compact_matches_parser_output() {
        let d = doc("<p>Hi</p>");
        assert_eq!(render_compact(&d), d.tree().html().to_string());
        assert!(render_compact(&d).contains("<p>Hi</p>"));
    }
}
