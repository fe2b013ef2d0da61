//! Serialization of document subtrees: HTML markup and a printable tree.

use termtree::Tree;

use crate::domain::arena::{Document, NodeId};
use crate::domain::properties::{self, PropertyKind};
use crate::domain::value::{format_number, PropValue};

/// HTML output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    /// Spaces per nesting level; `None` writes everything on one line
    pub indent: Option<usize>,
}

impl RenderOptions {
    pub fn compact() -> Self {
        Self { indent: None }
    }

    pub fn indented(width: usize) -> Self {
        Self {
            indent: Some(width),
        }
    }
}

/// Serialize `node` and its subtree as HTML.
///
/// Only reflected properties become attributes; handlers and expando
/// properties have no markup form and are skipped.
pub fn to_html(document: &Document, node: NodeId, options: &RenderOptions) -> String {
    let mut out = String::new();
    write_node(document, node, options, 0, &mut out);
    if options.indent.is_some() && out.ends_with('\n') {
        out.pop();
    }
    out
}

fn write_node(document: &Document, node: NodeId, options: &RenderOptions, level: usize, out: &mut String) {
    let pad = options
        .indent
        .map(|width| " ".repeat(width * level))
        .unwrap_or_default();

    if let Some(text) = document.text(node) {
        out.push_str(&pad);
        out.push_str(&escape_text(text));
        if options.indent.is_some() {
            out.push('\n');
        }
        return;
    }
    let Some(tag) = document.tag(node) else {
        return;
    };

    out.push_str(&pad);
    out.push('<');
    out.push_str(tag);
    for (name, value) in document.properties(node) {
        write_attribute(tag, name, value, out);
    }
    out.push('>');

    if properties::is_void(tag) {
        if options.indent.is_some() {
            out.push('\n');
        }
        return;
    }

    let children = document.child_nodes(node);
    let inline_text = children.iter().all(|&child| document.text(child).is_some());
    if children.is_empty() || inline_text || options.indent.is_none() {
        if children.is_empty() && tag == "textarea" {
            if let Some(PropValue::String(value)) = document.property(node, "value") {
                out.push_str(&escape_text(&value));
            }
        }
        for &child in children {
            write_node(document, child, &RenderOptions::compact(), 0, out);
        }
    } else {
        out.push('\n');
        for &child in children {
            write_node(document, child, options, level + 1, out);
        }
        out.push_str(&pad);
    }

    out.push_str("</");
    out.push_str(tag);
    out.push('>');
    if options.indent.is_some() {
        out.push('\n');
    }
}

fn write_attribute(tag: &str, name: &str, value: &PropValue, out: &mut String) {
    if tag == "textarea" && name == "value" {
        return;
    }
    let Some(attribute) = properties::reflected_attribute(tag, name) else {
        return;
    };
    match (properties::lookup(tag, name), value) {
        (Some(PropertyKind::Flag), PropValue::Bool(true)) => {
            out.push(' ');
            out.push_str(&attribute);
        }
        (Some(PropertyKind::Flag), _) => {}
        (_, PropValue::Number(n)) => {
            out.push_str(&format!(" {attribute}=\"{}\"", format_number(*n)));
        }
        (_, other) => {
            out.push_str(&format!(
                " {attribute}=\"{}\"",
                escape_attribute(&other.to_display_string())
            ));
        }
    }
}

pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

/// Printable tree of element labels such as `input#apples.w3-input`.
pub fn to_tree(document: &Document, node: NodeId) -> Tree<String> {
    let mut tree = Tree::new(label(document, node));
    for &child in document.child_nodes(node) {
        tree.push(to_tree(document, child));
    }
    tree
}

fn label(document: &Document, node: NodeId) -> String {
    if let Some(text) = document.text(node) {
        return format!("{text:?}");
    }
    let Some(tag) = document.tag(node) else {
        return "<removed>".to_string();
    };
    let mut label = tag.to_string();
    if let Some(PropValue::String(id)) = document.property(node, "id") {
        if !id.is_empty() {
            label.push('#');
            label.push_str(&id);
        }
    }
    if let Some(PropValue::String(classes)) = document.property(node, "className") {
        for class in classes.split_whitespace() {
            label.push('.');
            label.push_str(class);
        }
    }
    let handlers: Vec<&str> = document
        .properties(node)
        .iter()
        .filter(|(_, value)| matches!(value, PropValue::Handler(_)))
        .map(|(name, _)| name.as_str())
        .collect();
    if !handlers.is_empty() {
        label.push_str(&format!(" [{}]", handlers.join(", ")));
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::host::Host;

    #[test]
    fn test_escape() {
        assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_attribute(r#"say "hi""#), "say &quot;hi&quot;");
    }

    #[test]
    fn given_textarea_value_when_rendering_then_written_as_content() {
        let mut doc = Document::new();
        let textarea = doc.create_element("textarea").unwrap();
        doc.set_property(&textarea, "value", &PropValue::from("a<b")).unwrap();
        doc.set_property(&textarea, "rows", &PropValue::Number(3.0)).unwrap();

        let html = to_html(&doc, textarea, &RenderOptions::compact());

        assert_eq!(html, r#"<textarea rows="3">a&lt;b</textarea>"#);
    }

    #[test]
    fn given_false_flag_when_rendering_then_attribute_omitted() {
        let mut doc = Document::new();
        let input = doc.create_element("input").unwrap();
        doc.set_property(&input, "disabled", &PropValue::Bool(false)).unwrap();
        doc.set_property(&input, "required", &PropValue::Bool(true)).unwrap();

        assert_eq!(to_html(&doc, input, &RenderOptions::compact()), "<input required>");
    }
}
