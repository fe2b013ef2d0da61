//! In-memory document host backed by a generational arena.
//!
//! Elements and text nodes live in one arena; handles are generational indices
//! so a handle to a removed node is detected instead of aliasing a new one.

use std::fmt;

use generational_arena::{Arena, Index};
use regex::Regex;
use tracing::{debug, instrument, trace};

use crate::domain::host::{Host, HostError};
use crate::domain::properties::{self, PropertyKind};
use crate::domain::value::PropValue;

/// Handle to a node of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Index);

/// Payload of a document node.
#[derive(Debug, Clone)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
}

/// Element kind and its assigned properties, in first-assignment order.
#[derive(Debug, Clone)]
pub struct ElementData {
    pub tag: String,
    pub properties: Vec<(String, PropValue)>,
}

/// Node in the arena-based document.
#[derive(Debug)]
pub struct DomNode {
    pub data: NodeData,
    /// Parent node, None for detached nodes and the body
    pub parent: Option<NodeId>,
    /// Child nodes in document order
    pub children: Vec<NodeId>,
}

/// Checks applied by [`Document`] on construction and assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Only accept tags from [`properties::KNOWN_TAGS`]
    pub strict_tags: bool,
    /// Reject property names the element kind does not know
    pub strict_properties: bool,
}

/// Document holding a `body` element plus any number of detached subtrees.
#[derive(Debug)]
pub struct Document {
    arena: Arena<DomNode>,
    body: NodeId,
    options: DocumentOptions,
    tag_pattern: Regex,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::with_options(DocumentOptions::default())
    }

    pub fn with_options(options: DocumentOptions) -> Self {
        let mut arena = Arena::new();
        let body = NodeId(arena.insert(DomNode {
            data: NodeData::Element(ElementData {
                tag: "body".to_string(),
                properties: Vec::new(),
            }),
            parent: None,
            children: Vec::new(),
        }));
        Self {
            arena,
            body,
            options,
            tag_pattern: Regex::new(r"^[A-Za-z][A-Za-z0-9-]*$").unwrap(),
        }
    }

    pub fn options(&self) -> DocumentOptions {
        self.options
    }

    /// The document's `body` element, root of everything connected.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Number of live nodes, including the body.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&DomNode> {
        self.arena.get(id.0)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    fn element(&self, id: NodeId) -> Result<&ElementData, HostError> {
        match &self.node(id).ok_or(HostError::StaleNode)?.data {
            NodeData::Element(element) => Ok(element),
            NodeData::Text(_) => Err(HostError::NotAnElement),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, HostError> {
        match &mut self.arena.get_mut(id.0).ok_or(HostError::StaleNode)?.data {
            NodeData::Element(element) => Ok(element),
            NodeData::Text(_) => Err(HostError::NotAnElement),
        }
    }

    /// Tag of an element node.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).ok().map(|e| e.tag.as_str())
    }

    /// Content of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.data {
            NodeData::Text(text) => Some(text),
            NodeData::Element(_) => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_ok()
    }

    /// Current value of a property, as a script would read it back.
    pub fn property(&self, id: NodeId, name: &str) -> Option<PropValue> {
        let element = self.element(id).ok()?;
        if properties::lookup(&element.tag, name) == Some(PropertyKind::TextContent) {
            return Some(PropValue::String(self.text_content(id)));
        }
        element
            .properties
            .iter()
            .find(|(prop, _)| prop == name)
            .map(|(_, value)| value.clone())
    }

    /// Stored properties of an element, in first-assignment order.
    pub fn properties(&self, id: NodeId) -> &[(String, PropValue)] {
        self.element(id)
            .map(|e| e.properties.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// All child nodes, text included.
    pub fn child_nodes(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Element children only.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.child_nodes(id)
            .iter()
            .copied()
            .filter(|&child| self.is_element(child))
            .collect()
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|node| self.text(node))
            .collect()
    }

    /// True if the node is the body or hangs below it.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.body {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Pre-order traversal starting at (and including) `id`.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants::new(self, id)
    }

    /// Post-order traversal starting at (and including) `id`.
    pub fn post_order(&self, id: NodeId) -> PostOrder<'_> {
        PostOrder::new(self, id)
    }

    /// First connected element whose `id` property equals `element_id`.
    pub fn get_element_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.descendants(self.body).find(|&node| {
            self.element(node).is_ok_and(|e| {
                e.properties
                    .iter()
                    .any(|(name, value)| name == "id" && value.as_str() == Some(element_id))
            })
        })
    }

    /// Append `root` as the last child of the connected element with id `container_id`.
    #[instrument(level = "debug", skip(self))]
    pub fn mount(&mut self, container_id: &str, root: NodeId) -> Result<NodeId, HostError> {
        let container = self
            .get_element_by_id(container_id)
            .ok_or_else(|| HostError::ContainerNotFound(container_id.to_string()))?;
        self.append_child(&container, &root)?;
        debug!(container_id, "mounted subtree");
        Ok(container)
    }

    /// Invoke the `on<event>` handler of an element.
    ///
    /// Returns false when no callable handler is assigned.
    pub fn dispatch(&self, id: NodeId, event: &str) -> Result<bool, HostError> {
        let element = self.element(id)?;
        let name = format!("on{event}");
        let handler = element
            .properties
            .iter()
            .find(|(prop, _)| *prop == name)
            .and_then(|(_, value)| value.as_handler());
        match handler {
            Some(cb) => {
                trace!(handler = cb.name(), event, "dispatching");
                cb.call();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Create a detached text node.
    pub fn create_text_node(&mut self, text: impl Into<String>) -> NodeId {
        self.insert(NodeData::Text(text.into()))
    }

    /// Detach a node and free it with its whole subtree.
    pub fn remove(&mut self, id: NodeId) -> Result<(), HostError> {
        if id == self.body {
            return Err(HostError::HierarchyRequest(
                "the body cannot be removed".to_string(),
            ));
        }
        if !self.contains(id) {
            return Err(HostError::StaleNode);
        }
        self.detach(id);
        let doomed: Vec<NodeId> = self.post_order(id).collect();
        for node in doomed {
            self.arena.remove(node.0);
        }
        Ok(())
    }

    fn insert(&mut self, data: NodeData) -> NodeId {
        NodeId(self.arena.insert(DomNode {
            data,
            parent: None,
            children: Vec::new(),
        }))
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).and_then(|n| n.parent) {
            if let Some(parent_node) = self.arena.get_mut(parent.0) {
                parent_node.children.retain(|&child| child != id);
            }
        }
        if let Some(node) = self.arena.get_mut(id.0) {
            node.parent = None;
        }
    }

    fn replace_children_with_text(&mut self, id: NodeId, text: String) -> Result<(), HostError> {
        for child in self.child_nodes(id).to_vec() {
            self.remove(child)?;
        }
        if !text.is_empty() {
            let text_node = self.create_text_node(text);
            self.append_child(&id, &text_node)?;
        }
        Ok(())
    }

    fn store_property(&mut self, id: NodeId, name: &str, value: PropValue) -> Result<(), HostError> {
        let element = self.element_mut(id)?;
        match element.properties.iter_mut().find(|(prop, _)| prop == name) {
            Some(slot) => slot.1 = value,
            None => element.properties.push((name.to_string(), value)),
        }
        Ok(())
    }
}

impl Host for Document {
    type Element = NodeId;

    #[instrument(level = "trace", skip(self))]
    fn create_element(&mut self, tag: &str) -> Result<NodeId, HostError> {
        if !self.tag_pattern.is_match(tag) {
            return Err(HostError::InvalidTag(tag.to_string()));
        }
        let tag = tag.to_ascii_lowercase();
        if self.options.strict_tags && !properties::is_known_tag(&tag) {
            return Err(HostError::UnknownTag(tag));
        }
        Ok(self.insert(NodeData::Element(ElementData {
            tag,
            properties: Vec::new(),
        })))
    }

    #[instrument(level = "trace", skip(self, value))]
    fn set_property(&mut self, element: &NodeId, name: &str, value: &PropValue) -> Result<(), HostError> {
        let id = *element;
        let tag = self.element(id)?.tag.clone();
        match properties::lookup(&tag, name) {
            Some(PropertyKind::ReadOnly) => Err(HostError::ReadOnlyProperty {
                tag,
                property: name.to_string(),
            }),
            Some(PropertyKind::TextContent) => {
                let text = match value {
                    PropValue::Null => String::new(),
                    other => other.to_display_string(),
                };
                self.replace_children_with_text(id, text)
            }
            Some(PropertyKind::Text) => {
                self.store_property(id, name, PropValue::String(value.to_display_string()))
            }
            Some(PropertyKind::Flag) => self.store_property(id, name, PropValue::Bool(value.truthy())),
            Some(PropertyKind::Number) => {
                let number = value.to_number();
                if number.is_finite() {
                    self.store_property(id, name, PropValue::Number(number.trunc()))
                } else {
                    Err(HostError::InvalidPropertyValue {
                        tag,
                        property: name.to_string(),
                        message: format!("expected a number, got {} '{}'", value.type_name(), value),
                    })
                }
            }
            Some(PropertyKind::Handler) => {
                let stored = match value {
                    PropValue::Handler(_) => value.clone(),
                    _ => PropValue::Null,
                };
                self.store_property(id, name, stored)
            }
            None if self.options.strict_properties => Err(HostError::UnsupportedProperty {
                tag,
                property: name.to_string(),
            }),
            None => self.store_property(id, name, value.clone()),
        }
    }

    #[instrument(level = "trace", skip(self))]
    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), HostError> {
        let (parent, child) = (*parent, *child);
        self.element(parent)?;
        if !self.contains(child) {
            return Err(HostError::StaleNode);
        }
        if child == self.body {
            return Err(HostError::HierarchyRequest(
                "the body cannot be appended".to_string(),
            ));
        }
        let mut ancestor = Some(parent);
        while let Some(node) = ancestor {
            if node == child {
                return Err(HostError::HierarchyRequest(
                    "a node cannot be appended to itself or its descendant".to_string(),
                ));
            }
            ancestor = self.parent(node);
        }

        self.detach(child);
        if let Some(node) = self.arena.get_mut(child.0) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.arena.get_mut(parent.0) {
            node.children.push(child);
        }
        Ok(())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (index, generation) = self.0.into_raw_parts();
        write!(f, "#{index}v{generation}")
    }
}

pub struct Descendants<'a> {
    document: &'a Document,
    stack: Vec<NodeId>,
}

impl<'a> Descendants<'a> {
    fn new(document: &'a Document, start: NodeId) -> Self {
        let stack = if document.contains(start) {
            vec![start]
        } else {
            Vec::new()
        };
        Self { document, stack }
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Reverse push keeps left-to-right order
        for &child in self.document.child_nodes(current).iter().rev() {
            self.stack.push(child);
        }
        Some(current)
    }
}

pub struct PostOrder<'a> {
    document: &'a Document,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> PostOrder<'a> {
    fn new(document: &'a Document, start: NodeId) -> Self {
        let stack = if document.contains(start) {
            vec![(start, false)]
        } else {
            Vec::new()
        };
        Self { document, stack }
    }
}

impl Iterator for PostOrder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if visited {
                return Some(current);
            }
            self.stack.push((current, true));
            for &child in self.document.child_nodes(current).iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value::Callback;
    use std::cell::Cell;
    use std::rc::Rc;

    fn element(doc: &mut Document, tag: &str) -> NodeId {
        doc.create_element(tag).unwrap()
    }

    #[test]
    fn given_uppercase_tag_when_creating_then_normalizes_to_lowercase() {
        let mut doc = Document::new();
        let div = element(&mut doc, "DIV");
        assert_eq!(doc.tag(div), Some("div"));
        assert!(!doc.is_connected(div));
    }

    #[test]
    fn given_invalid_tag_when_creating_then_errors() {
        let mut doc = Document::new();
        assert_eq!(
            doc.create_element("1div"),
            Err(HostError::InvalidTag("1div".to_string()))
        );
        assert!(doc.create_element("").is_err());
        assert!(doc.create_element("my element").is_err());
    }

    #[test]
    fn given_strict_tags_when_creating_unknown_then_errors() {
        let mut doc = Document::with_options(DocumentOptions {
            strict_tags: true,
            ..Default::default()
        });
        assert_eq!(
            doc.create_element("blink"),
            Err(HostError::UnknownTag("blink".to_string()))
        );
        assert!(doc.create_element("textarea").is_ok());
    }

    #[test]
    fn given_typed_properties_when_assigning_then_coerces() {
        let mut doc = Document::new();
        let input = element(&mut doc, "input");

        doc.set_property(&input, "autofocus", &PropValue::String("yes".into())).unwrap();
        doc.set_property(&input, "maxLength", &PropValue::String("12".into())).unwrap();
        doc.set_property(&input, "id", &PropValue::Number(7.0)).unwrap();

        assert_eq!(doc.property(input, "autofocus"), Some(PropValue::Bool(true)));
        assert_eq!(doc.property(input, "maxLength"), Some(PropValue::Number(12.0)));
        assert_eq!(doc.property(input, "id"), Some(PropValue::String("7".into())));
    }

    #[test]
    fn given_non_numeric_value_for_number_property_when_assigning_then_errors() {
        let mut doc = Document::new();
        let textarea = element(&mut doc, "textarea");
        let result = doc.set_property(&textarea, "rows", &PropValue::String("many".into()));
        assert!(matches!(result, Err(HostError::InvalidPropertyValue { .. })));
    }

    #[test]
    fn given_text_content_when_assigning_then_replaces_children() {
        let mut doc = Document::new();
        let div = element(&mut doc, "div");
        let span = element(&mut doc, "span");
        doc.append_child(&div, &span).unwrap();

        doc.set_property(&div, "textContent", &PropValue::from("hello")).unwrap();

        assert!(!doc.contains(span));
        assert_eq!(doc.child_nodes(div).len(), 1);
        assert!(doc.children(div).is_empty());
        assert_eq!(doc.property(div, "textContent"), Some(PropValue::from("hello")));
    }

    #[test]
    fn given_string_handler_when_assigning_then_stores_null() {
        let mut doc = Document::new();
        let button = element(&mut doc, "button");
        doc.set_property(&button, "onclick", &PropValue::from("Controls.toggle()"))
            .unwrap();

        assert_eq!(doc.property(button, "onclick"), Some(PropValue::Null));
        assert_eq!(doc.dispatch(button, "click"), Ok(false));
    }

    #[test]
    fn given_callback_handler_when_dispatching_then_invokes_once() {
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let cb = Callback::new("summon", move || counter.set(counter.get() + 1));

        let mut doc = Document::new();
        let button = element(&mut doc, "button");
        doc.set_property(&button, "onclick", &PropValue::Handler(cb)).unwrap();
        assert_eq!(hits.get(), 0);

        assert_eq!(doc.dispatch(button, "click"), Ok(true));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn given_node_appended_to_its_descendant_when_appending_then_errors() {
        let mut doc = Document::new();
        let outer = element(&mut doc, "div");
        let inner = element(&mut doc, "div");
        doc.append_child(&outer, &inner).unwrap();

        let result = doc.append_child(&inner, &outer);
        assert!(matches!(result, Err(HostError::HierarchyRequest(_))));
        let result = doc.append_child(&outer, &outer);
        assert!(matches!(result, Err(HostError::HierarchyRequest(_))));
    }

    #[test]
    fn given_attached_child_when_appending_elsewhere_then_moves() {
        let mut doc = Document::new();
        let first = element(&mut doc, "div");
        let second = element(&mut doc, "div");
        let child = element(&mut doc, "span");
        doc.append_child(&first, &child).unwrap();

        doc.append_child(&second, &child).unwrap();

        assert!(doc.child_nodes(first).is_empty());
        assert_eq!(doc.child_nodes(second), &[child]);
        assert_eq!(doc.parent(child), Some(second));
    }

    #[test]
    fn given_removed_node_when_using_handle_then_stale() {
        let mut doc = Document::new();
        let div = element(&mut doc, "div");
        doc.remove(div).unwrap();

        let result = doc.set_property(&div, "id", &PropValue::from("x"));
        assert_eq!(result, Err(HostError::StaleNode));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn given_connected_element_when_looking_up_by_id_then_found() {
        let mut doc = Document::new();
        let container = element(&mut doc, "div");
        doc.set_property(&container, "id", &PropValue::from("test-id")).unwrap();
        assert_eq!(doc.get_element_by_id("test-id"), None);

        let body = doc.body();
        doc.append_child(&body, &container).unwrap();
        assert_eq!(doc.get_element_by_id("test-id"), Some(container));

        let root = element(&mut doc, "p");
        assert_eq!(doc.mount("test-id", root), Ok(container));
        assert!(doc.is_connected(root));
        assert_eq!(
            doc.mount("missing", root),
            Err(HostError::ContainerNotFound("missing".to_string()))
        );
    }

    #[test]
    fn given_tree_when_traversing_then_pre_and_post_order() {
        let mut doc = Document::new();
        let a = element(&mut doc, "div");
        let b = element(&mut doc, "p");
        let c = element(&mut doc, "span");
        let d = element(&mut doc, "i");
        doc.append_child(&a, &b).unwrap();
        doc.append_child(&b, &c).unwrap();
        doc.append_child(&a, &d).unwrap();

        assert_eq!(doc.descendants(a).collect::<Vec<_>>(), vec![a, b, c, d]);
        assert_eq!(doc.post_order(a).collect::<Vec<_>>(), vec![c, b, d, a]);
    }
}
