//! Node descriptions: the declarative input of the tree builder.
//!
//! A description is a mapping with exactly one key, the tag name, whose value
//! is a property bag. The reserved `children` key of a bag holds an ordered
//! list of nested descriptions; every other key is assigned onto the element
//! as a named property.
//!
//! ```json
//! {"div": {"className": "row", "children": [{"input": {"id": "x"}}]}}
//! ```

use std::cell::Cell;
use std::fmt;

use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Value};

use crate::domain::builder::DEFAULT_MAX_DEPTH;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::handlers::HandlerRegistry;
use crate::domain::value::PropValue;

/// Reserved property-bag key holding child descriptions.
pub const CHILDREN_KEY: &str = "children";

/// Key of the single-entry object that references a registered handler.
pub const HANDLER_KEY: &str = "$handler";

/// One element kind and its property bag.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDescription {
    tag: String,
    props: PropertyBag,
}

/// Ordered entries of a description, in source mapping order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyBag {
    entries: Vec<PropEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropEntry {
    Children(Vec<NodeDescription>),
    Property { name: String, value: PropValue },
}

impl NodeDescription {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            props: PropertyBag::default(),
        }
    }

    pub fn with_props(tag: impl Into<String>, props: PropertyBag) -> Self {
        Self {
            tag: tag.into(),
            props,
        }
    }

    /// Append a property entry.
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.push_property(name, value);
        self
    }

    /// Append a `children` entry.
    pub fn children(mut self, children: impl IntoIterator<Item = NodeDescription>) -> Self {
        self.props.push_children(children);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn props(&self) -> &PropertyBag {
        &self.props
    }

    /// Number of descriptions in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self
            .props
            .child_descriptions()
            .map(NodeDescription::node_count)
            .sum::<usize>()
    }

    /// Nesting depth of this subtree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .props
            .child_descriptions()
            .map(NodeDescription::depth)
            .max()
            .unwrap_or(0)
    }

    /// Parse a JSON document, nesting bounded by [`DEFAULT_MAX_DEPTH`].
    pub fn from_json(text: &str, handlers: &HandlerRegistry) -> DomainResult<Self> {
        Self::from_json_with_max_depth(text, handlers, DEFAULT_MAX_DEPTH)
    }

    /// Parse a JSON document whose description nesting may not exceed `max_depth`.
    pub fn from_json_with_max_depth(
        text: &str,
        handlers: &HandlerRegistry,
        max_depth: usize,
    ) -> DomainResult<Self> {
        let exceeded = Cell::new(false);
        let mut deserializer = serde_json::Deserializer::from_str(text);
        // Nesting is bounded by DepthLimited instead
        deserializer.disable_recursion_limit();
        let value = DepthLimited::new(max_depth, &exceeded)
            .deserialize(&mut deserializer)
            .and_then(|value| deserializer.end().map(|()| value))
            .map_err(|e| decode_error("JSON", e, &exceeded, max_depth))?;
        Parser::new(handlers, max_depth).node(&value, "$", 1)
    }

    /// Parse a TOML document. Key order follows the document.
    pub fn from_toml(text: &str, handlers: &HandlerRegistry) -> DomainResult<Self> {
        Self::from_toml_with_max_depth(text, handlers, DEFAULT_MAX_DEPTH)
    }

    pub fn from_toml_with_max_depth(
        text: &str,
        handlers: &HandlerRegistry,
        max_depth: usize,
    ) -> DomainResult<Self> {
        let exceeded = Cell::new(false);
        let value = DepthLimited::new(max_depth, &exceeded)
            .deserialize(toml::Deserializer::new(text))
            .map_err(|e| decode_error("TOML", e, &exceeded, max_depth))?;
        Parser::new(handlers, max_depth).node(&value, "$", 1)
    }

    /// Parse an already-decoded value tree.
    pub fn from_value(value: &Value, handlers: &HandlerRegistry) -> DomainResult<Self> {
        Parser::new(handlers, DEFAULT_MAX_DEPTH).node(value, "$", 1)
    }
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_property(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
        self.entries.push(PropEntry::Property {
            name: name.into(),
            value: value.into(),
        });
    }

    pub fn push_children(&mut self, children: impl IntoIterator<Item = NodeDescription>) {
        self.entries
            .push(PropEntry::Children(children.into_iter().collect()));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PropEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Last value given to `name`, if any.
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.entries.iter().rev().find_map(|entry| match entry {
            PropEntry::Property { name: n, value } if n == name => Some(value),
            _ => None,
        })
    }

    /// All child descriptions across every `children` entry, in order.
    pub fn child_descriptions(&self) -> impl Iterator<Item = &NodeDescription> {
        self.entries.iter().flat_map(PropEntry::child_descriptions)
    }
}

impl PropEntry {
    /// Child descriptions of a `children` entry; empty for properties.
    pub fn child_descriptions(&self) -> &[NodeDescription] {
        match self {
            PropEntry::Children(children) => children,
            PropEntry::Property { .. } => &[],
        }
    }
}

impl<'a> IntoIterator for &'a PropertyBag {
    type Item = &'a PropEntry;
    type IntoIter = std::slice::Iter<'a, PropEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn decode_error(
    format: &'static str,
    error: impl fmt::Display,
    exceeded: &Cell<bool>,
    max_depth: usize,
) -> DomainError {
    if exceeded.get() {
        DomainError::DepthExceeded { max: max_depth }
    } else {
        DomainError::Syntax {
            format,
            message: error.to_string(),
        }
    }
}

/// Decodes a value tree, failing once containers nest deeper than `limit`.
///
/// One description level takes three containers: the node object, its
/// property bag and the `children` list.
#[derive(Clone, Copy)]
struct DepthLimited<'a> {
    depth: usize,
    limit: usize,
    exceeded: &'a Cell<bool>,
}

impl<'a> DepthLimited<'a> {
    fn new(max_depth: usize, exceeded: &'a Cell<bool>) -> Self {
        Self {
            depth: 0,
            limit: max_depth.saturating_mul(3).saturating_add(1),
            exceeded,
        }
    }

    fn enter<E: de::Error>(self) -> Result<Self, E> {
        if self.depth >= self.limit {
            self.exceeded.set(true);
            return Err(E::custom("description nesting limit exceeded"));
        }
        Ok(Self {
            depth: self.depth + 1,
            ..self
        })
    }
}

impl<'de> DeserializeSeed<'de> for DepthLimited<'_> {
    type Value = Value;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for DepthLimited<'_> {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a description value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        DeserializeSeed::deserialize(self, deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let nested = self.enter()?;
        let mut items = Vec::new();
        while let Some(item) = seq.next_element_seed(nested)? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let nested = self.enter()?;
        let mut entries = Map::new();
        while let Some(key) = map.next_key::<String>()? {
            let value = map.next_value_seed(nested)?;
            entries.insert(key, value);
        }
        Ok(Value::Object(entries))
    }
}

/// Turns a decoded value tree into descriptions.
struct Parser<'a> {
    handlers: &'a HandlerRegistry,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    fn new(handlers: &'a HandlerRegistry, max_depth: usize) -> Self {
        Self {
            handlers,
            max_depth,
        }
    }

    fn node(&self, value: &Value, path: &str, depth: usize) -> DomainResult<NodeDescription> {
        if depth > self.max_depth {
            return Err(DomainError::DepthExceeded {
                max: self.max_depth,
            });
        }
        let map = value
            .as_object()
            .ok_or_else(|| DomainError::InvalidDescription {
                path: path.to_string(),
                message: format!("expected a single-key object, found {}", json_type(value)),
            })?;

        let mut keys = map.iter();
        let (tag, body) = match (keys.next(), keys.next()) {
            (None, _) => {
                return Err(DomainError::EmptyDescription {
                    path: path.to_string(),
                })
            }
            (Some(entry), None) => entry,
            (Some(_), Some(_)) => {
                return Err(DomainError::AmbiguousTag {
                    path: path.to_string(),
                    tags: map.keys().cloned().collect(),
                })
            }
        };

        let node_path = format!("{path}.{tag}");
        let bag = body
            .as_object()
            .ok_or_else(|| DomainError::InvalidDescription {
                path: node_path.clone(),
                message: format!("expected a property object, found {}", json_type(body)),
            })?;

        let props = self.bag(bag, &node_path, depth)?;
        Ok(NodeDescription::with_props(tag.clone(), props))
    }

    fn bag(&self, bag: &Map<String, Value>, path: &str, depth: usize) -> DomainResult<PropertyBag> {
        let mut props = PropertyBag::new();
        for (key, value) in bag {
            if key == CHILDREN_KEY {
                let items = value.as_array().ok_or_else(|| DomainError::InvalidChildren {
                    path: format!("{path}.{CHILDREN_KEY}"),
                })?;
                let children = items
                    .iter()
                    .enumerate()
                    .map(|(i, child)| {
                        self.node(child, &format!("{path}.{CHILDREN_KEY}[{i}]"), depth + 1)
                    })
                    .collect::<DomainResult<Vec<_>>>()?;
                props.push_children(children);
            } else {
                props.push_property(key.clone(), self.value(key, value, path)?);
            }
        }
        Ok(props)
    }

    fn value(&self, name: &str, value: &Value, path: &str) -> DomainResult<PropValue> {
        let invalid = |message: String| DomainError::InvalidPropertyValue {
            path: path.to_string(),
            name: name.to_string(),
            message,
        };

        match value {
            Value::Null => Ok(PropValue::Null),
            Value::Bool(b) => Ok(PropValue::Bool(*b)),
            Value::Number(n) => n
                .as_f64()
                .map(PropValue::Number)
                .ok_or_else(|| invalid(format!("number {n} out of range"))),
            Value::String(s) => Ok(PropValue::String(s.clone())),
            Value::Object(obj) => match (obj.len(), obj.get(HANDLER_KEY)) {
                (1, Some(Value::String(handler))) => self
                    .handlers
                    .get(handler)
                    .cloned()
                    .map(PropValue::Handler)
                    .ok_or_else(|| DomainError::UnknownHandler {
                        path: format!("{path}.{name}"),
                        name: handler.clone(),
                    }),
                _ => Err(invalid(format!(
                    "objects are only allowed as {{\"{HANDLER_KEY}\": \"name\"}}"
                ))),
            },
            Value::Array(_) => Err(invalid("lists are only allowed under 'children'".to_string())),
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
