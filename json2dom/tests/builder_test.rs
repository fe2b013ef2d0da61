//! Tests for TreeBuilder against the in-memory document

use std::cell::Cell;
use std::rc::Rc;

use json2dom::domain::{
    convert, Callback, Document, DocumentOptions, DomainError, HandlerRegistry, Host, HostError,
    NodeDescription, NodeId, PropValue, TreeBuilder,
};
use json2dom::util::testing;

fn parse(json: &str) -> NodeDescription {
    NodeDescription::from_json(json, &HandlerRegistry::new()).expect("valid description")
}

/// Tag, stored properties and children of a subtree, without node identities.
#[derive(Debug, PartialEq)]
struct Shape {
    tag: Option<String>,
    text: Option<String>,
    properties: Vec<(String, String)>,
    children: Vec<Shape>,
}

fn shape(doc: &Document, node: NodeId) -> Shape {
    Shape {
        tag: doc.tag(node).map(str::to_string),
        text: doc.text(node).map(str::to_string),
        properties: doc
            .properties(node)
            .iter()
            .map(|(name, value)| (name.clone(), value.to_display_string()))
            .collect(),
        children: doc
            .child_nodes(node)
            .iter()
            .map(|&child| shape(doc, child))
            .collect(),
    }
}

#[test]
fn given_empty_bag_when_converting_then_bare_element() {
    // Arrange
    testing::init_test_setup();
    let mut doc = Document::new();

    // Act
    let div = convert(&mut doc, &parse(r#"{"div": {}}"#)).unwrap();

    // Assert
    assert_eq!(doc.tag(div), Some("div"));
    assert!(doc.properties(div).is_empty());
    assert!(doc.child_nodes(div).is_empty());
}

#[test]
fn given_anchor_properties_when_converting_then_assigns_each() {
    // Arrange
    let mut doc = Document::new();
    let description = parse(r#"{"a": {"text": "Apples", "className": "my-styles"}}"#);

    // Act
    let a = convert(&mut doc, &description).unwrap();

    // Assert
    assert_eq!(doc.tag(a), Some("a"));
    assert_eq!(doc.property(a, "text"), Some(PropValue::from("Apples")));
    assert_eq!(doc.property(a, "className"), Some(PropValue::from("my-styles")));
}

#[test]
fn given_children_when_converting_then_appended_in_order() {
    // Arrange
    let mut doc = Document::new();
    let description = parse(
        r#"{"div": {"children": [{"input": {"id": "x"}}, {"button": {"textContent": "Go"}}]}}"#,
    );

    // Act
    let div = convert(&mut doc, &description).unwrap();

    // Assert
    let children = doc.children(div);
    assert_eq!(children.len(), 2);
    assert_eq!(doc.tag(children[0]), Some("input"));
    assert_eq!(doc.property(children[0], "id"), Some(PropValue::from("x")));
    assert_eq!(doc.tag(children[1]), Some("button"));
    assert_eq!(
        doc.property(children[1], "textContent"),
        Some(PropValue::from("Go"))
    );
    assert_eq!(doc.parent(children[0]), Some(div));
}

#[test]
fn given_callback_property_when_converting_then_stored_but_not_invoked() {
    // Arrange
    let hits = Rc::new(Cell::new(0));
    let counter = hits.clone();
    let callback = Callback::new("someCallback", move || counter.set(counter.get() + 1));
    let description = NodeDescription::new("button").prop("onclick", callback.clone());
    let mut doc = Document::new();

    // Act
    let button = convert(&mut doc, &description).unwrap();

    // Assert
    assert_eq!(hits.get(), 0);
    let stored = doc.property(button, "onclick").unwrap();
    assert!(stored.as_handler().is_some_and(|cb| cb.ptr_eq(&callback)));

    assert!(doc.dispatch(button, "click").unwrap());
    assert_eq!(hits.get(), 1);
}

#[test]
fn given_nested_description_when_converting_then_structure_mirrors_input() {
    // Arrange
    let mut doc = Document::new();
    let description = parse(
        r#"{"ul": {"children": [
            {"li": {"textContent": "one"}},
            {"li": {"children": [{"b": {"textContent": "two"}}]}},
            {"li": {}}
        ]}}"#,
    );

    // Act
    let ul = convert(&mut doc, &description).unwrap();

    // Assert
    let items = doc.children(ul);
    let expected: Vec<_> = description.props().child_descriptions().collect();
    assert_eq!(items.len(), expected.len());
    for (item, child) in items.iter().zip(expected) {
        assert_eq!(doc.tag(*item), Some(child.tag()));
    }
    assert_eq!(doc.text_content(ul), "onetwo");
    assert!(doc.children(items[2]).is_empty());
}

#[test]
fn given_every_value_type_when_converting_then_expandos_keep_values() {
    // Arrange
    let mut doc = Document::new();
    let description = parse(r#"{"div": {"count": 3, "flag": true, "label": "x", "none": null}}"#);

    // Act
    let div = convert(&mut doc, &description).unwrap();

    // Assert
    assert_eq!(doc.property(div, "count"), Some(PropValue::Number(3.0)));
    assert_eq!(doc.property(div, "flag"), Some(PropValue::Bool(true)));
    assert_eq!(doc.property(div, "label"), Some(PropValue::from("x")));
    assert_eq!(doc.property(div, "none"), Some(PropValue::Null));
}

#[test]
fn given_description_when_converting_then_input_is_unchanged() {
    // Arrange
    let description = parse(r#"{"div": {"id": "a", "children": [{"span": {"textContent": "t"}}]}}"#);
    let before = description.clone();
    let mut doc = Document::new();

    // Act
    convert(&mut doc, &description).unwrap();

    // Assert
    assert_eq!(description, before);
}

#[test]
fn given_prior_tree_when_converting_again_then_prior_tree_untouched() {
    // Arrange
    let mut doc = Document::new();
    let first = convert(&mut doc, &parse(r#"{"div": {"id": "first"}}"#)).unwrap();
    let first_shape = shape(&doc, first);

    // Act
    let second = convert(
        &mut doc,
        &parse(r#"{"div": {"id": "second", "children": [{"p": {}}]}}"#),
    )
    .unwrap();

    // Assert
    assert_ne!(first, second);
    assert_eq!(shape(&doc, first), first_shape);
    assert_eq!(doc.parent(first), None);
    assert_eq!(doc.parent(second), None);
}

#[test]
fn given_equal_descriptions_when_converting_twice_then_trees_equivalent() {
    // Arrange
    let json = r#"{"form": {"name": "f", "children": [
        {"input": {"type": "text", "maxLength": 8}},
        {"button": {"textContent": "Send", "disabled": true}}
    ]}}"#;
    let mut doc = Document::new();

    // Act
    let a = convert(&mut doc, &parse(json)).unwrap();
    let b = convert(&mut doc, &parse(json)).unwrap();

    // Assert
    assert_ne!(a, b);
    assert_eq!(shape(&doc, a), shape(&doc, b));
}

#[test]
fn given_empty_children_list_when_converting_then_leaf() {
    let mut doc = Document::new();

    let div = convert(&mut doc, &parse(r#"{"div": {"children": []}}"#)).unwrap();

    assert!(doc.child_nodes(div).is_empty());
}

#[test]
fn given_read_only_property_when_converting_then_error_propagates() {
    // Arrange
    let mut doc = Document::new();
    let description = parse(r#"{"div": {"children": [{"span": {"tagName": "p"}}]}}"#);

    // Act
    let result = convert(&mut doc, &description);

    // Assert
    assert_eq!(
        result.unwrap_err(),
        DomainError::Host(HostError::ReadOnlyProperty {
            tag: "span".into(),
            property: "tagName".into(),
        })
    );
}

#[test]
fn given_invalid_tag_when_converting_then_error_propagates() {
    let mut doc = Document::new();

    let result = convert(&mut doc, &parse(r#"{"div": {"children": [{"1nvalid": {}}]}}"#));

    assert_eq!(
        result.unwrap_err(),
        DomainError::Host(HostError::InvalidTag("1nvalid".into()))
    );
}

#[test]
fn given_strict_document_when_converting_unknown_names_then_rejected() {
    // Arrange
    let options = DocumentOptions {
        strict_tags: true,
        strict_properties: true,
    };

    // Act
    let unknown_tag = convert(
        &mut Document::with_options(options),
        &parse(r#"{"blink": {}}"#),
    );
    let unknown_property = convert(
        &mut Document::with_options(options),
        &parse(r#"{"div": {"colour": "red"}}"#),
    );

    // Assert
    assert_eq!(
        unknown_tag.unwrap_err(),
        DomainError::Host(HostError::UnknownTag("blink".into()))
    );
    assert_eq!(
        unknown_property.unwrap_err(),
        DomainError::Host(HostError::UnsupportedProperty {
            tag: "div".into(),
            property: "colour".into(),
        })
    );
}

#[test]
fn given_non_numeric_value_for_number_property_when_converting_then_rejected() {
    let mut doc = Document::new();

    let result = convert(&mut doc, &parse(r#"{"input": {"maxLength": "lots"}}"#));

    assert!(matches!(
        result,
        Err(DomainError::Host(HostError::InvalidPropertyValue { ref property, .. })) if property == "maxLength"
    ));
}

#[test]
fn given_string_handler_when_converting_then_stored_as_null() {
    let mut doc = Document::new();

    let button = convert(&mut doc, &parse(r#"{"button": {"onclick": "go()"}}"#)).unwrap();

    assert_eq!(doc.property(button, "onclick"), Some(PropValue::Null));
    assert!(!doc.dispatch(button, "click").unwrap());
}

#[test]
fn given_on_prefixed_non_event_name_when_converting_then_kept_as_string_expando() {
    // Arrange
    let mut doc = Document::new();
    let description = parse(r#"{"div": {"online": "yes", "onion": "layers"}}"#);

    // Act
    let div = convert(&mut doc, &description).unwrap();

    // Assert
    assert_eq!(doc.property(div, "online"), Some(PropValue::from("yes")));
    assert_eq!(doc.property(div, "onion"), Some(PropValue::from("layers")));
}

#[test]
fn given_depth_limit_when_description_is_deeper_then_rejected() {
    // Arrange
    let description = NodeDescription::new("div").children([NodeDescription::new("div")
        .children([NodeDescription::new("div")])]);
    let mut doc = Document::new();

    // Act
    let shallow = TreeBuilder::with_max_depth(2).convert(&mut doc, &description);
    let exact = TreeBuilder::with_max_depth(3).convert(&mut doc, &description);

    // Assert
    assert_eq!(shallow.unwrap_err(), DomainError::DepthExceeded { max: 2 });
    assert!(exact.is_ok());
}

#[test]
fn given_converted_tree_when_mounting_then_connected_under_container() {
    // Arrange
    let mut doc = Document::new();
    let container = doc.create_element("div").unwrap();
    doc.set_property(&container, "id", &PropValue::from("app")).unwrap();
    let body = doc.body();
    doc.append_child(&body, &container).unwrap();
    let root = convert(&mut doc, &parse(r#"{"p": {"id": "para"}}"#)).unwrap();
    assert!(!doc.is_connected(root));

    // Act
    let mounted = doc.mount("app", root).unwrap();

    // Assert
    assert_eq!(mounted, container);
    assert!(doc.is_connected(root));
    assert_eq!(doc.get_element_by_id("para"), Some(root));
    assert_eq!(
        doc.mount("missing", root).unwrap_err(),
        HostError::ContainerNotFound("missing".into())
    );
}
