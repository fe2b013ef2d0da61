//! Element-construction capability supplied by the surrounding environment.

use thiserror::Error;

use crate::domain::value::PropValue;

/// Failures raised by a host while creating or mutating elements.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("'{0}' is not a valid element name")]
    InvalidTag(String),

    #[error("unknown element kind: <{0}>")]
    UnknownTag(String),

    #[error("cannot assign read-only property '{property}' on <{tag}>")]
    ReadOnlyProperty { tag: String, property: String },

    #[error("property '{property}' is not supported on <{tag}>")]
    UnsupportedProperty { tag: String, property: String },

    #[error("invalid value for '{property}' on <{tag}>: {message}")]
    InvalidPropertyValue {
        tag: String,
        property: String,
        message: String,
    },

    #[error("cannot insert node: {0}")]
    HierarchyRequest(String),

    #[error("no element with id '{0}'")]
    ContainerNotFound(String),

    #[error("node does not belong to this document")]
    StaleNode,

    #[error("node is not an element")]
    NotAnElement,

    #[error("host error: {0}")]
    Js(String),
}

/// The three primitives the tree builder needs from its environment.
///
/// Implementations own the elements; the builder only holds handles.
pub trait Host {
    /// Handle to a constructed element.
    type Element: Clone;

    /// Create a new, detached element of kind `tag`.
    fn create_element(&mut self, tag: &str) -> Result<Self::Element, HostError>;

    /// Assign `value` to the property `name` of `element`.
    fn set_property(
        &mut self,
        element: &Self::Element,
        name: &str,
        value: &PropValue,
    ) -> Result<(), HostError>;

    /// Append `child` as the last child of `parent`.
    fn append_child(
        &mut self,
        parent: &Self::Element,
        child: &Self::Element,
    ) -> Result<(), HostError>;
}
