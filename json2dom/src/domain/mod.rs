//! Domain layer: descriptions, the host abstraction and the tree builder
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod description;
pub mod error;
pub mod handlers;
pub mod host;
pub mod properties;
pub mod render;
pub mod value;

pub use arena::{Document, DocumentOptions, NodeId};
pub use builder::{convert, TreeBuilder};
pub use description::{NodeDescription, PropEntry, PropertyBag, CHILDREN_KEY};
pub use error::{DomainError, DomainResult};
pub use handlers::HandlerRegistry;
pub use host::{Host, HostError};
pub use render::RenderOptions;
pub use value::{Callback, PropValue};
