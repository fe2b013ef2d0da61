//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::host::HostError;

/// Domain errors cover malformed descriptions and failures raised by the host
/// while a tree is being built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("{0}")]
    Host(#[from] HostError),

    #[error("description at {path} has no tag name")]
    EmptyDescription { path: String },

    #[error("description at {path} names more than one tag: {}", tags.join(", "))]
    AmbiguousTag { path: String, tags: Vec<String> },

    #[error("invalid description at {path}: {message}")]
    InvalidDescription { path: String, message: String },

    #[error("'children' at {path} must be a list of descriptions")]
    InvalidChildren { path: String },

    #[error("property '{name}' at {path} has an unsupported value: {message}")]
    InvalidPropertyValue {
        path: String,
        name: String,
        message: String,
    },

    #[error("unknown handler '{name}' referenced at {path}")]
    UnknownHandler { path: String, name: String },

    #[error("description nesting exceeds the maximum depth of {max}")]
    DepthExceeded { max: usize },

    #[error("cannot parse {format} description: {message}")]
    Syntax {
        format: &'static str,
        message: String,
    },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
