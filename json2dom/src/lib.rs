//! json2dom: build element trees from nested key-value descriptions.
//!
//! A description is a single-key mapping from a tag name to a property bag.
//! The reserved `children` key holds nested descriptions; every other key is
//! assigned to the created element in the order it appears.
//!
//! ```
//! use json2dom::domain::{convert, Document, HandlerRegistry, NodeDescription};
//!
//! let description = NodeDescription::from_json(
//!     r#"{"div": {"id": "root", "children": [{"span": {"textContent": "hi"}}]}}"#,
//!     &HandlerRegistry::new(),
//! )
//! .unwrap();
//! let mut document = Document::new();
//! let root = convert(&mut document, &description).unwrap();
//! assert_eq!(document.tag(root), Some("div"));
//! assert_eq!(document.text_content(root), "hi");
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
