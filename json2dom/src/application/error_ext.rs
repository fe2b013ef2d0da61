//! Error conversion helpers for I/O performed by services

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for turning `io::Result` into `ApplicationResult`.
pub trait IoResultExt<T> {
    /// Attach the action and the path it touched, e.g. "read description: page.json".
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::OperationFailed {
            context: format!("{action}: {}", path.display()),
            source: Box::new(source),
        })
    }
}
