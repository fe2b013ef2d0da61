//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::ConvertService;
use crate::config::Settings;
use crate::domain::HandlerRegistry;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding settings and I/O dependencies shared by services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            settings: Arc::new(settings),
            fs,
        }
    }

    /// Conversion service whose handler registry holds the configured handler names.
    pub fn convert_service(&self) -> ConvertService {
        ConvertService::new(self.fs.clone(), self.settings.clone())
            .with_handlers(HandlerRegistry::logging(self.settings.handlers.iter().cloned()))
    }
}
