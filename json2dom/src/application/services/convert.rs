//! Conversion service
//!
//! Loads descriptions from files, builds them into an in-memory document and
//! renders the result.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::render::{self, RenderOptions};
use crate::domain::{
    Document, DomainError, HandlerRegistry, Host, NodeDescription, NodeId, PropValue,
    TreeBuilder,
};
use crate::infrastructure::traits::FileSystem;

/// Text format of a description file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Toml,
}

impl InputFormat {
    /// Guess the format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// Result of a conversion: the document, the built root and its container.
#[derive(Debug)]
pub struct ConvertOutput {
    pub document: Document,
    /// Root element built from the description
    pub root: NodeId,
    /// Element the root was mounted into, if any
    pub container: Option<NodeId>,
}

impl ConvertOutput {
    /// Node that rendering starts from: the container when mounted, else the root.
    pub fn render_target(&self) -> NodeId {
        self.container.unwrap_or(self.root)
    }
}

/// Service turning description files into element trees.
pub struct ConvertService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
    handlers: HandlerRegistry,
}

impl ConvertService {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self {
            fs,
            settings,
            handlers: HandlerRegistry::new(),
        }
    }

    /// Use `handlers` to resolve `{"$handler": "name"}` references.
    pub fn with_handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Read and parse a description file.
    ///
    /// Without an explicit `format` the file extension decides.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path, format: Option<InputFormat>) -> ApplicationResult<NodeDescription> {
        let format = format
            .or_else(|| InputFormat::from_path(path))
            .ok_or_else(|| ApplicationError::UnknownFormat(path.to_path_buf()))?;
        let text = self
            .fs
            .read_to_string(path)
            .with_path_context("read description", path)?;
        let description = self.parse(&text, format)?;
        debug!(
            tag = description.tag(),
            nodes = description.node_count(),
            "loaded description"
        );
        Ok(description)
    }

    /// Parse description text.
    pub fn parse(&self, text: &str, format: InputFormat) -> ApplicationResult<NodeDescription> {
        let description = match format {
            InputFormat::Json => {
                NodeDescription::from_json_with_max_depth(text, &self.handlers, self.settings.max_depth)?
            }
            InputFormat::Toml => {
                NodeDescription::from_toml_with_max_depth(text, &self.handlers, self.settings.max_depth)?
            }
        };
        Ok(description)
    }

    /// Build a description into a fresh document, detached from the body.
    #[instrument(level = "debug", skip_all, fields(tag = description.tag()))]
    pub fn convert(&self, description: &NodeDescription) -> ApplicationResult<ConvertOutput> {
        let mut document = Document::with_options(self.settings.document_options());
        let root = self.builder().convert(&mut document, description)?;
        info!(nodes = document.len() - 1, "converted description");
        Ok(ConvertOutput {
            document,
            root,
            container: None,
        })
    }

    /// Build a description and append it to a container element `<div id=container_id>`
    /// under the document body.
    #[instrument(level = "debug", skip(self, description), fields(tag = description.tag()))]
    pub fn convert_and_mount(
        &self,
        description: &NodeDescription,
        container_id: &str,
    ) -> ApplicationResult<ConvertOutput> {
        let mut output = self.convert(description)?;
        let document = &mut output.document;

        let container = document.create_element("div").map_err(DomainError::from)?;
        document
            .set_property(&container, "id", &PropValue::from(container_id))
            .map_err(DomainError::from)?;
        let body = document.body();
        document
            .append_child(&body, &container)
            .map_err(DomainError::from)?;

        let container = document
            .mount(container_id, output.root)
            .map_err(DomainError::from)?;
        output.container = Some(container);
        Ok(output)
    }

    /// Serialize a conversion result as HTML using the configured layout.
    pub fn render(&self, output: &ConvertOutput) -> String {
        self.render_with(output, &self.settings.render_options())
    }

    pub fn render_with(&self, output: &ConvertOutput, options: &RenderOptions) -> String {
        render::to_html(&output.document, output.render_target(), options)
    }

    /// Write rendered HTML to a file.
    pub fn write_output(&self, path: &Path, html: &str) -> ApplicationResult<()> {
        self.fs
            .ensure_parent(path)
            .with_path_context("create output directory", path)?;
        self.fs
            .write(path, &format!("{html}\n"))
            .with_path_context("write output", path)
    }

    fn builder(&self) -> TreeBuilder {
        TreeBuilder::with_max_depth(self.settings.max_depth)
    }
}
