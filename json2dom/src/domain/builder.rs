//! Tree builder: turns a node description into a constructed element subtree.

use tracing::{instrument, trace};

use crate::domain::description::{NodeDescription, PropEntry};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::host::Host;

/// Default limit on description nesting.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Builds element trees through a [`Host`].
///
/// Holds no state between calls; every `convert` creates fresh elements.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    max_depth: usize,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Convert `description` into a new element with all children attached.
    ///
    /// Entries of the property bag are applied in order: `children` entries
    /// convert and append each child in sequence, every other entry is
    /// assigned as a property. The first host failure aborts the whole call.
    /// The returned element is not inserted anywhere.
    #[instrument(level = "debug", skip_all, fields(tag = %description.tag()))]
    pub fn convert<H: Host>(&self, host: &mut H, description: &NodeDescription) -> DomainResult<H::Element> {
        self.convert_at(host, description, 1)
    }

    fn convert_at<H: Host>(
        &self,
        host: &mut H,
        description: &NodeDescription,
        depth: usize,
    ) -> DomainResult<H::Element> {
        if depth > self.max_depth {
            return Err(DomainError::DepthExceeded {
                max: self.max_depth,
            });
        }

        let element = host.create_element(description.tag())?;
        for entry in description.props() {
            match entry {
                PropEntry::Children(children) => {
                    for child in children {
                        let child_element = self.convert_at(host, child, depth + 1)?;
                        host.append_child(&element, &child_element)?;
                    }
                }
                PropEntry::Property { name, value } => {
                    trace!(tag = description.tag(), property = %name, "assign");
                    host.set_property(&element, name, value)?;
                }
            }
        }
        Ok(element)
    }
}

/// Convert with a default [`TreeBuilder`].
pub fn convert<H: Host>(host: &mut H, description: &NodeDescription) -> DomainResult<H::Element> {
    TreeBuilder::new().convert(host, description)
}
