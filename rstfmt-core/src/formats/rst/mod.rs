//! Canonical reStructuredText output
//!
//! Serializes a parsed tree with [`RstSerializer`] and runs the post-render
//! normalization over the result, so the output is exactly what [`crate::format`]
//! would produce for the same tree.

use crate::config::RenderConfig;
use crate::error::FormatError;
use crate::format::Format;
use crate::normalize;
use crate::tree::Node;

pub mod serializer;

use serializer::RstSerializer;

#[derive(Debug, Clone, Default)]
pub struct RstFormat {
    config: RenderConfig,
}

impl RstFormat {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }
}

impl Format for RstFormat {
    fn name(&self) -> &str {
        "rst"
    }

    fn description(&self) -> &str {
        "Canonical reStructuredText"
    }

    fn serialize(&self, doc: &Node) -> Result<String, FormatError> {
        let rendered = RstSerializer::new(&self.config).serialize(doc)?;
        Ok(normalize::after_render(&rendered, &self.config))
    }
}
