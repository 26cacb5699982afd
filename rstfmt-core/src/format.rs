//! Format trait definition
//!
//! A format turns a parsed document tree into text. The canonical reStructuredText
//! output is one format, the inspection views (treeviz, json) are others, and they
//! all share this interface so the CLI can pick one by name.

use crate::error::FormatError;
use crate::tree::Node;
use std::collections::HashMap;

/// Trait for output formats
///
/// # Examples
///
/// ```ignore
/// struct CountFormat;
///
/// impl Format for CountFormat {
///     fn name(&self) -> &str {
///         "count"
///     }
///
///     fn serialize(&self, doc: &Node) -> Result<String, FormatError> {
///         Ok(doc.children.len().to_string())
///     }
/// }
/// ```
pub trait Format: Send + Sync {
    /// The name of this format (e.g., "rst", "treeviz", "json")
    fn name(&self) -> &str;

    /// Optional description of this format
    fn description(&self) -> &str {
        ""
    }

    /// Serialize a document tree into text
    fn serialize(&self, doc: &Node) -> Result<String, FormatError>;

    /// Serialize a document tree, optionally using extra parameters.
    ///
    /// Formats without parameters can rely on the default implementation, which
    /// rejects any option it is given.
    fn serialize_with_options(
        &self,
        doc: &Node,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        if options.is_empty() {
            self.serialize(doc)
        } else {
            Err(FormatError::SerializationError(format!(
                "format '{}' does not take extra parameters",
                self.name()
            )))
        }
    }
}
