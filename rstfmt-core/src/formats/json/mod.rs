//! JSON dump of the parse tree
//!
//! Every node becomes an object with a `type` tag, its kind-specific fields, the
//! source `line` and, when it has any, a `children` array.

use crate::error::FormatError;
use crate::format::Format;
use crate::tree::Node;

pub struct JsonFormat;

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Parse tree as pretty-printed JSON"
    }

    fn serialize(&self, doc: &Node) -> Result<String, FormatError> {
        serde_json::to_string_pretty(doc)
            .map_err(|e| FormatError::SerializationError(e.to_string()))
    }
}
