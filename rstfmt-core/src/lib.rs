//! Canonicalizing formatter for reStructuredText
//!
//!     Given a document, produces a semantically equivalent document whose surface
//!     formatting (heading adornments, wrapping, indentation, blank lines) follows one
//!     consistent style. Formatting canonical output again changes nothing.
//!
//!     This is a pure lib: it powers rstfmt-cli but is shell agnostic, no code here
//!     reads files, environment variables or prints.
//!
//! Pipeline
//!
//!     raw text
//!       → normalize::before_parse     line endings, colon-then-bullet, glued directives,
//!                                      adornment lengths
//!       → parser::Parser               document tree (tree.rs), directives captured raw
//!       → formats::rst::serializer     canonical text
//!       → normalize::after_render      undo the colon-then-bullet blank line, trim
//!
//!     The file structure :
//!     .
//!     ├── config.rs               # RenderConfig, the five formatting options
//!     ├── error.rs
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for selecting an output by name
//!     ├── normalize.rs            # text passes around the parser and serializer
//!     ├── parser
//!     │   ├── mod.rs              # block structure
//!     │   ├── inline.rs           # inline markup
//!     │   └── directive.rs        # directive capture
//!     ├── tree.rs                 # document tree
//!     └── formats
//!         ├── rst                 # canonical output
//!         ├── treeviz             # tree view for inspection
//!         └── json                # tree dump for inspection
//!
//! Testing
//!
//!     Unit tests live next to the code. tests/ holds the end-to-end golden cases and
//!     the property tests over `format`.

pub mod config;
pub mod error;
pub mod format;
pub mod formats;
pub mod normalize;
pub mod parser;
pub mod registry;
pub mod tree;

pub use config::RenderConfig;
pub use error::FormatError;
pub use format::Format;
pub use formats::rst::serializer::{render, RstSerializer};
pub use parser::{Parser, ParserOptions};
pub use registry::FormatRegistry;
pub use tree::{Node, NodeKind};

/// Formats a reStructuredText document.
///
/// Deterministic, and idempotent: formatting the output again returns it unchanged.
pub fn format(source: &str, config: &RenderConfig) -> Result<String, FormatError> {
    let doc = parse(source, config)?;
    let rendered = render(&doc, config)?;
    Ok(normalize::after_render(&rendered, config))
}

/// Parses a document the way [`format`] does, pre-normalization included.
///
/// This is the tree the serializer sees, exposed for inspection.
pub fn parse(source: &str, config: &RenderConfig) -> Result<Node, FormatError> {
    config.validate()?;
    let text = normalize::before_parse(source, config);
    tracing::trace!(bytes = text.len(), "normalized input");
    Parser::new(ParserOptions::from_config(config)).parse(&text)
}
