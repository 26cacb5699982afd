//! Error types for formatting operations

use crate::tree::Construct;

/// Errors that can occur while formatting a document.
///
/// Every variant is fatal for the document being formatted: there is no partial
/// output. Parse-level defects that the parser can recover from never show up
/// here, they become `SystemMessage` nodes instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatError {
    /// `max_line_length` must allow at least one character per line
    #[error("max_line_length must be a positive integer")]
    InvalidLineLength,

    /// `title_order` has no entries
    #[error("title_order must contain at least one entry")]
    EmptyTitleOrder,

    /// A `title_order` entry is not one or two punctuation characters
    #[error("invalid title_order entry {0:?}: expected one or two punctuation characters")]
    InvalidTitleAdornment(String),

    /// A `no_line_break_regexes` entry does not compile
    #[error("invalid no_line_break pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The document nests sections deeper than `title_order` has entries
    #[error(
        "not enough title characters defined in title_order: section at line {line} has depth {depth}, only {available} configured"
    )]
    TitleDepthExceeded {
        depth: usize,
        available: usize,
        line: usize,
    },

    /// A section title uses an adornment style that cannot open a new level here
    #[error("line {line}: title level inconsistent with the sections above it")]
    InconsistentTitleLevel { line: usize },

    /// A section title appears inside a list item, citation or other nested block
    #[error("line {line}: unexpected section title inside a nested block")]
    UnexpectedSectionTitle { line: usize },

    /// A directive was reached while the current output line is not empty
    #[error("line {line}: directive `{name}` must start on a fresh line")]
    DirectiveNotAtLineStart { name: String, line: usize },

    /// The tree contains a construct the renderer cannot reproduce
    #[error("line {line}: {construct} is not supported by the formatter")]
    Unsupported { construct: Construct, line: usize },

    /// No output format registered under this name
    #[error("format not found: {0}")]
    FormatNotFound(String),

    /// A tree view could not be produced
    #[error("serialization error: {0}")]
    SerializationError(String),
}

impl FormatError {
    /// Whether the error comes from the configuration rather than the document.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            FormatError::InvalidLineLength
                | FormatError::EmptyTitleOrder
                | FormatError::InvalidTitleAdornment(_)
                | FormatError::InvalidPattern { .. }
                | FormatError::TitleDepthExceeded { .. }
        )
    }
}
