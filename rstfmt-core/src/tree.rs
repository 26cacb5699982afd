//! Document tree produced by the parser and consumed by the serializer
//!
//! The tree is a closed set of node kinds. Every node remembers the 1-based source
//! line it started on so errors raised while serializing can point back into the
//! input.
//!
//! Inline kinds that carry a `raw` field keep their exact source text, delimiters
//! included. The serializer reproduces them from that text instead of rebuilding
//! the markup.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A node in the document tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,
    pub line: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind, line: usize) -> Self {
        Self {
            kind,
            line,
            children: Vec::new(),
        }
    }

    pub fn with_children(kind: NodeKind, line: usize, children: Vec<Node>) -> Self {
        Self {
            kind,
            line,
            children,
        }
    }

    pub fn text(text: impl Into<String>, line: usize) -> Self {
        Self::new(NodeKind::Text { text: text.into() }, line)
    }

    /// Name of the node kind, as shown by the tree views.
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    /// Concatenated text of every `Text` descendant.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let NodeKind::Text { text } = &self.kind {
            out.push_str(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Depth-first search for the first node matching `predicate`.
    pub fn find(&self, predicate: &dyn Fn(&Node) -> bool) -> Option<&Node> {
        if predicate(self) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(predicate))
    }
}

/// Kinds of nodes in the document tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Document,
    Section,
    Title,
    Paragraph,
    Text {
        text: String,
    },
    Strong {
        raw: String,
    },
    Emphasis {
        raw: String,
    },
    Literal {
        raw: String,
    },
    InterpretedText {
        raw: String,
    },
    SubstitutionReference {
        raw: String,
    },
    Reference {
        raw: String,
    },
    /// Inline targets have a `Text` child, explicit ones have none.
    Target {
        raw: String,
    },
    CitationReference {
        raw: String,
    },
    /// Span matched by one of the configured no-line-break patterns
    NoWrapSpan {
        raw: String,
    },
    /// Citations and footnotes share this kind. Children: `Label`, then body blocks.
    Citation,
    Label,
    BulletList {
        bullet: char,
    },
    ListItem,
    LiteralBlock {
        lines: Vec<String>,
    },
    /// `lines[0]` is the text after `..` on the first line, possibly empty.
    Comment {
        lines: Vec<String>,
    },
    DirectivePlaceholder(Directive),
    SystemMessage {
        severity: Severity,
        message: String,
    },
    Transition,
    Unsupported {
        construct: Construct,
        lines: Vec<String>,
    },
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Document => "Document",
            NodeKind::Section => "Section",
            NodeKind::Title => "Title",
            NodeKind::Paragraph => "Paragraph",
            NodeKind::Text { .. } => "Text",
            NodeKind::Strong { .. } => "Strong",
            NodeKind::Emphasis { .. } => "Emphasis",
            NodeKind::Literal { .. } => "Literal",
            NodeKind::InterpretedText { .. } => "InterpretedText",
            NodeKind::SubstitutionReference { .. } => "SubstitutionReference",
            NodeKind::Reference { .. } => "Reference",
            NodeKind::Target { .. } => "Target",
            NodeKind::CitationReference { .. } => "CitationReference",
            NodeKind::NoWrapSpan { .. } => "NoWrapSpan",
            NodeKind::Citation => "Citation",
            NodeKind::Label => "Label",
            NodeKind::BulletList { .. } => "BulletList",
            NodeKind::ListItem => "ListItem",
            NodeKind::LiteralBlock { .. } => "LiteralBlock",
            NodeKind::Comment { .. } => "Comment",
            NodeKind::DirectivePlaceholder(_) => "Directive",
            NodeKind::SystemMessage { .. } => "SystemMessage",
            NodeKind::Transition => "Transition",
            NodeKind::Unsupported { .. } => "Unsupported",
        }
    }

    /// Source text of inline kinds that are reproduced as one unbreakable unit.
    pub fn raw_source(&self) -> Option<&str> {
        match self {
            NodeKind::Strong { raw }
            | NodeKind::Emphasis { raw }
            | NodeKind::Literal { raw }
            | NodeKind::InterpretedText { raw }
            | NodeKind::SubstitutionReference { raw }
            | NodeKind::Reference { raw }
            | NodeKind::Target { raw }
            | NodeKind::CitationReference { raw }
            | NodeKind::NoWrapSpan { raw } => Some(raw),
            _ => None,
        }
    }
}

/// A directive captured without interpreting it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Directive {
    pub name: String,
    pub arguments: Vec<String>,
    /// Sorted by key, which is also the order they are written back in.
    pub options: BTreeMap<String, String>,
    pub content: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Severe,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Severe => "SEVERE",
        };
        f.write_str(name)
    }
}

/// Block constructs the parser recognises but the serializer cannot reproduce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Construct {
    BlockQuote,
    EnumeratedList,
    DefinitionList,
    FieldList,
    Table,
    LineBlock,
    DoctestBlock,
    SubstitutionDefinition,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Construct::BlockQuote => "block quote",
            Construct::EnumeratedList => "enumerated list",
            Construct::DefinitionList => "definition list",
            Construct::FieldList => "field list",
            Construct::Table => "table",
            Construct::LineBlock => "line block",
            Construct::DoctestBlock => "doctest block",
            Construct::SubstitutionDefinition => "substitution definition",
        };
        f.write_str(name)
    }
}
