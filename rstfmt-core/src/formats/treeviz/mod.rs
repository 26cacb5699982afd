//! Treeviz formatter for document trees
//!
//! Treeviz is a visual representation of the parse tree, one line per node. Nesting
//! is drawn with box connectors, two columns per level:
//!
//! <prefix><connector> <icon> <label> (label truncated to 30 characters)
//!
//! Example:
//!
//! ⧉ Document (2 items)
//! ├─ § Introduction
//! │ ├─ ⊤ Introduction
//! │ │ └─ ◦ Introduction
//! │ └─ ¶ This is a two-lined para…
//! │   └─ ◦ This is a two-lined para…
//! └─ ≔ note::
//!
//! Parameters (see [`to_treeviz_str_with_params`]):
//!     show-linum: prefix every line with the source line of the node

use super::icons::get_icon;
use crate::error::FormatError;
use crate::format::Format;
use crate::tree::{Node, NodeKind};
use std::collections::HashMap;

const LABEL_WIDTH: usize = 30;

fn display_label(node: &Node) -> String {
    let label = match &node.kind {
        NodeKind::Document => String::new(),
        NodeKind::Text { text } => text.clone(),
        NodeKind::Section | NodeKind::Citation => node
            .children
            .first()
            .map(Node::plain_text)
            .unwrap_or_default(),
        NodeKind::BulletList { bullet } => {
            format!("{} {} items", bullet, node.children.len())
        }
        NodeKind::LiteralBlock { lines } | NodeKind::Comment { lines } => {
            lines.first().cloned().unwrap_or_default()
        }
        NodeKind::DirectivePlaceholder(directive) => {
            let mut label = format!("{}::", directive.name);
            for argument in &directive.arguments {
                label.push(' ');
                label.push_str(argument);
            }
            label
        }
        NodeKind::SystemMessage { severity, message } => format!("{severity}: {message}"),
        NodeKind::Transition => "----".to_string(),
        NodeKind::Unsupported { construct, .. } => construct.to_string(),
        kind => match kind.raw_source() {
            Some(raw) if node.children.is_empty() => raw.to_string(),
            _ => node.plain_text(),
        },
    };
    truncate(&label.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn truncate(label: &str) -> String {
    if label.chars().count() <= LABEL_WIDTH {
        return label.to_string();
    }
    let mut out: String = label.chars().take(LABEL_WIDTH - 1).collect();
    out.push('…');
    out
}

fn format_node(
    node: &Node,
    prefix: &str,
    child_index: usize,
    child_count: usize,
    show_linum: bool,
) -> String {
    let is_last = child_index == child_count - 1;
    let connector = if is_last { "└─" } else { "├─" };
    let icon = get_icon(node.kind_name());

    let linum_prefix = if show_linum {
        format!("{:02} ", node.line)
    } else {
        String::new()
    };

    let mut output = format!(
        "{}{}{} {} {}\n",
        linum_prefix,
        prefix,
        connector,
        icon,
        display_label(node)
    );

    let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    output.push_str(&format_children(&node.children, &child_prefix, show_linum));
    output
}

fn format_children(children: &[Node], prefix: &str, show_linum: bool) -> String {
    let child_count = children.len();
    children
        .iter()
        .enumerate()
        .map(|(i, child)| format_node(child, prefix, i, child_count, show_linum))
        .collect()
}

pub fn to_treeviz_str(doc: &Node) -> String {
    to_treeviz_str_with_params(doc, &HashMap::new())
}

/// Convert a document to a treeviz string with optional parameters
///
/// - `"show-linum"`: anything but `"false"` prefixes each node with its source line
pub fn to_treeviz_str_with_params(doc: &Node, params: &HashMap<String, String>) -> String {
    let show_linum = params
        .get("show-linum")
        .map(|v| v != "false")
        .unwrap_or(false);

    let icon = get_icon("Document");
    let output = format!("{} Document ({} items)\n", icon, doc.children.len());
    output + &format_children(&doc.children, "", show_linum)
}

/// Format implementation for treeviz format
pub struct TreevizFormat;

impl Format for TreevizFormat {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn description(&self) -> &str {
        "Visual tree representation with indentation and Unicode icons"
    }

    fn serialize(&self, doc: &Node) -> Result<String, FormatError> {
        Ok(to_treeviz_str(doc))
    }

    fn serialize_with_options(
        &self,
        doc: &Node,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        if let Some(unknown) = options.keys().find(|key| key.as_str() != "show-linum") {
            return Err(FormatError::SerializationError(format!(
                "treeviz does not take parameter '{unknown}'"
            )));
        }
        Ok(to_treeviz_str_with_params(doc, options))
    }
}
