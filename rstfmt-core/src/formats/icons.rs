//! Shared icon mapping for tree visualization

/// Get the Unicode icon for a node kind name, as returned by `Node::kind_name`
pub fn get_icon(node_type: &str) -> &'static str {
    match node_type {
        "Document" => "⧉",
        "Section" => "§",
        "Title" => "⊤",
        "Paragraph" => "¶",
        "Text" => "◦",
        "Strong" => "𝐁",
        "Emphasis" => "𝐼",
        "Literal" => "ƒ",
        "InterpretedText" => "ƒ",
        "SubstitutionReference" => "|",
        "Reference" => "⊕",
        "Target" => "⌖",
        "CitationReference" => "†",
        "NoWrapSpan" => "~",
        "Citation" => "³",
        "Label" => "#",
        "BulletList" => "☰",
        "ListItem" => "•",
        "LiteralBlock" => "𝒱",
        "Comment" => "\"",
        "Directive" => "≔",
        "SystemMessage" => "⚠",
        "Transition" => "⎯",
        "Unsupported" => "∅",
        _ => "○",
    }
}
