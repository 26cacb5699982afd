//! Inline markup recognition
//!
//! Start- and end-strings follow the reStructuredText recognition rules: a
//! start-string must be preceded by whitespace, an opening bracket or quote, or the
//! start of the text, and must be followed by a non-whitespace character. An
//! end-string must be preceded by a non-whitespace character and followed by
//! whitespace, closing punctuation or the end of the text. A backslash escapes the
//! character after it.
//!
//! Inline markup does not nest. Text between recognised constructs is scanned with
//! the configured no-line-break patterns.

use crate::tree::{Node, NodeKind, Severity};
use once_cell::sync::Lazy;
use regex::Regex;

const OPENERS: &str = "'\"([{<-/:‘“«";
const CLOSERS: &str = "'\")]}>-/:.,;!?\\’”»";

static SIMPLE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\W_]+(?:[-._+:][^\W_]+)*__?").expect("valid reference pattern")
});
static ROLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^:[^\W_]+(?:[-._+:][^\W_]+)*:").expect("valid role pattern"));
static ROLE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^:[^\W_]+(?:[-._+:][^\W_]+)*:`").expect("valid role pattern"));
static CITATION_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[(\d+|#|#[^\W_]+(?:[-._+:][^\W_]+)*|\*|[^\W_]+(?:[-._+:][^\W_]+)*)\]_")
        .expect("valid citation reference pattern")
});

/// Parses the inline content of paragraphs, titles and labels.
pub(crate) struct InlineParser<'a> {
    no_wrap: &'a [Regex],
}

enum Attempt {
    Matched { end: usize, node: Node },
    Unmatched { skip: usize, message: &'static str },
    NotMarkup,
}

impl<'a> InlineParser<'a> {
    pub(crate) fn new(no_wrap: &'a [Regex]) -> Self {
        Self { no_wrap }
    }

    /// Returns the inline nodes of `text` and any warnings raised on the way.
    ///
    /// `line` is the source line the text starts on.
    pub(crate) fn parse(&self, text: &str, line: usize) -> (Vec<Node>, Vec<Node>) {
        let mut nodes = Vec::new();
        let mut messages = Vec::new();
        let mut gap_start = 0;
        let mut pos = 0;
        let line_at = |pos: usize| line + text[..pos].matches('\n').count();

        while let Some(c) = text[pos..].chars().next() {
            if c == '\\' {
                let escaped = text[pos + 1..].chars().next().map_or(0, char::len_utf8);
                pos += 1 + escaped;
                continue;
            }
            match self.attempt(text, pos, c, line_at(pos)) {
                Attempt::Matched { end, node } => {
                    self.push_text(&text[gap_start..pos], line_at(gap_start), &mut nodes);
                    nodes.push(node);
                    gap_start = end;
                    pos = end;
                }
                Attempt::Unmatched { skip, message } => {
                    messages.push(Node::new(
                        NodeKind::SystemMessage {
                            severity: Severity::Warning,
                            message: message.to_string(),
                        },
                        line_at(pos),
                    ));
                    pos += skip;
                }
                Attempt::NotMarkup => pos += c.len_utf8(),
            }
        }
        self.push_text(&text[gap_start..], line_at(gap_start), &mut nodes);

        (nodes, messages)
    }

    fn attempt(&self, text: &str, pos: usize, c: char, line: usize) -> Attempt {
        let rest = &text[pos..];
        match c {
            '*' if rest.starts_with("**") => delimited(
                text,
                pos,
                ("**", "**"),
                false,
                |raw| NodeKind::Strong { raw },
                "Inline strong start-string without end-string.",
                line,
            ),
            '*' => delimited(
                text,
                pos,
                ("*", "*"),
                false,
                |raw| NodeKind::Emphasis { raw },
                "Inline emphasis start-string without end-string.",
                line,
            ),
            '`' if rest.starts_with("``") => delimited(
                text,
                pos,
                ("``", "``"),
                true,
                |raw| NodeKind::Literal { raw },
                "Inline literal start-string without end-string.",
                line,
            ),
            '`' => {
                if !start_allowed(text, pos, 1) {
                    return Attempt::NotMarkup;
                }
                phrase(text, pos, pos + 1, true, line)
            }
            '_' if rest.starts_with("_`") => delimited(
                text,
                pos,
                ("_`", "`"),
                false,
                |raw| NodeKind::Target { raw },
                "Inline target start-string without end-string.",
                line,
            ),
            '|' => substitution(text, pos, line),
            '[' => citation_reference(text, pos, line),
            ':' => match ROLE_PREFIX.find(rest) {
                Some(prefix) if start_allowed(text, pos, prefix.len()) => {
                    phrase(text, pos, pos + prefix.len(), false, line)
                }
                _ => Attempt::NotMarkup,
            },
            c if c.is_alphanumeric() => simple_reference(text, pos, line),
            _ => Attempt::NotMarkup,
        }
    }

    /// Splits plain text around matches of the no-line-break patterns.
    fn push_text(&self, text: &str, line: usize, nodes: &mut Vec<Node>) {
        let mut start = 0;
        while start < text.len() {
            let earliest = self
                .no_wrap
                .iter()
                .filter_map(|pattern| pattern.find_at(text, start))
                .filter(|m| !m.is_empty())
                .min_by_key(|m| m.start());
            let Some(m) = earliest else { break };
            if m.start() > start {
                nodes.push(Node::text(&text[start..m.start()], line));
            }
            nodes.push(Node::new(
                NodeKind::NoWrapSpan {
                    raw: m.as_str().to_string(),
                },
                line,
            ));
            start = m.end();
        }
        if start < text.len() {
            nodes.push(Node::text(&text[start..], line));
        }
    }
}

fn delimited(
    text: &str,
    pos: usize,
    (start, end): (&str, &str),
    literal: bool,
    make: fn(String) -> NodeKind,
    message: &'static str,
    line: usize,
) -> Attempt {
    if !start_allowed(text, pos, start.len()) {
        return Attempt::NotMarkup;
    }
    let from = pos + start.len();
    match find_end(text, from, end, literal) {
        Some(k) => {
            let span_end = k + end.len();
            Attempt::Matched {
                end: span_end,
                node: Node::with_children(
                    make(text[pos..span_end].to_string()),
                    line,
                    vec![Node::text(&text[from..k], line)],
                ),
            }
        }
        None => Attempt::Unmatched {
            skip: start.len(),
            message,
        },
    }
}

/// Backquoted text: a phrase reference when followed by `_` or `__`, otherwise
/// interpreted text with an optional role before or after it.
fn phrase(text: &str, pos: usize, from: usize, suffix_allowed: bool, line: usize) -> Attempt {
    let mut search = from;
    while let Some(offset) = text[search..].find('`') {
        let k = search + offset;
        search = k + 1;
        if k == from || !closes(text, k, false) {
            continue;
        }
        let after = &text[k + 1..];
        let (suffix, reference) = if !suffix_allowed {
            (0, false)
        } else if after.starts_with("__") {
            (2, true)
        } else if after.starts_with('_') {
            (1, true)
        } else if let Some(role) = ROLE.find(after) {
            (role.len(), false)
        } else {
            (0, false)
        };
        let span_end = k + 1 + suffix;
        if !followed_by_end(text, span_end) {
            continue;
        }
        let raw = text[pos..span_end].to_string();
        let kind = if reference {
            NodeKind::Reference { raw }
        } else {
            NodeKind::InterpretedText { raw }
        };
        return Attempt::Matched {
            end: span_end,
            node: Node::with_children(kind, line, vec![Node::text(&text[from..k], line)]),
        };
    }
    Attempt::Unmatched {
        skip: from - pos,
        message: "Inline interpreted text or phrase reference start-string without end-string.",
    }
}

fn substitution(text: &str, pos: usize, line: usize) -> Attempt {
    if !start_allowed(text, pos, 1) {
        return Attempt::NotMarkup;
    }
    let from = pos + 1;
    let mut search = from;
    while let Some(offset) = text[search..].find('|') {
        let k = search + offset;
        search = k + 1;
        if k == from || !closes(text, k, false) {
            continue;
        }
        let after = &text[k + 1..];
        let suffix = if after.starts_with("__") {
            2
        } else if after.starts_with('_') {
            1
        } else {
            0
        };
        let span_end = k + 1 + suffix;
        if followed_by_end(text, span_end) {
            return Attempt::Matched {
                end: span_end,
                node: Node::with_children(
                    NodeKind::SubstitutionReference {
                        raw: text[pos..span_end].to_string(),
                    },
                    line,
                    vec![Node::text(&text[from..k], line)],
                ),
            };
        }
    }
    Attempt::Unmatched {
        skip: 1,
        message: "Inline substitution_reference start-string without end-string.",
    }
}

fn citation_reference(text: &str, pos: usize, line: usize) -> Attempt {
    if !preceded_by_start(text, pos) {
        return Attempt::NotMarkup;
    }
    match CITATION_REFERENCE.captures(&text[pos..]) {
        Some(caps) => {
            let whole = &caps[0];
            let span_end = pos + whole.len();
            if !followed_by_end(text, span_end) {
                return Attempt::NotMarkup;
            }
            Attempt::Matched {
                end: span_end,
                node: Node::with_children(
                    NodeKind::CitationReference {
                        raw: whole.to_string(),
                    },
                    line,
                    vec![Node::text(&caps[1], line)],
                ),
            }
        }
        None => Attempt::NotMarkup,
    }
}

fn simple_reference(text: &str, pos: usize, line: usize) -> Attempt {
    if !preceded_by_start(text, pos) {
        return Attempt::NotMarkup;
    }
    match SIMPLE_REFERENCE.find(&text[pos..]) {
        Some(m) if followed_by_end(text, pos + m.end()) => {
            let raw = m.as_str();
            Attempt::Matched {
                end: pos + m.end(),
                node: Node::with_children(
                    NodeKind::Reference {
                        raw: raw.to_string(),
                    },
                    line,
                    vec![Node::text(raw.trim_end_matches('_'), line)],
                ),
            }
        }
        _ => Attempt::NotMarkup,
    }
}

fn preceded_by_start(text: &str, pos: usize) -> bool {
    match text[..pos].chars().next_back() {
        None => true,
        Some(c) => c.is_whitespace() || OPENERS.contains(c),
    }
}

fn start_allowed(text: &str, pos: usize, len: usize) -> bool {
    if !preceded_by_start(text, pos) {
        return false;
    }
    let Some(next) = text[pos + len..].chars().next() else {
        return false;
    };
    if next.is_whitespace() {
        return false;
    }
    // `(*)` and friends: markup quoted by a bracket pair is literal text
    match text[..pos].chars().next_back().and_then(closing_partner) {
        Some(partner) => partner != next,
        None => true,
    }
}

fn closing_partner(open: char) -> Option<char> {
    let close = match open {
        '\'' => '\'',
        '"' => '"',
        '(' => ')',
        '[' => ']',
        '{' => '}',
        '<' => '>',
        '‘' => '’',
        '“' => '”',
        '«' => '»',
        _ => return None,
    };
    Some(close)
}

fn find_end(text: &str, from: usize, end: &str, literal: bool) -> Option<usize> {
    let mut search = from;
    while let Some(offset) = text[search..].find(end) {
        let k = search + offset;
        if k > from && closes(text, k, literal) && followed_by_end(text, k + end.len()) {
            return Some(k);
        }
        search = k + 1;
    }
    None
}

/// Whether an end-string may start at `pos`: it needs non-whitespace before it and,
/// outside literals, must not be escaped.
fn closes(text: &str, pos: usize, literal: bool) -> bool {
    match text[..pos].chars().next_back() {
        Some(c) if !c.is_whitespace() => literal || !is_escaped(text, pos),
        _ => false,
    }
}

fn is_escaped(text: &str, pos: usize) -> bool {
    let backslashes = text[..pos]
        .chars()
        .rev()
        .take_while(|&c| c == '\\')
        .count();
    backslashes % 2 == 1
}

fn followed_by_end(text: &str, pos: usize) -> bool {
    match text[pos..].chars().next() {
        None => true,
        Some(c) => c.is_whitespace() || CLOSERS.contains(c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> (Vec<Node>, Vec<Node>) {
        let patterns = vec![Regex::new(r"~[^~]*~").unwrap()];
        InlineParser::new(&patterns).parse(text, 1)
    }

    fn kinds(nodes: &[Node]) -> Vec<&'static str> {
        nodes.iter().map(Node::kind_name).collect()
    }

    fn raw(node: &Node) -> &str {
        node.kind.raw_source().unwrap()
    }

    #[test]
    fn test_plain_text() {
        let (nodes, messages) = parse("Hello, dear world.");
        assert_eq!(nodes, vec![Node::text("Hello, dear world.", 1)]);
        assert!(messages.is_empty());
    }

    #[test]
    fn test_strong_and_emphasis() {
        let (nodes, _) = parse("**Bold** *Italic* done");
        assert_eq!(kinds(&nodes), vec!["Strong", "Text", "Emphasis", "Text"]);
        assert_eq!(raw(&nodes[0]), "**Bold**");
        assert_eq!(nodes[0].plain_text(), "Bold");
        assert_eq!(raw(&nodes[2]), "*Italic*");
    }

    #[test]
    fn test_phrase_and_simple_references() {
        let (nodes, _) = parse("see `some ref`_ and Python_.");
        assert_eq!(kinds(&nodes), vec!["Text", "Reference", "Text", "Reference", "Text"]);
        assert_eq!(raw(&nodes[1]), "`some ref`_");
        assert_eq!(raw(&nodes[3]), "Python_");
        assert_eq!(nodes[3].plain_text(), "Python");
        assert_eq!(nodes[4], Node::text(".", 1));
    }

    #[test]
    fn test_embedded_uri_reference() {
        let (nodes, _) = parse("`Somewhere <Chapter 4>`__ now");
        assert_eq!(raw(&nodes[0]), "`Somewhere <Chapter 4>`__");
    }

    #[test]
    fn test_inline_target_and_literal() {
        let (nodes, _) = parse("_`anchor` and ``co*de``");
        assert_eq!(kinds(&nodes), vec!["Target", "Text", "Literal"]);
        assert_eq!(raw(&nodes[0]), "_`anchor`");
        assert_eq!(raw(&nodes[2]), "``co*de``");
    }

    #[test]
    fn test_roles_and_substitutions() {
        let (nodes, _) = parse(":math:`x^2` and `y`:sub: and |name|_");
        assert_eq!(
            kinds(&nodes),
            vec!["InterpretedText", "Text", "InterpretedText", "Text", "SubstitutionReference"]
        );
        assert_eq!(raw(&nodes[0]), ":math:`x^2`");
        assert_eq!(raw(&nodes[2]), "`y`:sub:");
        assert_eq!(raw(&nodes[4]), "|name|_");
    }

    #[test]
    fn test_citation_reference() {
        let (nodes, _) = parse("Lorem [Ref]_ dolor [1]_.");
        assert_eq!(kinds(&nodes), vec!["Text", "CitationReference", "Text", "CitationReference", "Text"]);
        assert_eq!(raw(&nodes[1]), "[Ref]_");
        assert_eq!(nodes[3].plain_text(), "1");
    }

    #[test]
    fn test_no_wrap_spans_between_markup() {
        let (nodes, _) = parse("~a b~~c d~ and *x*");
        assert_eq!(kinds(&nodes), vec!["NoWrapSpan", "NoWrapSpan", "Text", "Emphasis"]);
        assert_eq!(raw(&nodes[0]), "~a b~");
        assert_eq!(raw(&nodes[1]), "~c d~");
    }

    #[test]
    fn test_start_string_rules() {
        let (nodes, messages) = parse("2 * 3 and a*b* and (*) and snake_case");
        assert_eq!(kinds(&nodes), vec!["Text"]);
        assert!(messages.is_empty());
    }

    #[test]
    fn test_escaped_markup_stays_text() {
        let (nodes, messages) = parse(r"\*not emphasis\*");
        assert_eq!(kinds(&nodes), vec!["Text"]);
        assert!(messages.is_empty());
    }

    #[test]
    fn test_unmatched_start_string_warns() {
        let (nodes, messages) = parse("an *open start");
        assert_eq!(nodes, vec![Node::text("an *open start", 1)]);
        assert_eq!(messages.len(), 1);
        assert!(matches!(
            &messages[0].kind,
            NodeKind::SystemMessage { severity: Severity::Warning, message }
                if message.contains("emphasis")
        ));
    }

    #[test]
    fn test_line_numbers_follow_newlines() {
        let (nodes, _) = parse("first\nsecond *x*");
        assert_eq!(nodes[1].line, 2);
    }
}
