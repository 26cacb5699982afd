//! Canonical reStructuredText serializer
//!
//! Walks the document tree depth first and writes it back through a single
//! word-wrapping primitive, [`RstSerializer::emit`]. Every decision about where a
//! line breaks, how far it is indented and where blank lines go is made here.
//!
//! Inline constructs that must not be split across lines (emphasis, references,
//! targets, no-wrap spans...) are written through a hold-space: while one is open,
//! emitted words collect in a buffer instead of the output, and the construct is
//! then placed as one unbreakable word using its stored source text.
//!
//! Blank lines between blocks are requested, not written: a block that wants a
//! blank line after it sets a flag, and the next paragraph, title, citation,
//! directive or list consumes it.

use crate::config::RenderConfig;
use crate::error::FormatError;
use crate::tree::{Directive, Node, NodeKind};
use once_cell::sync::Lazy;
use regex::Regex;

const INDENT: &str = "  ";

static NEWLINE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\n\s*").expect("valid whitespace pattern"));

/// What the last inline element written ended with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Previous {
    /// Whitespace, a line break or the start of a block
    Break,
    /// Text ending in a non-whitespace character
    Text,
    /// An unbreakable span
    Span,
}

#[derive(Debug, Clone)]
struct Word {
    text: String,
    glued: bool,
}

pub struct RstSerializer<'a> {
    config: &'a RenderConfig,
    output: String,
    hold_space: Vec<Vec<Word>>,
    line_length: usize,
    /// Byte offset in `output` where the text of the current line starts
    line_start: usize,
    /// Byte offset in `output` of the last run of glued words on the current line
    unit_start: usize,
    unit_width: usize,
    indent_level: usize,
    section_depth: usize,
    bullets: Vec<char>,
    need_blank_line: bool,
    previous: Previous,
}

impl<'a> RstSerializer<'a> {
    pub fn new(config: &'a RenderConfig) -> Self {
        Self {
            config,
            output: String::new(),
            hold_space: Vec::new(),
            line_length: 0,
            line_start: 0,
            unit_start: 0,
            unit_width: 0,
            indent_level: 0,
            section_depth: 0,
            bullets: Vec::new(),
            need_blank_line: false,
            previous: Previous::Break,
        }
    }

    pub fn serialize(mut self, doc: &Node) -> Result<String, FormatError> {
        self.walk(doc)?;
        assert!(
            self.hold_space.is_empty(),
            "hold-space not empty after serializing"
        );
        debug_assert_eq!(self.indent_level, 0);
        Ok(self.output)
    }

    fn walk(&mut self, node: &Node) -> Result<(), FormatError> {
        match &node.kind {
            NodeKind::Document => self.walk_children(node),
            NodeKind::Transition => {
                tracing::debug!(line = node.line, "dropping transition");
                self.walk_children(node)
            }
            NodeKind::Section => {
                self.section_depth += 1;
                let result = self.walk_children(node);
                self.section_depth -= 1;
                result
            }
            NodeKind::Title => self.title(node),
            NodeKind::Paragraph => {
                self.flush_blank_line();
                self.previous = Previous::Break;
                self.walk_children(node)?;
                self.emit::<&str>(&[], 1);
                self.need_blank_line = true;
                Ok(())
            }
            NodeKind::Text { text } => {
                self.text(text);
                Ok(())
            }
            NodeKind::BulletList { bullet } => {
                if !self.bullets.is_empty() || self.need_blank_line {
                    self.emit::<&str>(&[], 1);
                }
                self.bullets.push(*bullet);
                let result = self.walk_children(node);
                self.bullets.pop();
                result
            }
            NodeKind::ListItem => self.list_item(node),
            NodeKind::Target { raw } if node.children.is_empty() => {
                self.explicit_target(raw);
                Ok(())
            }
            NodeKind::Citation => {
                self.flush_blank_line();
                self.emit(&[".."], 0);
                let result = self.indented(|s| s.walk_children(node));
                self.end_line();
                self.need_blank_line = true;
                result
            }
            NodeKind::Label => {
                let label = self.hold(|s| s.walk_children(node))?;
                self.emit(&[format!("[{label}]")], 0);
                Ok(())
            }
            NodeKind::DirectivePlaceholder(directive) => self.directive(directive, node.line),
            NodeKind::Comment { lines } => {
                self.comment(lines);
                Ok(())
            }
            NodeKind::LiteralBlock { lines } => {
                self.flush_blank_line();
                self.indent_level += 1;
                for line in lines {
                    self.emit(&[line], 1);
                }
                self.indent_level -= 1;
                self.need_blank_line = true;
                Ok(())
            }
            NodeKind::SystemMessage { severity, message } => {
                tracing::debug!(line = node.line, %severity, %message, "dropping system message");
                Ok(())
            }
            NodeKind::Unsupported { construct, .. } => Err(FormatError::Unsupported {
                construct: *construct,
                line: node.line,
            }),
            NodeKind::Strong { raw }
            | NodeKind::Emphasis { raw }
            | NodeKind::Literal { raw }
            | NodeKind::InterpretedText { raw }
            | NodeKind::SubstitutionReference { raw }
            | NodeKind::Reference { raw }
            | NodeKind::Target { raw }
            | NodeKind::CitationReference { raw }
            | NodeKind::NoWrapSpan { raw } => self.span(node, raw),
        }
    }

    fn walk_children(&mut self, node: &Node) -> Result<(), FormatError> {
        node.children.iter().try_for_each(|child| self.walk(child))
    }

    /// Writes words through the line wrapper, then `newlines` line breaks.
    ///
    /// Inside a non-breakable span the words go to the innermost hold-space
    /// instead, and line breaks are not allowed.
    fn emit<S: AsRef<str>>(&mut self, words: &[S], newlines: usize) {
        for word in words {
            self.place(word.as_ref(), false);
        }
        self.break_lines(newlines);
    }

    fn break_lines(&mut self, newlines: usize) {
        if newlines == 0 {
            return;
        }
        assert!(
            self.hold_space.is_empty(),
            "line break requested inside a non-breakable span"
        );
        self.output.push_str(&"\n".repeat(newlines));
        self.line_length = 0;
        self.previous = Previous::Break;
    }

    /// Places a single word.
    ///
    /// A glued word attaches to the previous one without a space. When the pair
    /// overflows, the line breaks before the whole run of glued words. Words that
    /// would read back as a bullet or an adornment never start a continuation line.
    fn place(&mut self, word: &str, glued: bool) {
        if word.is_empty() {
            return;
        }
        if let Some(held) = self.hold_space.last_mut() {
            held.push(Word {
                text: word.to_string(),
                glued,
            });
            return;
        }

        let width = word.chars().count();
        let max = self.config.max_line_length;
        if self.line_length == 0 {
            self.start_line(word, width);
        } else if glued {
            if self.line_length + width > max && self.unit_start > self.line_start {
                let unit = self.output.split_off(self.unit_start);
                if can_start_line(&format!("{unit}{word}")) {
                    if self.output.ends_with(' ') {
                        self.output.pop();
                    }
                    self.output.push('\n');
                    let unit_width = self.unit_width;
                    self.start_line(&unit, unit_width);
                } else {
                    self.output.push_str(&unit);
                }
            }
            self.output.push_str(word);
            self.line_length += width;
            self.unit_width += width;
        } else if self.line_length + 1 + width > max && can_start_line(word) {
            self.output.push('\n');
            self.start_line(word, width);
        } else {
            self.output.push(' ');
            self.unit_start = self.output.len();
            self.output.push_str(word);
            self.line_length += 1 + width;
            self.unit_width = width;
        }
    }

    fn start_line(&mut self, word: &str, width: usize) {
        let indent = INDENT.repeat(self.indent_level);
        self.output.push_str(&indent);
        self.line_start = self.output.len();
        self.unit_start = self.line_start;
        self.output.push_str(word);
        self.line_length = indent.len() + width;
        self.unit_width = width;
    }

    fn text(&mut self, text: &str) {
        let mut first = true;
        let attached = !text.starts_with([' ', '\n']) && self.previous != Previous::Break;
        for word in text.split([' ', '\n']).filter(|word| !word.is_empty()) {
            self.place(word, first && attached);
            first = false;
        }
        if !text.is_empty() {
            self.previous = if text.ends_with([' ', '\n']) {
                Previous::Break
            } else {
                Previous::Text
            };
        }
    }

    fn span(&mut self, node: &Node, raw: &str) -> Result<(), FormatError> {
        self.hold(|s| s.walk_children(node))?;
        let raw = NEWLINE_RUN.replace_all(raw, " ");
        let glued = self.previous == Previous::Text;
        self.place(&raw, glued);
        self.previous = Previous::Span;
        Ok(())
    }

    /// Runs `f` with a fresh hold-space and returns what it collected, joined.
    /// The hold-space is released on every path out, errors included.
    fn hold<F>(&mut self, f: F) -> Result<String, FormatError>
    where
        F: FnOnce(&mut Self) -> Result<(), FormatError>,
    {
        let previous = self.previous;
        self.hold_space.push(Vec::new());
        self.previous = Previous::Break;
        let result = f(self);
        let words = self.hold_space.pop().unwrap_or_default();
        self.previous = previous;
        result.map(|()| join_words(&words))
    }

    fn indented<F>(&mut self, f: F) -> Result<(), FormatError>
    where
        F: FnOnce(&mut Self) -> Result<(), FormatError>,
    {
        self.indent_level += 1;
        let result = f(self);
        self.indent_level -= 1;
        result
    }

    fn flush_blank_line(&mut self) {
        if self.need_blank_line {
            self.emit::<&str>(&[], 1);
            self.need_blank_line = false;
        }
    }

    fn end_line(&mut self) {
        if self.line_length > 0 {
            self.emit::<&str>(&[], 1);
        }
    }

    fn title(&mut self, node: &Node) -> Result<(), FormatError> {
        self.flush_blank_line();
        let text = self.hold(|s| s.walk_children(node))?;

        let depth = self.section_depth;
        let adornment = self
            .config
            .adornment(depth)
            .ok_or_else(|| FormatError::TitleDepthExceeded {
                depth,
                available: self.config.title_order.len(),
                line: node.line,
            })?;
        let chars: Vec<char> = adornment.chars().collect();
        let width = text.chars().count();

        if let [over, _] = chars.as_slice() {
            self.emit(&[over.to_string().repeat(width)], 1);
        }
        self.emit(&[text], 1);
        if let Some(under) = chars.last() {
            self.emit(&[under.to_string().repeat(width)], 1);
        }
        if self.config.blank_line_after_title(depth) {
            self.need_blank_line = true;
        }
        Ok(())
    }

    fn list_item(&mut self, node: &Node) -> Result<(), FormatError> {
        let bullet = self.bullets.last().copied().unwrap_or('-');
        self.emit(&[bullet.to_string()], 0);
        self.need_blank_line = false;
        self.indented(|s| s.walk_children(node))?;
        self.end_line();
        Ok(())
    }

    fn explicit_target(&mut self, raw: &str) {
        self.flush_blank_line();
        let mut lines = raw.split('\n');
        if let Some(first) = lines.next() {
            self.emit(&[first], 1);
        }
        self.indent_level += 1;
        for line in lines {
            self.emit(&[line], 1);
        }
        self.indent_level -= 1;
        self.need_blank_line = true;
    }

    fn directive(&mut self, directive: &Directive, line: usize) -> Result<(), FormatError> {
        self.flush_blank_line();
        if self.line_length != 0 {
            return Err(FormatError::DirectiveNotAtLineStart {
                name: directive.name.clone(),
                line,
            });
        }

        let mut header = vec![format!(".. {}::", directive.name)];
        header.extend(directive.arguments.iter().cloned());
        self.emit(&header, 1);

        self.indent_level += 1;
        for (key, value) in &directive.options {
            self.emit(&[format!(":{key}:"), value.clone()], 1);
        }
        let has_header_fields = !directive.options.is_empty() || !directive.arguments.is_empty();
        if has_header_fields && !directive.content.is_empty() {
            self.emit::<&str>(&[], 1);
        }
        for line in &directive.content {
            self.emit(&[line], 1);
        }
        self.indent_level -= 1;
        self.need_blank_line = true;
        Ok(())
    }

    fn comment(&mut self, lines: &[String]) {
        self.flush_blank_line();
        let (first, rest) = match lines.split_first() {
            Some((first, rest)) => (first.as_str(), rest),
            None => ("", &[][..]),
        };
        self.emit(&["..", first], 1);
        self.indent_level += 1;
        for line in rest {
            self.emit(&[line], 1);
        }
        self.indent_level -= 1;
        self.need_blank_line = true;
    }
}

/// Whether a continuation line may start with `word` and still read back as
/// paragraph text: bullet markers and runs of one punctuation character
/// (adornments, `..`) would not.
fn can_start_line(word: &str) -> bool {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return true;
    };
    let bullet = matches!(first, '•' | '‣' | '⁃') && chars.next().is_none();
    let run = first.is_ascii_punctuation() && word.chars().all(|c| c == first);
    !(bullet || run)
}

fn join_words(words: &[Word]) -> String {
    let mut out = String::new();
    for (index, word) in words.iter().enumerate() {
        if index > 0 && !word.glued {
            out.push(' ');
        }
        out.push_str(&word.text);
    }
    out
}

/// Serializes a parsed document with the given configuration.
pub fn render(doc: &Node, config: &RenderConfig) -> Result<String, FormatError> {
    RstSerializer::new(config).serialize(doc)
}
