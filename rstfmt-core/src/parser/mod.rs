//! reStructuredText parser
//!
//! Builds the document tree the serializer walks. The parser is configured
//! explicitly through [`ParserOptions`]:
//!
//! - `no_wrap`: patterns whose matches in running text become `NoWrapSpan` nodes
//! - `directives`: the [`DirectiveHandler`] every directive is routed through,
//!   whatever its name
//!
//! It never rewrites the structure it read: titles stay where they were written,
//! no references are resolved and nothing is promoted to a document title.
//!
//! Block constructs the serializer has no rule for (block quotes, tables,
//! definition lists...) are still recognised, so that their lines are not folded
//! into a neighbouring paragraph, and come out as `Unsupported` nodes.
//! Recoverable defects in the input come out as `SystemMessage` nodes.

pub mod directive;
mod inline;

pub use directive::{CaptureDirectives, DirectiveHandler};

use crate::config::RenderConfig;
use crate::error::FormatError;
use crate::tree::{Construct, Node, NodeKind, Severity};
use inline::InlineParser;
use once_cell::sync::Lazy;
use regex::Regex;

static BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([-*+•‣⁃])( +|$)").expect("valid bullet pattern"));
static ENUMERATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?:\d+|#|[a-zA-Z]|[ivxlcdmIVXLCDM]+)[.)]|\((?:\d+|#|[a-zA-Z]|[ivxlcdmIVXLCDM]+)\))( +|$)",
    )
    .expect("valid enumerator pattern")
});
static DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^\W_]+(?:[-._+:][^\W_]+)*) ?::( +|$)").expect("valid directive pattern")
});
static CITATION_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[(\d+|#|#[^\W_]+(?:[-._+:][^\W_]+)*|\*|[^\W_]+(?:[-._+:][^\W_]+)*)\]( +|$)")
        .expect("valid label pattern")
});
static GRID_TABLE_BORDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+-[-+]*\+$").expect("valid table pattern"));
static SIMPLE_TABLE_BORDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^=+( +=+)+$").expect("valid table pattern"));
static LINE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\|( +|$)").expect("valid line block pattern"));
static DOCTEST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^>>>( +|$)").expect("valid doctest pattern"));

const TAB_WIDTH: usize = 8;

/// How the parser treats inline patterns and directives
pub struct ParserOptions<'a> {
    pub no_wrap: &'a [Regex],
    pub directives: &'a dyn DirectiveHandler,
}

impl<'a> ParserOptions<'a> {
    /// Options matching a render configuration, capturing every directive.
    pub fn from_config(config: &'a RenderConfig) -> Self {
        Self {
            no_wrap: &config.no_line_break_regexes,
            directives: &CaptureDirectives,
        }
    }
}

pub struct Parser<'a> {
    directives: &'a dyn DirectiveHandler,
    inline: InlineParser<'a>,
}

/// A source line with tabs expanded and trailing whitespace removed
#[derive(Debug, Clone)]
struct Line {
    number: usize,
    text: String,
}

impl Line {
    fn is_blank(&self) -> bool {
        self.text.is_empty()
    }

    fn indent(&self) -> usize {
        self.text.len() - self.text.trim_start_matches(' ').len()
    }

    /// A line made of one repeated punctuation character.
    fn adornment(&self) -> Option<char> {
        let first = self.text.chars().next()?;
        (first.is_ascii_punctuation() && self.text.chars().all(|c| c == first)).then_some(first)
    }
}

/// Overline character (if any) and underline character
type TitleStyle = (Option<char>, char);

enum Block {
    Node(Node),
    Title {
        style: TitleStyle,
        title: Node,
        messages: Vec<Node>,
    },
}

impl<'a> Parser<'a> {
    pub fn new(options: ParserOptions<'a>) -> Self {
        Self {
            directives: options.directives,
            inline: InlineParser::new(options.no_wrap),
        }
    }

    pub fn parse(&self, text: &str) -> Result<Node, FormatError> {
        let lines: Vec<Line> = text
            .lines()
            .enumerate()
            .map(|(index, line)| Line {
                number: index + 1,
                text: expand_tabs(line).trim_end().to_string(),
            })
            .collect();

        let mut blocks = Vec::new();
        self.parse_blocks(&lines, true, &mut blocks)?;
        let children = nest_sections(blocks)?;
        tracing::trace!(lines = lines.len(), items = children.len(), "parsed document");
        Ok(Node::with_children(NodeKind::Document, 1, children))
    }

    /// Parses a nested body (list item, citation) where titles are not allowed.
    fn parse_body(&self, lines: &[Line]) -> Result<Vec<Node>, FormatError> {
        let mut blocks = Vec::new();
        self.parse_blocks(lines, false, &mut blocks)?;
        Ok(blocks
            .into_iter()
            .filter_map(|block| match block {
                Block::Node(node) => Some(node),
                Block::Title { .. } => None,
            })
            .collect())
    }

    fn parse_blocks(
        &self,
        lines: &[Line],
        titles: bool,
        out: &mut Vec<Block>,
    ) -> Result<(), FormatError> {
        let mut i = 0;
        let mut expect_literal = false;

        while i < lines.len() {
            let line = &lines[i];
            if line.is_blank() {
                i += 1;
                continue;
            }

            if line.indent() > 0 {
                let end = indented_end(lines, i);
                let block = dedent(&lines[i..end]);
                let node = if expect_literal {
                    Node::new(
                        NodeKind::LiteralBlock {
                            lines: block.into_iter().map(|line| line.text).collect(),
                        },
                        line.number,
                    )
                } else {
                    unsupported(Construct::BlockQuote, &lines[i..end])
                };
                out.push(Block::Node(node));
                expect_literal = false;
                i = end;
                continue;
            }

            if expect_literal {
                out.push(message(
                    Severity::Warning,
                    "Literal block expected; none found.",
                    line.number,
                ));
                expect_literal = false;
            }

            let text = line.text.as_str();
            i = if text == ".." || text.starts_with(".. ") {
                self.explicit_markup(lines, i, out)?
            } else if text == "__" || text.starts_with("__ ") {
                self.anonymous_target(lines, i, out)
            } else if let Some(caps) = BULLET.captures(text) {
                let bullet = caps[1].chars().next().unwrap_or('-');
                self.bullet_list(lines, i, bullet, out)?
            } else if ENUMERATOR.is_match(text) && enumerated_item_follows(lines, i) {
                consume_unsupported(lines, i, Construct::EnumeratedList, out, |line| {
                    ENUMERATOR.is_match(&line.text)
                })
            } else if directive::field_marker(text).is_some() {
                consume_unsupported(lines, i, Construct::FieldList, out, |line| {
                    directive::field_marker(&line.text).is_some()
                })
            } else if GRID_TABLE_BORDER.is_match(text) {
                let end = until_blank(lines, i);
                out.push(Block::Node(unsupported(Construct::Table, &lines[i..end])));
                end
            } else if SIMPLE_TABLE_BORDER.is_match(text) {
                let end = simple_table_end(lines, i);
                out.push(Block::Node(unsupported(Construct::Table, &lines[i..end])));
                end
            } else if LINE_BLOCK.is_match(text) {
                let end = until_blank(lines, i);
                out.push(Block::Node(unsupported(Construct::LineBlock, &lines[i..end])));
                end
            } else if DOCTEST.is_match(text) {
                let end = until_blank(lines, i);
                out.push(Block::Node(unsupported(Construct::DoctestBlock, &lines[i..end])));
                end
            } else if let Some(next) = self.adorned(lines, i, titles, out)? {
                next
            } else {
                let (next, literal) = self.paragraph(lines, i, out)?;
                expect_literal = literal;
                next
            };
        }
        Ok(())
    }

    fn explicit_markup(
        &self,
        lines: &[Line],
        i: usize,
        out: &mut Vec<Block>,
    ) -> Result<usize, FormatError> {
        let number = lines[i].number;
        let first = lines[i].text[2..].trim_start();
        // An empty comment followed by a blank line does not swallow the next block.
        let (block, end) = if first.is_empty() && lines.get(i + 1).map_or(true, Line::is_blank) {
            (
                vec![Line {
                    number,
                    text: String::new(),
                }],
                (i + 2).min(lines.len()),
            )
        } else {
            first_known_block(lines, i, first)
        };

        let node = if first.starts_with('_') {
            Node::new(
                NodeKind::Target {
                    raw: join_raw(".. ", &block),
                },
                number,
            )
        } else if let Some(caps) = CITATION_LABEL.captures(first) {
            let label = Node::with_children(
                NodeKind::Label,
                number,
                vec![Node::text(&caps[1], number)],
            );
            let mut body = block;
            body[0].text = first[caps[0].len()..].to_string();
            let mut children = vec![label];
            children.extend(self.parse_body(&body)?);
            Node::with_children(NodeKind::Citation, number, children)
        } else if first.starts_with('|') {
            unsupported(Construct::SubstitutionDefinition, &lines[i..end])
        } else if let Some(caps) = DIRECTIVE.captures(first) {
            let mut raw: Vec<String> = block.into_iter().map(|line| line.text).collect();
            raw[0] = first[caps[0].len()..].to_string();
            let directive = self.directives.capture(&caps[1], &raw);
            Node::new(NodeKind::DirectivePlaceholder(directive), number)
        } else {
            Node::new(
                NodeKind::Comment {
                    lines: block.into_iter().map(|line| line.text).collect(),
                },
                number,
            )
        };
        out.push(Block::Node(node));

        if !blank_finish(lines, end) {
            out.push(message(
                Severity::Warning,
                "Explicit markup ends without a blank line; unexpected unindent.",
                lines[end].number,
            ));
        }
        Ok(end)
    }

    fn anonymous_target(&self, lines: &[Line], i: usize, out: &mut Vec<Block>) -> usize {
        let first = lines[i].text[2..].trim_start();
        let (block, end) = first_known_block(lines, i, first);
        out.push(Block::Node(Node::new(
            NodeKind::Target {
                raw: join_raw("__ ", &block),
            },
            lines[i].number,
        )));
        if !blank_finish(lines, end) {
            out.push(message(
                Severity::Warning,
                "Explicit markup ends without a blank line; unexpected unindent.",
                lines[end].number,
            ));
        }
        end
    }

    fn bullet_list(
        &self,
        lines: &[Line],
        start: usize,
        bullet: char,
        out: &mut Vec<Block>,
    ) -> Result<usize, FormatError> {
        let mut items = Vec::new();
        let mut i = start;
        loop {
            let line = &lines[i];
            let marker_end = BULLET.find(&line.text).map_or(1, |m| m.end());
            let (body, end) = first_known_block(lines, i, &line.text[marker_end..]);
            items.push(Node::with_children(
                NodeKind::ListItem,
                line.number,
                self.parse_body(&body)?,
            ));
            i = end;
            let continues = lines
                .get(i)
                .and_then(|next| BULLET.captures(&next.text))
                .is_some_and(|caps| caps[1].starts_with(bullet));
            if !continues {
                break;
            }
        }

        out.push(Block::Node(Node::with_children(
            NodeKind::BulletList { bullet },
            lines[start].number,
            items,
        )));
        if !blank_finish(lines, i) {
            out.push(message(
                Severity::Warning,
                "Bullet list ends without a blank line; unexpected unindent.",
                lines[i].number,
            ));
        }
        Ok(i)
    }

    /// Section titles and transitions. Returns `None` when the lines at `i` are
    /// neither, so the caller can read them as a paragraph.
    fn adorned(
        &self,
        lines: &[Line],
        i: usize,
        titles: bool,
        out: &mut Vec<Block>,
    ) -> Result<Option<usize>, FormatError> {
        let line = &lines[i];
        let next = lines.get(i + 1);

        if let Some(over) = line.adornment() {
            let over_len = line.text.chars().count();
            let text_line = next.filter(|next| !next.is_blank() && next.adornment().is_none());
            let under = lines.get(i + 2).and_then(Line::adornment);
            if let (Some(text_line), Some(under)) = (text_line, under) {
                let title_text = text_line.text.trim();
                let title_len = title_text.chars().count();
                if under == over && (over_len >= 4 || over_len >= title_len) {
                    let mut messages = Vec::new();
                    if over_len < title_len {
                        messages.push(message_node(
                            Severity::Warning,
                            "Title overline too short.",
                            line.number,
                        ));
                    }
                    self.push_title(
                        (Some(over), under),
                        title_text,
                        text_line.number,
                        titles,
                        messages,
                        out,
                    )?;
                    return Ok(Some(i + 3));
                }
            }

            if next.map_or(true, Line::is_blank) && over_len >= 4 {
                out.push(Block::Node(Node::new(NodeKind::Transition, line.number)));
                return Ok(Some(i + 1));
            }
            return Ok(None);
        }

        let Some(under) = next.and_then(Line::adornment) else {
            return Ok(None);
        };
        let title_text = line.text.as_str();
        let title_len = title_text.chars().count();
        let under_len = next.map_or(0, |next| next.text.chars().count());
        if under_len < title_len && under_len < 4 {
            out.push(message(
                Severity::Info,
                "Possible title underline, too short for the title. Treating it as ordinary text because it's so short.",
                line.number + 1,
            ));
            return Ok(None);
        }

        let mut messages = Vec::new();
        if under_len < title_len {
            messages.push(message_node(
                Severity::Warning,
                "Title underline too short.",
                line.number + 1,
            ));
        }
        self.push_title((None, under), title_text, line.number, titles, messages, out)?;
        Ok(Some(i + 2))
    }

    fn push_title(
        &self,
        style: TitleStyle,
        text: &str,
        number: usize,
        titles: bool,
        mut messages: Vec<Node>,
        out: &mut Vec<Block>,
    ) -> Result<(), FormatError> {
        if !titles {
            return Err(FormatError::UnexpectedSectionTitle { line: number });
        }
        let (children, inline_messages) = self.inline.parse(text, number);
        messages.extend(inline_messages);
        out.push(Block::Title {
            style,
            title: Node::with_children(NodeKind::Title, number, children),
            messages,
        });
        Ok(())
    }

    /// Returns the index after the paragraph and whether it ends with `::`.
    fn paragraph(
        &self,
        lines: &[Line],
        start: usize,
        out: &mut Vec<Block>,
    ) -> Result<(usize, bool), FormatError> {
        let mut end = start + 1;
        while end < lines.len() && !lines[end].is_blank() && lines[end].indent() == 0 {
            end += 1;
        }

        let indented_next = lines.get(end).is_some_and(|line| !line.is_blank());
        if indented_next && end == start + 1 {
            let block_end = indented_end(lines, end);
            out.push(Block::Node(unsupported(
                Construct::DefinitionList,
                &lines[start..block_end],
            )));
            return Ok((block_end, false));
        }

        let text = lines[start..end]
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let number = lines[start].number;
        let (children, messages) = self.inline.parse(&text, number);
        out.push(Block::Node(Node::with_children(
            NodeKind::Paragraph,
            number,
            children,
        )));
        out.extend(messages.into_iter().map(Block::Node));

        if indented_next {
            out.push(message(
                Severity::Error,
                "Unexpected indentation.",
                lines[end].number,
            ));
        }
        Ok((end, text.ends_with("::")))
    }
}

/// Turns the flat sequence of titles and blocks into nested sections.
///
/// Title styles get their level in order of first appearance. A style not seen
/// before may only open a level directly below the deepest one seen so far.
fn nest_sections(blocks: Vec<Block>) -> Result<Vec<Node>, FormatError> {
    let mut styles: Vec<TitleStyle> = Vec::new();
    let mut root: Vec<Node> = Vec::new();
    let mut open: Vec<Node> = Vec::new();

    for block in blocks {
        match block {
            Block::Node(node) => match open.last_mut() {
                Some(section) => section.children.push(node),
                None => root.push(node),
            },
            Block::Title {
                style,
                title,
                messages,
            } => {
                let line = title.line;
                let level = match styles.iter().position(|known| *known == style) {
                    Some(index) => index + 1,
                    None if styles.len() == open.len() => {
                        styles.push(style);
                        styles.len()
                    }
                    None => return Err(FormatError::InconsistentTitleLevel { line }),
                };
                if level > open.len() + 1 {
                    return Err(FormatError::InconsistentTitleLevel { line });
                }
                while open.len() >= level {
                    close_section(&mut open, &mut root);
                }
                let mut children = vec![title];
                children.extend(messages);
                open.push(Node::with_children(NodeKind::Section, line, children));
            }
        }
    }
    while !open.is_empty() {
        close_section(&mut open, &mut root);
    }
    Ok(root)
}

fn close_section(open: &mut Vec<Node>, root: &mut Vec<Node>) {
    if let Some(section) = open.pop() {
        match open.last_mut() {
            Some(parent) => parent.children.push(section),
            None => root.push(section),
        }
    }
}

fn message(severity: Severity, text: &str, line: usize) -> Block {
    Block::Node(message_node(severity, text, line))
}

fn message_node(severity: Severity, text: &str, line: usize) -> Node {
    Node::new(
        NodeKind::SystemMessage {
            severity,
            message: text.to_string(),
        },
        line,
    )
}

fn unsupported(construct: Construct, lines: &[Line]) -> Node {
    Node::new(
        NodeKind::Unsupported {
            construct,
            lines: lines.iter().map(|line| line.text.clone()).collect(),
        },
        lines.first().map_or(0, |line| line.number),
    )
}

/// Consumes a run of items that each start with a line accepted by `is_item`.
fn consume_unsupported(
    lines: &[Line],
    start: usize,
    construct: Construct,
    out: &mut Vec<Block>,
    is_item: impl Fn(&Line) -> bool,
) -> usize {
    let mut end = indented_end(lines, start + 1);
    while lines.get(end).is_some_and(&is_item) {
        end = indented_end(lines, end + 1);
    }
    out.push(Block::Node(unsupported(construct, &lines[start..end])));
    end
}

/// An enumerator only starts a list when the item is followed by a blank line,
/// an indented line, another enumerator or the end of the text.
fn enumerated_item_follows(lines: &[Line], i: usize) -> bool {
    match lines.get(i + 1) {
        None => true,
        Some(next) => next.is_blank() || next.indent() > 0 || ENUMERATOR.is_match(&next.text),
    }
}

fn simple_table_end(lines: &[Line], start: usize) -> usize {
    let mut i = start + 1;
    while i < lines.len() {
        if SIMPLE_TABLE_BORDER.is_match(&lines[i].text)
            && lines.get(i + 1).map_or(true, Line::is_blank)
        {
            return i + 1;
        }
        i += 1;
    }
    lines.len()
}

fn until_blank(lines: &[Line], start: usize) -> usize {
    let mut end = start;
    while end < lines.len() && !lines[end].is_blank() {
        end += 1;
    }
    end
}

/// Index of the first non-blank line in column 0 at or after `start`.
fn indented_end(lines: &[Line], start: usize) -> usize {
    let mut end = start;
    while end < lines.len() && (lines[end].is_blank() || lines[end].indent() > 0) {
        end += 1;
    }
    end
}

/// Whether the block ending before `end` was followed by a blank line (or the end
/// of the text) rather than running straight into unindented text.
fn blank_finish(lines: &[Line], end: usize) -> bool {
    end >= lines.len() || (end > 0 && lines[end - 1].is_blank())
}

/// A block whose first line starts after a marker and whose following lines are
/// indented by any amount. The following lines are dedented by their common
/// indentation; trailing blank lines are dropped.
fn first_known_block(lines: &[Line], start: usize, first: &str) -> (Vec<Line>, usize) {
    let end = indented_end(lines, start + 1);
    let mut block = vec![Line {
        number: lines[start].number,
        text: first.to_string(),
    }];
    block.extend(dedent(&lines[start + 1..end]));
    while block.len() > 1 && block.last().is_some_and(Line::is_blank) {
        block.pop();
    }
    (block, end)
}

fn dedent(lines: &[Line]) -> Vec<Line> {
    let indent = lines
        .iter()
        .filter(|line| !line.is_blank())
        .map(Line::indent)
        .min()
        .unwrap_or(0);
    let mut block: Vec<Line> = lines
        .iter()
        .map(|line| Line {
            number: line.number,
            text: line.text.get(indent..).unwrap_or_default().to_string(),
        })
        .collect();
    while block.last().is_some_and(Line::is_blank) {
        block.pop();
    }
    block
}

/// `prefix` plus the first line, continuation lines joined below it.
fn join_raw(prefix: &str, block: &[Line]) -> String {
    let mut raw = prefix.to_string();
    for (index, line) in block.iter().enumerate() {
        if index > 0 {
            raw.push('\n');
        }
        raw.push_str(&line.text);
    }
    raw
}

fn expand_tabs(line: &str) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len());
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let spaces = TAB_WIDTH - column % TAB_WIDTH;
            out.push_str(&" ".repeat(spaces));
            column += spaces;
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}
