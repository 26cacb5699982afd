//! Directive capture
//!
//! Directives are never interpreted. Whatever their name, the parser hands the raw
//! block to a [`DirectiveHandler`], which splits it into arguments, options and
//! content so the serializer can write it back in canonical form.
//!
//! The block passed to a handler has the text that followed `name::` on the marker
//! line as its first entry, then the indented lines below it, dedented.

use crate::tree::Directive;
use std::collections::BTreeMap;

/// Turns the raw block of a directive into a [`Directive`].
pub trait DirectiveHandler: Send + Sync {
    fn capture(&self, name: &str, block: &[String]) -> Directive;
}

/// The standard handler: accepts every directive name and never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureDirectives;

impl DirectiveHandler for CaptureDirectives {
    fn capture(&self, name: &str, block: &[String]) -> Directive {
        let mut lines = block.iter().map(String::as_str).peekable();

        let arguments = lines
            .next()
            .map(|first| first.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        let mut options = BTreeMap::new();
        while let Some((key, value)) = lines.peek().and_then(|line| field_marker(line)) {
            options.insert(key.to_string(), value.to_string());
            lines.next();
        }

        let mut content: Vec<String> = lines.map(str::to_string).collect();
        while content.last().is_some_and(|line| line.trim().is_empty()) {
            content.pop();
        }
        if content.first().is_some_and(|line| line.trim().is_empty()) {
            content.remove(0);
        }

        Directive {
            name: name.to_string(),
            arguments,
            options,
            content,
        }
    }
}

/// Splits a `:name: value` line into its name and value.
///
/// The name may not start with a colon or a space, may not end with a space, and
/// ends at the first unescaped colon followed by a space or the end of the line.
/// A colon followed by a backtick means the line opens an interpreted-text role
/// instead.
pub(crate) fn field_marker(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix(':')?;
    let mut chars = rest.char_indices().peekable();
    match chars.peek() {
        None | Some((_, ':')) | Some((_, ' ')) => return None,
        _ => {}
    }

    let mut prev = ' ';
    while let Some((index, c)) = chars.next() {
        match c {
            '\\' => {
                prev = chars.next().map(|(_, escaped)| escaped).unwrap_or('\\');
                continue;
            }
            ':' => {
                let after = &rest[index + 1..];
                if after.is_empty() || after.starts_with(' ') {
                    if prev == ' ' {
                        return None;
                    }
                    return Some((&rest[..index], after.trim()));
                }
                if after.starts_with('`') {
                    return None;
                }
            }
            _ => {}
        }
        prev = c;
    }
    None
}
