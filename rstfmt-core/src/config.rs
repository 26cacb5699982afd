use crate::error::FormatError;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Pattern used when no `no_line_break_regexes` are configured: `~...~` spans.
pub const DEFAULT_NO_LINE_BREAK: &str = r"~[^~]*~";

/// Configuration for the rst formatter
///
/// The value is read-only while a document is formatted, so one instance can be
/// shared between threads formatting independent documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RenderOptions", into = "RenderOptions")]
pub struct RenderConfig {
    /// Soft wrap width for prose
    pub max_line_length: usize,

    /// Everything matching one of these patterns is never broken across lines
    pub no_line_break_regexes: Vec<Regex>,

    /// Adornment per section depth. Two characters means overline and underline.
    pub title_order: Vec<String>,

    /// Titles at this depth or shallower are followed by a blank line
    pub newline_after_title: i64,

    /// Keep the blank line between a line ending in ':' and a following bullet list
    pub newline_bullet_list: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_line_length: 120,
            no_line_break_regexes: vec![
                Regex::new(DEFAULT_NO_LINE_BREAK).expect("default pattern compiles")
            ],
            title_order: default_title_order(),
            newline_after_title: 2,
            newline_bullet_list: false,
        }
    }
}

impl PartialEq for RenderConfig {
    fn eq(&self, other: &Self) -> bool {
        self.max_line_length == other.max_line_length
            && self.title_order == other.title_order
            && self.newline_after_title == other.newline_after_title
            && self.newline_bullet_list == other.newline_bullet_list
            && self.no_line_break_regexes.len() == other.no_line_break_regexes.len()
            && self
                .no_line_break_regexes
                .iter()
                .zip(&other.no_line_break_regexes)
                .all(|(a, b)| a.as_str() == b.as_str())
    }
}

impl RenderConfig {
    /// Checks the invariants the formatter relies on.
    pub fn validate(&self) -> Result<(), FormatError> {
        if self.max_line_length == 0 {
            return Err(FormatError::InvalidLineLength);
        }
        if self.title_order.is_empty() {
            return Err(FormatError::EmptyTitleOrder);
        }
        for entry in &self.title_order {
            let chars: Vec<char> = entry.chars().collect();
            let valid = match chars.as_slice() {
                [c] => c.is_ascii_punctuation(),
                [over, under] => over.is_ascii_punctuation() && over == under,
                _ => false,
            };
            if !valid {
                return Err(FormatError::InvalidTitleAdornment(entry.clone()));
            }
        }
        Ok(())
    }

    /// Adornment characters for a section depth (1-based).
    pub fn adornment(&self, depth: usize) -> Option<&str> {
        depth
            .checked_sub(1)
            .and_then(|index| self.title_order.get(index))
            .map(String::as_str)
    }

    /// Every character that appears anywhere in `title_order`, deduplicated.
    pub fn title_chars(&self) -> Vec<char> {
        let mut chars: Vec<char> = Vec::new();
        for c in self.title_order.iter().flat_map(|entry| entry.chars()) {
            if !chars.contains(&c) {
                chars.push(c);
            }
        }
        chars
    }

    /// Whether a title at `depth` asks for a blank line before the next block.
    pub fn blank_line_after_title(&self, depth: usize) -> bool {
        i64::try_from(depth).is_ok_and(|depth| depth <= self.newline_after_title)
    }
}

fn default_title_order() -> Vec<String> {
    ["==", "=", "-", "^"].iter().map(|s| s.to_string()).collect()
}

/// Serialized form of [`RenderConfig`], with patterns kept as strings.
///
/// Unknown keys are rejected: the five fields below are the whole surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RenderOptions {
    pub max_line_length: usize,
    pub no_line_break_regexes: Vec<String>,
    pub title_order: Vec<String>,
    pub newline_after_title: i64,
    pub newline_bullet_list: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_line_length: 120,
            no_line_break_regexes: vec![DEFAULT_NO_LINE_BREAK.to_string()],
            title_order: default_title_order(),
            newline_after_title: 2,
            newline_bullet_list: false,
        }
    }
}

impl TryFrom<RenderOptions> for RenderConfig {
    type Error = FormatError;

    fn try_from(options: RenderOptions) -> Result<Self, Self::Error> {
        let no_line_break_regexes = options
            .no_line_break_regexes
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| FormatError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let config = RenderConfig {
            max_line_length: options.max_line_length,
            no_line_break_regexes,
            title_order: options.title_order,
            newline_after_title: options.newline_after_title,
            newline_bullet_list: options.newline_bullet_list,
        };
        config.validate()?;
        Ok(config)
    }
}

impl TryFrom<&RenderOptions> for RenderConfig {
    type Error = FormatError;

    fn try_from(options: &RenderOptions) -> Result<Self, Self::Error> {
        RenderConfig::try_from(options.clone())
    }
}

impl From<RenderConfig> for RenderOptions {
    fn from(config: RenderConfig) -> Self {
        RenderOptions {
            max_line_length: config.max_line_length,
            no_line_break_regexes: config
                .no_line_break_regexes
                .iter()
                .map(|regex| regex.as_str().to_string())
                .collect(),
            title_order: config.title_order,
            newline_after_title: config.newline_after_title,
            newline_bullet_list: config.newline_bullet_list,
        }
    }
}
