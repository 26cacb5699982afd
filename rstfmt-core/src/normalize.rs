//! Text passes that run before parsing and after serializing
//!
//! The passes before parsing smooth over input the parser would otherwise read
//! differently from what the author meant: a bullet list glued to the line that
//! introduces it, a directive glued to the previous paragraph, and adornment lines
//! of drifting length. The pass after serializing undoes the one cosmetic change
//! the canonical style does not want to keep.

use crate::config::RenderConfig;
use once_cell::sync::Lazy;
use regex::Regex;

static LINE_ENDING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r\n?").expect("valid line ending pattern"));
static COLON_THEN_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":\n([ \t]*[-*] )").expect("valid bullet pattern"));
static COLON_BLANK_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":\n\n([ \t]*[-*] )").expect("valid bullet pattern"));
static GLUED_EXPLICIT_MARKUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^\n])(\n\.\. )").expect("valid directive pattern"));

/// Prepares raw input for the parser.
pub fn before_parse(raw: &str, config: &RenderConfig) -> String {
    let mut text = LINE_ENDING.replace_all(raw, "\n").into_owned();

    if !config.newline_bullet_list {
        text = COLON_THEN_BULLET
            .replace_all(&text, ":\n\n${1}")
            .into_owned();
    }

    text = GLUED_EXPLICIT_MARKUP
        .replace_all(&text, "${1}\n${2}")
        .into_owned();

    fix_heading_line_length(&text, config)
}

/// Collapses every line made only of three or more adornment characters to four.
///
/// Both lines around an overlined title end up the same length, which is what the
/// parser needs to pair them up. Only characters named in `title_order` count.
pub fn fix_heading_line_length(text: &str, config: &RenderConfig) -> String {
    let class: String = config
        .title_chars()
        .into_iter()
        .map(|c| regex::escape(&c.to_string()))
        .collect();
    if class.is_empty() {
        return text.to_string();
    }
    match Regex::new(&format!(r"(?m)^([{class}]){{3,}}[ \t]*$")) {
        Ok(adornment) => adornment
            .replace_all(text, "${1}${1}${1}${1}")
            .into_owned(),
        Err(err) => {
            tracing::warn!("skipping adornment normalization: {err}");
            text.to_string()
        }
    }
}

/// Cleans up serializer output.
pub fn after_render(rendered: &str, config: &RenderConfig) -> String {
    let text = if config.newline_bullet_list {
        rendered.to_string()
    } else {
        COLON_BLANK_BULLET
            .replace_all(rendered, ":\n${1}")
            .into_owned()
    };
    text.trim_matches('\n').to_string()
}
