//! Helpers shared by the integration tests

use rstfmt_core::{format, RenderConfig};

/// Formats with the given config, failing the test on error.
pub fn fmt_with(input: &str, config: &RenderConfig) -> String {
    format(input, config).unwrap_or_else(|e| panic!("formatting failed: {e}\ninput:\n{input}"))
}

pub fn fmt(input: &str) -> String {
    fmt_with(input, &RenderConfig::default())
}

pub fn config_with_titles(titles: &[&str]) -> RenderConfig {
    RenderConfig {
        title_order: titles.iter().map(|t| t.to_string()).collect(),
        ..RenderConfig::default()
    }
}
