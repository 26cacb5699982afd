//! Views over the parse tree for `rstfmt inspect`
//!
//! Every view parses the source with the loaded configuration and hands the tree to
//! one of the registered formats:
//!
//! - `treeviz`: indented tree with one icon per node (default)
//! - `json`: the tree serialized with serde
//! - `rst`: the formatted document, rendered from the tree without post-processing
//!   of the source
//!
//! ## Extra Parameters
//!
//! - `show-linum`: prefix each treeviz line with the source line of its node
//!
//! Example: `rstfmt inspect README.rst --extra-show-linum`

use crate::error::CliError;
use rstfmt_core::formats::RstFormat;
use rstfmt_core::{FormatRegistry, RenderConfig};
use std::collections::HashMap;

/// All views accepted by `rstfmt inspect`
pub const AVAILABLE_VIEWS: &[&str] = &["treeviz", "json", "rst"];

pub const DEFAULT_VIEW: &str = "treeviz";

/// Parse `source` and serialize its tree with the named view.
///
/// The `rst` view renders with `config`, so it shows exactly what `rstfmt format`
/// would write.
pub fn execute_view(
    source: &str,
    view: &str,
    config: &RenderConfig,
    params: &HashMap<String, String>,
) -> Result<String, CliError> {
    let doc = rstfmt_core::parse(source, config)?;

    let mut registry = FormatRegistry::default();
    registry.register(RstFormat::new(config.clone()));

    let output = registry.serialize_with_options(&doc, view, params)?;
    Ok(output)
}

/// Name and description of every view, in [`AVAILABLE_VIEWS`] order.
pub fn describe_views() -> Vec<(&'static str, String)> {
    let registry = FormatRegistry::default();
    AVAILABLE_VIEWS
        .iter()
        .filter_map(|name| {
            let format = registry.get(name).ok()?;
            Some((*name, format.description().to_string()))
        })
        .collect()
}
