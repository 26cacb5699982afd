//! Inspection views over parsed documents.

use rstfmt_core::{parse, FormatRegistry, RenderConfig};
use std::collections::HashMap;

const SOURCE: &str = "\
Main
====

Some *emphasis* here.

- item

.. note:: careful
";

#[test]
fn test_treeviz_of_parsed_document() {
    let doc = parse(SOURCE, &RenderConfig::default()).unwrap();
    let output = FormatRegistry::default().serialize(&doc, "treeviz").unwrap();
    let expected = "\
⧉ Document (1 items)
└─ § Main
  ├─ ⊤ Main
  │ └─ ◦ Main
  ├─ ¶ Some emphasis here.
  │ ├─ ◦ Some
  │ ├─ 𝐼 emphasis
  │ │ └─ ◦ emphasis
  │ └─ ◦ here.
  ├─ ☰ - 1 items
  │ └─ • item
  │   └─ ¶ item
  │     └─ ◦ item
  └─ ≔ note:: careful
";
    assert_eq!(output, expected);
}

#[test]
fn test_treeviz_with_line_numbers() {
    let doc = parse(SOURCE, &RenderConfig::default()).unwrap();
    let mut options = HashMap::new();
    options.insert("show-linum".to_string(), "true".to_string());
    let output = FormatRegistry::default()
        .serialize_with_options(&doc, "treeviz", &options)
        .unwrap();
    assert!(output.contains("08   └─ ≔ note:: careful"));
}

#[test]
fn test_json_of_parsed_document() {
    let doc = parse(SOURCE, &RenderConfig::default()).unwrap();
    let output = FormatRegistry::default().serialize(&doc, "json").unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    let section = &value["children"][0];
    assert_eq!(section["type"], "section");
    assert_eq!(section["children"][0]["type"], "title");
    assert_eq!(section["children"][3]["type"], "directive_placeholder");
    assert_eq!(section["children"][3]["arguments"][0], "careful");
}

#[test]
fn test_rst_view_matches_format() {
    let config = RenderConfig::default();
    let doc = parse(SOURCE, &config).unwrap();
    let output = FormatRegistry::default().serialize(&doc, "rst").unwrap();
    assert_eq!(output, rstfmt_core::format(SOURCE, &config).unwrap());
}
