//! End-to-end formatting cases: input text in, canonical text out.

use crate::common::{config_with_titles, fmt, fmt_with};
use insta::assert_snapshot;
use rstfmt_core::{format, FormatError, RenderConfig};

#[test]
fn test_simple_text() {
    let input = "Hello, dear world. How are you?";
    assert_eq!(fmt(input), input);
}

#[test]
fn test_whitespace_is_collapsed() {
    assert_snapshot!(fmt("something  or  other"), @"something or other");
}

#[test]
fn test_consecutive_headings() {
    let input = "
====
Heading1
====
Heading2
====
Heading3
----
Heading4
^^^^
";
    let expected = "\
========
Heading1
========

Heading2
========

Heading3
--------
Heading4
^^^^^^^^";
    assert_eq!(fmt(input), expected);
}

#[test]
fn test_multiline_title() {
    let input = "---\nMy Title\n----\nsome text.";

    assert_eq!(fmt(input), "========\nMy Title\n========\n\nsome text.");

    let config = RenderConfig {
        newline_after_title: -1,
        ..RenderConfig::default()
    };
    assert_eq!(
        fmt_with(input, &config),
        "========\nMy Title\n========\nsome text."
    );
}

#[test]
fn test_simple_bullet_list() {
    let input = "Some text:\n- line 1\n- line 2\n\nMore text";
    assert_eq!(fmt(input), input);
}

#[test]
fn test_bullet_list_keeps_blank_line_when_configured() {
    let config = RenderConfig {
        newline_bullet_list: true,
        ..RenderConfig::default()
    };
    let input = "Some text:\n\n- line 1\n- line 2";
    assert_eq!(fmt_with(input, &config), input);
}

#[test]
fn test_extra_bullet_list() {
    let input = "\
Heading
-------
- bullet 1
- bullet 2
  second line of bullet 2,
  which is rather long.

  third line of bullet 2
- bullet 3

  - sublist item 1
  - sublist item 2
- bullet 4

regular text";
    let expected = "\
Heading
-------

- bullet 1
- bullet 2 second line of bullet 2, which is rather long.

  third line of bullet 2
- bullet 3

  - sublist item 1
  - sublist item 2
- bullet 4

regular text";
    assert_eq!(fmt_with(input, &config_with_titles(&["-"])), expected);
}

#[test]
fn test_inline_markup() {
    let input = "\
**Bold** *Italic* `some official ref`_ and another `official ref`_ and a ~custom regex~.

_`some official ref` is here, _`official ref` as well.";
    assert_eq!(fmt(input), input);
}

#[test]
fn test_directives() {
    let input = "\
.. some_directive_with_content::
  macro content

.. directive_with_args_on_line:: some_arg other_arg

.. directive_with_named_args_and_no_content::
  :arg: frut

.. directive_with_named_args_and_content::
  :arg: frut

  content

no content

Known directive:

.. csv-table:: tablename
  :header: \"header 1\", \"header 2\"
  :widths: 30, 100

  col1, col2

Bla

.. somedirective_without_arguments_and_no_blank_line::
  line 1
  line 2

Remainder";
    assert_eq!(fmt(input), input);
}

#[test]
fn test_directive_options_are_sorted_and_reindented() {
    let input = ".. image:: picture.png\n    :width: 200\n    :alt: A picture";
    assert_eq!(
        fmt(input),
        ".. image:: picture.png\n  :alt: A picture\n  :width: 200"
    );
}

#[test]
fn test_directives_short() {
    let input = "Bla\n.. directive_without_leading_newline::\nRemainder";
    assert_eq!(
        fmt(input),
        "Bla\n\n.. directive_without_leading_newline::\n\nRemainder"
    );
}

#[test]
fn test_reference() {
    let input = "\
Chapter 1
=========

My *favorite* language is Python_.

.. _Python: https://www.python.org/

Continue reading in `Somewhere <Chapter 4>`_.

`Chapter 1`_ describes something

L1: `Something Else <something.other>`_ is outside this document.

L2: `something.other`_ is outside this document.

Lorem ipsum [Ref]_ dolor sit amet.

.. [Ref] Book or article reference, URL or whatever.

Chapter 4
=========

Bla";
    assert_eq!(fmt_with(input, &config_with_titles(&["="])), input);
}

#[test]
fn test_line_wrap_keeps_no_wrap_spans_whole() {
    let unbreakable = "~a b c d e~";
    let input = unbreakable.repeat(2);
    assert_eq!(fmt(&input), format!("{unbreakable} {unbreakable}"));

    let config = RenderConfig {
        max_line_length: 40,
        ..RenderConfig::default()
    };
    let output = fmt_with(&unbreakable.repeat(50), &config);
    let lines: Vec<&str> = output.split('\n').collect();
    assert!(lines.iter().all(|line| line.len() < config.max_line_length));
    assert!(lines[..lines.len() - 1]
        .iter()
        .all(|line| line.len() > config.max_line_length - unbreakable.len()));
}

#[test]
fn test_long_paragraph_is_wrapped() {
    let config = RenderConfig {
        max_line_length: 30,
        ..RenderConfig::default()
    };
    let input = "The quick brown fox jumps over the lazy dog and keeps running far away.";
    assert_eq!(
        fmt_with(input, &config),
        "The quick brown fox jumps over\nthe lazy dog and keeps running\nfar away."
    );
}

fn assert_stable(input: &str, width: usize, expected: &str) {
    let config = RenderConfig {
        max_line_length: width,
        ..RenderConfig::default()
    };
    let once = fmt_with(input, &config);
    assert_eq!(once, expected);
    assert_eq!(fmt_with(&once, &config), once);
}

#[test]
fn test_punctuation_led_words_wrap_like_any_word() {
    assert_stable(
        "aaaaaaa bbbbbbbb ,cccccccc dd",
        16,
        "aaaaaaa bbbbbbbb\n,cccccccc dd",
    );
    assert_stable("aaaaaaaaa .bbbbbbbbbb cc", 10, "aaaaaaaaa\n.bbbbbbbbbb\ncc");
    assert_stable("version aaaaaaa .cfg file", 15, "version aaaaaaa\n.cfg file");
}

#[test]
fn test_attached_punctuation_moves_with_its_span() {
    assert_stable("see `docs`_. Then more", 11, "see\n`docs`_.\nThen more");
    assert_stable("a *b*, c", 5, "a\n*b*,\nc");
}

#[test]
fn test_wrapped_lines_do_not_start_with_markup_markers() {
    assert_stable(
        "Intro text: - not a list item here",
        11,
        "Intro text: -\nnot a list\nitem here",
    );
    assert_stable("aaaa ==== bbbb", 5, "aaaa ====\nbbbb");
    assert_stable("aaaa .. bbbb", 5, "aaaa ..\nbbbb");
}

#[test]
fn test_wrapped_list_item_continues_under_its_text() {
    let config = RenderConfig {
        max_line_length: 20,
        ..RenderConfig::default()
    };
    let input = "- one two three four five six";
    assert_eq!(
        fmt_with(input, &config),
        "- one two three four\n  five six"
    );
}

#[test]
fn test_literal_block_is_kept() {
    let input = "Example::\n\n      indented   code\n    less\n\nafter";
    assert_eq!(
        fmt(input),
        "Example::\n\n    indented   code\n  less\n\nafter"
    );
}

#[test]
fn test_comment_is_kept() {
    let input = "Text\n\n.. a comment\n   continued\n\nMore";
    assert_eq!(fmt(input), "Text\n\n.. a comment\n  continued\n\nMore");
}

#[test]
fn test_crlf_input() {
    assert_eq!(fmt("Title\r\n=====\r\n\r\ntext\r\n"), "=====\nTitle\n=====\n\ntext");
}

#[test]
fn test_too_deep_sections_fail() {
    let input = "A\n=\n\nB\n-\n\nC\n^\n";
    let config = config_with_titles(&["=", "-"]);
    match format(input, &config) {
        Err(FormatError::TitleDepthExceeded {
            depth, available, ..
        }) => {
            assert_eq!(depth, 3);
            assert_eq!(available, 2);
        }
        other => panic!("expected TitleDepthExceeded, got {other:?}"),
    }
}

#[test]
fn test_unsupported_constructs_fail() {
    let input = "Text\n\n    quoted text\n";
    assert!(matches!(
        format(input, &RenderConfig::default()),
        Err(FormatError::Unsupported { line: 3, .. })
    ));
}

#[test]
fn test_transition_is_dropped() {
    assert_eq!(fmt("one\n\n--------\n\ntwo"), "one\n\ntwo");
}
