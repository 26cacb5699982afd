//! Property tests over generated prose documents.
//!
//! Paragraphs mix plain words with punctuation-led words, inline markup (some of it
//! followed by attached punctuation), no-wrap spans and tokens that would read as
//! structure at the start of a line.

use proptest::prelude::*;
use rstfmt_core::{format, RenderConfig};

/// Tokens that must never begin a line of the input or of the output.
const MARKERS: &[&str] = &["-", "*", "+", "..", "===="];

fn plain_word() -> impl Strategy<Value = String> {
    "[a-z]{1,12}"
}

fn token() -> impl Strategy<Value = String> {
    prop_oneof![
        6 => plain_word(),
        1 => "[,.][a-z]{1,6}",
        1 => r"\*[a-z]{1,8}\*[.,]?",
        1 => r"\*\*[a-z]{1,8}\*\*[.,]?",
        1 => "`[a-z]{1,8}`_[.,]?",
        1 => "~[a-z]{1,5}( [a-z]{1,5})?~[.,]?",
        1 => prop::sample::select(MARKERS).prop_map(str::to_string),
    ]
}

fn paragraph() -> impl Strategy<Value = String> {
    (
        plain_word(),
        prop::collection::vec((token(), prop::bool::ANY), 0..40),
    )
        .prop_map(|(first, rest)| {
            let mut out = first;
            for (token, newline) in rest {
                let marker = MARKERS.contains(&token.as_str());
                out.push_str(if newline && !marker { "\n" } else { "  " });
                out.push_str(&token);
            }
            out
        })
}

fn document() -> impl Strategy<Value = String> {
    prop::collection::vec(paragraph(), 1..6).prop_map(|paragraphs| paragraphs.join("\n\n"))
}

fn config(max_line_length: usize) -> RenderConfig {
    RenderConfig {
        max_line_length,
        ..RenderConfig::default()
    }
}

fn words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Splits a line on spaces outside `~...~` spans.
fn units(line: &str) -> Vec<String> {
    let mut units = vec![String::new()];
    let mut in_span = false;
    for c in line.chars() {
        match c {
            '~' => in_span = !in_span,
            ' ' if !in_span => {
                units.push(String::new());
                continue;
            }
            _ => {}
        }
        if let Some(last) = units.last_mut() {
            last.push(c);
        }
    }
    units.retain(|unit| !unit.is_empty());
    units
}

proptest! {
    #[test]
    fn format_is_idempotent(doc in document(), width in 2usize..80) {
        let config = config(width);
        let once = format(&doc, &config).unwrap();
        let twice = format(&once, &config).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn format_preserves_words(doc in document(), width in 2usize..80) {
        let once = format(&doc, &config(width)).unwrap();
        prop_assert_eq!(words(&once), words(&doc));
    }

    #[test]
    fn lines_fit_unless_a_unit_cannot_move(doc in document(), width in 2usize..80) {
        let once = format(&doc, &config(width)).unwrap();
        for line in once.lines() {
            if line.chars().count() <= width {
                continue;
            }
            let units = units(line);
            let single = units.len() == 1;
            let ends_with_marker = units
                .last()
                .is_some_and(|unit| MARKERS.contains(&unit.as_str()));
            prop_assert!(single || ends_with_marker, "line too long: {:?}", line);
        }
    }

    #[test]
    fn no_line_starts_with_a_marker(doc in document(), width in 2usize..80) {
        let once = format(&doc, &config(width)).unwrap();
        for line in once.lines() {
            let first = line.split(' ').next().unwrap_or_default();
            prop_assert!(!MARKERS.contains(&first), "line starts with a marker: {:?}", line);
        }
    }

    #[test]
    fn paragraphs_survive(doc in document()) {
        let once = format(&doc, &RenderConfig::default()).unwrap();
        prop_assert_eq!(once.split("\n\n").count(), doc.split("\n\n").count());
    }
}
