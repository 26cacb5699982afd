//! Formatting of files on disk: rewrite, check or diff.

use crate::error::CliError;
use rstfmt_core::formats::treeviz::to_treeviz_str;
use rstfmt_core::{FormatError, RenderConfig};
use similar::TextDiff;
use std::fs;
use std::io::Write;
use std::path::Path;

/// What to do with a file that needs changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Write,
    Check,
    Diff,
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub mode: Mode,
    pub silent: bool,
    pub print_parse_tree: bool,
    /// Prefix status messages with the file path, for runs over several files.
    pub label_files: bool,
}

/// Result of formatting a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Unchanged,
    Changed,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Unchanged => 0,
            Outcome::Changed => 1,
        }
    }
}

/// Format one file, reporting to `out`.
///
/// Only [`Mode::Write`] touches the file, and only when the formatted text differs
/// from what is on disk.
pub fn format_file(
    path: &Path,
    config: &RenderConfig,
    options: &RunOptions,
    out: &mut impl Write,
) -> Result<Outcome, CliError> {
    let content = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "formatting file");

    let with_path = |source: FormatError| CliError::Format {
        path: path.to_path_buf(),
        source,
    };

    if options.print_parse_tree {
        let doc = rstfmt_core::parse(&content, config).map_err(with_path)?;
        write!(out, "{}", to_treeviz_str(&doc))?;
    }

    let formatted = rstfmt_core::format(&content, config).map_err(with_path)?;

    let label = if options.label_files {
        format!("{}: ", path.display())
    } else {
        String::new()
    };

    if formatted == content {
        if !options.silent {
            writeln!(out, "{label}Nothing changed")?;
        }
        return Ok(Outcome::Unchanged);
    }

    match options.mode {
        Mode::Diff => {
            if !options.silent {
                write!(out, "{}", unified_diff(path, &content, &formatted))?;
            }
        }
        Mode::Check => {
            if !options.silent {
                writeln!(out, "{label}File needs changes (but file left unchanged)")?;
            }
        }
        Mode::Write => {
            if !options.silent {
                writeln!(out, "Writing changes to '{}'", path.display())?;
            }
            fs::write(path, &formatted).map_err(|source| CliError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            tracing::info!(path = %path.display(), "rewrote file");
        }
    }

    Ok(Outcome::Changed)
}

/// Unified diff from the file on disk to its formatted text.
pub fn unified_diff(path: &Path, before: &str, after: &str) -> String {
    let name = path.display().to_string();
    TextDiff::from_lines(before, after)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{name}"), &format!("b/{name}"))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn run(path: &Path, options: &RunOptions) -> (Outcome, String) {
        let mut out = Vec::new();
        let outcome = format_file(path, &RenderConfig::default(), options, &mut out).unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    #[test]
    fn clean_file_is_left_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clean.rst");
        fs::write(&path, "something or other").unwrap();

        let (outcome, output) = run(&path, &RunOptions::default());
        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(output, "Nothing changed\n");
    }

    #[test]
    fn write_mode_rewrites_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.rst");
        fs::write(&path, "something  or  other").unwrap();

        let (outcome, output) = run(&path, &RunOptions::default());
        assert_eq!(outcome, Outcome::Changed);
        assert!(output.starts_with("Writing changes to '"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "something or other");
    }

    #[test]
    fn check_mode_leaves_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.rst");
        fs::write(&path, "something  or  other").unwrap();

        let options = RunOptions {
            mode: Mode::Check,
            label_files: true,
            ..RunOptions::default()
        };
        let (outcome, output) = run(&path, &options);
        assert_eq!(outcome, Outcome::Changed);
        assert!(output.ends_with("doc.rst: File needs changes (but file left unchanged)\n"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "something  or  other");
    }

    #[test]
    fn diff_mode_prints_a_unified_diff() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.rst");
        fs::write(&path, "keep\n\nsomething  or  other\n").unwrap();

        let options = RunOptions {
            mode: Mode::Diff,
            ..RunOptions::default()
        };
        let (outcome, output) = run(&path, &options);
        assert_eq!(outcome, Outcome::Changed);
        assert!(output.contains("-something  or  other"));
        assert!(output.contains("+something or other"));
        assert!(output.contains(" keep"));
    }

    #[test]
    fn silent_suppresses_messages() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.rst");
        fs::write(&path, "something  or  other").unwrap();

        let options = RunOptions {
            silent: true,
            ..RunOptions::default()
        };
        let (outcome, output) = run(&path, &options);
        assert_eq!(outcome, Outcome::Changed);
        assert!(output.is_empty());
    }

    #[test]
    fn parse_tree_is_printed_first() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.rst");
        fs::write(&path, "plain text").unwrap();

        let options = RunOptions {
            print_parse_tree: true,
            ..RunOptions::default()
        };
        let (_, output) = run(&path, &options);
        assert!(output.starts_with("⧉ Document (1 items)\n└─ ¶ plain text\n"));
        assert!(output.ends_with("Nothing changed\n"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempdir().unwrap();
        let mut out = Vec::new();
        let err = format_file(
            &dir.path().join("absent.rst"),
            &RenderConfig::default(),
            &RunOptions::default(),
            &mut out,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Read { .. }));
    }

    #[test]
    fn document_errors_carry_the_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quoted.rst");
        fs::write(&path, "Text\n\n    quoted text\n").unwrap();

        let mut out = Vec::new();
        let err = format_file(&path, &RenderConfig::default(), &RunOptions::default(), &mut out)
            .unwrap_err();
        assert!(err.to_string().starts_with(&path.display().to_string()));
    }
}
