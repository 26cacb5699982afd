// Command-line interface for rstfmt
//
// This binary formats reStructuredText files in place, or reports what it would change.
//
// Usage:
//  rstfmt <file>... [options]          - Format files in place (default)
//  rstfmt format <file>... [options]   - Same as above (explicit)
//  rstfmt inspect <file> [<view>]      - Print the parse tree (defaults to "treeviz")
//  rstfmt inspect --list-views         - List available views
//
// Exit codes: 0 when nothing changed, 1 when a file needs or received changes, 2 on errors.
//
// Settings come from the embedded defaults, then ./rstfmt.toml, then --config, then flags.
//
// Extra Parameters:
//
// View-specific parameters can be passed using --extra-<parameter-name> <value>.
// The CLI layer strips the "extra-" prefix and passes the parameters to the view.
// Example:
//  rstfmt inspect README.rst --extra-show-linum

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use rstfmt_cli::error::CliError;
use rstfmt_cli::inspect::{self, AVAILABLE_VIEWS, DEFAULT_VIEW};
use rstfmt_cli::runner::{self, Mode, RunOptions};
use rstfmt_config::{Loader, RstfmtConfig, PROJECT_FILE};
use rstfmt_core::RenderConfig;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const SUBCOMMANDS: &[&str] = &["format", "inspect", "help"];

const EXIT_ERROR: u8 = 2;

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        if let Some(key) = arg.strip_prefix("--extra-") {
            let has_value = args.get(i + 1).is_some_and(|next| !next.starts_with('-'));

            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn build_cli() -> Command {
    Command::new("rstfmt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A canonicalizing formatter for reStructuredText")
        .long_about(
            "rstfmt rewrites reStructuredText files into one canonical layout: prose is\n\
            re-wrapped, section adornments follow a fixed order and blank lines are\n\
            normalized.\n\n\
            Commands:\n  \
            - format:  Format files in place (default)\n  \
            - inspect: Print the parse tree of a file\n\n\
            Examples:\n  \
            rstfmt README.rst                       # Rewrite README.rst\n  \
            rstfmt docs/*.rst --check               # Exit 1 if any file needs changes\n  \
            rstfmt README.rst --diff                # Show what would change\n  \
            rstfmt inspect README.rst json          # Dump the parse tree as JSON",
        )
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a rstfmt.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log debug output to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("format")
                .about("Format reStructuredText files (default command)")
                .long_about(
                    "Format reStructuredText files.\n\n\
                    Each file is rewritten in place unless --check or --diff is given.\n\
                    Files that are already formatted are left untouched.\n\n\
                    Options taking several values (--no-line-break, --titles) consume\n\
                    every following word, so put them after the file names.\n\n\
                    Examples:\n  \
                    rstfmt format README.rst                        # Rewrite in place\n  \
                    rstfmt format README.rst --check                # Only report\n  \
                    rstfmt format README.rst --titles '#' '=' '-'   # Custom adornments",
                )
                .arg(
                    Arg::new("files")
                        .help("Files to format")
                        .required(true)
                        .num_args(1..)
                        .index(1)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("check")
                        .long("check")
                        .short('c')
                        .help("Report files that need changes without writing them")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("diff")
                        .long("diff")
                        .short('d')
                        .help("Print a unified diff instead of writing files")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("silent")
                        .long("silent")
                        .short('s')
                        .help("Suppress status messages (errors are still reported)")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("max-line-length")
                        .long("max-line-length")
                        .alias("max_line_length")
                        .value_name("N")
                        .help("Maximum line length for wrapped prose")
                        .value_parser(clap::value_parser!(u32)),
                )
                .arg(
                    Arg::new("no-line-break")
                        .long("no-line-break")
                        .alias("no_line_break")
                        .value_name("REGEX")
                        .help("Patterns whose matches are never broken across lines")
                        .num_args(1..),
                )
                .arg(
                    Arg::new("titles")
                        .long("titles")
                        .value_name("ADORNMENT")
                        .help("Section adornments per depth, outermost first (e.g. '==' '=' '-')")
                        .num_args(1..),
                )
                .arg(
                    Arg::new("newline-after-title")
                        .long("newline-after-title")
                        .alias("newline_after_title")
                        .value_name("DEPTH")
                        .help("Add a blank line after titles up to this depth (-1 for never)")
                        .allow_negative_numbers(true)
                        .value_parser(clap::value_parser!(i64)),
                )
                .arg(
                    Arg::new("newline-bullet-list")
                        .long("newline-bullet-list")
                        .alias("newline_bullet_list")
                        .help("Keep the blank line between a line ending in ':' and its bullet list")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("print-parse-tree")
                        .long("print-parse-tree")
                        .help("Print the parse tree of each file before formatting it")
                        .action(ArgAction::SetTrue)
                        .hide(true),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the parse tree of a reStructuredText file")
                .long_about(
                    "View the tree the formatter builds from a file.\n\n\
                    Views:\n  \
                    - treeviz: Tree visualization with icons (default)\n  \
                    - json:    The tree as JSON\n  \
                    - rst:     The formatted output, rendered from the tree\n\n\
                    Extra Parameters:\n  \
                    --extra-show-linum    Prefix each treeviz line with its source line\n\n\
                    Examples:\n  \
                    rstfmt inspect README.rst                     # Tree visualization\n  \
                    rstfmt inspect README.rst --extra-show-linum  # With line numbers\n  \
                    rstfmt inspect README.rst json                # JSON output",
                )
                .arg(
                    Arg::new("list-views")
                        .long("list-views")
                        .help("List available views")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("path")
                        .help("Path to the reStructuredText file")
                        .required_unless_present("list-views")
                        .index(1)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("view")
                        .help("View to print. Defaults to 'treeviz'")
                        .required(false)
                        .value_parser(clap::builder::PossibleValuesParser::new(AVAILABLE_VIEWS))
                        .index(2)
                        .value_hint(ValueHint::Other),
                ),
        )
}

/// Parse `args`, retrying with "format" injected when no subcommand was named.
fn parse_with_default_subcommand(args: &[String]) -> Result<ArgMatches, clap::Error> {
    let cli = build_cli();
    match cli.clone().try_get_matches_from(args) {
        Ok(matches) => Ok(matches),
        Err(err) => {
            let inject = args
                .get(1)
                .is_some_and(|first| !SUBCOMMANDS.contains(&first.as_str()) && !is_root_flag(first));
            if !inject {
                return Err(err);
            }
            let mut new_args = vec![args[0].clone(), "format".to_string()];
            new_args.extend_from_slice(&args[1..]);
            cli.try_get_matches_from(&new_args)
        }
    }
}

fn is_root_flag(arg: &str) -> bool {
    matches!(arg, "-h" | "--help" | "-V" | "--version")
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    // Parse extra-* arguments before clap processing
    let (cleaned_args, mut extra_params) = parse_extra_args(&args);

    let matches = parse_with_default_subcommand(&cleaned_args).unwrap_or_else(|err| err.exit());

    // Global flags are propagated down, so read them from the subcommand.
    let leaf = matches.subcommand().map(|(_, sub)| sub).unwrap_or(&matches);
    init_tracing(leaf.get_flag("verbose"));

    match run(&matches, &mut extra_params) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(
    matches: &ArgMatches,
    extra_params: &mut HashMap<String, String>,
) -> Result<ExitCode, CliError> {
    match matches.subcommand() {
        Some(("format", sub_matches)) => {
            let config_path = sub_matches.get_one::<String>("config").map(|s| s.as_str());
            if let Some(key) = extra_params.keys().next() {
                return Err(CliError::UnexpectedExtra(key.clone()));
            }
            let config = load_cli_config(config_path, Some(sub_matches))?;
            let render = render_config(&config)?;
            handle_format_command(sub_matches, &render)
        }
        Some(("inspect", sub_matches)) => {
            if sub_matches.get_flag("list-views") {
                handle_list_views_command();
                return Ok(ExitCode::SUCCESS);
            }
            let path = sub_matches
                .get_one::<PathBuf>("path")
                .expect("path is required");
            let view = sub_matches
                .get_one::<String>("view")
                .map(|s| s.as_str())
                .unwrap_or(DEFAULT_VIEW);
            let config_path = sub_matches.get_one::<String>("config").map(|s| s.as_str());

            let mut config = load_cli_config(config_path, None)?;
            apply_config_overrides(&mut config, extra_params)?;
            let render = render_config(&config)?;
            let params = build_inspect_params(&config, view, extra_params);
            handle_inspect_command(path, view, &render, &params)
        }
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn handle_format_command(
    sub_matches: &ArgMatches,
    config: &RenderConfig,
) -> Result<ExitCode, CliError> {
    let files: Vec<&PathBuf> = sub_matches
        .get_many::<PathBuf>("files")
        .expect("files are required")
        .collect();

    let mode = if sub_matches.get_flag("diff") {
        Mode::Diff
    } else if sub_matches.get_flag("check") {
        Mode::Check
    } else {
        Mode::Write
    };
    let options = RunOptions {
        mode,
        silent: sub_matches.get_flag("silent"),
        print_parse_tree: sub_matches.get_flag("print-parse-tree"),
        label_files: files.len() > 1,
    };

    let mut stdout = std::io::stdout().lock();
    let mut code = 0;
    for path in files {
        match runner::format_file(path, config, &options, &mut stdout) {
            Ok(outcome) => code = code.max(outcome.exit_code()),
            Err(err) => {
                eprintln!("Error: {err}");
                code = EXIT_ERROR;
            }
        }
    }
    stdout.flush()?;

    Ok(ExitCode::from(code))
}

fn handle_list_views_command() {
    println!("Available views:\n");
    for (name, description) in inspect::describe_views() {
        println!("  {name:<10}{description}");
    }
}

fn handle_inspect_command(
    path: &Path,
    view: &str,
    config: &RenderConfig,
    params: &HashMap<String, String>,
) -> Result<ExitCode, CliError> {
    let source = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let output = inspect::execute_view(&source, view, config, params)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    if !output.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;

    Ok(ExitCode::SUCCESS)
}

fn load_cli_config(
    explicit_path: Option<&str>,
    format_flags: Option<&ArgMatches>,
) -> Result<RstfmtConfig, CliError> {
    let loader = Loader::new().with_optional_file(PROJECT_FILE);
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };
    let loader = match format_flags {
        Some(matches) => apply_format_flags(loader, matches)?,
        None => loader,
    };

    Ok(loader.build()?)
}

/// Layer the `format` subcommand's flags over the loaded files.
fn apply_format_flags(mut loader: Loader, matches: &ArgMatches) -> Result<Loader, CliError> {
    if let Some(&length) = matches.get_one::<u32>("max-line-length") {
        loader = loader.set_override("format.max_line_length", i64::from(length))?;
    }
    if let Some(patterns) = matches.get_many::<String>("no-line-break") {
        let patterns: Vec<String> = patterns.cloned().collect();
        loader = loader.set_override("format.no_line_break_regexes", patterns)?;
    }
    if let Some(titles) = matches.get_many::<String>("titles") {
        let titles: Vec<String> = titles.cloned().collect();
        loader = loader.set_override("format.title_order", titles)?;
    }
    if let Some(&depth) = matches.get_one::<i64>("newline-after-title") {
        loader = loader.set_override("format.newline_after_title", depth)?;
    }
    if matches.get_flag("newline-bullet-list") {
        loader = loader.set_override("format.newline_bullet_list", true)?;
    }
    Ok(loader)
}

fn render_config(config: &RstfmtConfig) -> Result<RenderConfig, CliError> {
    RenderConfig::try_from(&config.format).map_err(CliError::InvalidConfig)
}

fn apply_config_overrides(
    config: &mut RstfmtConfig,
    extra_params: &mut HashMap<String, String>,
) -> Result<(), CliError> {
    if let Some(raw) = take_override(extra_params, &["show-linum", "linum"]) {
        config.inspect.show_line_numbers = parse_bool_arg("show-linum", &raw)?;
    }
    Ok(())
}

fn build_inspect_params(
    config: &RstfmtConfig,
    view: &str,
    overrides: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut params = HashMap::new();

    if view == "treeviz" {
        params.insert(
            "show-linum".to_string(),
            config.inspect.show_line_numbers.to_string(),
        );
    }

    for (key, value) in overrides {
        params.insert(key.clone(), value.clone());
    }

    params
}

fn take_override(map: &mut HashMap<String, String>, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(value) = map.remove(*key) {
            return Some(value);
        }
    }
    None
}

fn parse_bool_arg(flag: &str, raw: &str) -> Result<bool, CliError> {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        other => Err(CliError::InvalidBool {
            flag: flag.to_string(),
            value: other.to_string(),
        }),
    }
}
