use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the views from src/inspect.rs
// We need to duplicate this here since build scripts can't access src/ modules
const AVAILABLE_VIEWS: &[&str] = &["treeviz", "json", "rst"];

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("rstfmt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A canonicalizing formatter for reStructuredText")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("format")
                .about("Format reStructuredText files (default command)")
                .arg(
                    Arg::new("files")
                        .required(true)
                        .num_args(1..)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(Arg::new("check").long("check").short('c').action(ArgAction::SetTrue))
                .arg(Arg::new("diff").long("diff").short('d').action(ArgAction::SetTrue))
                .arg(Arg::new("silent").long("silent").short('s').action(ArgAction::SetTrue))
                .arg(Arg::new("max-line-length").long("max-line-length").value_name("N"))
                .arg(
                    Arg::new("no-line-break")
                        .long("no-line-break")
                        .value_name("REGEX")
                        .num_args(1..),
                )
                .arg(
                    Arg::new("titles")
                        .long("titles")
                        .value_name("ADORNMENT")
                        .num_args(1..),
                )
                .arg(
                    Arg::new("newline-after-title")
                        .long("newline-after-title")
                        .value_name("DEPTH")
                        .allow_negative_numbers(true),
                )
                .arg(
                    Arg::new("newline-bullet-list")
                        .long("newline-bullet-list")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the parse tree of a reStructuredText file")
                .arg(
                    Arg::new("list-views")
                        .long("list-views")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("path")
                        .required_unless_present("list-views")
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("view")
                        .value_parser(clap::builder::PossibleValuesParser::new(AVAILABLE_VIEWS))
                        .index(2)
                        .value_hint(ValueHint::Other),
                ),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "rstfmt", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "rstfmt", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "rstfmt", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
