use rstfmt_config::ConfigError;
use rstfmt_core::FormatError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[source] FormatError),

    #[error("cannot read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Format { path: PathBuf, source: FormatError },

    #[error("{0}")]
    Inspect(#[from] FormatError),

    #[error("invalid boolean value '{value}' for --extra-{flag}")]
    InvalidBool { flag: String, value: String },

    #[error("--extra-{0} is only accepted by the inspect command")]
    UnexpectedExtra(String),

    #[error("{0}")]
    Output(#[from] std::io::Error),
}
