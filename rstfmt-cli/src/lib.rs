//! Building blocks of the `rstfmt` binary: per-file formatting runs and the
//! inspection views.

pub mod error;
pub mod inspect;
pub mod runner;
