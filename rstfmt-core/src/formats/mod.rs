//! Format implementations
//!
//! Each format turns a parsed document tree into text: canonical
//! reStructuredText, or one of the inspection views.

pub mod icons;
pub mod json;
pub mod rst;
pub mod treeviz;

pub use json::JsonFormat;
pub use rst::RstFormat;
pub use treeviz::TreevizFormat;
