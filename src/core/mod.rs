//! Sheet-level passes: the transformer and the column formatter it finishes with

pub mod formatter;
pub mod transformer;

pub use formatter::format_columns;
pub use transformer::{SheetTransformer, TransformReport};
