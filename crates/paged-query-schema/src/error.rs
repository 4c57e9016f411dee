//! Error types for paged-query-schema

use thiserror::Error;

/// Errors raised while building a [`SchemaRegistry`](crate::SchemaRegistry).
///
/// Every variant describes a declaration the service owner must fix before
/// startup; none of them can be caused by request input.
#[derive(Error, Debug)]
pub enum Error {
   /// A search pattern was declared for a search field that does not exist
   #[error("cannot apply search pattern to '{field}': field not in search fields {declared:?}")]
   UnknownPatternField { field: String, declared: Vec<String> },

   /// Two specs of the same kind share a name
   #[error("duplicate {kind} name '{name}'")]
   DuplicateName { kind: &'static str, name: String },

   /// A search or order field was declared without columns
   #[error("{kind} '{name}' must declare at least one column")]
   EmptyColumns { kind: &'static str, name: String },

   /// A filter was declared without allowed values
   #[error("filter '{name}' must declare at least one allowed value")]
   EmptyAllowedValues { name: String },

   /// Column name contains characters that are unsafe to interpolate.
   ///
   /// Column names must match `[a-zA-Z_][a-zA-Z0-9_.]*` (letters, digits,
   /// underscores, and dots for qualified names like `table.column`).
   #[error("invalid column name '{name}': must match [a-zA-Z_][a-zA-Z0-9_.]*")]
   InvalidColumnName { name: String },

   /// The default order field is not one of the declared order fields
   #[error("default order field '{name}' not in order fields {declared:?}")]
   UnknownDefaultOrderField { name: String, declared: Vec<String> },

   /// Registry configuration could not be parsed
   #[error("invalid registry configuration: {0}")]
   Json(#[from] serde_json::Error),

   /// IO error when reading a registry configuration file
   #[error("IO error: {0}")]
   Io(#[from] std::io::Error),
}

/// A type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
