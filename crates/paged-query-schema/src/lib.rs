//! # paged-query-schema
//!
//! Declares what a paged list endpoint lets its callers search, sort and
//! filter by, and checks those declarations once at startup.
//!
//! ## Core Types
//!
//! - **[`SchemaRegistry`]**: Immutable, shareable capability set with name lookups
//! - **[`SchemaRegistryConfig`]**: Declarations the registry is built from (JSON-loadable)
//! - **[`SearchFieldSpec`]**, **[`SearchPatternSpec`]**, **[`OrderFieldSpec`]**,
//!   **[`FilterFieldSpec`]**: The individual capability declarations
//! - **[`Error`]**: Configuration errors raised while building the registry

mod error;
mod registry;
mod spec;

pub use error::{Error, Result};
pub use registry::{SchemaRegistry, SchemaRegistryConfig, validate_column_name};
pub use spec::{
   FilterFieldSpec, OrderColumn, OrderFieldSpec, SearchFieldSpec, SearchPattern,
   SearchPatternSpec, SortDirection,
};
