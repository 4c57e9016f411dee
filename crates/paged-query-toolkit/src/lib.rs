//! # paged-query-toolkit
//!
//! Validates a per-request [`QuerySelection`] against a
//! [`SchemaRegistry`](paged_query_schema::SchemaRegistry) and assembles the
//! paged and count SQL for it.
//!
//! ```
//! use paged_query_schema::{
//!    OrderColumn, OrderFieldSpec, SchemaRegistry, SchemaRegistryConfig, SearchFieldSpec,
//!    SearchPattern, SearchPatternSpec,
//! };
//! use paged_query_toolkit::{QuerySelection, assemble, validate};
//!
//! let registry = SchemaRegistry::new(SchemaRegistryConfig {
//!    search_fields: vec![SearchFieldSpec::new("phones", ["phones"])],
//!    search_patterns: vec![SearchPatternSpec::new("phones", SearchPattern::Contains)],
//!    order_fields: vec![OrderFieldSpec::new("id", [OrderColumn::desc("id")])],
//!    ..Default::default()
//! })
//! .unwrap();
//!
//! let mut selection = QuerySelection::new("select id, name, phones from users");
//! selection.search_field = Some("phones".into());
//! selection.search_value = Some("1387".into());
//!
//! let validated = validate(selection, &registry).unwrap();
//! let query = assemble(&validated, &registry);
//! assert_eq!(query.params["search_value"], "%1387%");
//! ```

mod assemble;
mod error;
mod selection;
mod validate;

pub use assemble::{PLACEHOLDER, PagedQuery, assemble};
pub use error::{Error, Result, SchemaViolation};
pub use selection::{
   AppliedFilter, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, FilterSelection, OrderSelection,
   QuerySelection, SearchSelection, ValidatedSelection,
};
pub use validate::{cross_validate, normalize, validate};
