//! # paged-query
//!
//! Turns a list request's pagination, search, filter and order parameters into
//! a validated pair of Oracle-style SQL statements: a `ROWNUM`-windowed page
//! query and a matching count query, each with its named bind values.
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! use paged_query::{ListQuery, SchemaRegistry};
//!
//! let registry = SchemaRegistry::from_json_str(
//!    r#"{
//!       "searchFields": [{"name": "phones", "columns": ["phones"]}],
//!       "searchPatterns": [{"field": "phones", "pattern": "contains"}],
//!       "orderFields": [{"name": "id", "columns": [{"column": "id"}]}],
//!       "defaultOrderField": "id"
//!    }"#,
//! )
//! .unwrap();
//!
//! let users = ListQuery::new(Arc::new(registry), "select id, name, phones from users");
//!
//! let request: HashMap<String, String> = [("search_field", "phones"), ("search_value", "1387")]
//!    .into_iter()
//!    .map(|(k, v)| (k.to_string(), v.to_string()))
//!    .collect();
//!
//! let (sql, params, count_sql, count_params) = users.build(&request).unwrap().into_parts();
//! assert!(sql.contains("order by id desc"));
//! assert_eq!(params["search_value"], "%1387%");
//! assert_eq!(count_params.len(), 1);
//! ```

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use tracing::debug;

mod binder;

pub use binder::{ParamSource, bind};
pub use paged_query_schema::{
   FilterFieldSpec, OrderColumn, OrderFieldSpec, SchemaRegistry, SchemaRegistryConfig,
   SearchFieldSpec, SearchPattern, SearchPatternSpec, SortDirection,
};
pub use paged_query_toolkit::{
   Error, FilterSelection, PLACEHOLDER, PagedQuery, QuerySelection, Result, SchemaViolation,
   ValidatedSelection, assemble, cross_validate, normalize, validate,
};

/// A list endpoint: one base query paged, searched, filtered and ordered
/// within the capabilities of a shared registry.
///
/// Build one per endpoint at startup and call [`ListQuery::build`] once per
/// request. The base query is never modified, so a `ListQuery` can serve any
/// number of requests concurrently.
///
/// # Example
///
/// ```ignore
/// let users = ListQuery::new(registry, "select id, name {not_included_fields} from users where org = :org")
///    .bind_param("org", 42);
///
/// let query = users.build(&request)?;
/// ```
#[derive(Debug, Clone)]
pub struct ListQuery {
   registry: Arc<SchemaRegistry>,
   query: String,
   base_params: IndexMap<String, JsonValue>,
}

impl ListQuery {
   pub fn new(registry: Arc<SchemaRegistry>, query: impl Into<String>) -> Self {
      Self {
         registry,
         query: query.into(),
         base_params: IndexMap::new(),
      }
   }

   /// Replace the bind values the base query needs.
   pub fn base_params(mut self, params: IndexMap<String, JsonValue>) -> Self {
      self.base_params = params;
      self
   }

   /// Add one bind value the base query needs.
   pub fn bind_param(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
      self.base_params.insert(name.into(), value.into());
      self
   }

   pub fn registry(&self) -> &SchemaRegistry {
      &self.registry
   }

   /// A fresh selection over the base query with `request` bound into it.
   pub fn selection<P: ParamSource + ?Sized>(&self, request: &P) -> QuerySelection {
      let mut selection = QuerySelection::new(self.query.clone());
      selection.base_params = self.base_params.clone();
      selection.page = self.registry.default_page();
      selection.page_size = self.registry.default_page_size();

      bind(&mut selection, request, &self.registry);
      selection
   }

   /// Bind, validate and assemble the paged and count queries for `request`.
   pub fn build<P: ParamSource + ?Sized>(&self, request: &P) -> Result<PagedQuery> {
      let selection = self.selection(request);
      let validated = validate(selection, &self.registry)
         .inspect_err(|e| debug!(error = %e, "rejected list request"))?;

      Ok(assemble(&validated, &self.registry))
   }
}
