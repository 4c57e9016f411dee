//! Per-request selection state, before and after validation.

use indexmap::IndexMap;
use paged_query_schema::{FilterFieldSpec, OrderFieldSpec, SearchFieldSpec, SortDirection};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Page used by a fresh selection.
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used by a fresh selection.
pub const DEFAULT_PAGE_SIZE: i64 = 15;

/// One filter a request applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
   /// Name of the declared filter (not its column)
   pub field: String,
   pub values: Vec<String>,
}

impl FilterSelection {
   pub fn new<I, S>(field: impl Into<String>, values: I) -> Self
   where
      I: IntoIterator<Item = S>,
      S: Into<String>,
   {
      Self {
         field: field.into(),
         values: values.into_iter().map(Into::into).collect(),
      }
   }
}

/// Loosely-typed selection for a single request.
///
/// Populated by request binding (or by hand), then passed through
/// [`normalize`](crate::normalize) and [`cross_validate`](crate::cross_validate).
/// Field values are kept as the request supplied them until then: `strict`
/// accepts any JSON value and `order` any string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySelection {
   /// Base SELECT statement, optionally holding the placeholder token
   pub query: String,
   /// Caller-supplied bind values for the base statement
   pub base_params: IndexMap<String, JsonValue>,

   pub search_value: Option<String>,
   pub search_field: Option<String>,
   pub strict: Option<JsonValue>,

   pub order_field: Option<String>,
   pub order: Option<String>,

   pub page: i64,
   pub page_size: i64,

   pub filters: Vec<FilterSelection>,
}

impl QuerySelection {
   /// Fresh selection over `query` with first-page defaults and nothing selected.
   pub fn new(query: impl Into<String>) -> Self {
      Self {
         query: query.into(),
         base_params: IndexMap::new(),
         search_value: None,
         search_field: None,
         strict: None,
         order_field: None,
         order: None,
         page: DEFAULT_PAGE,
         page_size: DEFAULT_PAGE_SIZE,
         filters: Vec::new(),
      }
   }
}

/// A search the request selected, resolved against its spec.
#[derive(Debug, Clone)]
pub struct SearchSelection<'r> {
   pub spec: &'r SearchFieldSpec,
   /// Raw search term, before the pattern is applied
   pub value: String,
   pub strict: bool,
}

/// An ordering the request selected, resolved against its spec.
#[derive(Debug, Clone)]
pub struct OrderSelection<'r> {
   pub spec: &'r OrderFieldSpec,
   /// Applied to every column of the spec
   pub direction: SortDirection,
}

/// A filter the request applied, resolved against its spec.
#[derive(Debug, Clone)]
pub struct AppliedFilter<'r> {
   pub spec: &'r FilterFieldSpec,
   pub values: Vec<String>,
}

/// A selection that passed validation against a registry.
///
/// Only [`cross_validate`](crate::cross_validate) creates one, so every spec
/// it references is known to exist and assembly cannot fail.
#[derive(Debug, Clone)]
pub struct ValidatedSelection<'r> {
   pub(crate) query: String,
   pub(crate) base_params: IndexMap<String, JsonValue>,
   pub(crate) search: Option<SearchSelection<'r>>,
   pub(crate) order: Option<OrderSelection<'r>>,
   pub(crate) filters: Vec<AppliedFilter<'r>>,
   pub(crate) page: u64,
   pub(crate) page_size: u64,
}

impl<'r> ValidatedSelection<'r> {
   pub fn query(&self) -> &str {
      &self.query
   }

   pub fn base_params(&self) -> &IndexMap<String, JsonValue> {
      &self.base_params
   }

   pub fn search(&self) -> Option<&SearchSelection<'r>> {
      self.search.as_ref()
   }

   pub fn order(&self) -> Option<&OrderSelection<'r>> {
      self.order.as_ref()
   }

   pub fn filters(&self) -> &[AppliedFilter<'r>] {
      &self.filters
   }

   pub fn page(&self) -> u64 {
      self.page
   }

   pub fn page_size(&self) -> u64 {
      self.page_size
   }

   /// Row window `(page_start, page_end]` covered by the selected page.
   pub fn page_window(&self) -> (u64, u64) {
      let start = (self.page - 1).saturating_mul(self.page_size);
      (start, start.saturating_add(self.page_size))
   }
}
