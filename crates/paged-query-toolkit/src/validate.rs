//! Two-phase validation of a request selection.
//!
//! [`normalize`] coerces the primitive fields into canonical form and cannot
//! fail. [`cross_validate`] then checks the selection against a
//! [`SchemaRegistry`] and resolves every selected name to its spec. The first
//! violation aborts validation.

use paged_query_schema::{SchemaRegistry, SortDirection};
use serde_json::Value as JsonValue;

use crate::error::SchemaViolation;
use crate::selection::{
   AppliedFilter, OrderSelection, QuerySelection, SearchSelection, ValidatedSelection,
};

const DIRECTIONS: [&str; 2] = ["asc", "desc"];

/// Coerce a selection's primitive fields into canonical form.
///
/// - `page` and `page_size` below 1 become 1
/// - `strict` becomes `true` for `true`, `1`, `"1"` and `"true"`, otherwise `false`
/// - field names and the order direction are trimmed and lower-cased; empty becomes absent
/// - a blank search value becomes absent
///
/// Normalizing an already normalized selection returns it unchanged.
pub fn normalize(mut selection: QuerySelection) -> QuerySelection {
   selection.page = selection.page.max(1);
   selection.page_size = selection.page_size.max(1);
   selection.strict = Some(JsonValue::Bool(is_truthy(selection.strict.as_ref())));
   selection.search_field = normalize_name(selection.search_field);
   selection.order_field = normalize_name(selection.order_field);
   selection.order = normalize_name(selection.order);
   selection.search_value = selection
      .search_value
      .map(|value| value.trim().to_string())
      .filter(|value| !value.is_empty());
   selection
}

/// Check a selection against `registry` and resolve it for assembly.
///
/// Expects a [`normalize`]d selection; unnormalized page values are still
/// clamped so the page window stays valid.
pub fn cross_validate(
   selection: QuerySelection,
   registry: &SchemaRegistry,
) -> Result<ValidatedSelection<'_>, SchemaViolation> {
   let search_spec = match selection.search_field.as_deref() {
      Some(name) => Some(registry.search_field(name).ok_or_else(|| {
         SchemaViolation::new("search_field", name, registry.search_field_names())
      })?),
      None => None,
   };

   let order_spec = match selection.order_field.as_deref() {
      Some(name) => Some(registry.order_field(name).ok_or_else(|| {
         SchemaViolation::new("order_field", name, registry.order_field_names())
      })?),
      None => None,
   };

   let direction = match selection.order.as_deref() {
      Some(raw) => raw.parse::<SortDirection>().map_err(|_| {
         SchemaViolation::new("order", raw, DIRECTIONS.iter().map(|d| d.to_string()).collect())
      })?,
      None => registry.default_order(),
   };

   let search = match (selection.search_value, search_spec) {
      (Some(value), Some(spec)) => Some(SearchSelection {
         spec,
         value,
         strict: is_truthy(selection.strict.as_ref()),
      }),
      (Some(_), None) => {
         return Err(SchemaViolation::new(
            "search_field",
            "",
            registry.search_field_names(),
         ));
      }
      (None, _) => None,
   };

   let mut filters = Vec::with_capacity(selection.filters.len());
   for filter in selection.filters {
      let spec = registry
         .filter_field(&filter.field)
         .ok_or_else(|| SchemaViolation::new("filter", &filter.field, registry.filter_names()))?;

      if let Some(value) = filter.values.iter().find(|v| !spec.allows(v)) {
         return Err(SchemaViolation::new(
            &filter.field,
            value,
            spec.allowed_values.clone(),
         ));
      }

      if !filter.values.is_empty() {
         filters.push(AppliedFilter {
            spec,
            values: filter.values,
         });
      }
   }

   Ok(ValidatedSelection {
      query: selection.query,
      base_params: selection.base_params,
      search,
      order: order_spec.map(|spec| OrderSelection { spec, direction }),
      filters,
      page: selection.page.max(1) as u64,
      page_size: selection.page_size.max(1) as u64,
   })
}

/// [`normalize`] followed by [`cross_validate`].
pub fn validate(
   selection: QuerySelection,
   registry: &SchemaRegistry,
) -> Result<ValidatedSelection<'_>, SchemaViolation> {
   cross_validate(normalize(selection), registry)
}

fn is_truthy(value: Option<&JsonValue>) -> bool {
   match value {
      Some(JsonValue::Bool(flag)) => *flag,
      Some(JsonValue::Number(n)) => n.as_i64() == Some(1) || n.as_u64() == Some(1),
      Some(JsonValue::String(s)) => {
         let s = s.trim();
         s == "1" || s.eq_ignore_ascii_case("true")
      }
      _ => false,
   }
}

fn normalize_name(name: Option<String>) -> Option<String> {
   name
      .map(|n| n.trim().to_lowercase())
      .filter(|n| !n.is_empty())
}
