//! Binding raw request parameters into a [`QuerySelection`].
//!
//! Binding never rejects input. Unparseable pages fall back to the values the
//! selection already holds, missing order parameters fall back to the
//! registry defaults, and filter values outside a filter's allowed set are
//! dropped. Everything else is left for validation.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use indexmap::IndexMap;
use paged_query_schema::{FilterFieldSpec, SchemaRegistry};
use paged_query_toolkit::{FilterSelection, QuerySelection};
use serde_json::Value as JsonValue;
use tracing::debug;

/// Name-based lookup of raw request parameters (usually the query string).
pub trait ParamSource {
   /// Raw value of parameter `name`, if the request carries it.
   fn param(&self, name: &str) -> Option<&str>;
}

impl<S: BuildHasher> ParamSource for HashMap<String, String, S> {
   fn param(&self, name: &str) -> Option<&str> {
      self.get(name).map(String::as_str)
   }
}

impl<S: BuildHasher> ParamSource for IndexMap<String, String, S> {
   fn param(&self, name: &str) -> Option<&str> {
      self.get(name).map(String::as_str)
   }
}

impl ParamSource for BTreeMap<String, String> {
   fn param(&self, name: &str) -> Option<&str> {
      self.get(name).map(String::as_str)
   }
}

impl ParamSource for [(&str, &str)] {
   fn param(&self, name: &str) -> Option<&str> {
      self.iter().find(|(key, _)| *key == name).map(|(_, value)| *value)
   }
}

impl<P: ParamSource + ?Sized> ParamSource for &P {
   fn param(&self, name: &str) -> Option<&str> {
      (**self).param(name)
   }
}

/// Copy request parameters into `selection`.
///
/// Reads `page`, `page_size`, `order_field`, `order`, `search_value`,
/// `search_field`, `strict`, and one comma-separated parameter per declared
/// filter, named after the filter.
pub fn bind<P>(selection: &mut QuerySelection, request: &P, registry: &SchemaRegistry)
where
   P: ParamSource + ?Sized,
{
   selection.page = parse_int(request.param("page")).unwrap_or(selection.page);
   selection.page_size = parse_int(request.param("page_size")).unwrap_or(selection.page_size);

   selection.order_field = request
      .param("order_field")
      .or(registry.default_order_field())
      .map(str::to_string);
   selection.order = Some(
      request
         .param("order")
         .map(str::to_string)
         .unwrap_or_else(|| registry.default_order().to_string()),
   );

   selection.search_value = request.param("search_value").map(str::to_string);
   selection.search_field = request.param("search_field").map(str::to_string);
   selection.strict = request
      .param("strict")
      .map(|raw| JsonValue::String(raw.to_string()));

   selection.filters = registry
      .filters()
      .iter()
      .filter_map(|spec| bind_filter(spec, request.param(&spec.name)?))
      .collect();
}

/// Keep the allowed values of one comma-separated filter parameter.
fn bind_filter(spec: &FilterFieldSpec, raw: &str) -> Option<FilterSelection> {
   let mut values: Vec<String> = Vec::new();

   for value in raw.split(',').map(str::trim).filter(|v| !v.is_empty()) {
      if !spec.allows(value) {
         debug!(filter = %spec.name, value, "dropping filter value outside allowed set");
         continue;
      }
      if !values.iter().any(|v| v == value) {
         values.push(value.to_string());
      }
   }

   if values.is_empty() {
      return None;
   }

   Some(FilterSelection::new(spec.name.clone(), values))
}

fn parse_int(raw: Option<&str>) -> Option<i64> {
   raw?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
   use paged_query_schema::{OrderColumn, OrderFieldSpec, SchemaRegistryConfig, SortDirection};
   use serde_json::json;

   use super::*;

   fn registry() -> SchemaRegistry {
      SchemaRegistry::new(SchemaRegistryConfig {
         order_fields: vec![OrderFieldSpec::new("id", [OrderColumn::desc("id")])],
         filters: vec![
            FilterFieldSpec::new("status", "state", ["a", "b"]),
            FilterFieldSpec::new("kind", "kind", ["c"]),
         ],
         default_order_field: Some("id".into()),
         default_order: SortDirection::Asc,
         ..Default::default()
      })
      .unwrap()
   }

   fn bound(params: &[(&str, &str)]) -> QuerySelection {
      let mut selection = QuerySelection::new("select * from users");
      bind(&mut selection, params, &registry());
      selection
   }

   // ─── pages ───

   #[test]
   fn reads_page_and_page_size() {
      let selection = bound(&[("page", "3"), ("page_size", " 35 ")]);
      assert_eq!((selection.page, selection.page_size), (3, 35));
   }

   #[test]
   fn unparseable_pages_keep_prior_values() {
      let selection = bound(&[("page", "two"), ("page_size", "")]);
      assert_eq!((selection.page, selection.page_size), (1, 15));
   }

   #[test]
   fn out_of_range_pages_are_bound_as_given() {
      let selection = bound(&[("page", "-4"), ("page_size", "0")]);
      assert_eq!((selection.page, selection.page_size), (-4, 0));
   }

   // ─── order ───

   #[test]
   fn order_falls_back_to_registry_defaults() {
      let selection = bound(&[]);
      assert_eq!(selection.order_field.as_deref(), Some("id"));
      assert_eq!(selection.order.as_deref(), Some("asc"));
   }

   #[test]
   fn order_parameters_are_bound_raw() {
      let selection = bound(&[("order_field", " CID "), ("order", "DESC")]);
      assert_eq!(selection.order_field.as_deref(), Some(" CID "));
      assert_eq!(selection.order.as_deref(), Some("DESC"));
   }

   // ─── search ───

   #[test]
   fn reads_search_parameters() {
      let selection = bound(&[
         ("search_value", "1387"),
         ("search_field", "phones"),
         ("strict", "1"),
      ]);
      assert_eq!(selection.search_value.as_deref(), Some("1387"));
      assert_eq!(selection.search_field.as_deref(), Some("phones"));
      assert_eq!(selection.strict, Some(json!("1")));
   }

   #[test]
   fn absent_search_parameters_stay_absent() {
      let selection = bound(&[]);
      assert_eq!(selection.search_value, None);
      assert_eq!(selection.search_field, None);
      assert_eq!(selection.strict, None);
   }

   // ─── filters ───

   #[test]
   fn drops_disallowed_filter_values() {
      let selection = bound(&[("status", "a,b,x")]);
      assert_eq!(selection.filters, vec![FilterSelection::new("status", ["a", "b"])]);
   }

   #[test]
   fn omits_filter_without_allowed_values() {
      let selection = bound(&[("kind", "a,b,x")]);
      assert!(selection.filters.is_empty());
   }

   #[test]
   fn trims_and_dedupes_filter_values() {
      let selection = bound(&[("status", " b, a,,b ")]);
      assert_eq!(selection.filters, vec![FilterSelection::new("status", ["b", "a"])]);
   }

   #[test]
   fn filters_follow_declaration_order() {
      let selection = bound(&[("kind", "c"), ("status", "a")]);
      let names: Vec<&str> = selection.filters.iter().map(|f| f.field.as_str()).collect();
      assert_eq!(names, vec!["status", "kind"]);
   }

   #[test]
   fn undeclared_parameters_are_ignored() {
      let selection = bound(&[("colour", "red")]);
      assert!(selection.filters.is_empty());
   }

   // ─── sources ───

   #[test]
   fn hash_map_source() {
      let mut params = HashMap::new();
      params.insert("page".to_string(), "2".to_string());

      let mut selection = QuerySelection::new("select * from users");
      bind(&mut selection, &params, &registry());
      assert_eq!(selection.page, 2);
   }
}
