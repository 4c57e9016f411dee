//! The immutable capability set a list endpoint exposes.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::spec::{
   FilterFieldSpec, OrderFieldSpec, SearchFieldSpec, SearchPattern, SearchPatternSpec,
   SortDirection,
};
use crate::{Error, Result};

/// Declarations a [`SchemaRegistry`] is built from.
///
/// # Examples
///
/// ```
/// use paged_query_schema::{
///    OrderColumn, OrderFieldSpec, SchemaRegistry, SchemaRegistryConfig, SearchFieldSpec,
///    SearchPattern, SearchPatternSpec,
/// };
///
/// let config = SchemaRegistryConfig {
///    search_fields: vec![SearchFieldSpec::new("phones", ["phones"])],
///    search_patterns: vec![SearchPatternSpec::new("phones", SearchPattern::Contains)],
///    order_fields: vec![OrderFieldSpec::new("id", [OrderColumn::desc("id")])],
///    default_order_field: Some("id".into()),
///    ..Default::default()
/// };
///
/// let registry = SchemaRegistry::new(config).unwrap();
/// assert_eq!(registry.pattern_for("phones"), SearchPattern::Contains);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchemaRegistryConfig {
   pub search_fields: Vec<SearchFieldSpec>,

   /// Pattern overrides; search fields without one use [`SearchPattern::Prefix`]
   pub search_patterns: Vec<SearchPatternSpec>,

   pub order_fields: Vec<OrderFieldSpec>,

   pub filters: Vec<FilterFieldSpec>,

   /// Order field applied when a request names none
   ///
   /// Default: none (results are left unordered)
   pub default_order_field: Option<String>,

   /// Direction applied when a request names none
   ///
   /// Default: `desc`
   pub default_order: SortDirection,

   /// Page used when a request names none
   ///
   /// Default: 1
   pub default_page: i64,

   /// Page size used when a request names none
   ///
   /// Default: 15
   pub default_page_size: i64,
}

impl Default for SchemaRegistryConfig {
   fn default() -> Self {
      Self {
         search_fields: Vec::new(),
         search_patterns: Vec::new(),
         order_fields: Vec::new(),
         filters: Vec::new(),
         default_order_field: None,
         default_order: SortDirection::Desc,
         default_page: 1,
         default_page_size: 15,
      }
   }
}

/// Validated, read-only set of search, order and filter declarations.
///
/// Built once at service configuration time and shared (usually behind an
/// `Arc`) by every request. Lookups are by exact name.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
   search_fields: Vec<SearchFieldSpec>,
   patterns: HashMap<String, SearchPattern>,
   order_fields: Vec<OrderFieldSpec>,
   filters: Vec<FilterFieldSpec>,
   default_order_field: Option<String>,
   default_order: SortDirection,
   default_page: i64,
   default_page_size: i64,
}

impl SchemaRegistry {
   /// Check `config` for consistency and freeze it.
   pub fn new(config: SchemaRegistryConfig) -> Result<Self> {
      let mut names = HashSet::new();
      for field in &config.search_fields {
         ensure_unique(&mut names, "search field", &field.name)?;
         if field.columns.is_empty() {
            return Err(Error::EmptyColumns {
               kind: "search field",
               name: field.name.clone(),
            });
         }
         for column in &field.columns {
            validate_column_name(column)?;
         }
         // Injected columns are aliased by the spec name
         if field.include_if_not_in_query {
            validate_column_name(&field.name)?;
         }
      }

      let mut patterns = HashMap::new();
      for spec in &config.search_patterns {
         if !config.search_fields.iter().any(|f| f.name == spec.field) {
            return Err(Error::UnknownPatternField {
               field: spec.field.clone(),
               declared: config.search_fields.iter().map(|f| f.name.clone()).collect(),
            });
         }
         patterns.insert(spec.field.clone(), spec.pattern);
      }

      names.clear();
      for field in &config.order_fields {
         ensure_unique(&mut names, "order field", &field.name)?;
         if field.columns.is_empty() {
            return Err(Error::EmptyColumns {
               kind: "order field",
               name: field.name.clone(),
            });
         }
         for column in &field.columns {
            validate_column_name(&column.column)?;
         }
      }

      names.clear();
      for filter in &config.filters {
         ensure_unique(&mut names, "filter", &filter.name)?;
         validate_column_name(&filter.column)?;
         if filter.allowed_values.is_empty() {
            return Err(Error::EmptyAllowedValues {
               name: filter.name.clone(),
            });
         }
      }

      if let Some(default) = &config.default_order_field
         && !config.order_fields.iter().any(|f| &f.name == default)
      {
         return Err(Error::UnknownDefaultOrderField {
            name: default.clone(),
            declared: config.order_fields.iter().map(|f| f.name.clone()).collect(),
         });
      }

      debug!(
         search_fields = config.search_fields.len(),
         order_fields = config.order_fields.len(),
         filters = config.filters.len(),
         "schema registry built"
      );

      Ok(Self {
         search_fields: config.search_fields,
         patterns,
         order_fields: config.order_fields,
         filters: config.filters,
         default_order_field: config.default_order_field,
         default_order: config.default_order,
         default_page: config.default_page,
         default_page_size: config.default_page_size,
      })
   }

   /// Parse a JSON [`SchemaRegistryConfig`] and build the registry from it.
   pub fn from_json_str(json: &str) -> Result<Self> {
      Self::new(serde_json::from_str(json)?)
   }

   /// Read a JSON [`SchemaRegistryConfig`] from `path` and build the registry.
   pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
      let json = std::fs::read_to_string(path)?;
      Self::from_json_str(&json)
   }

   pub fn search_field(&self, name: &str) -> Option<&SearchFieldSpec> {
      self.search_fields.iter().find(|f| f.name == name)
   }

   pub fn order_field(&self, name: &str) -> Option<&OrderFieldSpec> {
      self.order_fields.iter().find(|f| f.name == name)
   }

   pub fn filter_field(&self, name: &str) -> Option<&FilterFieldSpec> {
      self.filters.iter().find(|f| f.name == name)
   }

   /// Pattern configured for a search field, [`SearchPattern::Prefix`] if none.
   pub fn pattern_for(&self, search_field: &str) -> SearchPattern {
      self.patterns.get(search_field).copied().unwrap_or_default()
   }

   /// Declared filters, in declaration order.
   pub fn filters(&self) -> &[FilterFieldSpec] {
      &self.filters
   }

   pub fn search_field_names(&self) -> Vec<String> {
      self.search_fields.iter().map(|f| f.name.clone()).collect()
   }

   pub fn order_field_names(&self) -> Vec<String> {
      self.order_fields.iter().map(|f| f.name.clone()).collect()
   }

   pub fn filter_names(&self) -> Vec<String> {
      self.filters.iter().map(|f| f.name.clone()).collect()
   }

   pub fn default_order_field(&self) -> Option<&str> {
      self.default_order_field.as_deref()
   }

   pub fn default_order(&self) -> SortDirection {
      self.default_order
   }

   pub fn default_page(&self) -> i64 {
      self.default_page
   }

   pub fn default_page_size(&self) -> i64 {
      self.default_page_size
   }
}

fn ensure_unique(seen: &mut HashSet<String>, kind: &'static str, name: &str) -> Result<()> {
   if !seen.insert(name.to_string()) {
      return Err(Error::DuplicateName {
         kind,
         name: name.to_string(),
      });
   }
   Ok(())
}

/// Validate that a column name is safe for SQL interpolation.
///
/// Accepts names matching `[a-zA-Z_][a-zA-Z0-9_.]*`, which covers plain column
/// names, qualified names (e.g., `table.column`), and underscored identifiers.
pub fn validate_column_name(name: &str) -> Result<()> {
   let mut chars = name.chars();
   let valid_start = chars
      .next()
      .is_some_and(|first| first.is_ascii_alphabetic() || first == '_');

   if !valid_start || !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '.') {
      return Err(Error::InvalidColumnName {
         name: name.to_string(),
      });
   }

   Ok(())
}

#[cfg(test)]
mod tests {
   use super::*;
   use crate::spec::OrderColumn;

   fn config() -> SchemaRegistryConfig {
      SchemaRegistryConfig {
         search_fields: vec![
            SearchFieldSpec::new("main", ["id", "name"]),
            SearchFieldSpec::new("phones", ["phones"]),
         ],
         search_patterns: vec![SearchPatternSpec::new("phones", SearchPattern::Contains)],
         order_fields: vec![
            OrderFieldSpec::new("id", [OrderColumn::desc("id")]),
            OrderFieldSpec::new("phone", [OrderColumn::desc("phones"), OrderColumn::asc("sendkomm")]),
         ],
         filters: vec![FilterFieldSpec::new("status", "state", ["a", "b"])],
         default_order_field: Some("id".into()),
         ..Default::default()
      }
   }

   // ─── construction ───

   #[test]
   fn builds_valid_config() {
      let registry = SchemaRegistry::new(config()).unwrap();
      assert_eq!(registry.search_field_names(), vec!["main", "phones"]);
      assert_eq!(registry.order_field_names(), vec!["id", "phone"]);
      assert_eq!(registry.filter_names(), vec!["status"]);
      assert_eq!(registry.default_order_field(), Some("id"));
      assert_eq!(registry.default_order(), SortDirection::Desc);
      assert_eq!(registry.default_page(), 1);
      assert_eq!(registry.default_page_size(), 15);
   }

   #[test]
   fn rejects_pattern_for_undeclared_field() {
      let mut config = config();
      config
         .search_patterns
         .push(SearchPatternSpec::new("address", SearchPattern::Suffix));

      let err = SchemaRegistry::new(config).unwrap_err();
      assert!(matches!(err, Error::UnknownPatternField { ref field, .. } if field == "address"));
      assert!(err.to_string().contains("main"));
   }

   #[test]
   fn rejects_duplicate_search_field() {
      let mut config = config();
      config.search_fields.push(SearchFieldSpec::new("main", ["other"]));

      let err = SchemaRegistry::new(config).unwrap_err();
      assert!(matches!(err, Error::DuplicateName { kind: "search field", .. }));
   }

   #[test]
   fn rejects_empty_order_columns() {
      let mut config = config();
      config.order_fields.push(OrderFieldSpec::new("empty", Vec::<OrderColumn>::new()));

      let err = SchemaRegistry::new(config).unwrap_err();
      assert!(matches!(err, Error::EmptyColumns { kind: "order field", .. }));
   }

   #[test]
   fn rejects_filter_without_values() {
      let mut config = config();
      config
         .filters
         .push(FilterFieldSpec::new("kind", "kind", Vec::<String>::new()));

      let err = SchemaRegistry::new(config).unwrap_err();
      assert!(matches!(err, Error::EmptyAllowedValues { ref name } if name == "kind"));
   }

   #[test]
   fn rejects_unsafe_column() {
      let mut config = config();
      config
         .search_fields
         .push(SearchFieldSpec::new("evil", ["id; DROP TABLE users --"]));

      let err = SchemaRegistry::new(config).unwrap_err();
      assert!(matches!(err, Error::InvalidColumnName { .. }));
   }

   #[test]
   fn rejects_undeclared_default_order_field() {
      let mut config = config();
      config.default_order_field = Some("cid".into());

      let err = SchemaRegistry::new(config).unwrap_err();
      assert!(matches!(err, Error::UnknownDefaultOrderField { ref name, .. } if name == "cid"));
   }

   // ─── lookups ───

   #[test]
   fn pattern_defaults_to_prefix() {
      let registry = SchemaRegistry::new(config()).unwrap();
      assert_eq!(registry.pattern_for("phones"), SearchPattern::Contains);
      assert_eq!(registry.pattern_for("main"), SearchPattern::Prefix);
      assert_eq!(registry.pattern_for("unknown"), SearchPattern::Prefix);
   }

   #[test]
   fn lookups_are_exact() {
      let registry = SchemaRegistry::new(config()).unwrap();
      assert!(registry.search_field("main").is_some());
      assert!(registry.search_field("MAIN").is_none());
      assert!(registry.order_field("phone").is_some());
      assert!(registry.filter_field("status").is_some());
      assert!(registry.filter_field("state").is_none());
   }

   #[test]
   fn builds_from_json() {
      let registry = SchemaRegistry::from_json_str(
         r#"{
            "searchFields": [{"name": "phones", "columns": ["phones"], "includeIfNotInQuery": true}],
            "searchPatterns": [{"field": "phones", "pattern": "all"}],
            "orderFields": [{"name": "id", "columns": [{"column": "id", "direction": "asc"}]}],
            "defaultOrderField": "id",
            "defaultOrder": "asc"
         }"#,
      )
      .unwrap();

      assert_eq!(registry.pattern_for("phones"), SearchPattern::Contains);
      assert!(registry.search_field("phones").unwrap().include_if_not_in_query);
      assert_eq!(registry.default_order(), SortDirection::Asc);
      assert_eq!(registry.default_page_size(), 15);
   }

   #[test]
   fn malformed_json_is_configuration_error() {
      let err = SchemaRegistry::from_json_str("{ not json").unwrap_err();
      assert!(matches!(err, Error::Json(_)));
   }

   // ─── validate_column_name ───

   #[test]
   fn column_name_valid_simple() {
      assert!(validate_column_name("id").is_ok());
      assert!(validate_column_name("_private").is_ok());
      assert!(validate_column_name("col_123").is_ok());
   }

   #[test]
   fn column_name_valid_qualified() {
      assert!(validate_column_name("us.phones").is_ok());
      assert!(validate_column_name("schema.table.column").is_ok());
   }

   #[test]
   fn column_name_rejects_injection() {
      assert!(validate_column_name("").is_err());
      assert!(validate_column_name("id)--").is_err());
      assert!(validate_column_name("1bad").is_err());
      assert!(validate_column_name("col name").is_err());
   }
}
