//! Loading a registry from a JSON configuration file.

use std::io::Write;

use paged_query_schema::{Error, SchemaRegistry, SearchPattern, SortDirection};

fn write_config(json: &str) -> tempfile::NamedTempFile {
   let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
   file.write_all(json.as_bytes()).unwrap();
   file
}

#[test]
fn loads_users_listing_from_file() {
   let file = write_config(
      r#"{
         "searchFields": [
            {"name": "main", "columns": ["id", "name"]},
            {"name": "phones", "columns": ["phones"]},
            {"name": "address", "columns": ["sendkomm"]}
         ],
         "searchPatterns": [
            {"field": "phones", "pattern": "contains"},
            {"field": "address", "pattern": "all"}
         ],
         "orderFields": [
            {"name": "id", "columns": [{"column": "id"}]},
            {"name": "phone", "columns": [{"column": "phones"}, {"column": "sendkomm", "direction": "asc"}]}
         ],
         "filters": [
            {"name": "status", "column": "state", "allowedValues": ["active", "blocked"]}
         ],
         "defaultOrderField": "id",
         "defaultPageSize": 35
      }"#,
   );

   let registry = SchemaRegistry::from_path(file.path()).unwrap();

   assert_eq!(registry.pattern_for("phones"), SearchPattern::Contains);
   assert_eq!(registry.pattern_for("address"), SearchPattern::Contains);
   assert_eq!(registry.pattern_for("main"), SearchPattern::Prefix);
   assert_eq!(registry.default_order(), SortDirection::Desc);
   assert_eq!(registry.default_page_size(), 35);

   let phone = registry.order_field("phone").unwrap();
   assert_eq!(phone.columns[0].direction, SortDirection::Desc);
   assert_eq!(phone.columns[1].direction, SortDirection::Asc);

   let status = registry.filter_field("status").unwrap();
   assert!(status.allows("blocked"));
}

#[test]
fn unknown_pattern_name_falls_back_to_prefix() {
   let file = write_config(
      r#"{
         "searchFields": [{"name": "phones", "columns": ["phones"]}],
         "searchPatterns": [{"field": "phones", "pattern": "soundex"}]
      }"#,
   );

   let registry = SchemaRegistry::from_path(file.path()).unwrap();
   assert_eq!(registry.pattern_for("phones"), SearchPattern::Prefix);
}

#[test]
fn pattern_for_undeclared_field_fails_startup() {
   let file = write_config(
      r#"{
         "searchFields": [{"name": "phones", "columns": ["phones"]}],
         "searchPatterns": [{"field": "address", "pattern": "contains"}]
      }"#,
   );

   let err = SchemaRegistry::from_path(file.path()).unwrap_err();
   assert!(matches!(err, Error::UnknownPatternField { .. }));
   assert!(err.to_string().contains("address"));
}

#[test]
fn missing_file_is_io_error() {
   let dir = tempfile::TempDir::new().unwrap();
   let err = SchemaRegistry::from_path(dir.path().join("missing.json")).unwrap_err();
   assert!(matches!(err, Error::Io(_)));
}
