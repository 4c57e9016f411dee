//! Declarative capability specs for search, ordering and filtering.
//!
//! Each spec names something a request may select (`search_field=main`,
//! `order_field=id`, `status=open,closed`) and maps it onto the columns of the
//! base query. Specs are plain data; the [`SchemaRegistry`](crate::SchemaRegistry)
//! checks them for consistency when it is built.
//!
//! # Example
//!
//! ```
//! use paged_query_schema::{FilterFieldSpec, OrderColumn, OrderFieldSpec, SearchFieldSpec};
//!
//! let main = SearchFieldSpec::new("main", ["id", "name"]);
//! let phones = SearchFieldSpec::new("phones", ["us.phones"]).inject_if_absent();
//! let by_phone = OrderFieldSpec::new(
//!    "phone",
//!    [OrderColumn::desc("phones"), OrderColumn::asc("sendkomm")],
//! );
//! let status = FilterFieldSpec::new("status", "state", ["open", "closed"]);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Sort direction for an order column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
   /// Ascending order (smallest first)
   Asc,
   /// Descending order (largest first)
   #[default]
   Desc,
}

impl SortDirection {
   /// Keyword emitted in the ORDER BY clause.
   pub fn as_sql(self) -> &'static str {
      match self {
         SortDirection::Asc => "asc",
         SortDirection::Desc => "desc",
      }
   }
}

impl fmt::Display for SortDirection {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(self.as_sql())
   }
}

impl FromStr for SortDirection {
   type Err = ();

   fn from_str(s: &str) -> Result<Self, Self::Err> {
      match s {
         "asc" => Ok(SortDirection::Asc),
         "desc" => Ok(SortDirection::Desc),
         _ => Err(()),
      }
   }
}

/// LIKE-operand shaping rule applied to a raw search term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchPattern {
   /// `value%`
   #[default]
   Prefix,
   /// `%value`
   Suffix,
   /// `%value%`
   Contains,
   /// `value`
   Exact,
}

impl SearchPattern {
   /// Shape `value` into the operand bound as `:search_value`.
   pub fn apply(self, value: &str) -> String {
      match self {
         SearchPattern::Prefix => format!("{value}%"),
         SearchPattern::Suffix => format!("%{value}"),
         SearchPattern::Contains => format!("%{value}%"),
         SearchPattern::Exact => value.to_string(),
      }
   }
}

impl FromStr for SearchPattern {
   type Err = ();

   /// Accepts the pattern names and the legacy `start`/`end`/`all`/`strict`
   /// aliases, case-insensitively.
   fn from_str(s: &str) -> Result<Self, Self::Err> {
      match s.trim().to_ascii_lowercase().as_str() {
         "prefix" | "start" => Ok(SearchPattern::Prefix),
         "suffix" | "end" => Ok(SearchPattern::Suffix),
         "contains" | "all" => Ok(SearchPattern::Contains),
         "exact" | "strict" => Ok(SearchPattern::Exact),
         _ => Err(()),
      }
   }
}

impl<'de> Deserialize<'de> for SearchPattern {
   fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
      let raw = String::deserialize(deserializer)?;
      Ok(raw.parse().unwrap_or_else(|_| {
         warn!(pattern = %raw, "unrecognized search pattern, falling back to prefix");
         SearchPattern::Prefix
      }))
   }
}

/// A named, user-selectable search target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFieldSpec {
   /// Value a request passes as `search_field`
   pub name: String,
   /// Columns OR-combined into the search predicate, in declaration order
   pub columns: Vec<String>,
   /// Append missing columns to the select list through the placeholder token
   #[serde(default)]
   pub include_if_not_in_query: bool,
}

impl SearchFieldSpec {
   pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
   where
      I: IntoIterator<Item = S>,
      S: Into<String>,
   {
      Self {
         name: name.into(),
         columns: columns.into_iter().map(Into::into).collect(),
         include_if_not_in_query: false,
      }
   }

   /// Inject columns the base query does not already select.
   pub fn inject_if_absent(mut self) -> Self {
      self.include_if_not_in_query = true;
      self
   }

   /// Alias used when `column` is injected into the select list.
   ///
   /// A single-column spec aliases its column to the spec name; a
   /// multi-column spec suffixes the name with the column, dots replaced by
   /// underscores.
   pub fn alias_for(&self, column: &str) -> String {
      if self.columns.len() == 1 {
         self.name.clone()
      } else {
         format!("{}_{}", self.name, column.replace('.', "_"))
      }
   }
}

/// Pattern policy for one declared search field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPatternSpec {
   /// Name of the [`SearchFieldSpec`] this policy applies to
   pub field: String,
   #[serde(default)]
   pub pattern: SearchPattern,
}

impl SearchPatternSpec {
   pub fn new(field: impl Into<String>, pattern: SearchPattern) -> Self {
      Self {
         field: field.into(),
         pattern,
      }
   }
}

/// One column of an order group with its declared direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderColumn {
   pub column: String,
   #[serde(default)]
   pub direction: SortDirection,
}

impl OrderColumn {
   /// Create an order column with ascending default direction.
   pub fn asc(column: impl Into<String>) -> Self {
      Self {
         column: column.into(),
         direction: SortDirection::Asc,
      }
   }

   /// Create an order column with descending default direction.
   pub fn desc(column: impl Into<String>) -> Self {
      Self {
         column: column.into(),
         direction: SortDirection::Desc,
      }
   }
}

/// A named, user-selectable sort target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFieldSpec {
   /// Value a request passes as `order_field`
   pub name: String,
   pub columns: Vec<OrderColumn>,
}

impl OrderFieldSpec {
   pub fn new(name: impl Into<String>, columns: impl IntoIterator<Item = OrderColumn>) -> Self {
      Self {
         name: name.into(),
         columns: columns.into_iter().collect(),
      }
   }
}

/// A named membership filter over one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterFieldSpec {
   /// Request parameter carrying the comma-separated values
   pub name: String,
   pub column: String,
   pub allowed_values: Vec<String>,
}

impl FilterFieldSpec {
   pub fn new<I, S>(name: impl Into<String>, column: impl Into<String>, allowed_values: I) -> Self
   where
      I: IntoIterator<Item = S>,
      S: Into<String>,
   {
      Self {
         name: name.into(),
         column: column.into(),
         allowed_values: allowed_values.into_iter().map(Into::into).collect(),
      }
   }

   pub fn allows(&self, value: &str) -> bool {
      self.allowed_values.iter().any(|allowed| allowed == value)
   }
}
