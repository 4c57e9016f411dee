//! Paged query assembly with row-number windowing.
//!
//! Turns a [`ValidatedSelection`] into two statements around the caller's base
//! query: a page-bounded result query and a matching total-count query.
//!
//! # How It Works
//!
//! The search and filter predicates are appended to the base query, joined
//! with `where` when the base query has no top-level WHERE clause and with
//! `and` otherwise. The order clause follows. The result becomes the inner
//! query of a `ROWNUM` window:
//!
//! ```text
//! SELECT * FROM (
//!    SELECT a.*, ROWNUM AS rnum FROM ( <base> <where> <order> ) a WHERE ROWNUM <= :page_end
//! ) WHERE rnum > :page_start
//! ```
//!
//! The count query wraps `<base> <where>` in `SELECT count(*)`.
//!
//! Search terms are always bound as `:search_value`. Filter values are
//! rendered as quoted literals; they can only be values the registry declared.
//!
//! # Placeholder
//!
//! A base query may contain [`PLACEHOLDER`] in its select list. When the
//! selected search field is flagged to inject missing columns, the placeholder
//! is replaced with `, column as alias` for every search column the base query
//! does not already mention; otherwise it is removed. Substitution works on a
//! copy, so assembling the same selection twice yields the same SQL.

use indexmap::IndexMap;
use paged_query_schema::{SchemaRegistry, SearchPattern};
use regex::RegexBuilder;
use serde::Serialize;
use serde_json::{Value as JsonValue, json};
use tracing::debug;

use crate::selection::{AppliedFilter, OrderSelection, SearchSelection, ValidatedSelection};

/// Marks where injected search columns are appended to the select list.
pub const PLACEHOLDER: &str = "{not_included_fields}";

/// The statements and bind values produced for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedQuery {
   /// Page-bounded result query
   pub sql: String,
   /// Base params plus `page_start`, `page_end` and, when searching, `search_value`
   pub params: IndexMap<String, JsonValue>,
   /// Total-count query over the same predicates
   pub count_sql: String,
   /// Base params plus, when searching, `search_value`
   pub count_params: IndexMap<String, JsonValue>,
}

impl PagedQuery {
   /// Split into `(sql, params, count_sql, count_params)`.
   pub fn into_parts(
      self,
   ) -> (
      String,
      IndexMap<String, JsonValue>,
      String,
      IndexMap<String, JsonValue>,
   ) {
      (self.sql, self.params, self.count_sql, self.count_params)
   }
}

/// Assemble the paged and count queries for a validated selection.
pub fn assemble(selection: &ValidatedSelection<'_>, registry: &SchemaRegistry) -> PagedQuery {
   let base = resolve_placeholder(selection.query(), selection.search());
   let base = base.trim_end().trim_end_matches(';').trim();

   let mut params = selection.base_params().clone();
   let mut count_params = selection.base_params().clone();
   let (page_start, page_end) = selection.page_window();
   params.insert("page_start".into(), json!(page_start));
   params.insert("page_end".into(), json!(page_end));

   let mut has_where = has_top_level_where(base);
   let mut where_part = Vec::new();

   if let Some(search) = selection.search() {
      where_part.push(format!("{} {}", joiner(has_where), search_predicate(search)));
      has_where = true;

      let bound = json!(search_pattern(search, registry).apply(&search.value));
      params.insert("search_value".into(), bound.clone());
      count_params.insert("search_value".into(), bound);
   }

   if !selection.filters().is_empty() {
      where_part.push(format!(
         "{} {}",
         joiner(has_where),
         filter_predicate(selection.filters())
      ));
   }

   let where_part = where_part.join(" ");
   let order_part = selection.order().map(order_clause).unwrap_or_default();

   let inner = join_fragments(&[base, where_part.as_str(), order_part.as_str()]);
   let filtered = join_fragments(&[base, where_part.as_str()]);

   debug!(
      search = selection.search().map(|s| s.spec.name.as_str()),
      filters = selection.filters().len(),
      order = selection.order().map(|o| o.spec.name.as_str()),
      page_start,
      page_end,
      "assembled paged query"
   );

   PagedQuery {
      sql: format!(
         "SELECT * FROM ( SELECT a.*, ROWNUM AS rnum FROM ( {inner} ) a WHERE ROWNUM <= :page_end ) WHERE rnum > :page_start"
      ),
      params,
      count_sql: format!("SELECT count(*) FROM ( {filtered} ) a"),
      count_params,
   }
}

/// Strict searches always match exactly; others use the configured pattern.
fn search_pattern(search: &SearchSelection<'_>, registry: &SchemaRegistry) -> SearchPattern {
   if search.strict {
      SearchPattern::Exact
   } else {
      registry.pattern_for(&search.spec.name)
   }
}

fn joiner(has_where: bool) -> &'static str {
   if has_where { "and" } else { "where" }
}

fn join_fragments(fragments: &[&str]) -> String {
   fragments
      .iter()
      .filter(|f| !f.is_empty())
      .copied()
      .collect::<Vec<_>>()
      .join(" ")
}

/// `( lower(a) like lower(:search_value) or lower(b) like lower(:search_value) )`
fn search_predicate(search: &SearchSelection<'_>) -> String {
   let tests: Vec<String> = search
      .spec
      .columns
      .iter()
      .map(|column| format!("lower({column}) like lower(:search_value)"))
      .collect();

   format!("( {} )", tests.join(" or "))
}

/// `( lower(a) in ('x', 'y') and lower(b) in ('z') )`
fn filter_predicate(filters: &[AppliedFilter<'_>]) -> String {
   let tests: Vec<String> = filters
      .iter()
      .map(|filter| {
         let values: Vec<String> = filter.values.iter().map(|v| quote_literal(v)).collect();
         format!("lower({}) in ({})", filter.spec.column, values.join(", "))
      })
      .collect();

   format!("( {} )", tests.join(" and "))
}

/// `order by a dir, b dir`, the selected direction applied to every column.
fn order_clause(order: &OrderSelection<'_>) -> String {
   let columns: Vec<String> = order
      .spec
      .columns
      .iter()
      .map(|c| format!("{} {}", c.column, order.direction))
      .collect();

   format!("order by {}", columns.join(", "))
}

/// Quote a string literal, doubling embedded single quotes.
fn quote_literal(value: &str) -> String {
   format!("'{}'", value.replace('\'', "''"))
}

/// Replace the placeholder in `query`, returning a new string.
///
/// Columns of an injecting search spec that the query does not mention (as a
/// whole word, case-insensitively) are appended as aliased select
/// expressions. Without a placeholder the query is returned unchanged.
pub(crate) fn resolve_placeholder(query: &str, search: Option<&SearchSelection<'_>>) -> String {
   if !query.contains(PLACEHOLDER) {
      return query.to_string();
   }

   let template = query.replacen(PLACEHOLDER, "", 1);
   let injected: String = search
      .filter(|s| s.spec.include_if_not_in_query)
      .map(|s| {
         s.spec
            .columns
            .iter()
            .filter(|column| !mentions_column(&template, column))
            .map(|column| format!(", {column} as {}", s.spec.alias_for(column)))
            .collect::<String>()
      })
      .unwrap_or_default();

   query.replacen(PLACEHOLDER, &injected, 1)
}

fn mentions_column(query: &str, column: &str) -> bool {
   RegexBuilder::new(&format!(r"\b{}\b", regex::escape(column)))
      .case_insensitive(true)
      .build()
      .map(|re| re.is_match(query))
      .unwrap_or(false)
}

/// Detect whether `query` has a WHERE keyword outside parentheses, string
/// literals, quoted identifiers and comments.
pub(crate) fn has_top_level_where(query: &str) -> bool {
   let bytes = query.as_bytes();
   let len = bytes.len();
   let mut depth: i32 = 0;
   let mut i = 0;

   while i < len {
      match bytes[i] {
         b'(' => depth += 1,
         b')' => depth -= 1,
         quote @ (b'\'' | b'"') => i = skip_quoted(bytes, i, quote),
         b'-' if bytes.get(i + 1) == Some(&b'-') => {
            while i < len && bytes[i] != b'\n' {
               i += 1;
            }
         }
         b'/' if bytes.get(i + 1) == Some(&b'*') => {
            i += 2;
            while i + 1 < len && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
               i += 1;
            }
            i += 1;
         }
         _ if depth == 0 && is_where_at(bytes, i) => return true,
         _ => {}
      }
      i += 1;
   }

   false
}

/// Index of the closing quote, honouring doubled-quote escapes.
fn skip_quoted(bytes: &[u8], start: usize, quote: u8) -> usize {
   let mut j = start + 1;
   while j < bytes.len() {
      if bytes[j] == quote {
         if bytes.get(j + 1) == Some(&quote) {
            j += 2;
            continue;
         }
         return j;
      }
      j += 1;
   }
   j
}

fn is_where_at(bytes: &[u8], i: usize) -> bool {
   const WHERE: &[u8] = b"where";
   let is_ident = |b: u8| b.is_ascii_alphanumeric() || b == b'_';

   bytes.len() >= i + WHERE.len()
      && bytes[i..i + WHERE.len()].eq_ignore_ascii_case(WHERE)
      && (i == 0 || !is_ident(bytes[i - 1]))
      && bytes.get(i + WHERE.len()).is_none_or(|&b| !is_ident(b))
}
