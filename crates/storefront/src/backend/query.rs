//! Structured row queries for the backend's REST dialect.
//!
//! A [`Query`] is a table name plus a projection, predicate list, ordering and
//! limit. [`RestBackend`](super::RestBackend) renders it into PostgREST query
//! parameters; the in-memory backend evaluates the same structure directly.
//!
//! # Rendering
//!
//! ```text
//! Filter::Eq(status, "active")          status=eq.active
//! Filter::Gte(price, "100")             price=gte.100
//! Filter::ILike(brand, "%sam%")         brand=ilike.%sam%
//! Filter::In(id, [a, b])                id=in.("a","b")
//! Filter::Or([name ilike, brand ilike]) or=(name.ilike."%x%",brand.ilike."%x%")
//! ```

use std::fmt;

/// A column reference, optionally drilling into a JSON object as text
/// (`specifications->>network`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    name: String,
    json_key: Option<String>,
}

impl Column {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            json_key: None,
        }
    }

    /// The text value stored under `key` inside the JSON column `name`.
    #[must_use]
    pub fn json_text(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            json_key: Some(key.into()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn json_key(&self) -> Option<&str> {
        self.json_key.as_deref()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.json_key {
            Some(key) => write!(f, "{}->>{key}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A row predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq(Column, String),
    Gte(Column, String),
    Lte(Column, String),
    /// Case-insensitive `LIKE`; the pattern is passed through untouched, so
    /// user input must go through [`contains_pattern`] first.
    ILike(Column, String),
    In(Column, Vec<String>),
    Or(Vec<Filter>),
}

impl Filter {
    /// Whether this predicate (or any nested one) reads inside a JSON column.
    #[must_use]
    pub fn uses_json_path(&self) -> bool {
        match self {
            Self::Eq(c, _) | Self::Gte(c, _) | Self::Lte(c, _) | Self::ILike(c, _) | Self::In(c, _) => {
                c.json_key.is_some()
            }
            Self::Or(inner) => inner.iter().any(Self::uses_json_path),
        }
    }

    /// Render as a top-level `(key, value)` query parameter.
    fn to_param(&self) -> (String, String) {
        match self {
            Self::Or(inner) => ("or".to_string(), render_group(inner)),
            Self::Eq(c, v) => (c.to_string(), format!("eq.{v}")),
            Self::Gte(c, v) => (c.to_string(), format!("gte.{v}")),
            Self::Lte(c, v) => (c.to_string(), format!("lte.{v}")),
            Self::ILike(c, v) => (c.to_string(), format!("ilike.{v}")),
            Self::In(c, vs) => (c.to_string(), format!("in.{}", render_list(vs))),
        }
    }

    /// Render inside a logic tree (`or=(...)`), where values must be quoted.
    fn to_nested(&self) -> String {
        match self {
            Self::Or(inner) => format!("or{}", render_group(inner)),
            Self::Eq(c, v) => format!("{c}.eq.{}", quote(v)),
            Self::Gte(c, v) => format!("{c}.gte.{}", quote(v)),
            Self::Lte(c, v) => format!("{c}.lte.{}", quote(v)),
            Self::ILike(c, v) => format!("{c}.ilike.{}", quote(v)),
            Self::In(c, vs) => format!("{c}.in.{}", render_list(vs)),
        }
    }
}

fn render_group(filters: &[Filter]) -> String {
    let parts: Vec<String> = filters.iter().map(Filter::to_nested).collect();
    format!("({})", parts.join(","))
}

fn render_list(values: &[String]) -> String {
    let parts: Vec<String> = values.iter().map(|v| quote(v)).collect();
    format!("({})", parts.join(","))
}

/// Double-quote a value for use inside a logic tree or list.
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Escape `LIKE` metacharacters so user input only ever matches literally.
///
/// ```
/// use techspec_storefront::backend::escape_like;
///
/// assert_eq!(escape_like("100%_off"), "100\\%\\_off");
/// ```
#[must_use]
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// A `LIKE` pattern matching `needle` anywhere, with wildcards escaped.
#[must_use]
pub fn contains_pattern(needle: &str) -> String {
    format!("%{}%", escape_like(needle))
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// One ordering term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

/// A select query against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    table: String,
    select: String,
    filters: Vec<Filter>,
    order: Vec<Order>,
    limit: Option<usize>,
}

impl Query {
    /// Select every column of `table`.
    #[must_use]
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            select: "*".to_string(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    /// Set the projection, including embedded resources (`*, category:categories(*)`).
    #[must_use]
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = columns.into();
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn eq(self, column: &str, value: impl fmt::Display) -> Self {
        self.filter(Filter::Eq(Column::new(column), value.to_string()))
    }

    #[must_use]
    pub fn in_list<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: fmt::Display,
    {
        let values = values.into_iter().map(|v| v.to_string()).collect();
        self.filter(Filter::In(Column::new(column), values))
    }

    #[must_use]
    pub fn order(mut self, column: &str, direction: Direction) -> Self {
        self.order.push(Order {
            column: column.to_string(),
            direction,
        });
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Copy of this query with every JSON-path predicate removed.
    #[must_use]
    pub fn without_json_filters(&self) -> Self {
        let mut query = self.clone();
        query.filters.retain(|f| !f.uses_json_path());
        query
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn projection(&self) -> &str {
        &self.select
    }

    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    #[must_use]
    pub fn ordering(&self) -> &[Order] {
        &self.order
    }

    #[must_use]
    pub const fn row_limit(&self) -> Option<usize> {
        self.limit
    }

    /// Query-string parameters for the select (`GET`) form.
    #[must_use]
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.select.replace(' ', ""))];
        params.extend(self.filter_params());
        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|o| match o.direction {
                    Direction::Asc => format!("{}.asc", o.column),
                    Direction::Desc => format!("{}.desc", o.column),
                })
                .collect::<Vec<_>>()
                .join(",");
            params.push(("order".to_string(), order));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }

    /// Only the predicate parameters (used for `PATCH` row selection).
    #[must_use]
    pub fn filter_params(&self) -> Vec<(String, String)> {
        self.filters.iter().map(Filter::to_param).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Vec<&'a str> {
        params
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[test]
    fn test_escape_like_escapes_wildcards_and_backslash() {
        assert_eq!(escape_like("a_b%c\\d"), "a\\_b\\%c\\\\d");
        assert_eq!(contains_pattern("5G"), "%5G%");
    }

    #[test]
    fn test_range_renders_two_predicates_on_same_column() {
        let query = Query::table("products")
            .filter(Filter::Gte(Column::new("price"), "100".into()))
            .filter(Filter::Lte(Column::new("price"), "500".into()));
        let params = query.to_params();
        assert_eq!(param(&params, "price"), vec!["gte.100", "lte.500"]);
    }

    #[test]
    fn test_or_group_quotes_values() {
        let query = Query::table("products").filter(Filter::Or(vec![
            Filter::ILike(Column::new("name"), contains_pattern("a,b")),
            Filter::ILike(Column::new("brand"), contains_pattern("say \"hi\"")),
        ]));
        let params = query.to_params();
        assert_eq!(
            param(&params, "or"),
            vec![r#"(name.ilike."%a,b%",brand.ilike."%say \"hi\"%")"#]
        );
    }

    #[test]
    fn test_json_path_column() {
        let query = Query::table("products").filter(Filter::ILike(
            Column::json_text("specifications", "network"),
            contains_pattern("5G"),
        ));
        let params = query.to_params();
        assert_eq!(param(&params, "specifications->>network"), vec!["ilike.%5G%"]);
        assert!(query.filters()[0].uses_json_path());
        assert!(query.without_json_filters().filters().is_empty());
    }

    #[test]
    fn test_select_order_limit() {
        let query = Query::table("reviews")
            .select("*, product:products(name)")
            .order("created_at", Direction::Desc)
            .limit(10);
        let params = query.to_params();
        assert_eq!(param(&params, "select"), vec!["*,product:products(name)"]);
        assert_eq!(param(&params, "order"), vec!["created_at.desc"]);
        assert_eq!(param(&params, "limit"), vec!["10"]);
    }

    #[test]
    fn test_in_list() {
        let query = Query::table("products").in_list("id", ["a", "b"]);
        assert_eq!(param(&query.to_params(), "id"), vec![r#"in.("a","b")"#]);
    }
}
