//! PostgREST query-string builder.
//!
//! Filters follow PostgREST's `column=op.value` syntax. Values are
//! percent-encoded; column names are passed through (they may be embedded
//! resource paths such as `products.website`).

use std::fmt::Display;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, String)>,
    filters: usize,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.params
            .push(("select".to_string(), columns.replace(char::is_whitespace, "")));
        self
    }

    fn filter(mut self, column: &str, op: &str, value: impl Display) -> Self {
        self.params
            .push((column.to_string(), format!("{}.{}", op, value)));
        self.filters += 1;
        self
    }

    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "eq", value)
    }

    pub fn neq(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "neq", value)
    }

    pub fn gt(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "gt", value)
    }

    pub fn gte(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "gte", value)
    }

    pub fn lt(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "lt", value)
    }

    pub fn lte(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "lte", value)
    }

    pub fn is_null(self, column: &str) -> Self {
        self.filter(column, "is", "null")
    }

    pub fn not_null(self, column: &str) -> Self {
        self.filter(column, "not.is", "null")
    }

    /// `column=in.("a","b")`. Values are always double-quoted.
    pub fn in_list<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Display,
    {
        let quoted: Vec<String> = values
            .into_iter()
            .map(|v| format!("\"{}\"", v.to_string().replace('"', "\\\"")))
            .collect();
        self.filter(column, "in", format!("({})", quoted.join(",")))
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let dir = if ascending { "asc" } else { "desc" };
        self.params
            .push(("order".to_string(), format!("{}.{}", column, dir)));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.params.push(("limit".to_string(), n.to_string()));
        self
    }

    /// Whether any row filter was added. Updates and deletes require one.
    pub fn has_filters(&self) -> bool {
        self.filters > 0
    }

    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_query() {
        let q = Query::new()
            .select("price, collected_at, price_changed_at")
            .eq("product_id", 42)
            .gte("price_changed_at", "2025-01-01T00:00:00+00:00")
            .order("price_changed_at", true)
            .limit(48);
        assert_eq!(
            q.to_query_string(),
            "select=price%2Ccollected_at%2Cprice_changed_at\
             &product_id=eq.42\
             &price_changed_at=gte.2025-01-01T00%3A00%3A00%2B00%3A00\
             &order=price_changed_at.asc\
             &limit=48"
        );
        assert!(q.has_filters());
    }

    #[test]
    fn test_in_list_quotes_values() {
        let q = Query::new().in_list("id", ["1", "2"]);
        assert_eq!(q.to_query_string(), "id=in.%28%221%22%2C%222%22%29");
    }

    #[test]
    fn test_null_filters() {
        let q = Query::new().is_null("hidden_at").not_null("hidden_reason");
        assert_eq!(
            q.to_query_string(),
            "hidden_at=is.null&hidden_reason=not.is.null"
        );
    }

    #[test]
    fn test_select_and_order_are_not_filters() {
        let q = Query::new().select("*").order("name", false).limit(1);
        assert!(!q.has_filters());
        assert_eq!(q.to_query_string(), "select=%2A&order=name.desc&limit=1");
    }
}
