//! The fluent query builder (§4.H).
use crate::entry::Entry;

/// A comparison operator supported by [`Query::where_clause`] (§4.H).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    Contains,
}

#[derive(Debug, Clone)]
struct WhereClause {
    field: String,
    op: Operator,
    values: Vec<String>,
}

#[derive(Debug, Clone)]
struct OrderKey {
    field: String,
    ascending: bool,
}

/// A fluent, in-memory query over a set of entries: `where_clause`/`where_in`/`order_by`/
/// `limit`/`offset` (§4.H). Execution loads all candidate entries, filters them in memory,
/// sorts by the ordering keys (a stable multi-sort applied in reverse registration order so
/// the first [`Query::order_by`] call remains the primary sort key), then applies
/// offset/limit.
#[derive(Debug, Clone, Default)]
pub struct Query {
    wheres: Vec<WhereClause>,
    order: Vec<OrderKey>,
    limit: Option<usize>,
    offset: usize,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by `field`'s stringified value and `op`. String fields compare lexically;
    /// `Lt`/`Le`/`Gt`/`Ge` compare numerically when both sides parse as a number.
    pub fn where_clause(mut self, field: impl Into<String>, op: Operator, value: impl Into<String>) -> Self {
        self.wheres.push(WhereClause { field: field.into(), op, values: vec![value.into()] });
        self
    }

    /// Filter where `field`'s value is one of `values` (§4.H "where-in").
    pub fn where_in(mut self, field: impl Into<String>, values: Vec<String>) -> Self {
        self.wheres.push(WhereClause { field: field.into(), op: Operator::In, values });
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, ascending: bool) -> Self {
        self.order.push(OrderKey { field: field.into(), ascending });
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: usize) -> Self {
        self.offset = n;
        self
    }

    fn matches(&self, entry: &Entry) -> bool {
        self.wheres.iter().all(|clause| {
            let value = field_value(entry, &clause.field);
            match clause.op {
                Operator::Eq => value.as_deref() == Some(clause.values[0].as_str()),
                Operator::Ne => value.as_deref() != Some(clause.values[0].as_str()),
                Operator::Lt => compare(value.as_deref(), &clause.values[0]).is_some_and(|o| o.is_lt()),
                Operator::Le => compare(value.as_deref(), &clause.values[0]).is_some_and(|o| o.is_le()),
                Operator::Gt => compare(value.as_deref(), &clause.values[0]).is_some_and(|o| o.is_gt()),
                Operator::Ge => compare(value.as_deref(), &clause.values[0]).is_some_and(|o| o.is_ge()),
                Operator::In => value.is_some_and(|v| clause.values.iter().any(|c| c == &v)),
                Operator::Contains => value.is_some_and(|v| v.contains(&clause.values[0])),
            }
        })
    }

    /// Run the query against `entries`.
    pub fn execute(&self, entries: &[Entry]) -> Vec<Entry> {
        let mut results: Vec<Entry> = entries.iter().filter(|e| self.matches(e)).cloned().collect();

        for key in self.order.iter().rev() {
            results.sort_by(|a, b| {
                let ordering = compare(field_value(a, &key.field).as_deref(), &field_value(b, &key.field).unwrap_or_default())
                    .unwrap_or(std::cmp::Ordering::Equal);
                if key.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        let start = self.offset.min(results.len());
        let end = match self.limit {
            Some(n) => start.saturating_add(n).min(results.len()),
            None => results.len(),
        };
        results[start..end].to_vec()
    }
}

fn field_value(entry: &Entry, field: &str) -> Option<String> {
    if field == "key" {
        return Some(entry.key.as_str().to_owned());
    }
    if field == "type" {
        return Some(entry.entry_type.as_str().to_owned());
    }
    entry.fields.get(field)
}

fn compare(lhs: Option<&str>, rhs: &str) -> Option<std::cmp::Ordering> {
    let lhs = lhs?;
    match (lhs.parse::<f64>(), rhs.parse::<f64>()) {
        (Ok(l), Ok(r)) => l.partial_cmp(&r),
        _ => Some(lhs.cmp(rhs)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryKey, EntryType, Fields};

    fn entry(key: &str, year: &str, author: &str) -> Entry {
        let mut fields = Fields::default();
        fields.set("year", year);
        fields.set("author", author);
        Entry::new(EntryKey::new(key).unwrap(), EntryType::Article, fields)
    }

    #[test]
    fn filters_by_equality() {
        let entries = vec![entry("a", "2020", "Smith"), entry("b", "2024", "Doe")];
        let results = Query::new().where_clause("year", Operator::Eq, "2024").execute(&entries);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key.as_str(), "b");
    }

    #[test]
    fn numeric_comparison_on_year() {
        let entries = vec![entry("a", "2020", "Smith"), entry("b", "2024", "Doe")];
        let results = Query::new().where_clause("year", Operator::Gt, "2021").execute(&entries);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key.as_str(), "b");
    }

    #[test]
    fn order_by_then_limit_offset() {
        let entries = vec![entry("a", "2020", "Smith"), entry("b", "2024", "Doe"), entry("c", "2022", "Lee")];
        let results = Query::new().order_by("year", true).execute(&entries);
        let years: Vec<_> = results.iter().map(|e| e.fields.year).collect();
        assert_eq!(years, vec![Some(2020), Some(2022), Some(2024)]);

        let page = Query::new().order_by("year", true).offset(1).limit(1).execute(&entries);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].key.as_str(), "c");
    }

    #[test]
    fn primary_order_by_call_wins_ties() {
        let mut a = entry("a", "2020", "Zeta");
        a.fields.set("journal", "J1");
        let mut b = entry("b", "2020", "Alpha");
        b.fields.set("journal", "J1");
        let entries = vec![a, b];
        // primary: author ascending; year is a (non-discriminating) secondary key
        let results = Query::new().order_by("author", true).order_by("year", true).execute(&entries);
        assert_eq!(results[0].key.as_str(), "b");
    }
}
