//! Declarative query descriptions for remote tables
//!
//! A query is always "select every column of one table", optionally narrowed by
//! a single equality constraint, with an explicit ordering. There is no way to
//! express compound filters or ranges.

use crate::error::QueryError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sort direction for an ordering clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Short form used in query strings (`asc` / `desc`).
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering clause: one field, one direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn ascending(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Descending)
    }
}

/// Single-field exact-match constraint.
///
/// Two filters are the same filter when field and value compare equal, which
/// is what decides whether a resource re-queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EqualityFilter {
    /// Field to match on
    pub field: String,
    /// Scalar JSON value the field must equal
    pub value: serde_json::Value,
}

impl EqualityFilter {
    pub fn new(field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether a row satisfies this constraint. Rows lacking the field never match.
    pub fn matches(&self, row: &serde_json::Value) -> bool {
        row.get(&self.field).is_some_and(|v| *v == self.value)
    }
}

/// Everything a table service needs to answer one read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableQuery {
    pub table: String,
    pub order: OrderSpec,
    pub filter: Option<EqualityFilter>,
}

impl TableQuery {
    pub fn new(table: impl Into<String>, order: OrderSpec) -> Self {
        Self {
            table: table.into(),
            order,
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: Option<EqualityFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn validate(&self) -> Result<(), QueryError> {
        if self.table.trim().is_empty() {
            return Err(QueryError::InvalidQuery {
                reason: "table name must not be empty".to_string(),
            });
        }
        if self.order.field.trim().is_empty() {
            return Err(QueryError::InvalidQuery {
                reason: format!("order field for table {} must not be empty", self.table),
            });
        }
        if let Some(filter) = &self.filter {
            if filter.field.trim().is_empty() {
                return Err(QueryError::InvalidQuery {
                    reason: format!("filter field for table {} must not be empty", self.table),
                });
            }
            if filter.value.is_array() || filter.value.is_object() {
                return Err(QueryError::InvalidQuery {
                    reason: format!(
                        "filter on {}.{} must compare against a scalar value",
                        self.table, filter.field
                    ),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_equality_is_by_value() {
        let a = EqualityFilter::new("user_id", "u1");
        let b = EqualityFilter::new("user_id", String::from("u1"));
        assert_eq!(a, b);
        assert_ne!(a, EqualityFilter::new("user_id", "u2"));
    }

    #[test]
    fn test_filter_matches_row() {
        let filter = EqualityFilter::new("user_id", "u1");
        assert!(filter.matches(&json!({"id": "a", "user_id": "u1"})));
        assert!(!filter.matches(&json!({"id": "b", "user_id": "u2"})));
        assert!(!filter.matches(&json!({"id": "c"})));
    }

    #[test]
    fn test_validate_accepts_unfiltered_query() {
        let query = TableQuery::new("achievements", OrderSpec::descending("xp_reward"));
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_table() {
        let query = TableQuery::new("  ", OrderSpec::descending("created_at"));
        assert!(matches!(
            query.validate(),
            Err(QueryError::InvalidQuery { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_order_field() {
        let query = TableQuery::new("users", OrderSpec::descending(""));
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_compound_filter_value() {
        let query = TableQuery::new("user_activity", OrderSpec::descending("created_at"))
            .with_filter(Some(EqualityFilter::new("user_id", json!(["u1", "u2"]))));
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_sort_direction_short_form() {
        assert_eq!(SortDirection::Ascending.to_string(), "asc");
        assert_eq!(SortDirection::Descending.to_string(), "desc");
    }
}
