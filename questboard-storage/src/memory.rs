//! In-process table service with real filter and ordering semantics.

use crate::service::RemoteTableService;
use async_trait::async_trait;
use chrono::DateTime;
use questboard_core::{OrderSpec, QueryError, Row, SortDirection, TableEntity, TableQuery};
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{PoisonError, RwLock};

/// In-memory table service for tests and offline demos.
///
/// Rows are kept in insertion order per table. Selection applies the equality
/// filter, then a stable sort on the order field, so rows with equal keys keep
/// their insertion order.
#[derive(Debug, Default)]
pub struct InMemoryTableService {
    tables: RwLock<HashMap<String, Vec<Row>>>,
    // table -> optional failure message
    failures: RwLock<HashMap<String, Option<String>>>,
    queries: AtomicUsize,
}

impl InMemoryTableService {
    /// Create an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw row to a table, creating the table if needed.
    pub fn insert_row(&self, table: &str, row: Row) {
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    /// Append a typed record to its entity's table.
    pub fn insert<T: TableEntity + Serialize>(&self, entity: &T) -> Result<(), QueryError> {
        let row = serde_json::to_value(entity).map_err(|e| QueryError::Decode {
            table: T::TABLE.to_string(),
            reason: e.to_string(),
        })?;
        self.insert_row(T::TABLE, row);
        Ok(())
    }

    /// Make every following query on `table` fail, with or without a message.
    pub fn fail_table(&self, table: &str, message: Option<String>) {
        self.failures
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(table.to_string(), message);
    }

    /// Undo a previous `fail_table`.
    pub fn recover_table(&self, table: &str) {
        self.failures
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(table);
    }

    /// Remove all rows and injected failures.
    pub fn clear(&self) {
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.failures
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of rows stored in `table`.
    pub fn row_count(&self, table: &str) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(table)
            .map_or(0, Vec::len)
    }

    /// Number of `select` calls served so far, failed ones included.
    pub fn query_count(&self) -> usize {
        self.queries.load(AtomicOrdering::SeqCst)
    }
}

#[async_trait]
impl RemoteTableService for InMemoryTableService {
    async fn select(&self, query: &TableQuery) -> Result<Vec<Row>, QueryError> {
        self.queries.fetch_add(1, AtomicOrdering::SeqCst);
        query.validate()?;

        if let Some(message) = self
            .failures
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&query.table)
        {
            return Err(QueryError::Remote {
                table: query.table.clone(),
                status: None,
                message: message.clone(),
            });
        }

        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        let mut rows: Vec<Row> = tables
            .get(&query.table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filter.as_ref().map_or(true, |f| f.matches(row)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        drop(tables);

        sort_rows(&mut rows, &query.order);
        Ok(rows)
    }
}

/// Stable sort of rows on one field.
pub fn sort_rows(rows: &mut [Row], order: &OrderSpec) {
    rows.sort_by(|a, b| {
        let ordering = compare_values(a.get(&order.field), b.get(&order.field));
        match order.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

/// Total order over JSON scalars: null/missing < bool < number < string.
/// Arrays and objects compare equal to each other and sort after strings.
///
/// Two strings that both parse as RFC 3339 compare as instants, so fractional
/// seconds and offsets sort chronologically.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(Value::Array(_)) | Some(Value::Object(_)) => 4,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        _ => rank(a).cmp(&rank(b)),
    }
}
