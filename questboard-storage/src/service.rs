//! Async table service trait.
//!
//! Resources depend on this trait only; transport, authentication and the
//! backend's own query engine stay behind it.

use async_trait::async_trait;
use questboard_core::{QueryError, Row, TableQuery};

/// Read access to named remote collections.
///
/// Implementations return rows in the order the query asks for and never cache
/// results between calls.
#[async_trait]
pub trait RemoteTableService: Send + Sync {
    /// Select every row of `query.table` matching the optional equality filter,
    /// ordered by `query.order`.
    async fn select(&self, query: &TableQuery) -> Result<Vec<Row>, QueryError>;
}

