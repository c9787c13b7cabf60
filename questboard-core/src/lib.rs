//! Questboard Core - Entity Types
//!
//! Pure data structures shared by every other crate: the remote collection
//! schemas, the declarative query description handed to a table service, and
//! the error taxonomy. No I/O lives here.

pub mod entities;
pub mod error;
pub mod identity;
pub mod query;

pub use entities::{Achievement, TableEntity, User, UserActivity};
pub use error::QueryError;
pub use identity::{AchievementId, ActivityId, Timestamp, UserId};
pub use query::{EqualityFilter, OrderSpec, SortDirection, TableQuery};

/// A single record as returned by a remote table: one JSON object per row.
pub type Row = serde_json::Value;
