//! Error types for Questboard operations

use thiserror::Error;

/// Failures of a single read against a remote table.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// The service answered with an error. `message` is whatever the service
    /// said, if anything.
    #[error("Query on {table} rejected: {}", message.as_deref().unwrap_or("no message"))]
    Remote {
        table: String,
        status: Option<u16>,
        message: Option<String>,
    },

    #[error("Transport error: {reason}")]
    Transport { reason: String },

    #[error("Row decode failed for {table}: {reason}")]
    Decode { table: String, reason: String },

    #[error("Invalid query: {reason}")]
    InvalidQuery { reason: String },
}

impl QueryError {
    /// Human-readable message carried by the failure, if it carries one.
    ///
    /// A remote rejection without a body message yields `None`; callers pick
    /// their own fallback text.
    pub fn message(&self) -> Option<String> {
        match self {
            QueryError::Remote { message, .. } => message
                .as_ref()
                .filter(|m| !m.trim().is_empty())
                .cloned(),
            QueryError::Transport { reason } => Some(reason.clone()),
            QueryError::Decode { .. } | QueryError::InvalidQuery { .. } => Some(self.to_string()),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
