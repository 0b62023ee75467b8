// ABOUTME: Error taxonomy for replication operations
// ABOUTME: Every variant is fatal to the run; insert conflicts are absorbed in SQL, not here

use thiserror::Error;

/// Main error type for replication operations.
///
/// Every variant aborts the whole run. There is no retry and no
/// skip-and-continue across tables. The only locally recovered condition is
/// a per-row uniqueness conflict during insert, which `ON CONFLICT DO
/// NOTHING` absorbs before it could ever surface here.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid connection descriptor, table selector, or batch size.
    /// Detected before any connection opens.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Failure to open or maintain a database connection.
    #[error("connection error ({context}): {source}")]
    Connection {
        context: String,
        #[source]
        source: tokio_postgres::Error,
    },

    /// Referenced table or schema does not exist, or yields no columns.
    #[error("schema error: {0}")]
    Schema(String),

    /// A catalog or fetch query failed.
    #[error("query error: {source}")]
    Query {
        query: String,
        #[source]
        source: tokio_postgres::Error,
    },

    /// An insert failed with something other than a uniqueness conflict.
    #[error("write error on table {table}: {source}")]
    Write {
        table: String,
        #[source]
        source: tokio_postgres::Error,
    },
}

/// Result type alias for replication operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Run-scoped record of the most recently executed query text.
///
/// Surfaced to the caller for diagnostics when the run fails. Owned by the
/// [`Replicator`](crate::Replicator) rather than stored in a process-wide
/// global, so repeated runs in the same process never see each other's
/// queries.
#[derive(Debug, Default)]
pub struct QueryLog {
    last: Option<String>,
}

impl QueryLog {
    pub fn record(&mut self, query: &str) {
        self.last = Some(query.to_string());
    }

    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_log_starts_empty() {
        let log = QueryLog::default();
        assert_eq!(log.last(), None);
    }

    #[test]
    fn test_query_log_keeps_most_recent() {
        let mut log = QueryLog::default();
        log.record("SELECT 1");
        log.record("SELECT 2");
        assert_eq!(log.last(), Some("SELECT 2"));
    }
}
