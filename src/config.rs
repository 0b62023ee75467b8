// ABOUTME: Run configuration and validation
// ABOUTME: Every check happens before any connection opens

use crate::error::{Error, Result};

/// Smallest accepted batch size. A batch of 1 degenerates into one
/// round-trip per row and is rejected as a misconfiguration.
pub const MIN_BATCH_SIZE: i64 = 2;

/// Largest accepted batch size, bounding per-page memory.
pub const MAX_BATCH_SIZE: i64 = 1000;

/// Validated inputs for one replication run.
///
/// Connection strings are opaque: they are handed to tokio-postgres
/// unmodified, so anything the driver accepts is accepted here.
#[derive(Debug, Clone)]
pub struct ReplicateConfig {
    pub source: String,
    pub target: String,
    /// Table selector expression, parsed by [`selector::parse`](crate::selector::parse).
    pub tables: String,
    pub batch_size: i64,
}

impl ReplicateConfig {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        tables: impl Into<String>,
        batch_size: i64,
    ) -> Result<Self> {
        let source = source.into();
        let target = target.into();
        let tables = tables.into();

        if source.trim().is_empty() {
            return Err(Error::Configuration(
                "source connection string must not be empty".to_string(),
            ));
        }
        if target.trim().is_empty() {
            return Err(Error::Configuration(
                "destination connection string must not be empty".to_string(),
            ));
        }
        if tables.trim().is_empty() {
            return Err(Error::Configuration(
                "table selector must not be empty".to_string(),
            ));
        }
        if !(MIN_BATCH_SIZE..=MAX_BATCH_SIZE).contains(&batch_size) {
            return Err(Error::Configuration(format!(
                "batch size must be between {} and {}, got {}",
                MIN_BATCH_SIZE, MAX_BATCH_SIZE, batch_size
            )));
        }

        Ok(Self {
            source,
            target,
            tables,
            batch_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_batch(batch_size: i64) -> Result<ReplicateConfig> {
        ReplicateConfig::new(
            "postgres://u@src/db",
            "postgres://u@dst/db",
            "public.*",
            batch_size,
        )
    }

    #[test]
    fn test_batch_size_one_rejected() {
        assert!(config_with_batch(1).is_err());
    }

    #[test]
    fn test_batch_size_bounds_accepted() {
        assert!(config_with_batch(2).is_ok());
        assert!(config_with_batch(1000).is_ok());
    }

    #[test]
    fn test_batch_size_above_max_rejected() {
        assert!(config_with_batch(1001).is_err());
    }

    #[test]
    fn test_empty_source_rejected() {
        let result = ReplicateConfig::new("", "postgres://u@dst/db", "orders", 50);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_empty_selector_rejected() {
        let result = ReplicateConfig::new("postgres://u@src/db", "postgres://u@dst/db", "  ", 50);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
