// ABOUTME: Replication driver orchestrating selection, introspection, and paging
// ABOUTME: Strictly sequential: one table at a time, one page at a time

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;
use tokio_postgres::Client;

use crate::config::ReplicateConfig;
use crate::error::{QueryLog, Result};
use crate::postgres::{self, connect};
use crate::selector::{self, Selector, TableIdentifier};

use super::order_key::OrderKeyResolver;
use super::{reader, writer};

/// Summary of one replication run.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub tables_completed: usize,
    pub rows_read: u64,
    pub rows_inserted: u64,
    /// Rows the destination skipped as uniqueness conflicts.
    pub rows_skipped: u64,
    /// True when the run stopped early on a shutdown signal. Pages
    /// committed before the signal stay committed.
    pub cancelled: bool,
}

/// Drives a whole run: both connections, the resolved table list, and the
/// fetch/insert loop per table.
///
/// The two clients are owned here, opened once before any table processing
/// and dropped exactly once when the replicator goes out of scope, on
/// success and on fatal error alike. Each client carries at most one
/// in-flight operation at a time; there is no pipelining between the fetch
/// and insert of adjacent pages.
pub struct Replicator {
    source: Client,
    target: Client,
    batch_size: i64,
    tables: String,
    query_log: QueryLog,
    key_resolver: OrderKeyResolver,
}

impl Replicator {
    /// Open the source and destination connections.
    ///
    /// Fails with a connection error if either endpoint is unreachable; a
    /// source that opened before the destination failed is dropped on the
    /// way out.
    pub async fn connect(config: &ReplicateConfig, allow_invalid_certs: bool) -> Result<Self> {
        let source = connect(&config.source, allow_invalid_certs, "source").await?;
        let target = connect(&config.target, allow_invalid_certs, "destination").await?;

        Ok(Self {
            source,
            target,
            batch_size: config.batch_size,
            tables: config.tables.clone(),
            query_log: QueryLog::default(),
            key_resolver: OrderKeyResolver::new(),
        })
    }

    /// The text of the most recently executed query, for diagnostics when
    /// the run fails.
    pub fn last_query(&self) -> Option<&str> {
        self.query_log.last()
    }

    /// Replicate every selected table, strictly sequentially.
    ///
    /// The first fatal error aborts the remaining tables. Cancellation is
    /// observed between tables and at the top of each page iteration; an
    /// in-flight fetch or insert always runs to completion.
    pub async fn run(&mut self, mut shutdown: broadcast::Receiver<()>) -> Result<RunStats> {
        let selectors = selector::parse(&self.tables)?;
        let tables = self.expand(&selectors).await?;

        let mut stats = RunStats::default();
        for table in &tables {
            if cancelled(&mut shutdown) {
                tracing::info!(
                    "replication cancelled; {} of {} tables completed",
                    stats.tables_completed,
                    tables.len()
                );
                stats.cancelled = true;
                return Ok(stats);
            }

            if !self.copy_table(table, &mut stats, &mut shutdown).await? {
                stats.cancelled = true;
                return Ok(stats);
            }
            stats.tables_completed += 1;
        }

        tracing::info!("replication of {} tables completed", stats.tables_completed);
        Ok(stats)
    }

    /// Expand wildcard selectors against the source catalog. Literal
    /// entries keep their input order; wildcard expansions keep catalog
    /// (lexicographic) order. No de-duplication.
    async fn expand(&mut self, selectors: &[Selector]) -> Result<Vec<TableIdentifier>> {
        let mut tables = Vec::new();
        for sel in selectors {
            match sel {
                Selector::Exact(id) => tables.push(id.clone()),
                Selector::Wildcard { schema } => {
                    let names =
                        postgres::list_tables(&self.source, schema, &mut self.query_log).await?;
                    tables.extend(
                        names
                            .into_iter()
                            .map(|name| TableIdentifier::new(schema.clone(), name)),
                    );
                }
            }
        }
        Ok(tables)
    }

    /// Copy a single table. Returns false when the run was cancelled
    /// mid-table.
    async fn copy_table(
        &mut self,
        table: &TableIdentifier,
        stats: &mut RunStats,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Result<bool> {
        let columns =
            postgres::list_columns(&self.source, &table.schema, &table.name, &mut self.query_log)
                .await?;
        tracing::info!("starting data transfer of {} ({} columns)", table, columns.len());

        let order_key = self.key_resolver.resolve(table, &columns);

        let mut offset: i64 = 0;
        loop {
            if cancelled(shutdown) {
                tracing::info!("data transfer of {} cancelled at offset {}", table, offset);
                return Ok(false);
            }

            tracing::info!(
                "fetching rows {}..{} of {}",
                offset,
                offset + self.batch_size,
                table
            );
            let page = reader::fetch_page(
                &self.source,
                &mut self.query_log,
                table,
                &columns,
                &order_key,
                offset,
                self.batch_size,
            )
            .await?;

            // The empty page is the sole termination signal.
            if page.is_empty() {
                break;
            }

            let read = page.len() as u64;
            let inserted = writer::write_page(
                &mut self.target,
                &mut self.query_log,
                table,
                &columns,
                &page,
            )
            .await?;

            stats.rows_read += read;
            stats.rows_inserted += inserted;
            stats.rows_skipped += read - inserted;

            // The offset tracks the source position: conflict-skipped rows
            // still advance it by a full batch.
            offset += self.batch_size;
        }

        tracing::info!("data transfer of {} completed", table);
        Ok(true)
    }
}

fn cancelled(shutdown: &mut broadcast::Receiver<()>) -> bool {
    // A closed or lagged channel also counts as a shutdown request.
    !matches!(shutdown.try_recv(), Err(TryRecvError::Empty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_on_signal() {
        let (tx, mut rx) = broadcast::channel(1);
        assert!(!cancelled(&mut rx));
        tx.send(()).unwrap();
        assert!(cancelled(&mut rx));
    }

    #[test]
    fn test_cancelled_on_closed_channel() {
        let (tx, mut rx) = broadcast::channel::<()>(1);
        drop(tx);
        assert!(cancelled(&mut rx));
    }
}
