// ABOUTME: Catalog metadata queries against information_schema
// ABOUTME: Read-only; never mutates data

use tokio_postgres::Client;

use crate::error::{Error, QueryLog, Result};

const LIST_TABLES: &str = "SELECT table_name FROM information_schema.tables \
     WHERE table_schema = $1 ORDER BY table_name";

const LIST_COLUMNS: &str = "SELECT column_name FROM information_schema.columns \
     WHERE table_schema = $1 AND table_name = $2 ORDER BY ordinal_position";

/// List the table names in `schema`, in lexicographic order.
///
/// An unknown or empty schema yields an empty list, not an error.
pub async fn list_tables(client: &Client, schema: &str, log: &mut QueryLog) -> Result<Vec<String>> {
    log.record(LIST_TABLES);
    let rows = client
        .query(LIST_TABLES, &[&schema])
        .await
        .map_err(|source| Error::Query {
            query: LIST_TABLES.to_string(),
            source,
        })?;

    Ok(rows.iter().map(|row| row.get(0)).collect())
}

/// List the column names of `schema.table` in ordinal position.
///
/// An empty result means the table is missing, or exists with no columns;
/// information_schema cannot tell the two apart, and no valid query can be
/// built either way, so both surface as a schema error.
pub async fn list_columns(
    client: &Client,
    schema: &str,
    table: &str,
    log: &mut QueryLog,
) -> Result<Vec<String>> {
    log.record(LIST_COLUMNS);
    let rows = client
        .query(LIST_COLUMNS, &[&schema, &table])
        .await
        .map_err(|source| Error::Query {
            query: LIST_COLUMNS.to_string(),
            source,
        })?;

    if rows.is_empty() {
        return Err(Error::Schema(format!(
            "table {}.{} does not exist or has no columns",
            schema, table
        )));
    }

    Ok(rows.iter().map(|row| row.get(0)).collect())
}
