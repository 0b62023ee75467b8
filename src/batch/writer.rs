// ABOUTME: Batch writer for conflict-tolerant destination inserts
// ABOUTME: One transaction per page; uniqueness conflicts are skipped rows, not errors

use tokio_postgres::types::ToSql;
use tokio_postgres::Client;

use crate::error::{Error, QueryLog, Result};
use crate::selector::{quote_ident, TableIdentifier};
use crate::value::RowPage;

/// Build the per-row insert statement with one placeholder per column.
pub fn build_insert(table: &TableIdentifier, columns: &[String]) -> String {
    let column_list = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");

    let placeholders = (1..=columns.len())
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT DO NOTHING",
        table.qualified(),
        column_list,
        placeholders
    )
}

/// Write one page inside a single transaction, returning how many rows were
/// actually inserted.
///
/// Rows that violate a uniqueness constraint on the destination are skipped
/// by `ON CONFLICT DO NOTHING`, which is what makes re-runs over partially
/// migrated tables safe. Any other failure leaves the page's transaction
/// uncommitted (the drop rolls it back) and aborts the run; there is no
/// per-row error isolation.
pub async fn write_page(
    client: &mut Client,
    log: &mut QueryLog,
    table: &TableIdentifier,
    columns: &[String],
    page: &RowPage,
) -> Result<u64> {
    let query = build_insert(table, columns);
    log.record(&query);

    let write_err = |source| Error::Write {
        table: table.to_string(),
        source,
    };

    let tx = client.transaction().await.map_err(write_err)?;
    let statement = tx.prepare(&query).await.map_err(write_err)?;

    let mut inserted = 0u64;
    for row in page {
        let params: Vec<&(dyn ToSql + Sync)> =
            row.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
        // execute reports 0 affected rows for a conflict-skipped insert.
        inserted += tx.execute(&statement, &params).await.map_err(write_err)?;
    }

    // Commit only after every row in the page has been attempted.
    tx.commit().await.map_err(write_err)?;

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_text_matches_wire_contract() {
        let table = TableIdentifier::new("public", "users");
        let columns = vec!["id".to_string(), "name".to_string(), "email".to_string()];
        assert_eq!(
            build_insert(&table, &columns),
            r#"INSERT INTO "public"."users" ("id", "name", "email") VALUES ($1, $2, $3) ON CONFLICT DO NOTHING"#
        );
    }

    #[test]
    fn test_insert_single_column() {
        let table = TableIdentifier::new("sales", "tags");
        let columns = vec!["id".to_string()];
        assert_eq!(
            build_insert(&table, &columns),
            r#"INSERT INTO "sales"."tags" ("id") VALUES ($1) ON CONFLICT DO NOTHING"#
        );
    }
}
