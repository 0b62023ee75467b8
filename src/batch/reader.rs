// ABOUTME: Batch reader for paginated source-table fetches
// ABOUTME: Ordered LIMIT/OFFSET SELECT with bound parameters

use tokio_postgres::Client;

use crate::error::{Error, QueryLog, Result};
use crate::selector::{quote_ident, TableIdentifier};
use crate::value::{RowPage, Value};

/// Build the page-fetch statement. Limit and offset are bound as `$1`/`$2`,
/// never interpolated into the text.
pub fn build_select(table: &TableIdentifier, columns: &[String], order_key: &str) -> String {
    let column_list = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "SELECT {} FROM {} ORDER BY {} LIMIT $1 OFFSET $2",
        column_list,
        table.qualified(),
        quote_ident(order_key)
    )
}

/// Fetch one page of up to `limit` rows starting at `offset`, in
/// `order_key` order.
///
/// An empty page is the pagination loop's sole termination signal, not an
/// error. LIMIT/OFFSET over a non-unique key can skip or duplicate rows if
/// the key has ties and the table is modified mid-run; that is an accepted
/// limitation of offset pagination here.
pub async fn fetch_page(
    client: &Client,
    log: &mut QueryLog,
    table: &TableIdentifier,
    columns: &[String],
    order_key: &str,
    offset: i64,
    limit: i64,
) -> Result<RowPage> {
    let query = build_select(table, columns, order_key);
    log.record(&query);

    let rows = client
        .query(&query, &[&limit, &offset])
        .await
        .map_err(|source| Error::Query {
            query: query.clone(),
            source,
        })?;

    let mut page = RowPage::with_capacity(rows.len());
    for row in &rows {
        let mut values = Vec::with_capacity(columns.len());
        for idx in 0..columns.len() {
            let value = Value::from_row(row, idx).map_err(|source| Error::Query {
                query: query.clone(),
                source,
            })?;
            values.push(value);
        }
        page.push(values);
    }

    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_text_matches_wire_contract() {
        let table = TableIdentifier::new("public", "users");
        let columns = vec!["id".to_string(), "name".to_string(), "email".to_string()];
        assert_eq!(
            build_select(&table, &columns, "id"),
            r#"SELECT "id", "name", "email" FROM "public"."users" ORDER BY "id" LIMIT $1 OFFSET $2"#
        );
    }

    #[test]
    fn test_select_quotes_awkward_identifiers() {
        let table = TableIdentifier::new("sales", "Order Lines");
        let columns = vec!["line id".to_string()];
        assert_eq!(
            build_select(&table, &columns, "line id"),
            r#"SELECT "line id" FROM "sales"."Order Lines" ORDER BY "line id" LIMIT $1 OFFSET $2"#
        );
    }
}
