// ABOUTME: Table selector expression parsing
// ABOUTME: Supports "table", "schema.table", comma-separated lists, and "schema.*" wildcards

use std::fmt;

use crate::error::{Error, Result};

/// Characters stripped from each selector segment before use. Lets users
/// paste identifiers quoted for other tools ("[Orders]", '"users"').
const TRIM_CHARS: &[char] = &['[', ']', '"', '\'', ' '];

/// A resolved (schema, table) pair.
///
/// Identity is the unquoted pair; quoting is applied only when a query is
/// built, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableIdentifier {
    pub schema: String,
    pub name: String,
}

impl TableIdentifier {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Schema-qualified, quote-escaped form for query construction.
    pub fn qualified(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.name))
    }
}

impl fmt::Display for TableIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Quote a PostgreSQL identifier, doubling any embedded double quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// One entry of a parsed selector expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Exact(TableIdentifier),
    /// `schema.*`: every table in the schema, in catalog (lexicographic)
    /// order. Expansion needs a live source connection, so it happens in
    /// the driver after the connections open.
    Wildcard { schema: String },
}

/// Parse a selector expression into its entries, preserving input order.
///
/// Entries without a schema default to `public`. No de-duplication is
/// performed; a table listed twice is copied twice.
pub fn parse(expr: &str) -> Result<Vec<Selector>> {
    let mut selectors = Vec::new();

    for entry in expr.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let (schema, table) = match entry.split_once('.') {
            Some((schema, table)) => {
                (schema.trim_matches(TRIM_CHARS), table.trim_matches(TRIM_CHARS))
            }
            None => ("public", entry.trim_matches(TRIM_CHARS)),
        };

        if schema.is_empty() || table.is_empty() {
            continue;
        }

        if table == "*" {
            selectors.push(Selector::Wildcard {
                schema: schema.to_string(),
            });
        } else {
            selectors.push(Selector::Exact(TableIdentifier::new(schema, table)));
        }
    }

    if selectors.is_empty() {
        return Err(Error::Configuration(format!(
            "table selector {:?} yields no tables",
            expr
        )));
    }

    Ok(selectors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact(schema: &str, name: &str) -> Selector {
        Selector::Exact(TableIdentifier::new(schema, name))
    }

    #[test]
    fn test_single_table_defaults_to_public() {
        assert_eq!(parse("orders").unwrap(), vec![exact("public", "orders")]);
    }

    #[test]
    fn test_schema_qualified_table() {
        assert_eq!(parse("sales.orders").unwrap(), vec![exact("sales", "orders")]);
    }

    #[test]
    fn test_comma_separated_list_preserves_order() {
        assert_eq!(
            parse("users, sales.orders,items").unwrap(),
            vec![
                exact("public", "users"),
                exact("sales", "orders"),
                exact("public", "items"),
            ]
        );
    }

    #[test]
    fn test_brackets_and_quotes_stripped() {
        assert_eq!(
            parse(r#"[sales]."Orders", 'users'"#).unwrap(),
            vec![exact("sales", "Orders"), exact("public", "users")]
        );
    }

    #[test]
    fn test_wildcard() {
        assert_eq!(
            parse("sales.*").unwrap(),
            vec![Selector::Wildcard {
                schema: "sales".to_string()
            }]
        );
    }

    #[test]
    fn test_bare_star_is_wildcard_over_public() {
        assert_eq!(
            parse("*").unwrap(),
            vec![Selector::Wildcard {
                schema: "public".to_string()
            }]
        );
    }

    #[test]
    fn test_duplicates_kept() {
        assert_eq!(
            parse("users,users").unwrap(),
            vec![exact("public", "users"), exact("public", "users")]
        );
    }

    #[test]
    fn test_empty_expression_rejected() {
        assert!(parse("").is_err());
        assert!(parse(" , ,").is_err());
    }

    #[test]
    fn test_qualified_quotes_identifiers() {
        let id = TableIdentifier::new("public", "orders");
        assert_eq!(id.qualified(), r#""public"."orders""#);
    }

    #[test]
    fn test_qualified_escapes_embedded_quotes() {
        let id = TableIdentifier::new("public", r#"odd"name"#);
        assert_eq!(id.qualified(), r#""public"."odd""name""#);
    }

    #[test]
    fn test_display_is_unquoted() {
        let id = TableIdentifier::new("sales", "orders");
        assert_eq!(id.to_string(), "sales.orders");
    }
}
