// ABOUTME: Heuristic selection of the ORDER BY column for pagination
// ABOUTME: Emits the fallback notice at most once per run

use crate::selector::TableIdentifier;

/// Picks the column used as the stable sort key for LIMIT/OFFSET paging.
///
/// The chosen column is only an ORDER BY key, not necessarily a true
/// uniqueness constraint; pagination correctness depends on its values
/// being stable and totally orderable. The resolver is owned by the driver
/// so its one-time notice is scoped to a single run, never shared across
/// runs in the same process.
#[derive(Debug, Default)]
pub struct OrderKeyResolver {
    notified_fallback: bool,
}

impl OrderKeyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the sort key for `table` from its columns in ordinal order.
    ///
    /// The first column wins if it is named `Id` or ends with `id`
    /// (case-insensitive). Otherwise the first id-suffixed column in list
    /// order is taken, falling back to the first column when none
    /// qualifies; pagination may then be unstable, which is a documented
    /// limitation rather than an error. `columns` must be non-empty, which
    /// the introspector guarantees.
    pub fn resolve(&mut self, table: &TableIdentifier, columns: &[String]) -> String {
        let first = &columns[0];
        if first == "Id" || has_id_suffix(first) {
            return first.clone();
        }

        let key = columns.iter().find(|c| has_id_suffix(c)).unwrap_or(first);
        if !self.notified_fallback {
            tracing::warn!(
                "the first column of table {} does not look like a primary key; \
                 ordering batches by \"{}\" instead. If that column does not order \
                 consistently, rearrange the table so its key column comes first \
                 and ends with 'id'",
                table,
                key
            );
            self.notified_fallback = true;
        }
        key.clone()
    }
}

fn has_id_suffix(column: &str) -> bool {
    column.to_lowercase().ends_with("id")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TableIdentifier {
        TableIdentifier::new("public", "users")
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_column_named_id_wins() {
        let mut resolver = OrderKeyResolver::new();
        assert_eq!(resolver.resolve(&table(), &cols(&["Id", "name"])), "Id");
        assert!(!resolver.notified_fallback);
    }

    #[test]
    fn test_first_column_with_id_suffix_wins() {
        let mut resolver = OrderKeyResolver::new();
        assert_eq!(resolver.resolve(&table(), &cols(&["userId", "name"])), "userId");
        assert_eq!(resolver.resolve(&table(), &cols(&["UUID", "name"])), "UUID");
        assert!(!resolver.notified_fallback);
    }

    #[test]
    fn test_later_id_column_selected_when_first_fails() {
        let mut resolver = OrderKeyResolver::new();
        assert_eq!(
            resolver.resolve(&table(), &cols(&["name", "userId", "email"])),
            "userId"
        );
        assert!(resolver.notified_fallback);
    }

    #[test]
    fn test_falls_back_to_first_column_when_nothing_qualifies() {
        let mut resolver = OrderKeyResolver::new();
        assert_eq!(resolver.resolve(&table(), &cols(&["name", "email"])), "name");
        assert!(resolver.notified_fallback);
    }

    #[test]
    fn test_notice_fires_once_across_tables() {
        let mut resolver = OrderKeyResolver::new();
        resolver.resolve(&table(), &cols(&["name", "email"]));
        assert!(resolver.notified_fallback);
        // Second fallback table in the same run keeps the flag set; the
        // notice itself only fired on the first one.
        resolver.resolve(&TableIdentifier::new("public", "tags"), &cols(&["label"]));
        assert!(resolver.notified_fallback);
    }

    #[test]
    fn test_fresh_resolver_starts_clean() {
        let resolver = OrderKeyResolver::new();
        assert!(!resolver.notified_fallback);
    }
}
