// ABOUTME: PostgreSQL connectivity and catalog introspection
// ABOUTME: Thin wrappers over tokio-postgres shared by the replication engine

pub mod connection;
pub mod introspect;

pub use connection::connect;
pub use introspect::{list_columns, list_tables};
