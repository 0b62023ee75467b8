// ABOUTME: Library entry point for pg-batch-replicator
// ABOUTME: Exposes the batched table replication engine and its building blocks

pub mod batch;
pub mod config;
pub mod error;
pub mod postgres;
pub mod selector;
pub mod value;

pub use batch::{Replicator, RunStats};
pub use config::ReplicateConfig;
pub use error::{Error, QueryLog, Result};
pub use selector::{Selector, TableIdentifier};
pub use value::{RowPage, Value};
