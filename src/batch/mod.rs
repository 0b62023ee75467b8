// ABOUTME: Batched table replication engine
// ABOUTME: Order-by-key LIMIT/OFFSET pagination from source to destination

pub mod driver;
pub mod order_key;
pub mod reader;
pub mod writer;

pub use driver::{Replicator, RunStats};
pub use order_key::OrderKeyResolver;
