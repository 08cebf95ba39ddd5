//! Training dataset schema and Parquet persistence.
//!
//! Extracted points become rows of a fixed columnar schema
//! ([`schema::training_schema`]) and are persisted as Parquet, either to a
//! local file or to an object-store table with read-merge-rewrite append
//! semantics.

pub mod batch;
pub mod schema;
pub mod writer;

pub use batch::records_to_batch;
pub use schema::training_schema;
pub use writer::{append_to_file, merge_parquet, read_batches, TrainingTable};
