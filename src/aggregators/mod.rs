//! Aggregate policies applied to each closed timestamp bucket.
//!
//! An [`Aggregate`] folds records into its score table and, when asked,
//! turns the table into one output row. [`SimpleMean`] divides the table
//! total by a record-supplied divisor; [`TrecMean`] averages per TREC
//! collection.

pub mod mean;
pub mod trec;

pub use mean::{Mean, MeanRow, SimpleMean};
pub use trec::{TREC_CSV_HEADER, TREC_GROUPS, TrecMean, TrecRow};

use crate::parser::Timestamped;

pub trait Aggregate {
    type Record: Timestamped;
    type Row;

    /// Folds one record into the running state.
    fn observe(&mut self, record: Self::Record);

    /// Builds the row for the bucket that just closed.
    fn summarize(&self, elapsed: i64) -> Self::Row;
}
