//! Timestamp bucketing for a stream of records.

use thiserror::Error;

use crate::aggregators::Aggregate;
use crate::parser::Timestamped;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BucketError {
    #[error("elapsed time from {first} to {timestamp} does not fit in 64 bits")]
    ElapsedOverflow { first: i64, timestamp: i64 },
}

#[derive(Debug, Clone, Copy)]
struct Clock {
    first: i64,
    last: i64,
    elapsed: i64,
}

impl Clock {
    fn start(timestamp: i64) -> Self {
        Clock {
            first: timestamp,
            last: timestamp,
            elapsed: 0,
        }
    }

    fn advance(self, timestamp: i64) -> Result<Self, BucketError> {
        let elapsed = timestamp
            .checked_sub(self.first)
            .ok_or(BucketError::ElapsedOverflow {
                first: self.first,
                timestamp,
            })?;
        Ok(Clock {
            last: timestamp,
            elapsed,
            ..self
        })
    }
}

/// Drives an [`Aggregate`] over records in arrival order.
///
/// A bucket is a run of consecutive records with the same timestamp. When a
/// record with a different timestamp arrives, the previous bucket is closed
/// and summarized before the new record touches the table, so every row
/// reflects the table as of the last record of its own bucket.
#[derive(Debug)]
pub struct BucketAverager<A: Aggregate> {
    aggregate: A,
    clock: Option<Clock>,
    records: u64,
    buckets: u64,
}

impl<A: Aggregate> BucketAverager<A> {
    pub fn new(aggregate: A) -> Self {
        Self {
            aggregate,
            clock: None,
            records: 0,
            buckets: 0,
        }
    }

    /// Feeds one record, returning the row of the bucket it closed, if any.
    ///
    /// # Errors
    ///
    /// Fails without touching any state if the elapsed time of the record
    /// cannot be represented.
    pub fn push(&mut self, record: A::Record) -> Result<Option<A::Row>, BucketError> {
        let timestamp = record.timestamp();
        let mut closed = None;

        match self.clock {
            None => self.clock = Some(Clock::start(timestamp)),
            Some(clock) if clock.last != timestamp => {
                let next = clock.advance(timestamp)?;
                closed = Some(self.aggregate.summarize(clock.elapsed));
                self.buckets += 1;
                self.clock = Some(next);
            }
            Some(_) => {}
        }

        self.aggregate.observe(record);
        self.records += 1;
        Ok(closed)
    }

    /// Closes the last bucket. Returns `None` if no record was ever pushed.
    pub fn finish(&mut self) -> Option<A::Row> {
        let clock = self.clock.take()?;
        self.buckets += 1;
        Some(self.aggregate.summarize(clock.elapsed))
    }

    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn buckets(&self) -> u64 {
        self.buckets
    }
}
