use std::fmt;

use crate::aggregators::Aggregate;
use crate::format::format_score;
use crate::parser::MeanRecord;
use crate::stats::ScoreTable;

/// Result of dividing a table total by the bucket divisor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mean {
    Value(f64),
    /// The divisor was zero; rendered as a bare `0`.
    ZeroDivisor,
}

impl Mean {
    pub fn of(total: f64, divisor: f64) -> Self {
        if divisor == 0.0 {
            Mean::ZeroDivisor
        } else {
            Mean::Value(total / divisor)
        }
    }
}

impl fmt::Display for Mean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mean::Value(v) => f.write_str(&format_score(*v)),
            Mean::ZeroDivisor => f.write_str("0"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanRow {
    pub elapsed: i64,
    pub mean: Mean,
}

impl fmt::Display for MeanRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.elapsed, self.mean)
    }
}

/// Sum of the latest score per category divided by the divisor carried by
/// the last record of the bucket. The table size plays no part.
#[derive(Debug, Default)]
pub struct SimpleMean {
    table: ScoreTable,
    divisor: f64,
}

impl SimpleMean {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Aggregate for SimpleMean {
    type Record = MeanRecord;
    type Row = MeanRow;

    fn observe(&mut self, record: MeanRecord) {
        self.table.record(&record.category, record.score);
        self.divisor = record.divisor;
    }

    fn summarize(&self, elapsed: i64) -> MeanRow {
        MeanRow {
            elapsed,
            mean: Mean::of(self.table.total(), self.divisor),
        }
    }
}
