use serde::Serialize;
use std::fmt;

use crate::aggregators::Aggregate;
use crate::format::{format_score, serialize_score};
use crate::parser::TrecRecord;
use crate::stats::GroupedScoreTable;

/// TREC collections reported on every row, in output order.
pub const TREC_GROUPS: [&str; 4] = ["4", "5", "6", "7"];

pub const TREC_CSV_HEADER: [&str; 5] = ["Time(seconds)", "TREC-4", "TREC-5", "TREC-6", "TREC-7"];

/// Number of topics a collection's total is divided by.
///
/// TREC-4 has 49 judged topics; every other collection is assumed to
/// have 50.
pub fn topic_count(group: &str) -> f64 {
    if group == "4" { 49.0 } else { 50.0 }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrecRow {
    pub elapsed: i64,
    #[serde(serialize_with = "serialize_score")]
    pub trec4: f64,
    #[serde(serialize_with = "serialize_score")]
    pub trec5: f64,
    #[serde(serialize_with = "serialize_score")]
    pub trec6: f64,
    #[serde(serialize_with = "serialize_score")]
    pub trec7: f64,
}

impl fmt::Display for TrecRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.elapsed,
            format_score(self.trec4),
            format_score(self.trec5),
            format_score(self.trec6),
            format_score(self.trec7)
        )
    }
}

/// Per-collection average of the latest score for each topic.
#[derive(Debug, Default)]
pub struct TrecMean {
    table: GroupedScoreTable,
}

impl TrecMean {
    pub fn new() -> Self {
        Self::default()
    }

    /// Average for `group`, or `None` if no record for it has been seen.
    pub fn group_mean(&self, group: &str) -> Option<f64> {
        self.table
            .group(group)
            .map(|scores| scores.total() / topic_count(group))
    }
}

impl Aggregate for TrecMean {
    type Record = TrecRecord;
    type Row = TrecRow;

    fn observe(&mut self, record: TrecRecord) {
        self.table
            .record(&record.group, &record.category, record.score);
    }

    fn summarize(&self, elapsed: i64) -> TrecRow {
        let [trec4, trec5, trec6, trec7] =
            TREC_GROUPS.map(|group| self.group_mean(group).unwrap_or(0.0));
        TrecRow {
            elapsed,
            trec4,
            trec5,
            trec6,
            trec7,
        }
    }
}
