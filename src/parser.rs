//! Record types and the whitespace line parser.
//!
//! Comma separated input is read with the `csv` crate in
//! [`crate::pipeline`]; records derive `Deserialize` for that path.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// Number of fields every record carries.
pub const FIELD_COUNT: usize = 4;

/// Why a line could not be turned into a record.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("invalid {field} {value:?}: {source}")]
    InvalidInt {
        field: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("invalid {field} {value:?}: {source}")]
    InvalidFloat {
        field: &'static str,
        value: String,
        #[source]
        source: ParseFloatError,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Anything that belongs to a timestamp bucket.
pub trait Timestamped {
    fn timestamp(&self) -> i64;
}

/// A record readable from one whitespace separated line or one CSV row.
pub trait ParseRecord: Timestamped + DeserializeOwned {
    fn from_fields(fields: [&str; FIELD_COUNT]) -> Result<Self, RecordError>;

    /// Splits `line` on whitespace and builds a record from the fields.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::FieldCount`] unless the line has exactly
    /// [`FIELD_COUNT`] fields, or a numeric error if a number does not parse.
    fn parse_line(line: &str) -> Result<Self, RecordError> {
        let fields: [&str; FIELD_COUNT] = line
            .split_whitespace()
            .collect::<Vec<_>>()
            .try_into()
            .map_err(|fields: Vec<&str>| RecordError::FieldCount {
                expected: FIELD_COUNT,
                found: fields.len(),
            })?;
        Self::from_fields(fields)
    }
}

fn parse_int(field: &'static str, value: &str) -> Result<i64, RecordError> {
    value.parse().map_err(|source| RecordError::InvalidInt {
        field,
        value: value.to_string(),
        source,
    })
}

fn parse_float(field: &'static str, value: &str) -> Result<f64, RecordError> {
    value.parse().map_err(|source| RecordError::InvalidFloat {
        field,
        value: value.to_string(),
        source,
    })
}

/// `<timestamp> <divisor> <category> <score>`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MeanRecord {
    pub timestamp: i64,
    pub divisor: f64,
    pub category: String,
    pub score: f64,
}

impl Timestamped for MeanRecord {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

impl ParseRecord for MeanRecord {
    fn from_fields(
        [timestamp, divisor, category, score]: [&str; FIELD_COUNT],
    ) -> Result<Self, RecordError> {
        Ok(MeanRecord {
            timestamp: parse_int("timestamp", timestamp)?,
            divisor: parse_float("divisor", divisor)?,
            category: category.to_string(),
            score: parse_float("score", score)?,
        })
    }
}

/// `<timestamp> <group> <category> <score>`, where group is the TREC id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrecRecord {
    pub timestamp: i64,
    pub group: String,
    pub category: String,
    pub score: f64,
}

impl Timestamped for TrecRecord {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

impl ParseRecord for TrecRecord {
    fn from_fields(
        [timestamp, group, category, score]: [&str; FIELD_COUNT],
    ) -> Result<Self, RecordError> {
        Ok(TrecRecord {
            timestamp: parse_int("timestamp", timestamp)?,
            group: group.to_string(),
            category: category.to_string(),
            score: parse_float("score", score)?,
        })
    }
}
