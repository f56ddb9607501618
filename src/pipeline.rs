//! Input loop tying parser, bucketing and output together.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::BufRead;
use tracing::{debug, trace};

use crate::aggregators::Aggregate;
use crate::bucket::BucketAverager;
use crate::output::RowSink;
use crate::parser::{FIELD_COUNT, ParseRecord, RecordError};

/// Rows of CSV input starting with this byte are embedded headers.
pub const CSV_HEADER_MARKER: u8 = b'T';

/// How records are laid out in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Whitespace separated fields, one record per line.
    Whitespace,
    /// Comma separated rows; rows starting with [`CSV_HEADER_MARKER`] are
    /// skipped.
    Csv,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    pub records: u64,
    pub buckets: u64,
}

/// Reads records from `input` until end of stream, writing one row per
/// timestamp bucket to `sink`.
///
/// # Errors
///
/// Fails on the first unreadable or malformed record, or on a write error.
/// Rows for buckets closed before the failure have already been written.
pub fn run<A, R, S>(
    aggregate: A,
    input: R,
    format: InputFormat,
    sink: &mut S,
) -> Result<StreamSummary>
where
    A: Aggregate,
    A::Record: ParseRecord,
    R: BufRead,
    S: RowSink<A::Row>,
{
    let mut averager = BucketAverager::new(aggregate);

    match format {
        InputFormat::Whitespace => read_lines(input, &mut averager, sink)?,
        InputFormat::Csv => read_csv(input, &mut averager, sink)?,
    }

    if let Some(row) = averager.finish() {
        sink.write_row(&row)?;
    }

    let summary = StreamSummary {
        records: averager.records(),
        buckets: averager.buckets(),
    };
    debug!(?summary, "End of stream");
    Ok(summary)
}

fn read_lines<A, R, S>(input: R, averager: &mut BucketAverager<A>, sink: &mut S) -> Result<()>
where
    A: Aggregate,
    A::Record: ParseRecord,
    R: BufRead,
    S: RowSink<A::Row>,
{
    for (index, line) in input.lines().enumerate() {
        let line_no = index as u64 + 1;
        let line = line.with_context(|| format!("failed to read line {line_no}"))?;

        let record = <A::Record as ParseRecord>::parse_line(&line)
            .with_context(|| format!("malformed record on line {line_no}: {line:?}"))?;
        feed(averager, record, line_no, sink)?;
    }
    Ok(())
}

fn read_csv<A, R, S>(input: R, averager: &mut BucketAverager<A>, sink: &mut S) -> Result<()>
where
    A: Aggregate,
    A::Record: ParseRecord,
    R: BufRead,
    S: RowSink<A::Row>,
{
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(CSV_HEADER_MARKER))
        .trim(Trim::All)
        .flexible(true)
        .from_reader(input);

    for fields in reader.records() {
        let fields = fields.context("failed to read CSV input")?;
        let line_no = fields.position().map_or(0, |pos| pos.line());

        let record = csv_record::<A::Record>(&fields).with_context(|| {
            let row: Vec<_> = fields.iter().collect();
            format!("malformed record on line {line_no}: {:?}", row.join(","))
        })?;
        feed(averager, record, line_no, sink)?;
    }
    Ok(())
}

fn csv_record<T: ParseRecord>(fields: &StringRecord) -> Result<T, RecordError> {
    if fields.len() != FIELD_COUNT {
        return Err(RecordError::FieldCount {
            expected: FIELD_COUNT,
            found: fields.len(),
        });
    }
    Ok(fields.deserialize(None)?)
}

fn feed<A, S>(
    averager: &mut BucketAverager<A>,
    record: A::Record,
    line_no: u64,
    sink: &mut S,
) -> Result<()>
where
    A: Aggregate,
    S: RowSink<A::Row>,
{
    let closed = averager
        .push(record)
        .with_context(|| format!("bad timestamp on line {line_no}"))?;
    if let Some(row) = closed {
        trace!(line_no, bucket = averager.buckets(), "Bucket closed");
        sink.write_row(&row)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregators::{Mean, MeanRow, SimpleMean, TrecMean, TrecRow};
    use crate::bucket::BucketError;
    use std::io::Cursor;

    /// Collects rows in memory.
    struct Collect<R>(Vec<R>);

    impl<R: Clone> RowSink<R> for Collect<R> {
        fn write_row(&mut self, row: &R) -> Result<()> {
            self.0.push(row.clone());
            Ok(())
        }
    }

    fn run_mean(input: &str) -> Result<(Vec<MeanRow>, StreamSummary)> {
        let mut sink = Collect(Vec::new());
        let summary = run(
            SimpleMean::new(),
            Cursor::new(input),
            InputFormat::Whitespace,
            &mut sink,
        )?;
        Ok((sink.0, summary))
    }

    fn run_trec(input: &str, format: InputFormat) -> Result<(Vec<TrecRow>, StreamSummary)> {
        let mut sink = Collect(Vec::new());
        let summary = run(TrecMean::new(), Cursor::new(input), format, &mut sink)?;
        Ok((sink.0, summary))
    }

    #[test]
    fn test_empty_input_emits_nothing() {
        let (rows, summary) = run_mean("").unwrap();
        assert!(rows.is_empty());
        assert_eq!(summary, StreamSummary::default());
    }

    #[test]
    fn test_worked_example() {
        let (rows, summary) = run_mean("0 2 A 10\n0 2 B 20\n1 2 A 15\n").unwrap();
        assert_eq!(
            rows,
            vec![
                MeanRow {
                    elapsed: 0,
                    mean: Mean::Value(15.0)
                },
                MeanRow {
                    elapsed: 1,
                    mean: Mean::Value(17.5)
                },
            ]
        );
        assert_eq!(summary.records, 3);
        assert_eq!(summary.buckets, 2);
    }

    #[test]
    fn test_missing_trailing_newline() {
        let (rows, _) = run_mean("5 1 A 1\n5 1 B 2").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].mean, Mean::Value(3.0));
    }

    #[test]
    fn test_malformed_line_is_fatal() {
        let err = run_mean("0 2 A 10\n0 2 B\n1 2 A 15\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
        let cause = err.downcast_ref::<RecordError>().unwrap();
        assert!(matches!(cause, RecordError::FieldCount { found: 3, .. }));
    }

    #[test]
    fn test_rows_before_failure_are_written() {
        let mut sink = Collect(Vec::new());
        let result = run(
            SimpleMean::new(),
            Cursor::new("0 1 A 1\n1 1 A 2\nbad line\n"),
            InputFormat::Whitespace,
            &mut sink,
        );
        assert!(result.is_err());
        assert_eq!(sink.0.len(), 1);
    }

    #[test]
    fn test_blank_line_is_fatal() {
        assert!(run_mean("0 1 A 1\n\n1 1 A 2\n").is_err());
    }

    #[test]
    fn test_header_lines_ignored_in_csv_mode() {
        let input = "Time,TREC,Topic,Score\n0,4,201,49\nT again\n0,5,251,25\n";
        let (rows, summary) = run_trec(input, InputFormat::Csv).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].trec4, 1.0);
        assert_eq!(rows[0].trec5, 0.5);
        assert_eq!(summary.records, 2);
    }

    #[test]
    fn test_csv_fields_are_trimmed() {
        let (rows, _) = run_trec(" 0 , 6 , 301 , 25 \n", InputFormat::Csv).unwrap();
        assert_eq!(rows[0].trec6, 0.5);
    }

    #[test]
    fn test_csv_row_with_empty_field_is_fatal() {
        let err = run_trec("0,4,,201,49\n", InputFormat::Csv).unwrap_err();
        assert!(err.to_string().contains("line 1"));
        let cause = err.downcast_ref::<RecordError>().unwrap();
        assert!(matches!(cause, RecordError::FieldCount { found: 5, .. }));
    }

    #[test]
    fn test_csv_short_row_is_fatal() {
        let err = run_trec("0,4,201,49\n10,4,201\n", InputFormat::Csv).unwrap_err();
        assert!(err.to_string().contains("line 2"));
        let cause = err.downcast_ref::<RecordError>().unwrap();
        assert!(matches!(cause, RecordError::FieldCount { found: 3, .. }));
    }

    #[test]
    fn test_csv_non_numeric_score_is_fatal() {
        let err = run_trec("0,4,201,high\n", InputFormat::Csv).unwrap_err();
        let cause = err.downcast_ref::<RecordError>().unwrap();
        assert!(matches!(cause, RecordError::Csv(_)));
    }

    #[test]
    fn test_whitespace_rows_are_malformed_in_csv_mode() {
        assert!(run_trec("0 4 201 49\n", InputFormat::Csv).is_err());
    }

    #[test]
    fn test_elapsed_overflow_is_fatal() {
        let input = format!("{} 1 A 1\n{} 1 A 2\n", i64::MIN, i64::MAX);
        let err = run_mean(&input).unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert!(err.downcast_ref::<BucketError>().is_some());
    }

    #[test]
    fn test_header_line_is_malformed_in_plain_mode() {
        assert!(run_trec("Time TREC Topic Score\n", InputFormat::Whitespace).is_err());
    }

    #[test]
    fn test_trec_buckets_use_cumulative_table() {
        let input = "100 4 201 49\n100 6 301 10\n160 6 302 40\n220 7 351 5\n";
        let (rows, _) = run_trec(input, InputFormat::Whitespace).unwrap();

        let elapsed: Vec<_> = rows.iter().map(|r| r.elapsed).collect();
        assert_eq!(elapsed, vec![0, 60, 120]);
        assert_eq!(rows[0].trec6, 0.2);
        assert_eq!(rows[1].trec4, 1.0);
        assert_eq!(rows[1].trec6, 1.0);
        assert_eq!(rows[2].trec7, 0.1);
        assert_eq!(rows[2].trec4, 1.0);
    }
}
