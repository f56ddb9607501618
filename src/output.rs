//! Row writers for aggregate output.
//!
//! Every row is flushed as soon as it is written so a consumer tailing the
//! stream sees values as they are produced.

use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use std::fmt::Display;
use std::io::Write;

/// Destination for aggregate rows.
pub trait RowSink<Row> {
    fn write_row(&mut self, row: &Row) -> Result<()>;
}

/// Writes each row's `Display` form on its own line.
pub struct PlainWriter<W: Write> {
    out: W,
}

impl<W: Write> PlainWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write, R: Display> RowSink<R> for PlainWriter<W> {
    fn write_row(&mut self, row: &R) -> Result<()> {
        writeln!(self.out, "{row}")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Serializes rows as CSV records below a fixed header line.
pub struct CsvWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvWriter<W> {
    /// Writes `header` immediately, so it appears even if no row follows.
    pub fn new(out: W, header: &[&str]) -> Result<Self> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(out);
        writer.write_record(header)?;
        writer.flush()?;
        Ok(Self { writer })
    }
}

impl<W: Write, R: Serialize> RowSink<R> for CsvWriter<W> {
    fn write_row(&mut self, row: &R) -> Result<()> {
        self.writer.serialize(row)?;
        self.writer.flush()?;
        Ok(())
    }
}
