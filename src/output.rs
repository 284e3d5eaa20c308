//! Tabular output for decoded row batches.
//!
//! Writes the column header once, then one line per row, in batch order.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{Writer, WriterBuilder};
use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::{debug, info};

use crate::error::Result;
use crate::row::RowBatch;
use crate::summary::FeedSummary;

/// Consumer of decoded batches.
pub trait RowSink {
    fn write_batch(&mut self, batch: &RowBatch) -> Result<()>;
}

/// Delimited-text sink over any writer.
///
/// The header comes from the first batch with columns; later batches are
/// expected to share it and only append rows.
pub struct CsvSink<W: Write> {
    writer: Writer<W>,
    header_written: bool,
}

impl<W: Write> CsvSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: WriterBuilder::new().has_headers(false).from_writer(inner),
            header_written: false,
        }
    }

    /// Flushes buffered rows and returns the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| crate::error::Error::Io(e.into_error()))
    }
}

impl<W: Write> RowSink for CsvSink<W> {
    fn write_batch(&mut self, batch: &RowBatch) -> Result<()> {
        if batch.columns().is_empty() {
            return Ok(());
        }

        if !self.header_written {
            self.writer.write_record(batch.columns())?;
            self.header_written = true;
        }
        for row in batch.rows() {
            self.writer
                .write_record(row.cells().iter().map(|c| c.render().into_owned()))?;
        }
        self.writer.flush()?;

        Ok(())
    }
}

/// Writes `batch` to `path` as CSV, gzip-compressed when `gzip` is set.
pub fn write_csv_file(path: &Path, batch: &RowBatch, gzip: bool) -> Result<()> {
    debug!(path = %path.display(), rows = batch.len(), gzip, "Writing CSV");
    let file = File::create(path)?;

    if gzip {
        let mut sink = CsvSink::new(GzEncoder::new(file, Compression::default()));
        sink.write_batch(batch)?;
        sink.into_inner()?.finish()?;
    } else {
        let mut sink = CsvSink::new(file);
        sink.write_batch(batch)?;
        sink.into_inner()?;
    }

    Ok(())
}

/// Logs a feed summary as pretty-printed JSON.
pub fn print_json(summary: &FeedSummary) -> anyhow::Result<()> {
    info!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}
