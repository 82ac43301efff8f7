//! Parquet output
//!
//! [`ParquetSink`] buffers the records of each stream and writes them in
//! batches to `{dir}/{stream}.parquet` through a [`ParquetWriter`]. A
//! checkpoint closes the open files, so everything written before it is
//! readable; later records of the stream go to `{stream}-1.parquet`,
//! `{stream}-2.parquet` and so on. Existing files are never overwritten.

use super::message::{Message, RecordSink};
use super::schema::{arrow_schema, records_to_batch};
use crate::error::{Error, Result, ResultExt};
use crate::types::JsonObject;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Configuration for Parquet writer
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    row_group_size: usize,
    batch_size: usize,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: 1024 * 1024,
            batch_size: 1000,
        }
    }
}

impl ParquetWriterConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set compression algorithm
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set row group size
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Records buffered per stream before a batch is written
    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn build_properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build()
    }
}

/// Parquet file writer
pub struct ParquetWriter {
    writer: ArrowWriter<File>,
    rows_written: usize,
}

impl ParquetWriter {
    /// Create the file and its writer
    pub fn new(path: impl AsRef<Path>, schema: SchemaRef, config: &ParquetWriterConfig) -> Result<Self> {
        let file = File::create(path.as_ref()).map_err(|e| {
            Error::output(format!("Failed to create {}: {e}", path.as_ref().display()))
        })?;

        let writer = ArrowWriter::try_new(file, schema, Some(config.build_properties()))?;

        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// Write a RecordBatch to the file
    pub fn write(&mut self, batch: &RecordBatch) -> Result<()> {
        self.writer.write(batch)?;
        self.rows_written += batch.num_rows();
        Ok(())
    }

    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Close the writer and finalize the file
    pub fn close(self) -> Result<usize> {
        let rows = self.rows_written;
        self.writer.close()?;
        Ok(rows)
    }
}

impl std::fmt::Debug for ParquetWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParquetWriter")
            .field("rows_written", &self.rows_written)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Sink
// ============================================================================

#[derive(Debug)]
struct StreamBuffer {
    schema: SchemaRef,
    rows: Vec<JsonObject>,
    writer: Option<ParquetWriter>,
    files: Vec<PathBuf>,
}

/// Writes the records of each stream into Parquet files in a directory
#[derive(Debug)]
pub struct ParquetSink {
    dir: PathBuf,
    config: ParquetWriterConfig,
    streams: BTreeMap<String, StreamBuffer>,
}

impl ParquetSink {
    /// Create the sink, creating `dir` if needed
    pub fn new(dir: impl Into<PathBuf>, config: ParquetWriterConfig) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        Ok(Self {
            dir,
            config,
            streams: BTreeMap::new(),
        })
    }

    /// First output file of a stream
    pub fn file_path(&self, stream: &str) -> PathBuf {
        part_path(&self.dir, stream, 0)
    }

    /// Files opened for a stream so far, in write order
    pub fn files(&self, stream: &str) -> &[PathBuf] {
        self.streams
            .get(stream)
            .map(|buffer| buffer.files.as_slice())
            .unwrap_or_default()
    }

    fn flush_stream(dir: &Path, config: &ParquetWriterConfig, name: &str, buffer: &mut StreamBuffer) -> Result<()> {
        if buffer.rows.is_empty() {
            return Ok(());
        }

        let batch = records_to_batch(&buffer.schema, &buffer.rows)?;
        let writer = match buffer.writer.take() {
            Some(writer) => writer,
            None => {
                let path = next_free_path(dir, name);
                debug!("Opening {}", path.display());
                let writer = ParquetWriter::new(&path, Arc::clone(&buffer.schema), config)?;
                buffer.files.push(path);
                writer
            }
        };
        buffer.writer.insert(writer).write(&batch)?;
        buffer.rows.clear();
        Ok(())
    }

    /// Flush every stream and close its open file
    fn close_all(&mut self) -> Result<()> {
        for (name, buffer) in &mut self.streams {
            Self::flush_stream(&self.dir, &self.config, name, buffer)?;
            if let Some(writer) = buffer.writer.take() {
                let rows = writer.close()?;
                if let Some(path) = buffer.files.last() {
                    info!("Wrote {rows} rows to {}", path.display());
                }
            }
        }
        Ok(())
    }
}

fn part_path(dir: &Path, stream: &str, part: usize) -> PathBuf {
    match part {
        0 => dir.join(format!("{stream}.parquet")),
        n => dir.join(format!("{stream}-{n}.parquet")),
    }
}

/// Closed files are never reopened; a new part gets the first unused name
fn next_free_path(dir: &Path, stream: &str) -> PathBuf {
    let mut part = 0;
    loop {
        let path = part_path(dir, stream, part);
        if !path.exists() {
            return path;
        }
        part += 1;
    }
}

impl RecordSink for ParquetSink {
    fn write(&mut self, message: &Message) -> Result<()> {
        match message {
            Message::Schema { stream, schema, .. } => {
                let schema = arrow_schema(schema);
                let buffer = self.streams.entry(stream.clone()).or_insert_with(|| StreamBuffer {
                    schema: Arc::clone(&schema),
                    rows: Vec::new(),
                    writer: None,
                    files: Vec::new(),
                });
                if buffer.writer.is_none() {
                    buffer.schema = schema;
                }
            }
            Message::Record { stream, record, .. } => {
                let buffer = self.streams.get_mut(stream).ok_or_else(|| {
                    Error::output(format!("record for stream '{stream}' before its schema"))
                })?;
                buffer.rows.push(record.clone());
                if buffer.rows.len() >= self.config.batch_size {
                    Self::flush_stream(&self.dir, &self.config, stream, buffer)?;
                }
            }
            Message::State { .. } => {
                for (name, buffer) in &mut self.streams {
                    Self::flush_stream(&self.dir, &self.config, name, buffer)?;
                }
            }
        }
        Ok(())
    }

    fn checkpoint(&mut self) -> Result<()> {
        self.close_all()
    }

    fn finish(&mut self) -> Result<()> {
        self.close_all()
    }
}
