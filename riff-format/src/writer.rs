//! File writer: stripe accumulation, statistics and filter build, header
//! emission.
//!
//! Rows arrive in the caller's original schema order and are remapped to the
//! read layout through each field's original position. Every `stripe_rows`
//! rows the writer seals a stripe: the payload is encoded and compressed
//! into the data file, per-column statistics (and, when enabled, bloom
//! filters) are collected over the indexed prefix, and an index entry is
//! recorded. `finish` writes the header file with the stripe index and the
//! footer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use riff_result::{Error, Result};
use riff_types::{Row, RowView, TypeDescription};

use crate::config::Config;
use crate::filter::ColumnFilter;
use crate::footer::FileFooter;
use crate::header::FileHeader;
use crate::io::{codec_for, CompressionCodec, OutputBuffer};
use crate::reader::{data_preamble, DATA_FILE_SUFFIX, DATA_PREAMBLE_LENGTH};
use crate::rows::write_row;
use crate::stats::Statistics;
use crate::stripe::{write_stripes, StripeInformation};

/// Write session producing one logical file pair.
pub struct FileWriter {
    header_path: PathBuf,
    td: TypeDescription,
    stripe_rows: usize,
    column_filter_enabled: bool,
    codec: Box<dyn CompressionCodec>,
    data_file: BufWriter<File>,
    buffered: Vec<Row>,
    stripes: Vec<StripeInformation>,
    file_stats: Vec<Statistics>,
    offset: i64,
    next_stripe_id: u32,
    num_records: u64,
    finished: bool,
}

impl FileWriter {
    /// Create `<path>.data` and a writer bound to `<path>`.
    pub fn create(
        path: impl AsRef<Path>,
        td: TypeDescription,
        config: &Config,
    ) -> Result<FileWriter> {
        let header_path = path.as_ref().to_path_buf();
        let mut data_name = header_path.as_os_str().to_os_string();
        data_name.push(DATA_FILE_SUFFIX);

        let mut file_stats = Vec::with_capacity(td.num_indexed());
        for ordinal in 0..td.num_indexed() {
            file_stats.push(Statistics::for_type(td.at(ordinal).data_type())?);
        }

        let mut data_file = BufWriter::new(File::create(PathBuf::from(data_name))?);
        data_file.write_all(&data_preamble())?;

        Ok(FileWriter {
            header_path,
            td,
            stripe_rows: config.stripe_rows(),
            column_filter_enabled: config.column_filter_enabled(),
            codec: codec_for(config.compression_codec())?,
            data_file,
            buffered: Vec::new(),
            stripes: Vec::new(),
            file_stats,
            offset: DATA_PREAMBLE_LENGTH as i64,
            next_stripe_id: 0,
            num_records: 0,
            finished: false,
        })
    }

    /// Buffer one row, given in the original schema order.
    pub fn write_row(&mut self, row: &Row) -> Result<()> {
        if self.finished {
            return Err(Error::StateViolation(
                "cannot write to a finished writer".to_string(),
            ));
        }
        if row.num_fields() != self.td.size() {
            return Err(Error::Internal(format!(
                "row arity {} does not match type description of {} fields",
                row.num_fields(),
                self.td.size()
            )));
        }
        // remap into the read layout: indexed fields first
        let mut bound = Row::new(self.td.size());
        for spec in self.td.specs() {
            bound.update(spec.position(), row.value(spec.orig_position()).clone());
        }
        self.buffered.push(bound);
        if self.buffered.len() >= self.stripe_rows {
            self.flush_stripe()?;
        }
        Ok(())
    }

    fn flush_stripe(&mut self) -> Result<()> {
        if self.buffered.is_empty() {
            return Ok(());
        }
        let id = u8::try_from(self.next_stripe_id)
            .map_err(|_| Error::Internal("stripe id overflow: more than 256 stripes".to_string()))?;
        self.next_stripe_id += 1;

        let num_indexed = self.td.num_indexed();
        let stats = if num_indexed > 0 {
            let mut stats = Vec::with_capacity(num_indexed);
            for ordinal in 0..num_indexed {
                let mut s = Statistics::for_type(self.td.at(ordinal).data_type())?;
                for row in &self.buffered {
                    s.update(row, ordinal);
                }
                self.file_stats[ordinal].merge(&s)?;
                stats.push(s);
            }
            Some(stats)
        } else {
            None
        };

        let filters = if self.column_filter_enabled && num_indexed > 0 {
            let mut filters = Vec::with_capacity(num_indexed);
            for ordinal in 0..num_indexed {
                filters.push(ColumnFilter::bloom(
                    self.buffered.iter().map(|row| row.value(ordinal)),
                ));
            }
            Some(filters)
        } else {
            None
        };

        let mut payload = OutputBuffer::new();
        for row in &self.buffered {
            write_row(&mut payload, row, &self.td)?;
        }
        let compressed = self.codec.compress(payload.as_slice())?;
        let length = i32::try_from(compressed.len())
            .map_err(|_| Error::Internal("stripe payload exceeds 2 GiB".to_string()))?;
        self.data_file.write_all(&compressed)?;

        tracing::debug!(
            stripe = id,
            rows = self.buffered.len(),
            raw = payload.bytes_written(),
            compressed = length,
            "flushed stripe"
        );
        self.stripes.push(StripeInformation {
            id,
            offset: self.offset,
            length,
            stats,
            filters,
        });
        self.offset += length as i64;
        self.num_records += self.buffered.len() as u64;
        self.buffered.clear();
        Ok(())
    }

    /// Seal the file pair: flush the residual stripe, close the data file
    /// and write the header file (header, stripe index, footer). Returns the
    /// written header.
    pub fn finish(
        &mut self,
        properties: Option<FxHashMap<String, String>>,
    ) -> Result<FileHeader> {
        if self.finished {
            return Err(Error::StateViolation(
                "writer has already finished".to_string(),
            ));
        }
        self.flush_stripe()?;
        self.data_file.flush()?;

        let header = FileHeader::new(self.td.clone(), properties);
        let footer_stats = if self.td.num_indexed() > 0 {
            Some(self.file_stats.clone())
        } else {
            None
        };
        let footer = FileFooter::new(self.num_records, footer_stats);

        let mut out = OutputBuffer::new();
        header.write_to(&mut out);
        write_stripes(&mut out, &self.stripes);
        footer.write_to(&mut out);
        std::fs::write(&self.header_path, out.as_slice())?;

        tracing::debug!(
            stripes = self.stripes.len(),
            records = self.num_records,
            "wrote header file {}",
            self.header_path.display()
        );
        self.finished = true;
        Ok(header)
    }

    /// Rows written so far, including buffered ones.
    pub fn num_records(&self) -> u64 {
        self.num_records + self.buffered.len() as u64
    }
}
