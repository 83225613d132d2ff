//! File reader: header parsing, stripe planning and row streaming.
//!
//! A logical file is a pair on disk: the header file at `<path>` (header,
//! stripe index, footer) and the data file at `<path>.data` (stripe payloads
//! behind an 8-byte preamble). A read session moves through
//! `Opened → HeaderRead → Planned → Streaming → Closed`; `Closed` is
//! terminal and any error transitions straight to it.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use riff_expr::Expr;
use riff_result::{Error, Result};
use riff_types::{Row, TypeDescription};

use crate::config::Config;
use crate::footer::FileFooter;
use crate::header::{FileHeader, MAGIC};
use crate::io::{codec_for, CompressionCodec, InputBuffer};
use crate::rows::read_row;
use crate::state::PredicateState;
use crate::stripe::{evaluate_stripes, read_stripes, StripeInformation};
use crate::util::assert_bytes;

/// Suffix of the data file relative to the header file path.
pub const DATA_FILE_SUFFIX: &str = ".data";
/// Length of the data file preamble: 4 magic bytes plus 4 reserved bytes.
pub const DATA_PREAMBLE_LENGTH: usize = 8;

/// Preamble written at the start of every data file. Stripe offsets are
/// absolute, so the first stripe starts right behind it.
pub(crate) fn data_preamble() -> [u8; DATA_PREAMBLE_LENGTH] {
    let mut preamble = [0u8; DATA_PREAMBLE_LENGTH];
    preamble[..4].copy_from_slice(&MAGIC.to_be_bytes());
    preamble
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SessionState {
    Opened,
    HeaderRead,
    Planned,
    Closed,
}

/// Read session over one logical file.
///
/// Sessions are single-threaded and independent; callers parallelize by
/// opening one session per task. The reader itself performs no I/O until
/// [`FileReader::read_file_info`] or [`FileReader::prepare_read`].
pub struct FileReader {
    header_path: PathBuf,
    data_path: PathBuf,
    buffer_size: usize,
    filter_pushdown: bool,
    metadata_count_enabled: bool,
    codec_name: String,
    state: SessionState,
    header: Option<FileHeader>,
    stripes: Vec<StripeInformation>,
    footer: Option<FileFooter>,
    streaming: Arc<AtomicBool>,
}

impl FileReader {
    /// Bind a reader to `<path>` / `<path>.data` with settings from `config`.
    pub fn open(path: impl AsRef<Path>, config: &Config) -> Result<FileReader> {
        let header_path = path.as_ref().to_path_buf();
        let mut data_name = header_path.as_os_str().to_os_string();
        data_name.push(DATA_FILE_SUFFIX);
        Ok(FileReader {
            header_path,
            data_path: PathBuf::from(data_name),
            buffer_size: config.buffer_size(),
            filter_pushdown: config.filter_pushdown(),
            metadata_count_enabled: config.metadata_count_enabled(),
            codec_name: config.compression_codec().to_string(),
            state: SessionState::Opened,
            header: None,
            stripes: Vec::new(),
            footer: None,
            streaming: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn header_path(&self) -> &Path {
        &self.header_path
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Effective buffer size after clamping.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Parse the header file: magic, header body and stripe index always,
    /// footer when `read_footer` is set. Idempotent once parsed.
    pub fn read_file_info(&mut self, read_footer: bool) -> Result<&FileHeader> {
        if self.state == SessionState::Closed {
            return Err(Error::StateViolation(
                "cannot read file info on a closed session".to_string(),
            ));
        }
        if self.header.is_none() || (read_footer && self.footer.is_none()) {
            if let Err(e) = self.parse_header_file(read_footer) {
                self.state = SessionState::Closed;
                return Err(e);
            }
            if self.state == SessionState::Opened {
                self.state = SessionState::HeaderRead;
            }
        }
        self.file_header()
    }

    fn parse_header_file(&mut self, read_footer: bool) -> Result<()> {
        let bytes = std::fs::read(&self.header_path)?;
        let mut input = InputBuffer::new(&bytes);
        let header = FileHeader::read_from(&mut input)?;
        let num_indexed = header.type_description().num_indexed();
        let stripes = read_stripes(&mut input, num_indexed)?;
        let footer = if read_footer {
            Some(FileFooter::read_from(&mut input, num_indexed)?)
        } else {
            None
        };
        tracing::debug!(
            stripes = stripes.len(),
            footer = footer.is_some(),
            "read file info from {}",
            self.header_path.display()
        );
        self.header = Some(header);
        self.stripes = stripes;
        self.footer = footer;
        Ok(())
    }

    /// Header of the file; fails unless file info was read.
    pub fn file_header(&self) -> Result<&FileHeader> {
        self.header.as_ref().ok_or_else(|| {
            Error::StateViolation("file info has not been read yet".to_string())
        })
    }

    pub fn type_description(&self) -> Result<&TypeDescription> {
        Ok(self.file_header()?.type_description())
    }

    /// Total record count from the footer, for count-style queries that can
    /// bypass the stripe scan. `None` unless the footer was read and
    /// metadata counts are enabled.
    pub fn num_records(&self) -> Option<u64> {
        if !self.metadata_count_enabled {
            return None;
        }
        self.footer.as_ref().map(|f| f.num_records())
    }

    /// File-level aggregate statistics from the footer.
    pub fn file_statistics(&self) -> Option<&[crate::stats::Statistics]> {
        self.footer.as_ref().and_then(|f| f.statistics())
    }

    /// Plan a read and return the row iterator over surviving stripes.
    ///
    /// Loads file info if necessary, builds the predicate state (unless
    /// pushdown is disabled), plans stripes in offset order and hands
    /// everything to the iterator. Idempotent until the first row is pulled
    /// from any returned iterator; afterwards, and after close, it fails
    /// with [`Error::StateViolation`].
    pub fn prepare_read(&mut self, predicate: Option<&Expr>) -> Result<RowIterator> {
        if self.state == SessionState::Closed {
            return Err(Error::StateViolation(
                "cannot plan a read on a closed session".to_string(),
            ));
        }
        if self.streaming.load(Ordering::Acquire) {
            return Err(Error::StateViolation(
                "cannot re-plan a read once streaming has started".to_string(),
            ));
        }
        match self.prepare_read_inner(predicate) {
            Ok(iter) => Ok(iter),
            Err(e) => {
                self.state = SessionState::Closed;
                Err(e)
            }
        }
    }

    fn prepare_read_inner(&mut self, predicate: Option<&Expr>) -> Result<RowIterator> {
        if self.header.is_none() {
            self.parse_header_file(false)?;
        }
        let header = self.file_header()?;
        let td = header.type_description().clone();

        let state = match predicate {
            Some(expr) if self.filter_pushdown => {
                Some(Arc::new(PredicateState::new(expr, &td)?))
            }
            _ => None,
        };
        let planned = evaluate_stripes(self.stripes.clone(), state.as_deref());
        let codec = codec_for(&self.codec_name)?;
        self.state = SessionState::Planned;
        Ok(RowIterator {
            data_path: self.data_path.clone(),
            buffer_size: self.buffer_size,
            codec,
            td,
            state,
            stripes: planned.into_iter(),
            file: None,
            pending: Vec::new().into_iter(),
            streaming: Arc::clone(&self.streaming),
            finished: false,
        })
    }

    /// Close the session. Terminal: every later operation fails.
    pub fn close(&mut self) {
        self.state = SessionState::Closed;
    }
}

/// Pull-based row iterator over the surviving stripes of one read.
///
/// Stripes are visited strictly in offset order; one stripe's payload is
/// buffered at a time and the next is not touched until the current one is
/// drained. The first error ends the stream: it is yielded once and the
/// iterator is fused afterwards. Dropping the iterator releases the data
/// file handle.
pub struct RowIterator {
    data_path: PathBuf,
    buffer_size: usize,
    codec: Box<dyn CompressionCodec>,
    td: TypeDescription,
    state: Option<Arc<PredicateState>>,
    stripes: std::vec::IntoIter<StripeInformation>,
    file: Option<BufReader<File>>,
    pending: std::vec::IntoIter<Row>,
    streaming: Arc<AtomicBool>,
    finished: bool,
}

impl RowIterator {
    /// Number of stripes this iterator will visit in total.
    pub fn num_stripes(&self) -> usize {
        self.stripes.len()
    }

    fn ensure_open(&mut self) -> Result<()> {
        if self.file.is_some() {
            return Ok(());
        }
        let file = File::open(&self.data_path)?;
        let mut reader = BufReader::with_capacity(self.buffer_size, file);
        let mut preamble = [0u8; DATA_PREAMBLE_LENGTH];
        reader.read_exact(&mut preamble)?;
        assert_bytes(Some(&data_preamble()), Some(&preamble), "data file preamble")?;
        self.file = Some(reader);
        Ok(())
    }

    fn load_stripe(&mut self, stripe: &StripeInformation) -> Result<Vec<Row>> {
        self.ensure_open()?;
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| Error::Internal("data file handle missing".to_string()))?;
        file.seek(SeekFrom::Start(stripe.offset as u64))?;
        let mut compressed = vec![0u8; stripe.length as usize];
        file.read_exact(&mut compressed)?;
        let raw = self.codec.decompress(&compressed)?;
        let mut input = InputBuffer::new(&raw);
        let mut rows = Vec::new();
        while input.remaining() > 0 {
            rows.push(read_row(&mut input, &self.td)?);
        }
        tracing::debug!(
            stripe = stripe.id,
            rows = rows.len(),
            bytes = stripe.length,
            "loaded stripe"
        );
        Ok(rows)
    }
}

impl Iterator for RowIterator {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Result<Row>> {
        if self.finished {
            return None;
        }
        self.streaming.store(true, Ordering::Release);
        loop {
            if let Some(row) = self.pending.next() {
                let passes = match &self.state {
                    Some(state) => state.evaluate_row(&row),
                    None => true,
                };
                if passes {
                    return Some(Ok(row));
                }
                continue;
            }
            let Some(stripe) = self.stripes.next() else {
                self.finished = true;
                self.file = None;
                return None;
            };
            match self.load_stripe(&stripe) {
                Ok(rows) => self.pending = rows.into_iter(),
                Err(e) => {
                    self.finished = true;
                    self.file = None;
                    return Some(Err(e));
                }
            }
        }
    }
}
