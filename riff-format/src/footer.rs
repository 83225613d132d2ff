//! Footer of the header file.
//!
//! Written after the stripe index: the total record count and, when the
//! schema has indexed columns, file-level aggregate statistics (the merge of
//! every stripe's statistics, ordinal-aligned). The count lets metadata-only
//! queries skip the data file entirely.

use riff_result::{Error, Result};

use crate::io::{InputBuffer, OutputBuffer};
use crate::stats::Statistics;

#[derive(Debug, Clone, PartialEq)]
pub struct FileFooter {
    num_records: u64,
    stats: Option<Vec<Statistics>>,
}

impl FileFooter {
    pub fn new(num_records: u64, stats: Option<Vec<Statistics>>) -> FileFooter {
        FileFooter { num_records, stats }
    }

    /// Total number of rows across all stripes.
    pub fn num_records(&self) -> u64 {
        self.num_records
    }

    /// File-level aggregate statistics, ordinal-aligned over the indexed
    /// prefix.
    pub fn statistics(&self) -> Option<&[Statistics]> {
        self.stats.as_deref()
    }

    pub fn write_to(&self, buf: &mut OutputBuffer) {
        buf.write_i64(self.num_records as i64);
        match &self.stats {
            None => buf.write_u8(0),
            Some(stats) => {
                buf.write_u8(1);
                for s in stats {
                    s.write_to(buf);
                }
            }
        }
    }

    pub fn read_from(input: &mut InputBuffer<'_>, num_indexed: usize) -> Result<FileFooter> {
        let num_records = input.read_i64()?;
        if num_records < 0 {
            return Err(Error::CorruptHeader(format!(
                "negative record count {num_records}"
            )));
        }
        let stats = if input.read_u8()? != 0 {
            let mut stats = Vec::with_capacity(num_indexed);
            for _ in 0..num_indexed {
                stats.push(Statistics::read_from(input)?);
            }
            Some(stats)
        } else {
            None
        };
        Ok(FileFooter {
            num_records: num_records as u64,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_with_stats() {
        let footer = FileFooter::new(
            12_345,
            Some(vec![Statistics::Int {
                bounds: Some((0, 99)),
                has_nulls: true,
            }]),
        );
        let mut buf = OutputBuffer::new();
        footer.write_to(&mut buf);
        let bytes = buf.into_inner();
        let mut input = InputBuffer::new(&bytes);
        assert_eq!(FileFooter::read_from(&mut input, 1).unwrap(), footer);
        assert_eq!(input.remaining(), 0);
    }

    #[test]
    fn roundtrip_without_stats() {
        let footer = FileFooter::new(0, None);
        let mut buf = OutputBuffer::new();
        footer.write_to(&mut buf);
        let bytes = buf.into_inner();
        let mut input = InputBuffer::new(&bytes);
        assert_eq!(FileFooter::read_from(&mut input, 0).unwrap(), footer);
    }

    #[test]
    fn negative_count_is_corrupt() {
        let mut buf = OutputBuffer::new();
        buf.write_i64(-1);
        buf.write_u8(0);
        let bytes = buf.into_inner();
        let mut input = InputBuffer::new(&bytes);
        assert!(FileFooter::read_from(&mut input, 0).is_err());
    }
}
