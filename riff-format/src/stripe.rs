//! Stripe records, the trailing index block and stripe-level planning.

use riff_result::{Error, Result};

use crate::io::{InputBuffer, OutputBuffer};
use crate::state::PredicateState;
use crate::stats::Statistics;
use crate::filter::ColumnFilter;

/// Location and summaries of one stripe.
///
/// `stats` and `filters`, when present, have one entry per indexed column,
/// ordinal-aligned to the type description. Offsets are strictly increasing
/// within a file and `length` is non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct StripeInformation {
    pub id: u8,
    pub offset: i64,
    pub length: i32,
    pub stats: Option<Vec<Statistics>>,
    pub filters: Option<Vec<ColumnFilter>>,
}

impl StripeInformation {
    /// Serialize one index entry.
    pub fn write_to(&self, buf: &mut OutputBuffer) {
        buf.write_u8(self.id);
        buf.write_i64(self.offset);
        buf.write_i32(self.length);
        match &self.stats {
            None => buf.write_u8(0),
            Some(stats) => {
                buf.write_u8(1);
                for s in stats {
                    s.write_to(buf);
                }
            }
        }
        match &self.filters {
            None => buf.write_u8(0),
            Some(filters) => {
                buf.write_u8(1);
                for f in filters {
                    f.write_to(buf);
                }
            }
        }
    }

    /// Deserialize one index entry; `num_indexed` fixes the summary array
    /// lengths.
    pub fn read_from(input: &mut InputBuffer<'_>, num_indexed: usize) -> Result<StripeInformation> {
        let id = input.read_u8()?;
        let offset = input.read_i64()?;
        let length = input.read_i32()?;
        if offset < 0 || length < 0 {
            return Err(Error::CorruptHeader(format!(
                "invalid stripe extent: offset {offset}, length {length}"
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
        let filters = if input.read_u8()? != 0 {
            let mut filters = Vec::with_capacity(num_indexed);
            for _ in 0..num_indexed {
                filters.push(ColumnFilter::read_from(input)?);
            }
            Some(filters)
        } else {
            None
        };
        Ok(StripeInformation {
            id,
            offset,
            length,
            stats,
            filters,
        })
    }
}

/// Serialize the trailing index block.
pub fn write_stripes(buf: &mut OutputBuffer, stripes: &[StripeInformation]) {
    buf.write_i32(stripes.len() as i32);
    for stripe in stripes {
        stripe.write_to(buf);
    }
}

/// Deserialize the trailing index block.
pub fn read_stripes(
    input: &mut InputBuffer<'_>,
    num_indexed: usize,
) -> Result<Vec<StripeInformation>> {
    let count = input.read_i32()?;
    if count < 0 {
        return Err(Error::CorruptHeader(format!(
            "negative stripe count {count}"
        )));
    }
    let mut stripes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        stripes.push(StripeInformation::read_from(input, num_indexed)?);
    }
    Ok(stripes)
}

/// Plan the stripes of one read.
///
/// Stripes are sorted ascending by offset — the file read order, which keeps
/// the data stream forward-only — and then filtered against the predicate
/// state: a stripe survives unless its statistics or its column filters
/// prove no row can match. A stripe without summaries always survives, and
/// the output order is never changed after filtering. A trivially false
/// state drops every stripe, letting the caller skip the data file
/// entirely.
pub fn evaluate_stripes(
    mut stripes: Vec<StripeInformation>,
    state: Option<&PredicateState>,
) -> Vec<StripeInformation> {
    stripes.sort_by_key(|s| s.offset);
    let Some(state) = state else {
        return stripes;
    };
    if state.trivial() == Some(false) {
        tracing::debug!("trivially false predicate, skipping every stripe");
        return Vec::new();
    }
    let total = stripes.len();
    let survivors: Vec<StripeInformation> = stripes
        .into_iter()
        .filter(|stripe| {
            let stats_pass = match &stripe.stats {
                Some(stats) => state.evaluate_stats(stats),
                None => true,
            };
            let filters_pass = match &stripe.filters {
                Some(filters) => state.evaluate_filters(filters),
                None => true,
            };
            stats_pass && filters_pass
        })
        .collect();
    tracing::debug!(
        kept = survivors.len(),
        skipped = total - survivors.len(),
        "evaluated stripes against predicate state"
    );
    survivors
}
