//! Per-column membership filters.
//!
//! A column filter is an approximate membership oracle over the non-null
//! values of one indexed column in one stripe: `may_contain` returning
//! `false` proves absence, `true` proves nothing. The bloom shape uses
//! double hashing with two seeded `FxHash64` passes and unbiased 64→[0, m)
//! reduction via 128-bit multiply, so `m_bits` need not be a power of two.

use bitcode::{Decode, Encode};
use riff_result::{Error, Result};
use riff_types::Value;
use rustc_hash::FxHasher;
use std::hash::Hasher;

use crate::io::{InputBuffer, OutputBuffer};

const KIND_NOOP: u8 = 0;
const KIND_BLOOM: u8 = 1;

/// Membership oracle for one indexed column of one stripe.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnFilter {
    /// Filter that tracks nothing and answers "maybe" to everything.
    Noop,
    Bloom(BloomFilter),
}

impl ColumnFilter {
    /// Build a bloom filter over the non-null values of a column slice.
    pub fn bloom<'a, I>(values: I) -> ColumnFilter
    where
        I: IntoIterator<Item = &'a Value>,
    {
        ColumnFilter::Bloom(BloomFilter::from_values(values))
    }

    /// Whether the filter may contain `value`.
    ///
    /// `false` means definitely absent; `true` is always allowed.
    pub fn may_contain(&self, value: &Value) -> bool {
        match self {
            ColumnFilter::Noop => true,
            ColumnFilter::Bloom(bloom) => {
                if matches!(value, Value::Null) {
                    // nulls are never inserted; stay on the "maybe" side
                    return true;
                }
                bloom.check(&value.filter_bytes())
            }
        }
    }

    /// Serialize into the stripe index layout.
    pub fn write_to(&self, buf: &mut OutputBuffer) {
        match self {
            ColumnFilter::Noop => buf.write_u8(KIND_NOOP),
            ColumnFilter::Bloom(bloom) => {
                buf.write_u8(KIND_BLOOM);
                let blob = bitcode::encode(bloom);
                buf.write_i32(blob.len() as i32);
                buf.write_bytes(&blob);
            }
        }
    }

    /// Deserialize from the stripe index layout.
    pub fn read_from(input: &mut InputBuffer<'_>) -> Result<ColumnFilter> {
        match input.read_u8()? {
            KIND_NOOP => Ok(ColumnFilter::Noop),
            KIND_BLOOM => {
                let len = input.read_i32()?;
                if len < 0 {
                    return Err(Error::CorruptHeader(format!(
                        "negative column filter length {len}"
                    )));
                }
                let blob = input.read_bytes(len as usize)?;
                let bloom = bitcode::decode(blob)
                    .map_err(|e| Error::CorruptHeader(format!("invalid column filter: {e}")))?;
                Ok(ColumnFilter::Bloom(bloom))
            }
            other => Err(Error::CorruptHeader(format!(
                "unknown column filter kind {other}"
            ))),
        }
    }
}

/// Compact bloom filter persisted inside the stripe index.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct BloomFilter {
    /// Number of bits in the filter.
    m_bits: u32,
    /// Number of hash probes.
    k_hashes: u8,
    /// Seeds for double hashing; kept for reproducibility.
    seed1: u64,
    seed2: u64,
    /// Packed bitset, little-endian bytes.
    bits: Vec<u8>,
}

impl BloomFilter {
    // Stable salts for the two base hashes.
    const SEED1: u64 = 0x9E37_79B9_7F4A_7C15;
    const SEED2: u64 = 0xD1B5_4A32_D192_ED03;

    /// Target bits/key; ~12.0 gives roughly 0.3–0.6% false positives.
    const BITS_PER_KEY: f64 = 12.0;

    #[inline(always)]
    fn fxhash64_with_seed(seed: u64, bytes: &[u8]) -> u64 {
        let mut h = FxHasher::default();
        h.write_u64(seed);
        h.write(bytes);
        h.finish()
    }

    #[inline(always)]
    fn index_of(bit: u32) -> (usize, u8) {
        let byte = (bit >> 3) as usize;
        let mask = 1u8 << (bit & 7);
        (byte, mask)
    }

    /// Unbiased reduction of a 64-bit hash into [0, m_bits).
    #[inline(always)]
    fn fast_reduce(x: u64, m_bits: u32) -> u32 {
        ((x as u128).wrapping_mul(m_bits as u128) >> 64) as u32
    }

    /// Build a bloom filter over the non-null values of a column slice.
    pub fn from_values<'a, I>(values: I) -> BloomFilter
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let keys: Vec<Vec<u8>> = values
            .into_iter()
            .filter(|v| !matches!(v, Value::Null))
            .map(|v| v.filter_bytes())
            .collect();
        let n = keys.len().max(1);

        let m_bits = ((n as f64) * Self::BITS_PER_KEY).ceil() as u32;
        let m_bits = m_bits.max(8);

        // k ≈ (m/n) ln 2, clamped to [1, 16]
        let kf = (m_bits as f64 / n as f64) * std::f64::consts::LN_2;
        let k_hashes = (kf.round() as i32).clamp(1, 16) as u8;

        let mut bits = vec![0u8; m_bits.div_ceil(8) as usize];
        for key in &keys {
            let h1 = Self::fxhash64_with_seed(Self::SEED1, key);
            let mut h2 = Self::fxhash64_with_seed(Self::SEED2, key);
            h2 |= 1; // ensure non-zero step
            let mut x = h1;
            for _ in 0..k_hashes {
                let (byte, mask) = Self::index_of(Self::fast_reduce(x, m_bits));
                bits[byte] |= mask;
                x = x.wrapping_add(h2);
            }
        }

        BloomFilter {
            m_bits,
            k_hashes,
            seed1: Self::SEED1,
            seed2: Self::SEED2,
            bits,
        }
    }

    /// Membership check; false positives possible, false negatives not.
    pub fn check(&self, key: &[u8]) -> bool {
        if self.m_bits == 0 {
            // treat as "maybe" to avoid false negatives when disabled
            return true;
        }

        let h1 = Self::fxhash64_with_seed(self.seed1, key);
        let mut h2 = Self::fxhash64_with_seed(self.seed2, key);
        h2 |= 1; // ensure non-zero step
        let mut x = h1;

        for _ in 0..self.k_hashes {
            let (byte, mask) = Self::index_of(Self::fast_reduce(x, self.m_bits));
            if self.bits[byte] & mask == 0 {
                return false;
            }
            x = x.wrapping_add(h2);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn in_set_values(n: usize, seed: u64) -> Vec<Value> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|i| {
                let len = rng.random_range(0..=24);
                let mut s = String::with_capacity(len + 9);
                for _ in 0..len {
                    s.push((b'a' + (rng.random::<u8>() % 26)) as char);
                }
                s.push('#');
                s.push_str(&format!("{i:08x}"));
                Value::Utf8(s)
            })
            .collect()
    }

    fn out_set_values(n: usize, seed: u64) -> Vec<Value> {
        let mut rng = StdRng::seed_from_u64(seed ^ 0xDEADBEEF);
        (0..n)
            .map(|i| {
                let len = rng.random_range(0..=24);
                let mut s = String::with_capacity(len + 9);
                for _ in 0..len {
                    s.push((b'0' + (rng.random::<u8>() % 10)) as char);
                }
                s.push('#');
                s.push_str(&format!("{i:08x}"));
                Value::Utf8(s)
            })
            .collect()
    }

    #[test]
    fn inserted_values_are_maybe_present() {
        let values = in_set_values(10_000, 42);
        let filter = ColumnFilter::bloom(values.iter());
        for v in &values {
            assert!(filter.may_contain(v), "inserted value must be maybe-present");
        }
    }

    #[test]
    fn serialization_preserves_membership() {
        let values = in_set_values(2_000, 7);
        let filter = ColumnFilter::bloom(values.iter());

        let mut buf = OutputBuffer::new();
        filter.write_to(&mut buf);
        let bytes = buf.into_inner();
        let mut input = InputBuffer::new(&bytes);
        let decoded = ColumnFilter::read_from(&mut input).unwrap();
        assert_eq!(decoded, filter);
        for v in &values {
            assert!(decoded.may_contain(v));
        }
    }

    #[test]
    fn false_positive_rate_is_reasonable() {
        let n_in = 10_000usize;
        let n_out = 20_000usize;
        let filter = ColumnFilter::bloom(in_set_values(n_in, 123).iter());

        let mut fp = 0usize;
        for v in out_set_values(n_out, 456) {
            if filter.may_contain(&v) {
                fp += 1;
            }
        }
        let rate = (fp as f64) / (n_out as f64);

        // With 12 bits/key, expect ≈0.3–0.6% FP. Allow up to 1.5% for safety.
        assert!(
            rate < 0.015,
            "FP too high: {:.3}% (fp={}, n={})",
            rate * 100.0,
            fp,
            n_out
        );
    }

    #[test]
    fn nulls_are_skipped_and_answer_maybe() {
        let values = vec![Value::Int(1), Value::Null, Value::Int(2)];
        let filter = ColumnFilter::bloom(values.iter());
        assert!(filter.may_contain(&Value::Int(1)));
        assert!(filter.may_contain(&Value::Null));
    }

    #[test]
    fn noop_always_answers_maybe() {
        let filter = ColumnFilter::Noop;
        assert!(filter.may_contain(&Value::Int(99)));

        let mut buf = OutputBuffer::new();
        filter.write_to(&mut buf);
        let bytes = buf.into_inner();
        let mut input = InputBuffer::new(&bytes);
        assert_eq!(ColumnFilter::read_from(&mut input).unwrap(), filter);
    }

    #[test]
    fn typed_values_do_not_collide_with_membership() {
        let values: Vec<Value> = (0..1000).map(Value::Int).collect();
        let filter = ColumnFilter::bloom(values.iter());
        let mut fp = 0usize;
        for v in 10_000..20_000 {
            if filter.may_contain(&Value::Int(v)) {
                fp += 1;
            }
        }
        assert!(fp < 300, "unexpectedly high FP count {fp}");
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let bytes = [9u8];
        let mut input = InputBuffer::new(&bytes);
        assert!(ColumnFilter::read_from(&mut input).is_err());
    }
}
