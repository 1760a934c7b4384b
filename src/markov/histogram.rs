//! Continuation counts for a single N-gram context.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use crate::error::SamarError;
use crate::kernels::codepoint::{CodePoint, END};
use crate::persist::{read_u32, read_u64, write_u32, write_u64};

/// Occurrence counts of every code point seen after one context, plus a
/// separate end-of-string counter.
///
/// Buckets live in a `BTreeMap` so that sampling iterates them in a fixed
/// order; an unordered map here would make generation irreproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Histogram {
    /// Sum of all bucket counts. Does not include `count_end`.
    pub total: u64,
    pub count_end: u64,
    pub buckets: BTreeMap<CodePoint, u64>,
}

impl Histogram {
    pub fn add(&mut self, code: CodePoint) {
        self.total += 1;
        *self.buckets.entry(code).or_insert(0) += 1;
    }

    pub fn add_end(&mut self) {
        self.count_end += 1;
    }

    /// Draws one code point. `random` selects a position inside the range
    /// `total + count_end * end_multiplier`; positions past the buckets fall
    /// into the end-of-string tail and yield [`END`].
    pub fn sample(&self, random: u64, end_multiplier: f64) -> CodePoint {
        let range = self.total + (self.count_end as f64 * end_multiplier) as u64;
        if range == 0 {
            return END;
        }

        let random = random % range;

        let mut sum = 0u64;
        for (&code, &count) in &self.buckets {
            sum += count;
            if sum > random {
                return code;
            }
        }

        END
    }

    pub fn write<W: Write + ?Sized>(&self, out: &mut W) -> Result<(), SamarError> {
        write_u64(out, self.total)?;
        write_u64(out, self.count_end)?;
        write_u64(out, self.buckets.len() as u64)?;
        for (&code, &count) in &self.buckets {
            write_u32(out, code)?;
            write_u64(out, count)?;
        }
        Ok(())
    }

    pub fn read<R: Read + ?Sized>(input: &mut R) -> Result<Self, SamarError> {
        let total = read_u64(input)?;
        let count_end = read_u64(input)?;
        let size = read_u64(input)?;

        let mut buckets = BTreeMap::new();
        for _ in 0..size {
            let code = read_u32(input)?;
            let count = read_u64(input)?;
            buckets.insert(code, count);
        }

        Ok(Self {
            total,
            count_end,
            buckets,
        })
    }
}

//==================================================================================
// Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn histogram_from(pairs: &[(CodePoint, u64)], count_end: u64) -> Histogram {
        let buckets: BTreeMap<CodePoint, u64> = pairs.iter().copied().collect();
        let total = buckets.values().sum();
        Histogram {
            total,
            count_end,
            buckets,
        }
    }

    #[test]
    fn test_add_tracks_total_and_buckets() {
        let mut h = Histogram::default();
        h.add(b'a' as u32);
        h.add(b'a' as u32);
        h.add(b'b' as u32);
        h.add_end();

        assert_eq!(h.total, 3);
        assert_eq!(h.count_end, 1);
        assert_eq!(h.buckets[&(b'a' as u32)], 2);
        assert_eq!(h.buckets[&(b'b' as u32)], 1);
    }

    #[test]
    fn test_sample_walks_buckets_in_key_order() {
        // Buckets: 10 -> 2, 20 -> 3. Positions 0..2 hit 10, 2..5 hit 20.
        let h = histogram_from(&[(10, 2), (20, 3)], 0);
        assert_eq!(h.sample(0, 0.0), 10);
        assert_eq!(h.sample(1, 0.0), 10);
        assert_eq!(h.sample(2, 0.0), 20);
        assert_eq!(h.sample(4, 0.0), 20);
        // random wraps modulo range
        assert_eq!(h.sample(5, 0.0), 10);
    }

    #[test]
    fn test_sample_end_tail() {
        let h = histogram_from(&[(10, 2)], 4);
        // With multiplier 1.0 the range is 2 + 4 = 6; positions 2..6 are END.
        assert_eq!(h.sample(2, 1.0), END);
        assert_eq!(h.sample(5, 1.0), END);
        assert_eq!(h.sample(1, 1.0), 10);
        // With multiplier 0 the end tail vanishes.
        assert_eq!(h.sample(3, 0.0), 10);
    }

    #[test]
    fn test_sample_empty_histogram_yields_end() {
        let h = Histogram::default();
        assert_eq!(h.sample(123, 0.0), END);
        assert_eq!(h.sample(123, 10.0), END);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let h = histogram_from(&[(7, 1), (300, 42), (0xFFFF_FF00, 9)], 5);
        let mut buf = Vec::new();
        h.write(&mut buf).unwrap();

        let mut cursor = std::io::Cursor::new(buf);
        let back = Histogram::read(&mut cursor).unwrap();
        assert_eq!(h, back);
    }
}
