//! The mixed-order Markov model used to generate synthetic strings.
//!
//! This is not an order-N model but a mix of order-{0..N} models: training
//! counts continuations for every context of 0..N previous code points, and
//! generation looks statistics up for the longest context first, backing off
//! toward order 0 when a context has no mass.
//!
//! The table keys by a 32-bit hash of the context, never by the context
//! bytes. Hash collisions merge histograms; that is part of the model and
//! of the persisted format, and must not be "fixed".

use std::collections::BTreeMap;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::SamarError;
use crate::kernels::codepoint::{read_code_point, write_code_point, CodePoint, BEGIN, END};
use crate::kernels::sip::SipState64;
use crate::markov::histogram::Histogram;
use crate::persist::{read_f64, read_u32, read_u64, write_f64, write_u32, write_u64};

/// Growth factor applied to the end-of-string weight for every byte the
/// output has run past its desired size.
const END_BIAS_BASE: f64 = 1.25;

/// Tuning knobs of the Markov model. All of them are carried inside the
/// persisted model stream, so a loaded model generates with the parameters
/// it was trained under.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MarkovModelParameters {
    /// Maximum context length in code points.
    #[serde(default = "default_order")]
    pub order: usize,

    /// Remove buckets (and whole histograms) with fewer occurrences than this.
    #[serde(default = "default_frequency_cutoff")]
    pub frequency_cutoff: u64,

    /// Remove histograms with fewer distinct continuations than this.
    #[serde(default)]
    pub num_buckets_cutoff: usize,

    /// Constant added to every count to lower probability distribution skew.
    #[serde(default)]
    pub frequency_add: u64,

    /// 0..1 - move every frequency toward the mean to lower skew.
    #[serde(default)]
    pub frequency_desaturate: f64,

    /// Size of the sliding window over the source string whose hash seeds
    /// the per-step RNG during generation.
    #[serde(default = "default_window_size")]
    pub determinator_sliding_window_size: usize,
}

fn default_order() -> usize {
    5
}

fn default_frequency_cutoff() -> u64 {
    5
}

fn default_window_size() -> usize {
    8
}

impl Default for MarkovModelParameters {
    fn default() -> Self {
        Self {
            order: default_order(),
            frequency_cutoff: default_frequency_cutoff(),
            num_buckets_cutoff: 0,
            frequency_add: 0,
            frequency_desaturate: 0.0,
            determinator_sliding_window_size: default_window_size(),
        }
    }
}

impl MarkovModelParameters {
    pub(crate) fn write<W: Write + ?Sized>(&self, out: &mut W) -> Result<(), SamarError> {
        write_u64(out, self.order as u64)?;
        write_u64(out, self.frequency_cutoff)?;
        write_u64(out, self.num_buckets_cutoff as u64)?;
        write_u64(out, self.frequency_add)?;
        write_f64(out, self.frequency_desaturate)?;
        write_u64(out, self.determinator_sliding_window_size as u64)?;
        Ok(())
    }

    pub(crate) fn read<R: Read + ?Sized>(input: &mut R) -> Result<Self, SamarError> {
        Ok(Self {
            order: read_u64(input)? as usize,
            frequency_cutoff: read_u64(input)?,
            num_buckets_cutoff: read_u64(input)? as usize,
            frequency_add: read_u64(input)?,
            frequency_desaturate: read_f64(input)?,
            determinator_sliding_window_size: read_u64(input)? as usize,
        })
    }
}

/// Hash of an N-gram context. The table deliberately keys by this 32-bit
/// value alone; colliding contexts share one histogram.
fn context_hash(context: &[CodePoint]) -> u32 {
    crc32fast::hash(bytemuck::cast_slice(context))
}

#[derive(Debug, Clone)]
pub struct MarkovModel {
    params: MarkovModelParameters,
    table: BTreeMap<u32, Histogram>,

    /// Working code-point buffer, reset to `order` BEGIN sentinels at the
    /// start of every string. Reused between rows; not thread-safe.
    code_points: Vec<CodePoint>,
}

/// Structural equality over parameters and table. The working buffer is
/// transient state and is deliberately excluded.
impl PartialEq for MarkovModel {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params && self.table == other.table
    }
}

impl MarkovModel {
    pub fn new(params: MarkovModelParameters) -> Self {
        let code_points = vec![BEGIN; params.order];
        Self {
            params,
            table: BTreeMap::new(),
            code_points,
        }
    }

    pub fn params(&self) -> &MarkovModelParameters {
        &self.params
    }

    /// Number of distinct context hashes observed so far.
    pub fn context_count(&self) -> usize {
        self.table.len()
    }

    /// Feeds one source string into the statistics.
    ///
    /// Walks the string one code point at a time, plus one virtual step past
    /// the end; at every step each context of 0..order previous code points
    /// gets either the next code point or the end marker counted.
    pub fn consume(&mut self, data: &[u8]) {
        // First `order` entries are the pre-filled BEGIN sentinels.
        self.code_points.truncate(self.params.order);

        let mut pos = 0;
        loop {
            let inside = pos < data.len();

            let mut next_code_point = 0;
            if inside {
                next_code_point = read_code_point(data, &mut pos);
            }

            for context_size in 0..self.params.order {
                let begin = self.code_points.len() - context_size;
                let hash = context_hash(&self.code_points[begin..]);
                let histogram = self.table.entry(hash).or_default();
                if inside {
                    histogram.add(next_code_point);
                } else {
                    histogram.add_end();
                }
            }

            if inside {
                self.code_points.push(next_code_point);
            } else {
                break;
            }
        }
    }

    /// Prunes and smooths the trained statistics. The four passes run in a
    /// fixed order: num-buckets cutoff, frequency cutoff, frequency add,
    /// desaturation. Passes after the first skip histograms whose bucket
    /// mass is already gone, so their `count_end` survives untouched.
    pub fn finalize(&mut self) {
        if self.params.num_buckets_cutoff > 0 {
            for histogram in self.table.values_mut() {
                if histogram.buckets.len() < self.params.num_buckets_cutoff {
                    histogram.buckets.clear();
                    histogram.total = 0;
                }
            }
        }

        if self.params.frequency_cutoff > 0 {
            for histogram in self.table.values_mut() {
                if histogram.total == 0 {
                    continue;
                }

                if histogram.total + histogram.count_end < self.params.frequency_cutoff {
                    histogram.buckets.clear();
                    histogram.total = 0;
                } else {
                    let cutoff = self.params.frequency_cutoff;
                    let mut erased_count = 0;
                    histogram.buckets.retain(|_, count| {
                        if *count >= cutoff {
                            true
                        } else {
                            erased_count += *count;
                            false
                        }
                    });
                    histogram.total -= erased_count;
                }
            }
        }

        if self.params.frequency_add > 0 {
            for histogram in self.table.values_mut() {
                if histogram.total == 0 {
                    continue;
                }

                for count in histogram.buckets.values_mut() {
                    *count += self.params.frequency_add;
                }
                histogram.count_end += self.params.frequency_add;
                histogram.total += self.params.frequency_add * histogram.buckets.len() as u64;
            }
        }

        if self.params.frequency_desaturate > 0.0 {
            let desaturate = self.params.frequency_desaturate;
            for histogram in self.table.values_mut() {
                if histogram.total == 0 {
                    continue;
                }

                let average = histogram.total as f64 / histogram.buckets.len() as f64;

                let mut new_total = 0;
                for count in histogram.buckets.values_mut() {
                    *count = (*count as f64 * (1.0 - desaturate) + average * desaturate) as u64;
                    new_total += *count;
                }
                histogram.total = new_total;
            }
        }

        log::debug!(
            "finalized markov table: {} contexts",
            self.table.len()
        );
    }

    /// Generates one synthetic string into `out`, returning the number of
    /// bytes written.
    ///
    /// Each step backs off from the longest context with statistics, draws
    /// the continuation with a PRNG seeded by the hash of a sliding window
    /// over `determinator` (the source string), and biases toward the end
    /// marker once the output has run past `desired_size`.
    pub fn generate(
        &mut self,
        out: &mut [u8],
        desired_size: usize,
        seed: u64,
        determinator: &[u8],
    ) -> Result<usize, SamarError> {
        self.code_points.truncate(self.params.order);

        let mut pos = 0;
        while pos < out.len() {
            // Back-off: longest context with any mass wins; a context that
            // exists but is empty only wins at order 0, where sampling it
            // terminates the string.
            let mut context_size = self.params.order;
            let histogram = loop {
                let begin = self.code_points.len() - context_size;
                let hash = context_hash(&self.code_points[begin..]);
                match self.table.get(&hash) {
                    Some(h) if h.total + h.count_end != 0 => break Some(h),
                    found => {
                        if context_size == 0 {
                            break found;
                        }
                    }
                }
                context_size -= 1;
            };

            let histogram = histogram.ok_or_else(|| {
                SamarError::LogicalError(
                    "markov model has no statistics for the empty context; \
                     generate was called on an untrained model"
                        .to_string(),
                )
            })?;

            let offset_from_begin = pos;
            let window_size = self
                .params
                .determinator_sliding_window_size
                .min(determinator.len());
            let window_overflow =
                (offset_from_begin + window_size).saturating_sub(determinator.len());
            let window_begin = offset_from_begin - window_overflow;

            let mut determinator_hash = SipState64::new();
            determinator_hash.update_u64(seed);
            determinator_hash.update_bytes(&determinator[window_begin..window_begin + window_size]);
            determinator_hash.update_u64(window_overflow as u64);
            let random = determinator_hash.finish();

            // If the output has run past desired_size, raise the probability
            // of drawing the end marker, exponentially in the overrun.
            let bytes_after_desired = pos as i64 - desired_size as i64;
            let end_multiplier = if bytes_after_desired > 0 {
                END_BIAS_BASE.powi(bytes_after_desired as i32)
            } else {
                0.0
            };

            let code = histogram.sample(random, end_multiplier);

            if code == END {
                break;
            }

            if bytes_after_desired > 0 && code < 128 && !(code as u8).is_ascii_alphanumeric() {
                // Past the desired size, stop at an ASCII non-alphanumeric
                // code point: close to the target length without breaking a
                // natural-looking word.
                break;
            }

            if !write_code_point(code, out, &mut pos) {
                break;
            }

            self.code_points.push(code);
        }

        Ok(pos)
    }

    pub fn write<W: Write + ?Sized>(&self, out: &mut W) -> Result<(), SamarError> {
        self.params.write(out)?;

        write_u64(out, self.table.len() as u64)?;
        for (&hash, histogram) in &self.table {
            write_u32(out, hash)?;
            histogram.write(out)?;
        }
        Ok(())
    }

    pub fn read<R: Read + ?Sized>(input: &mut R) -> Result<Self, SamarError> {
        let params = MarkovModelParameters::read(input)?;

        let size = read_u64(input)?;
        let mut table = BTreeMap::new();
        for _ in 0..size {
            let hash = read_u32(input)?;
            table.insert(hash, Histogram::read(input)?);
        }

        let code_points = vec![BEGIN; params.order];
        Ok(Self {
            params,
            table,
            code_points,
        })
    }
}
