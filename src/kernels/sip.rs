//! The keyed-hash primitive behind every deterministic decision in the crate.
//!
//! The algorithm is SipHash-2-4 with an all-zero key, consumed as one
//! continuous little-endian byte stream. Per-column seeds, the Feistel round
//! function, the Markov determinator and the FixedString/UUID digests all
//! flow through these builders, so the digest must be bit-exact across
//! builds: both the persisted Markov tables and the cross-table JOIN
//! compatibility guarantee depend on it.

use std::hash::Hasher;

use siphasher::sip::SipHasher24;
use siphasher::sip128::{Hasher128, SipHasher24 as SipHasher24x128};

/// Incremental builder for a 64-bit digest.
///
/// Fixed-width integers are appended as their little-endian bytes; byte
/// strings are appended raw. Appending `(a, b)` is equivalent to appending
/// the concatenation of their encodings.
pub struct SipState64 {
    hasher: SipHasher24,
}

impl SipState64 {
    pub fn new() -> Self {
        Self {
            hasher: SipHasher24::new_with_keys(0, 0),
        }
    }

    pub fn update_u64(&mut self, x: u64) {
        self.hasher.write(&x.to_le_bytes());
    }

    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.write(bytes);
    }

    pub fn finish(&self) -> u64 {
        self.hasher.finish()
    }
}

impl Default for SipState64 {
    fn default() -> Self {
        Self::new()
    }
}

/// Incremental builder for a 128-bit digest. Same input convention as
/// [`SipState64`]; the two digests of one input are unrelated.
pub struct SipState128 {
    hasher: SipHasher24x128,
}

impl SipState128 {
    pub fn new() -> Self {
        Self {
            hasher: SipHasher24x128::new_with_keys(0, 0),
        }
    }

    pub fn update_u64(&mut self, x: u64) {
        self.hasher.write(&x.to_le_bytes());
    }

    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.write(bytes);
    }

    pub fn finish(&self) -> [u8; 16] {
        let (h1, h2) = self.finish_pair();
        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&h1.to_le_bytes());
        out[8..].copy_from_slice(&h2.to_le_bytes());
        out
    }

    /// The digest as its two 64-bit halves, low half first.
    pub fn finish_pair(&self) -> (u64, u64) {
        let digest = self.hasher.finish128();
        (digest.h1, digest.h2)
    }
}

impl Default for SipState128 {
    fn default() -> Self {
        Self::new()
    }
}

/// 64-bit digest of a single integer. Used for seed rotation.
pub fn hash_u64(x: u64) -> u64 {
    let mut state = SipState64::new();
    state.update_u64(x);
    state.finish()
}

/// 64-bit digest of a sequence of integers.
pub fn hash_u64s(parts: &[u64]) -> u64 {
    let mut state = SipState64::new();
    for &part in parts {
        state.update_u64(part);
    }
    state.finish()
}

/// 64-bit digest of a seed followed by a byte string. Used for per-column
/// seed derivation and the FixedString per-row seed.
pub fn hash_seeded_bytes(seed: u64, bytes: &[u8]) -> u64 {
    let mut state = SipState64::new();
    state.update_u64(seed);
    state.update_bytes(bytes);
    state.finish()
}

/// 128-bit digest of a sequence of integers. Used for the FixedString
/// digest chunks.
pub fn hash128_u64s(parts: &[u64]) -> [u8; 16] {
    let mut state = SipState128::new();
    for &part in parts {
        state.update_u64(part);
    }
    state.finish()
}

/// 128-bit digest of a seed followed by a byte string. Used by the UUID model.
pub fn hash128_seeded_bytes(seed: u64, bytes: &[u8]) -> [u8; 16] {
    let mut state = SipState128::new();
    state.update_u64(seed);
    state.update_bytes(bytes);
    state.finish()
}
