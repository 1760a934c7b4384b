//! Pure, stateless kernels shared by every model.
//!
//! `sip` is the keyed-hash primitive, `feistel` builds the magnitude-class
//! preserving permutations on top of it, and `codepoint` is the bijective
//! byte <-> code-point codec used by the Markov string model. All three are
//! fixed by the persisted-model format version and must never change within
//! one.

pub mod codepoint;
pub mod feistel;
pub mod sip;
