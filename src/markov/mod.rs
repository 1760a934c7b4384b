//! The mixed-order Markov model behind variable-length string generation.
//!
//! `histogram` holds the per-context continuation counts; `model` owns the
//! context table and the train / finalize / generate pipeline.

pub mod histogram;
pub mod model;

pub use model::{MarkovModel, MarkovModelParameters};
