//! Per-column obfuscation models.
//!
//! A model transforms one column of source data into a column with a similar
//! structure and similar probability distributions, but anonymized content.
//! Every model follows the same three-phase lifecycle: `train` is called
//! iteratively for each block, `finalize` exactly once after training, and
//! `generate` once per block (possibly over several passes with `update_seed`
//! rotations in between). Stateless models simply ignore `train`/`finalize`.

pub mod array;
pub mod datetime;
pub mod factory;
pub mod fixed_string;
pub mod float;
pub mod identity;
pub mod integer;
pub mod nullable;
pub mod string;
pub mod uuid;

use std::io::{Read, Write};

use arrow::array::{Array, ArrayRef};

use crate::error::SamarError;

pub use factory::ModelFactory;

/// One per-column obfuscation model.
pub trait Model {
    /// Accumulates statistics from one block of source data. Stateless
    /// models keep the default no-op.
    fn train(&mut self, _column: &dyn Array) -> Result<(), SamarError> {
        Ok(())
    }

    /// Called exactly once between the last `train` and the first `generate`.
    fn finalize(&mut self) {}

    /// Transforms one block of source data into anonymized output of the
    /// same type and row count.
    fn generate(&mut self, column: &dyn Array) -> Result<ArrayRef, SamarError>;

    /// Deterministically rotates the seed, so a driver can produce more
    /// rows than the source contains by looping over the input again.
    fn update_seed(&mut self);

    /// Writes the model payload. Stateless models write nothing.
    fn serialize(&self, _out: &mut dyn Write) -> Result<(), SamarError> {
        Ok(())
    }

    /// Reads the model payload written by [`Model::serialize`].
    fn deserialize(&mut self, _input: &mut dyn Read) -> Result<(), SamarError> {
        Ok(())
    }
}

pub type ModelPtr = Box<dyn Model>;

/// Shared helper to produce the `TypeMismatch` error for a column that
/// cannot be downcast to what the model expects.
pub(crate) fn type_mismatch(expected: &str, column: &dyn Array) -> SamarError {
    SamarError::TypeMismatch(format!(
        "expected a {} column, got {:?}",
        expected,
        column.data_type()
    ))
}
