//! Variable string model.
//!
//! The length of each output string is the magnitude-preserving permutation
//! of the source length; the content comes from the Markov model, driven by
//! a deterministic RNG seeded from a sliding window over the source string.
//! Locally-similar sources therefore yield locally-similar outputs.

use arrow::array::{make_array, Array, ArrayRef, BinaryArray, BinaryBuilder};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use std::io::{Read, Write};

use crate::error::SamarError;
use crate::kernels::feistel::transform;
use crate::kernels::sip::hash_u64;
use crate::markov::{MarkovModel, MarkovModelParameters};
use crate::models::{type_mismatch, Model};

pub struct StringModel {
    seed: u64,
    markov_model: MarkovModel,
}

impl StringModel {
    pub fn new(seed: u64, params: MarkovModelParameters) -> Self {
        Self {
            seed,
            markov_model: MarkovModel::new(params),
        }
    }

    /// Views a string column as binary. `Binary` is the native
    /// representation; `Utf8` is rebound zero-copy.
    fn as_binary(column: &dyn Array) -> Result<ArrayRef, SamarError> {
        match column.data_type() {
            DataType::Binary => Ok(make_array(column.to_data())),
            DataType::Utf8 => Ok(cast(column, &DataType::Binary)?),
            _ => Err(type_mismatch("string", column)),
        }
    }
}

impl Model for StringModel {
    fn train(&mut self, column: &dyn Array) -> Result<(), SamarError> {
        let binary = Self::as_binary(column)?;
        let binary = binary
            .as_any()
            .downcast_ref::<BinaryArray>()
            .ok_or_else(|| type_mismatch("string", column))?;

        for i in 0..binary.len() {
            self.markov_model.consume(binary.value(i));
        }
        Ok(())
    }

    fn finalize(&mut self) {
        self.markov_model.finalize();
    }

    fn generate(&mut self, column: &dyn Array) -> Result<ArrayRef, SamarError> {
        let binary = Self::as_binary(column)?;
        let binary_ref = binary
            .as_any()
            .downcast_ref::<BinaryArray>()
            .ok_or_else(|| type_mismatch("string", column))?;

        let mut builder = BinaryBuilder::new();
        let mut buffer = Vec::new();
        for i in 0..binary_ref.len() {
            let source = binary_ref.value(i);
            let desired_size = transform(source.len() as u64, self.seed) as usize;

            let mut actual_size = 0;
            if desired_size != 0 {
                buffer.clear();
                buffer.resize(desired_size * 2, 0);
                actual_size =
                    self.markov_model
                        .generate(&mut buffer, desired_size, self.seed, source)?;
            }
            builder.append_value(&buffer[..actual_size]);
        }

        let generated = builder.finish();
        let data = generated
            .to_data()
            .into_builder()
            .nulls(binary_ref.nulls().cloned())
            .build()?;
        let out = make_array(data);

        // A Utf8 input gets a Utf8 output; the cast re-validates the bytes.
        if column.data_type() == &DataType::Utf8 {
            Ok(cast(out.as_ref(), &DataType::Utf8)?)
        } else {
            Ok(out)
        }
    }

    fn update_seed(&mut self) {
        self.seed = hash_u64(self.seed);
    }

    fn serialize(&self, out: &mut dyn Write) -> Result<(), SamarError> {
        self.markov_model.write(out)
    }

    fn deserialize(&mut self, input: &mut dyn Read) -> Result<(), SamarError> {
        self.markov_model = MarkovModel::read(input)?;
        Ok(())
    }
}

//==================================================================================
// Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::StringArray;
    use std::collections::BTreeSet;

    fn markov_params() -> MarkovModelParameters {
        MarkovModelParameters {
            order: 2,
            frequency_cutoff: 0,
            num_buckets_cutoff: 0,
            frequency_add: 0,
            frequency_desaturate: 0.0,
            determinator_sliding_window_size: 8,
        }
    }

    fn trained_model(seed: u64) -> StringModel {
        let mut model = StringModel::new(seed, markov_params());
        let corpus = StringArray::from(vec!["hello", "help", "helm"]);
        model.train(&corpus).unwrap();
        model.finalize();
        model
    }

    #[test]
    fn test_output_length_is_bounded_and_corpus_closed() {
        let column = StringArray::from(vec!["hello"]);
        let corpus: BTreeSet<u8> = b"hellopm".iter().copied().collect();

        for seed in [0u64, 1, 42, 0xDEAD_BEEF] {
            let mut model = trained_model(seed);
            let out = model.generate(&column).unwrap();
            let out = out.as_any().downcast_ref::<StringArray>().unwrap();

            let desired = transform(5, seed) as usize;
            let value = out.value(0).as_bytes();
            assert!(
                value.len() <= desired * 2,
                "length {} exceeds scratch buffer for seed {}",
                value.len(),
                seed
            );
            for &byte in value {
                assert!(corpus.contains(&byte));
            }
        }
    }

    #[test]
    fn test_empty_string_stays_empty() {
        let column = StringArray::from(vec![""]);
        let mut model = trained_model(77);

        let out = model.generate(&column).unwrap();
        let out = out.as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(out.value(0), "");
    }

    #[test]
    fn test_generate_is_deterministic() {
        let column = StringArray::from(vec!["hello", "help", "hello"]);
        let mut model_a = trained_model(5);
        let mut model_b = trained_model(5);

        let out_a = model_a.generate(&column).unwrap();
        let out_b = model_b.generate(&column).unwrap();
        assert_eq!(out_a.as_ref(), out_b.as_ref());
    }

    #[test]
    fn test_identical_rows_map_identically() {
        let column = StringArray::from(vec!["hello", "hello"]);
        let mut model = trained_model(13);

        let out = model.generate(&column).unwrap();
        let out = out.as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(out.value(0), out.value(1));
    }

    #[test]
    fn test_binary_input_yields_binary_output() {
        let mut model = StringModel::new(3, markov_params());
        let corpus = BinaryArray::from(vec![&b"abc"[..], b"abd", b"abe"]);
        model.train(&corpus).unwrap();
        model.finalize();

        let out = model.generate(&corpus).unwrap();
        assert_eq!(out.data_type(), &DataType::Binary);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_serialization_roundtrip_generates_identically() {
        let mut model = trained_model(19);
        let mut bytes = Vec::new();
        Model::serialize(&model, &mut bytes).unwrap();

        let mut restored = StringModel::new(19, MarkovModelParameters::default());
        let mut cursor = std::io::Cursor::new(bytes);
        Model::deserialize(&mut restored, &mut cursor).unwrap();

        let column = StringArray::from(vec!["hello", "helm"]);
        let out_a = model.generate(&column).unwrap();
        let out_b = restored.generate(&column).unwrap();
        assert_eq!(out_a.as_ref(), out_b.as_ref());
    }

    #[test]
    fn test_non_string_column_is_rejected() {
        let column = arrow::array::Int32Array::from(vec![1, 2, 3]);
        let mut model = StringModel::new(1, markov_params());
        assert!(matches!(
            model.train(&column),
            Err(SamarError::TypeMismatch(_))
        ));
    }
}
