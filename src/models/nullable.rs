//! Nullable wrapper: the nested model transforms the values, and the
//! input's null mask is re-attached to the output unchanged, so NULL
//! positions are preserved bit-identically.

use std::io::{Read, Write};

use arrow::array::{make_array, Array, ArrayRef};

use crate::error::SamarError;
use crate::models::{Model, ModelPtr};

pub struct NullableModel {
    nested_model: ModelPtr,
}

impl NullableModel {
    pub fn new(nested_model: ModelPtr) -> Self {
        Self { nested_model }
    }
}

impl Model for NullableModel {
    fn train(&mut self, column: &dyn Array) -> Result<(), SamarError> {
        self.nested_model.train(column)
    }

    fn finalize(&mut self) {
        self.nested_model.finalize();
    }

    fn generate(&mut self, column: &dyn Array) -> Result<ArrayRef, SamarError> {
        let generated = self.nested_model.generate(column)?;

        let data = generated
            .to_data()
            .into_builder()
            .nulls(column.nulls().cloned())
            .build()?;
        Ok(make_array(data))
    }

    fn update_seed(&mut self) {
        self.nested_model.update_seed();
    }

    fn serialize(&self, out: &mut dyn Write) -> Result<(), SamarError> {
        self.nested_model.serialize(out)
    }

    fn deserialize(&mut self, input: &mut dyn Read) -> Result<(), SamarError> {
        self.nested_model.deserialize(input)
    }
}
