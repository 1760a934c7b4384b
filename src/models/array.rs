//! Array wrapper: the nested model transforms the flattened values column,
//! and the output reuses the input's offsets, so array lengths (and with
//! them the cardinality of lengths and the empty-array frequency) are
//! preserved exactly.

use std::io::{Read, Write};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, ListArray};
use arrow::datatypes::DataType;

use crate::error::SamarError;
use crate::models::{type_mismatch, Model, ModelPtr};

pub struct ArrayModel {
    nested_model: ModelPtr,
}

impl ArrayModel {
    pub fn new(nested_model: ModelPtr) -> Self {
        Self { nested_model }
    }
}

impl Model for ArrayModel {
    fn train(&mut self, column: &dyn Array) -> Result<(), SamarError> {
        let list = column
            .as_any()
            .downcast_ref::<ListArray>()
            .ok_or_else(|| type_mismatch("list", column))?;
        self.nested_model.train(list.values().as_ref())
    }

    fn finalize(&mut self) {
        self.nested_model.finalize();
    }

    fn generate(&mut self, column: &dyn Array) -> Result<ArrayRef, SamarError> {
        let list = column
            .as_any()
            .downcast_ref::<ListArray>()
            .ok_or_else(|| type_mismatch("list", column))?;

        let new_values = self.nested_model.generate(list.values().as_ref())?;

        let DataType::List(field) = column.data_type() else {
            return Err(type_mismatch("list", column));
        };
        let out = ListArray::try_new(
            field.clone(),
            list.offsets().clone(),
            new_values,
            list.nulls().cloned(),
        )?;
        Ok(Arc::new(out))
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
