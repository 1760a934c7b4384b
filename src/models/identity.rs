//! Leaves all data as is. Used for columns of type Date: the date component
//! carries the statistical shape the obfuscator is required to preserve.

use arrow::array::{make_array, Array, ArrayRef};

use crate::error::SamarError;
use crate::models::Model;

#[derive(Debug, Default)]
pub struct IdentityModel;

impl IdentityModel {
    pub fn new() -> Self {
        Self
    }
}

impl Model for IdentityModel {
    fn generate(&mut self, column: &dyn Array) -> Result<ArrayRef, SamarError> {
        Ok(make_array(column.to_data()))
    }

    fn update_seed(&mut self) {}
}

//==================================================================================
// Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Date32Array;

    #[test]
    fn test_identity_returns_input_unchanged() {
        let column = Date32Array::from(vec![Some(19000), None, Some(0), Some(-365)]);
        let mut model = IdentityModel::new();

        let out = model.generate(&column).unwrap();
        let out = out.as_any().downcast_ref::<Date32Array>().unwrap();
        assert_eq!(out, &column);
    }
}
