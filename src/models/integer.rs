//! Stateless integer models: a seeded pseudo-random permutation per row.
//!
//! The permutation preserves 0, 1 (and -1 for signed values) exactly, keeps
//! the `log2` magnitude class of everything else, and keeps the sign of
//! signed values, so value distributions and JOIN keys survive obfuscation.

use std::marker::PhantomData;

use arrow::array::{Array, ArrayRef, PrimitiveArray};
use arrow::datatypes::ArrowPrimitiveType;
use num_traits::AsPrimitive;
use std::sync::Arc;

use crate::error::SamarError;
use crate::kernels::feistel::{transform, transform_signed};
use crate::kernels::sip::hash_u64;
use crate::models::{type_mismatch, Model};

pub struct UnsignedIntegerModel<T: ArrowPrimitiveType> {
    seed: u64,
    _type: PhantomData<T>,
}

impl<T: ArrowPrimitiveType> UnsignedIntegerModel<T> {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            _type: PhantomData,
        }
    }
}

impl<T> Model for UnsignedIntegerModel<T>
where
    T: ArrowPrimitiveType,
    T::Native: AsPrimitive<u64>,
    u64: AsPrimitive<T::Native>,
{
    fn generate(&mut self, column: &dyn Array) -> Result<ArrayRef, SamarError> {
        let src = column
            .as_any()
            .downcast_ref::<PrimitiveArray<T>>()
            .ok_or_else(|| type_mismatch("unsigned integer", column))?;

        let values: Vec<T::Native> = src
            .values()
            .iter()
            .map(|&v| transform(v.as_(), self.seed).as_())
            .collect();

        Ok(Arc::new(PrimitiveArray::<T>::new(
            values.into(),
            src.nulls().cloned(),
        )))
    }

    fn update_seed(&mut self) {
        self.seed = hash_u64(self.seed);
    }
}

pub struct SignedIntegerModel<T: ArrowPrimitiveType> {
    seed: u64,
    _type: PhantomData<T>,
}

impl<T: ArrowPrimitiveType> SignedIntegerModel<T> {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            _type: PhantomData,
        }
    }
}

impl<T> Model for SignedIntegerModel<T>
where
    T: ArrowPrimitiveType,
    T::Native: AsPrimitive<i64>,
    i64: AsPrimitive<T::Native>,
{
    fn generate(&mut self, column: &dyn Array) -> Result<ArrayRef, SamarError> {
        let src = column
            .as_any()
            .downcast_ref::<PrimitiveArray<T>>()
            .ok_or_else(|| type_mismatch("signed integer", column))?;

        let values: Vec<T::Native> = src
            .values()
            .iter()
            .map(|&v| transform_signed(v.as_(), self.seed).as_())
            .collect();

        Ok(Arc::new(PrimitiveArray::<T>::new(
            values.into(),
            src.nulls().cloned(),
        )))
    }

    fn update_seed(&mut self) {
        self.seed = hash_u64(self.seed);
    }
}

//==================================================================================
// Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int32Array, UInt16Array, UInt64Array};
    use arrow::datatypes::{Int32Type, UInt16Type, UInt64Type};

    #[test]
    fn test_unsigned_keeps_zero_and_one() {
        let column = UInt64Array::from(vec![0u64, 1, 0, 1]);
        let mut model = UnsignedIntegerModel::<UInt64Type>::new(0xABCD);

        let out = model.generate(&column).unwrap();
        let out = out.as_any().downcast_ref::<UInt64Array>().unwrap();
        assert_eq!(out.values().as_ref(), &[0u64, 1, 0, 1]);
    }

    #[test]
    fn test_unsigned_preserves_magnitude_class() {
        let values = vec![5u64, 100, 1_000_000, u64::MAX / 2];
        let column = UInt64Array::from(values.clone());
        let mut model = UnsignedIntegerModel::<UInt64Type>::new(99);

        let out = model.generate(&column).unwrap();
        let out = out.as_any().downcast_ref::<UInt64Array>().unwrap();
        for (src, dst) in values.iter().zip(out.values().iter()) {
            assert_eq!(src.ilog2(), dst.ilog2());
        }
    }

    #[test]
    fn test_narrow_unsigned_stays_in_range() {
        // The magnitude class of a u16 value is below 2^16, so the permuted
        // value fits the narrow type exactly.
        let values = vec![2u16, 255, 256, 65535];
        let column = UInt16Array::from(values.clone());
        let mut model = UnsignedIntegerModel::<UInt16Type>::new(7);

        let out = model.generate(&column).unwrap();
        let out = out.as_any().downcast_ref::<UInt16Array>().unwrap();
        for (src, dst) in values.iter().zip(out.values().iter()) {
            assert_eq!((*src as u64).ilog2(), (*dst as u64).ilog2());
        }
    }

    #[test]
    fn test_signed_preserves_sign_and_constants() {
        let values = vec![-1i32, 0, 1, -100, 100, i32::MIN + 1, i32::MAX];
        let column = Int32Array::from(values.clone());
        let mut model = SignedIntegerModel::<Int32Type>::new(12345);

        let out = model.generate(&column).unwrap();
        let out = out.as_any().downcast_ref::<Int32Array>().unwrap();
        assert_eq!(out.value(0), -1);
        assert_eq!(out.value(1), 0);
        assert_eq!(out.value(2), 1);
        for (src, dst) in values.iter().zip(out.values().iter()) {
            assert_eq!(src.signum(), dst.signum());
        }
    }

    #[test]
    fn test_generate_is_deterministic_and_seed_sensitive() {
        let column = UInt64Array::from(vec![17u64, 1000, 123_456]);
        let mut model_a = UnsignedIntegerModel::<UInt64Type>::new(1);
        let mut model_b = UnsignedIntegerModel::<UInt64Type>::new(1);
        let mut model_c = UnsignedIntegerModel::<UInt64Type>::new(2);

        let out_a = model_a.generate(&column).unwrap();
        let out_b = model_b.generate(&column).unwrap();
        let out_c = model_c.generate(&column).unwrap();

        assert_eq!(out_a.as_ref(), out_b.as_ref());
        assert_ne!(out_a.as_ref(), out_c.as_ref());
    }

    #[test]
    fn test_update_seed_changes_output() {
        let column = UInt64Array::from(vec![1000u64, 2000, 4000, 8000]);
        let mut model = UnsignedIntegerModel::<UInt64Type>::new(42);

        let before = model.generate(&column).unwrap();
        model.update_seed();
        let after = model.generate(&column).unwrap();
        assert_ne!(before.as_ref(), after.as_ref());
    }

    #[test]
    fn test_null_positions_are_preserved() {
        let column = UInt64Array::from(vec![Some(10u64), None, Some(30)]);
        let mut model = UnsignedIntegerModel::<UInt64Type>::new(5);

        let out = model.generate(&column).unwrap();
        assert!(out.is_valid(0));
        assert!(out.is_null(1));
        assert!(out.is_valid(2));
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let column = Int32Array::from(vec![1, 2, 3]);
        let mut model = UnsignedIntegerModel::<UInt64Type>::new(5);
        assert!(matches!(
            model.generate(&column),
            Err(SamarError::TypeMismatch(_))
        ));
    }
}
