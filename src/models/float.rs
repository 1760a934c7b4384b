//! Float model: permutes the mantissa of the difference from the previous
//! value, then accumulates. Sign and exponent of each step survive, so the
//! result keeps the local continuity and magnitude distribution of the
//! source while the values themselves change.

use std::marker::PhantomData;
use std::ops::{Add, Sub};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, PrimitiveArray};
use arrow::datatypes::ArrowPrimitiveType;
use num_traits::Zero;

use crate::error::SamarError;
use crate::kernels::feistel::MantissaPermute;
use crate::kernels::sip::hash_u64;
use crate::models::{type_mismatch, Model};

pub struct FloatModel<T: ArrowPrimitiveType> {
    seed: u64,
    src_prev_value: T::Native,
    res_prev_value: T::Native,
    _type: PhantomData<T>,
}

impl<T: ArrowPrimitiveType> FloatModel<T>
where
    T::Native: Zero,
{
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            src_prev_value: T::Native::zero(),
            res_prev_value: T::Native::zero(),
            _type: PhantomData,
        }
    }
}

impl<T> Model for FloatModel<T>
where
    T: ArrowPrimitiveType,
    T::Native: MantissaPermute + Zero + Add<Output = T::Native> + Sub<Output = T::Native>,
{
    fn generate(&mut self, column: &dyn Array) -> Result<ArrayRef, SamarError> {
        let src = column
            .as_any()
            .downcast_ref::<PrimitiveArray<T>>()
            .ok_or_else(|| type_mismatch("float", column))?;

        let mut values = Vec::with_capacity(src.len());
        for &v in src.values().iter() {
            let res = self.res_prev_value + (v - self.src_prev_value).permute_mantissa(self.seed);
            self.src_prev_value = v;
            self.res_prev_value = res;
            values.push(res);
        }

        Ok(Arc::new(PrimitiveArray::<T>::new(
            values.into(),
            src.nulls().cloned(),
        )))
    }

    fn update_seed(&mut self) {
        self.seed = hash_u64(self.seed);
    }
}
