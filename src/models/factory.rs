//! Maps a declared column type to the concrete model that obfuscates it.

use arrow::datatypes::{
    Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type, UInt32Type,
    UInt64Type, UInt8Type,
};
use chrono_tz::Tz;

use crate::markov::MarkovModelParameters;
use crate::models::array::ArrayModel;
use crate::models::datetime::DateTimeModel;
use crate::models::fixed_string::FixedStringModel;
use crate::models::float::FloatModel;
use crate::models::identity::IdentityModel;
use crate::models::integer::{SignedIntegerModel, UnsignedIntegerModel};
use crate::models::nullable::NullableModel;
use crate::models::string::StringModel;
use crate::models::uuid::UuidModel;
use crate::models::ModelPtr;
use crate::types::SamarDataType;

pub struct ModelFactory;

impl ModelFactory {
    /// Builds the model for one declared column type, recursing through the
    /// structural wrappers. The set of supported types is closed by
    /// [`SamarDataType`], so anything parseable has a model.
    pub fn build(
        dtype: &SamarDataType,
        seed: u64,
        markov_params: &MarkovModelParameters,
        calendar: Tz,
    ) -> ModelPtr {
        match dtype {
            SamarDataType::UInt8 => Box::new(UnsignedIntegerModel::<UInt8Type>::new(seed)),
            SamarDataType::UInt16 => Box::new(UnsignedIntegerModel::<UInt16Type>::new(seed)),
            SamarDataType::UInt32 => Box::new(UnsignedIntegerModel::<UInt32Type>::new(seed)),
            SamarDataType::UInt64 => Box::new(UnsignedIntegerModel::<UInt64Type>::new(seed)),
            SamarDataType::Int8 => Box::new(SignedIntegerModel::<Int8Type>::new(seed)),
            SamarDataType::Int16 => Box::new(SignedIntegerModel::<Int16Type>::new(seed)),
            SamarDataType::Int32 => Box::new(SignedIntegerModel::<Int32Type>::new(seed)),
            SamarDataType::Int64 => Box::new(SignedIntegerModel::<Int64Type>::new(seed)),
            SamarDataType::Float32 => Box::new(FloatModel::<Float32Type>::new(seed)),
            SamarDataType::Float64 => Box::new(FloatModel::<Float64Type>::new(seed)),
            SamarDataType::Date => Box::new(IdentityModel::new()),
            SamarDataType::DateTime => Box::new(DateTimeModel::new(seed, calendar)),
            SamarDataType::String => Box::new(StringModel::new(seed, markov_params.clone())),
            SamarDataType::FixedString(_) => Box::new(FixedStringModel::new(seed)),
            SamarDataType::Uuid => Box::new(UuidModel::new(seed)),
            SamarDataType::Array(nested) => Box::new(ArrayModel::new(Self::build(
                nested,
                seed,
                markov_params,
                calendar,
            ))),
            SamarDataType::Nullable(nested) => Box::new(NullableModel::new(Self::build(
                nested,
                seed,
                markov_params,
                calendar,
            ))),
        }
    }
}
