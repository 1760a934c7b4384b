//! This module defines the canonical, type-safe representation of column types
//! used throughout the samar pipeline.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use arrow::datatypes::{DataType as ArrowDataType, Field, TimeUnit};
use serde::{Deserialize, Serialize};

use crate::error::SamarError;

/// The canonical, internal representation of a declared column type.
///
/// This enum replaces fragile string-based type dispatch, enabling
/// compile-time checks and eliminating an entire class of runtime errors.
/// Its `Display` output is part of the persisted-model contract: the
/// rendered names are written into the model stream header and validated
/// byte-for-byte on load.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SamarDataType {
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    /// Day-precision date. Passed through unchanged by the obfuscator.
    Date,
    /// Second-precision, timezone-aware timestamp.
    DateTime,
    /// Variable-length byte string (Arrow `Binary`, or `Utf8` accepted and
    /// validated on the way back out).
    String,
    /// Fixed-width byte string of the given width.
    FixedString(usize),
    /// RFC-4122 UUID, carried as 16 canonical big-endian bytes.
    Uuid,
    Array(Box<SamarDataType>),
    Nullable(Box<SamarDataType>),
}

impl SamarDataType {
    /// Converts an Arrow `Field` into a `SamarDataType`.
    ///
    /// The field's `nullable` flag maps to the `Nullable` wrapper, and a
    /// 16-byte `FixedSizeBinary` field carrying the `arrow.uuid` extension
    /// name maps to `Uuid`.
    pub fn from_arrow_field(field: &Field) -> Result<Self, SamarError> {
        let base = Self::from_arrow_type(field)?;
        if field.is_nullable() {
            Ok(Self::Nullable(Box::new(base)))
        } else {
            Ok(base)
        }
    }

    fn from_arrow_type(field: &Field) -> Result<Self, SamarError> {
        match field.data_type() {
            ArrowDataType::UInt8 => Ok(Self::UInt8),
            ArrowDataType::UInt16 => Ok(Self::UInt16),
            ArrowDataType::UInt32 => Ok(Self::UInt32),
            ArrowDataType::UInt64 => Ok(Self::UInt64),
            ArrowDataType::Int8 => Ok(Self::Int8),
            ArrowDataType::Int16 => Ok(Self::Int16),
            ArrowDataType::Int32 => Ok(Self::Int32),
            ArrowDataType::Int64 => Ok(Self::Int64),
            ArrowDataType::Float32 => Ok(Self::Float32),
            ArrowDataType::Float64 => Ok(Self::Float64),
            ArrowDataType::Date32 => Ok(Self::Date),
            ArrowDataType::Timestamp(TimeUnit::Second, _) => Ok(Self::DateTime),
            ArrowDataType::Utf8 | ArrowDataType::Binary => Ok(Self::String),
            ArrowDataType::FixedSizeBinary(n) => {
                let is_uuid = field
                    .metadata()
                    .get("ARROW:extension:name")
                    .is_some_and(|name| name == "arrow.uuid" || name == "uuid");
                if is_uuid && *n == 16 {
                    Ok(Self::Uuid)
                } else if *n > 0 {
                    Ok(Self::FixedString(*n as usize))
                } else {
                    Err(SamarError::UnsupportedType(
                        "FixedSizeBinary width must be positive".to_string(),
                    ))
                }
            }
            ArrowDataType::List(inner) => {
                Ok(Self::Array(Box::new(Self::from_arrow_field(inner)?)))
            }
            dt => Err(SamarError::UnsupportedType(format!(
                "Cannot convert Arrow type {:?} to SamarDataType",
                dt
            ))),
        }
    }

    /// Converts a `SamarDataType` back into the Arrow `DataType` the models
    /// operate on. Nullability lives on the Arrow `Field`, so `Nullable(T)`
    /// renders as the inner type.
    pub fn to_arrow_type(&self) -> ArrowDataType {
        match self {
            Self::UInt8 => ArrowDataType::UInt8,
            Self::UInt16 => ArrowDataType::UInt16,
            Self::UInt32 => ArrowDataType::UInt32,
            Self::UInt64 => ArrowDataType::UInt64,
            Self::Int8 => ArrowDataType::Int8,
            Self::Int16 => ArrowDataType::Int16,
            Self::Int32 => ArrowDataType::Int32,
            Self::Int64 => ArrowDataType::Int64,
            Self::Float32 => ArrowDataType::Float32,
            Self::Float64 => ArrowDataType::Float64,
            Self::Date => ArrowDataType::Date32,
            Self::DateTime => ArrowDataType::Timestamp(TimeUnit::Second, None),
            Self::String => ArrowDataType::Binary,
            Self::FixedString(n) => ArrowDataType::FixedSizeBinary(*n as i32),
            Self::Uuid => ArrowDataType::FixedSizeBinary(16),
            Self::Array(inner) => ArrowDataType::List(Arc::new(Field::new(
                "item",
                inner.to_arrow_type(),
                matches!(inner.as_ref(), Self::Nullable(_)),
            ))),
            Self::Nullable(inner) => inner.to_arrow_type(),
        }
    }
}

/// Provides the canonical string representation for a `SamarDataType`.
///
/// These names are part of the public contract: they are written into the
/// persisted model header and must never change within a format version.
impl fmt::Display for SamarDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UInt8 => write!(f, "UInt8"),
            Self::UInt16 => write!(f, "UInt16"),
            Self::UInt32 => write!(f, "UInt32"),
            Self::UInt64 => write!(f, "UInt64"),
            Self::Int8 => write!(f, "Int8"),
            Self::Int16 => write!(f, "Int16"),
            Self::Int32 => write!(f, "Int32"),
            Self::Int64 => write!(f, "Int64"),
            Self::Float32 => write!(f, "Float32"),
            Self::Float64 => write!(f, "Float64"),
            Self::Date => write!(f, "Date"),
            Self::DateTime => write!(f, "DateTime"),
            Self::String => write!(f, "String"),
            Self::FixedString(n) => write!(f, "FixedString({})", n),
            Self::Uuid => write!(f, "UUID"),
            Self::Array(inner) => write!(f, "Array({})", inner),
            Self::Nullable(inner) => write!(f, "Nullable({})", inner),
        }
    }
}

impl FromStr for SamarDataType {
    type Err = SamarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "UInt8" => return Ok(Self::UInt8),
            "UInt16" => return Ok(Self::UInt16),
            "UInt32" => return Ok(Self::UInt32),
            "UInt64" => return Ok(Self::UInt64),
            "Int8" => return Ok(Self::Int8),
            "Int16" => return Ok(Self::Int16),
            "Int32" => return Ok(Self::Int32),
            "Int64" => return Ok(Self::Int64),
            "Float32" => return Ok(Self::Float32),
            "Float64" => return Ok(Self::Float64),
            "Date" => return Ok(Self::Date),
            "DateTime" => return Ok(Self::DateTime),
            "String" => return Ok(Self::String),
            "UUID" => return Ok(Self::Uuid),
            _ => {}
        }

        if let Some(inner) = strip_wrapper(s, "FixedString") {
            let n: usize = inner.trim().parse().map_err(|_| {
                SamarError::UnsupportedType(format!("Invalid FixedString width: {}", inner))
            })?;
            if n == 0 {
                return Err(SamarError::UnsupportedType(
                    "FixedString width must be positive".to_string(),
                ));
            }
            return Ok(Self::FixedString(n));
        }
        if let Some(inner) = strip_wrapper(s, "Array") {
            return Ok(Self::Array(Box::new(inner.parse()?)));
        }
        if let Some(inner) = strip_wrapper(s, "Nullable") {
            return Ok(Self::Nullable(Box::new(inner.parse()?)));
        }

        Err(SamarError::UnsupportedType(s.to_string()))
    }
}

/// Strips `Name(...)` down to the inner `...`, or returns `None`.
fn strip_wrapper<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?
        .strip_prefix('(')?
        .strip_suffix(')')
}

//==================================================================================
// Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_display_parse_roundtrip() {
        let cases = vec![
            SamarDataType::UInt32,
            SamarDataType::Int64,
            SamarDataType::Float64,
            SamarDataType::Date,
            SamarDataType::DateTime,
            SamarDataType::String,
            SamarDataType::FixedString(16),
            SamarDataType::Uuid,
            SamarDataType::Array(Box::new(SamarDataType::String)),
            SamarDataType::Nullable(Box::new(SamarDataType::UInt64)),
            SamarDataType::Array(Box::new(SamarDataType::Nullable(Box::new(
                SamarDataType::Int8,
            )))),
        ];

        for dtype in cases {
            let rendered = dtype.to_string();
            let parsed: SamarDataType = rendered.parse().unwrap();
            assert_eq!(parsed, dtype, "roundtrip failed for {}", rendered);
        }
    }

    #[test]
    fn test_parse_rejects_unknown_types() {
        assert!(matches!(
            "Decimal(10, 2)".parse::<SamarDataType>(),
            Err(SamarError::UnsupportedType(_))
        ));
        assert!(matches!(
            "FixedString(0)".parse::<SamarDataType>(),
            Err(SamarError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_from_arrow_field_wraps_nullable() {
        let field = Field::new("x", ArrowDataType::UInt32, true);
        let dtype = SamarDataType::from_arrow_field(&field).unwrap();
        assert_eq!(
            dtype,
            SamarDataType::Nullable(Box::new(SamarDataType::UInt32))
        );
    }

    #[test]
    fn test_from_arrow_field_detects_uuid_extension() {
        let mut metadata = HashMap::new();
        metadata.insert("ARROW:extension:name".to_string(), "arrow.uuid".to_string());
        let field =
            Field::new("id", ArrowDataType::FixedSizeBinary(16), false).with_metadata(metadata);
        assert_eq!(
            SamarDataType::from_arrow_field(&field).unwrap(),
            SamarDataType::Uuid
        );

        let plain = Field::new("code", ArrowDataType::FixedSizeBinary(16), false);
        assert_eq!(
            SamarDataType::from_arrow_field(&plain).unwrap(),
            SamarDataType::FixedString(16)
        );
    }

    #[test]
    fn test_from_arrow_field_rejects_unsupported() {
        let field = Field::new("x", ArrowDataType::LargeUtf8, false);
        assert!(matches!(
            SamarDataType::from_arrow_field(&field),
            Err(SamarError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_list_field_maps_to_array() {
        let field = Field::new(
            "tags",
            ArrowDataType::List(Arc::new(Field::new("item", ArrowDataType::Utf8, false))),
            false,
        );
        assert_eq!(
            SamarDataType::from_arrow_field(&field).unwrap(),
            SamarDataType::Array(Box::new(SamarDataType::String))
        );
    }
}
