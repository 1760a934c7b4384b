//! UUID model: replaces the random bits of a UUID with a keyed 128-bit
//! digest of it, then copies the RFC-4122 version nibble and variant bits
//! back from the source, so the output is a plausible UUID of the same kind.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, FixedSizeBinaryArray};
use arrow::buffer::Buffer;
use uuid::Uuid;

use crate::error::SamarError;
use crate::kernels::sip::{hash_u64, SipState128};
use crate::models::{type_mismatch, Model};

/// Version nibble location within the high 64 bits of the canonical layout.
const VERSION_MASK: u64 = 0x0000_0000_0000_f000;
/// Variant bits location within the low 64 bits of the canonical layout.
const VARIANT_MASK: u64 = 0xe000_0000_0000_0000;

fn transform_uuid(src: Uuid, seed: u64) -> Uuid {
    let (src_high, src_low) = src.as_u64_pair();

    // Hash the little-endian normalized form of the source.
    let mut state = SipState128::new();
    state.update_u64(seed);
    state.update_u64(src_high);
    state.update_u64(src_low);
    let (mut dst_high, mut dst_low) = state.finish_pair();

    // Keep the version and variant from the old UUID.
    dst_high = (dst_high & !VERSION_MASK) | (src_high & VERSION_MASK);
    dst_low = (dst_low & !VARIANT_MASK) | (src_low & VARIANT_MASK);

    Uuid::from_u64_pair(dst_high, dst_low)
}

pub struct UuidModel {
    seed: u64,
}

impl UuidModel {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Model for UuidModel {
    fn generate(&mut self, column: &dyn Array) -> Result<ArrayRef, SamarError> {
        let src = column
            .as_any()
            .downcast_ref::<FixedSizeBinaryArray>()
            .ok_or_else(|| type_mismatch("16-byte fixed-size binary", column))?;
        if src.value_length() != 16 {
            return Err(type_mismatch("16-byte fixed-size binary", column));
        }

        let mut data = Vec::with_capacity(16 * src.len());
        for i in 0..src.len() {
            let bytes: [u8; 16] = src
                .value(i)
                .try_into()
                .map_err(|_| type_mismatch("16-byte fixed-size binary", column))?;
            let out = transform_uuid(Uuid::from_bytes(bytes), self.seed);
            data.extend_from_slice(out.as_bytes());
        }

        let out = FixedSizeBinaryArray::try_new(16, Buffer::from(data), src.nulls().cloned())?;
        Ok(Arc::new(out))
    }

    fn update_seed(&mut self) {
        self.seed = hash_u64(self.seed);
    }
}
