//! FixedString model: refills each row from a keyed digest stream while
//! keeping ASCII word-character positions word characters, so the rough
//! token shape of codes and identifiers survives.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, FixedSizeBinaryArray};
use arrow::buffer::Buffer;

use crate::error::SamarError;
use crate::kernels::sip::{hash128_u64s, hash_seeded_bytes, hash_u64};
use crate::models::{type_mismatch, Model};

/// 64 word characters, indexed by `digest_byte % 64`.
const WORD_CHARS: &[u8; 64] =
    b"_01234567890abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

fn is_word_char_ascii(byte: u8) -> bool {
    byte == b'_' || byte.is_ascii_alphanumeric()
}

/// Pseudo-random function of the whole row, but keep word characters as
/// word characters.
fn transform_fixed_string(src: &[u8], dst: &mut [u8], seed: u64) {
    let size = src.len();
    let row_seed = hash_seeded_bytes(seed, src);

    let mut pos = 0;
    let mut chunk_index = 0u64;
    while pos < size {
        let digest = hash128_u64s(&[row_seed, chunk_index]);
        if size >= 16 {
            // The final chunk is placed so its tail aligns with the row end,
            // overwriting part of the previous chunk.
            let offset = pos.min(size - 16);
            dst[offset..offset + 16].copy_from_slice(&digest);
        } else {
            dst[..size].copy_from_slice(&digest[..size]);
        }
        pos += 16;
        chunk_index += 1;
    }

    for j in 0..size {
        if is_word_char_ascii(src[j]) {
            dst[j] = WORD_CHARS[(dst[j] % 64) as usize];
        }
    }
}

pub struct FixedStringModel {
    seed: u64,
}

impl FixedStringModel {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Model for FixedStringModel {
    fn generate(&mut self, column: &dyn Array) -> Result<ArrayRef, SamarError> {
        let src = column
            .as_any()
            .downcast_ref::<FixedSizeBinaryArray>()
            .ok_or_else(|| type_mismatch("fixed-size binary", column))?;

        let width = src.value_length() as usize;
        let mut data = vec![0u8; width * src.len()];
        for i in 0..src.len() {
            transform_fixed_string(src.value(i), &mut data[i * width..(i + 1) * width], self.seed);
        }

        let out = FixedSizeBinaryArray::try_new(
            src.value_length(),
            Buffer::from(data),
            src.nulls().cloned(),
        )?;
        Ok(Arc::new(out))
    }

    fn update_seed(&mut self) {
        self.seed = hash_u64(self.seed);
    }
}
