// In: src/persist.rs

//! Low-level read/write helpers for the persisted model stream.
//!
//! Every primitive is written little-endian at its native fixed width;
//! strings are u16-length-prefixed UTF-8. These helpers are the single
//! place where raw bytes touch the stream, so the on-disk layout is
//! defined here and nowhere else.

use std::io::{Read, Write};

use crate::error::SamarError;

/// A reasonable limit to prevent OOM from malformed length prefixes. (64KB)
const MAX_REASONABLE_STRING_LEN: usize = 64 * 1024;

fn read_err(e: std::io::Error) -> SamarError {
    SamarError::ModelFormatError(e.to_string())
}

pub(crate) fn write_u8<W: Write + ?Sized>(out: &mut W, v: u8) -> Result<(), SamarError> {
    out.write_all(&[v])?;
    Ok(())
}

pub(crate) fn read_u8<R: Read + ?Sized>(input: &mut R) -> Result<u8, SamarError> {
    let mut buf = [0u8; 1];
    input.read_exact(&mut buf).map_err(read_err)?;
    Ok(buf[0])
}

pub(crate) fn write_u32<W: Write + ?Sized>(out: &mut W, v: u32) -> Result<(), SamarError> {
    out.write_all(&v.to_le_bytes())?;
    Ok(())
}

pub(crate) fn read_u32<R: Read + ?Sized>(input: &mut R) -> Result<u32, SamarError> {
    let mut buf = [0u8; 4];
    input.read_exact(&mut buf).map_err(read_err)?;
    Ok(u32::from_le_bytes(buf))
}

pub(crate) fn write_u64<W: Write + ?Sized>(out: &mut W, v: u64) -> Result<(), SamarError> {
    out.write_all(&v.to_le_bytes())?;
    Ok(())
}

pub(crate) fn read_u64<R: Read + ?Sized>(input: &mut R) -> Result<u64, SamarError> {
    let mut buf = [0u8; 8];
    input.read_exact(&mut buf).map_err(read_err)?;
    Ok(u64::from_le_bytes(buf))
}

pub(crate) fn write_f64<W: Write + ?Sized>(out: &mut W, v: f64) -> Result<(), SamarError> {
    out.write_all(&v.to_le_bytes())?;
    Ok(())
}

pub(crate) fn read_f64<R: Read + ?Sized>(input: &mut R) -> Result<f64, SamarError> {
    let mut buf = [0u8; 8];
    input.read_exact(&mut buf).map_err(read_err)?;
    Ok(f64::from_le_bytes(buf))
}

pub(crate) fn write_prefixed_string<W: Write + ?Sized>(
    out: &mut W,
    s: &str,
) -> Result<(), SamarError> {
    if s.len() > MAX_REASONABLE_STRING_LEN {
        return Err(SamarError::ModelFormatError(format!(
            "String length ({}) exceeds maximum allowed size ({})",
            s.len(),
            MAX_REASONABLE_STRING_LEN
        )));
    }
    out.write_all(&(s.len() as u16).to_le_bytes())?;
    out.write_all(s.as_bytes())?;
    Ok(())
}

pub(crate) fn read_prefixed_string<R: Read + ?Sized>(input: &mut R) -> Result<String, SamarError> {
    let mut len_buf = [0u8; 2];
    input.read_exact(&mut len_buf).map_err(read_err)?;
    let len = u16::from_le_bytes(len_buf) as usize;

    let mut str_buf = vec![0u8; len];
    input.read_exact(&mut str_buf).map_err(read_err)?;
    String::from_utf8(str_buf).map_err(|e| SamarError::ModelFormatError(e.to_string()))
}

//==================================================================================
// Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_primitive_roundtrips() {
        let mut buf = Vec::new();
        write_u8(&mut buf, 0x7F).unwrap();
        write_u32(&mut buf, 0xDEAD_BEEF).unwrap();
        write_u64(&mut buf, u64::MAX - 1).unwrap();
        write_f64(&mut buf, 0.25).unwrap();

        let mut cursor = Cursor::new(buf);
        assert_eq!(read_u8(&mut cursor).unwrap(), 0x7F);
        assert_eq!(read_u32(&mut cursor).unwrap(), 0xDEAD_BEEF);
        assert_eq!(read_u64(&mut cursor).unwrap(), u64::MAX - 1);
        assert_eq!(read_f64(&mut cursor).unwrap(), 0.25);
    }

    #[test]
    fn test_layout_is_little_endian() {
        let mut buf = Vec::new();
        write_u32(&mut buf, 0x0102_0304).unwrap();
        assert_eq!(buf, vec![0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_prefixed_string_roundtrip() {
        let mut buf = Vec::new();
        write_prefixed_string(&mut buf, "Nullable(UInt64)").unwrap();
        assert_eq!(&buf[..2], &[16, 0]);

        let mut cursor = Cursor::new(buf);
        assert_eq!(read_prefixed_string(&mut cursor).unwrap(), "Nullable(UInt64)");
    }

    #[test]
    fn test_truncated_stream_is_rejected() {
        let bytes = vec![1u8, 2, 3];
        let mut cursor = Cursor::new(bytes);
        let result = read_u64(&mut cursor);
        assert!(matches!(result, Err(SamarError::ModelFormatError(_))));
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let bytes = vec![2u8, 0, 0xFF, 0xFE];
        let mut cursor = Cursor::new(bytes);
        let result = read_prefixed_string(&mut cursor);
        assert!(matches!(result, Err(SamarError::ModelFormatError(_))));
    }
}
