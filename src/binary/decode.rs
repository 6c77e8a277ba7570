//! Avro binary decoder for primitive types.
//!
//! This module provides functions to decode Avro binary data read from any
//! `std::io::Read`. The decoder follows the Avro binary encoding:
//! - Varints use zigzag encoding for signed integers
//! - Floats and doubles are little-endian IEEE 754
//! - Bytes and strings are length-prefixed
//!
//! Each `decode_*` function has a `skip_*` twin that consumes exactly the
//! same bytes without materializing a value.

use std::io::{self, Read};

use super::varint::{decode_zigzag, skip_varint};
use crate::error::DecodeError;

/// Decode a null value (no-op, consumes no bytes).
#[inline]
pub fn decode_null<R: Read + ?Sized>(_reader: &mut R) -> Result<(), DecodeError> {
    Ok(())
}

/// Decode a boolean value.
///
/// Avro booleans are encoded as a single byte: 0x00 for false, 0x01 for true.
#[inline]
pub fn decode_boolean<R: Read + ?Sized>(reader: &mut R) -> Result<bool, DecodeError> {
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte)?;
    match byte[0] {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(DecodeError::InvalidData(format!(
            "Invalid boolean value: {}, expected 0 or 1",
            other
        ))),
    }
}

/// Decode a 32-bit signed integer (zigzag varint encoded).
#[inline]
pub fn decode_int<R: Read + ?Sized>(reader: &mut R) -> Result<i32, DecodeError> {
    let long = decode_long(reader)?;
    i32::try_from(long).map_err(|_| {
        DecodeError::InvalidData(format!("Integer overflow: {} does not fit in i32", long))
    })
}

/// Decode a 64-bit signed integer (zigzag varint encoded).
#[inline]
pub fn decode_long<R: Read + ?Sized>(reader: &mut R) -> Result<i64, DecodeError> {
    decode_zigzag(reader)
}

/// Decode a 32-bit IEEE 754 floating-point number (little-endian).
#[inline]
pub fn decode_float<R: Read + ?Sized>(reader: &mut R) -> Result<f32, DecodeError> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(f32::from_le_bytes(bytes))
}

/// Decode a 64-bit IEEE 754 floating-point number (little-endian).
#[inline]
pub fn decode_double<R: Read + ?Sized>(reader: &mut R) -> Result<f64, DecodeError> {
    let mut bytes = [0u8; 8];
    reader.read_exact(&mut bytes)?;
    Ok(f64::from_le_bytes(bytes))
}

/// Read a length prefix, rejecting negative values.
#[inline]
fn decode_length<R: Read + ?Sized>(reader: &mut R, what: &str) -> Result<u64, DecodeError> {
    let len = decode_long(reader)?;
    u64::try_from(len)
        .map_err(|_| DecodeError::InvalidData(format!("Negative {} length: {}", what, len)))
}

/// Decode a byte array (length-prefixed).
pub fn decode_bytes<R: Read + ?Sized>(reader: &mut R) -> Result<Vec<u8>, DecodeError> {
    let len = decode_length(reader, "bytes")?;
    read_exact_vec(reader, len)
}

/// Decode a UTF-8 string (length-prefixed).
pub fn decode_string<R: Read + ?Sized>(reader: &mut R) -> Result<String, DecodeError> {
    let bytes = decode_bytes(reader)?;
    String::from_utf8(bytes).map_err(DecodeError::from)
}

/// Decode a fixed-size byte array.
pub fn decode_fixed<R: Read + ?Sized>(reader: &mut R, size: usize) -> Result<Vec<u8>, DecodeError> {
    read_exact_vec(reader, size as u64)
}

/// Read exactly `len` bytes without trusting `len` for the up-front allocation.
fn read_exact_vec<R: Read + ?Sized>(reader: &mut R, len: u64) -> Result<Vec<u8>, DecodeError> {
    let mut buf = Vec::with_capacity(len.min(64 * 1024) as usize);
    let read = reader.take(len).read_to_end(&mut buf)?;
    if (read as u64) < len {
        return Err(DecodeError::UnexpectedEof);
    }
    Ok(buf)
}

// ============================================================================
// Block framing (arrays and maps)
// ============================================================================

/// Header of one array/map block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Number of items in the block (zero marks the end of the sequence)
    pub count: usize,
    /// Byte size of the block, present when the count was written negative
    pub byte_size: Option<u64>,
}

/// Decode an array/map block header.
///
/// A negative count means the absolute value is the item count and a `long`
/// byte size of the block follows.
pub fn decode_block_header<R: Read + ?Sized>(reader: &mut R) -> Result<BlockHeader, DecodeError> {
    let count = decode_long(reader)?;
    if count >= 0 {
        return Ok(BlockHeader {
            count: count as usize,
            byte_size: None,
        });
    }
    let byte_size = decode_length(reader, "block")?;
    Ok(BlockHeader {
        count: count.unsigned_abs() as usize,
        byte_size: Some(byte_size),
    })
}

// ============================================================================
// Skip functions
// ============================================================================

/// Skip exactly `len` bytes.
pub fn skip_exact<R: Read + ?Sized>(reader: &mut R, len: u64) -> Result<(), DecodeError> {
    let skipped = io::copy(&mut reader.take(len), &mut io::sink())?;
    if skipped < len {
        return Err(DecodeError::UnexpectedEof);
    }
    Ok(())
}

/// Skip a null value (no bytes).
#[inline]
pub fn skip_null<R: Read + ?Sized>(_reader: &mut R) -> Result<(), DecodeError> {
    Ok(())
}

/// Skip a boolean value.
#[inline]
pub fn skip_boolean<R: Read + ?Sized>(reader: &mut R) -> Result<(), DecodeError> {
    skip_exact(reader, 1)
}

/// Skip an int value.
#[inline]
pub fn skip_int<R: Read + ?Sized>(reader: &mut R) -> Result<(), DecodeError> {
    skip_varint(reader)
}

/// Skip a long value.
#[inline]
pub fn skip_long<R: Read + ?Sized>(reader: &mut R) -> Result<(), DecodeError> {
    skip_varint(reader)
}

/// Skip a float value.
#[inline]
pub fn skip_float<R: Read + ?Sized>(reader: &mut R) -> Result<(), DecodeError> {
    skip_exact(reader, 4)
}

/// Skip a double value.
#[inline]
pub fn skip_double<R: Read + ?Sized>(reader: &mut R) -> Result<(), DecodeError> {
    skip_exact(reader, 8)
}

/// Skip a bytes value.
#[inline]
pub fn skip_bytes<R: Read + ?Sized>(reader: &mut R) -> Result<(), DecodeError> {
    let len = decode_length(reader, "bytes")?;
    skip_exact(reader, len)
}

/// Skip a string value.
#[inline]
pub fn skip_string<R: Read + ?Sized>(reader: &mut R) -> Result<(), DecodeError> {
    skip_bytes(reader)
}

/// Skip a fixed value of `size` bytes.
#[inline]
pub fn skip_fixed<R: Read + ?Sized>(reader: &mut R, size: usize) -> Result<(), DecodeError> {
    skip_exact(reader, size as u64)
}

/// Skip a blocked sequence (array or map), calling `skip_item` once per item.
///
/// Blocks that carry a byte size are skipped wholesale.
pub fn skip_blocks<R, F>(reader: &mut R, mut skip_item: F) -> Result<(), DecodeError>
where
    R: Read + ?Sized,
    F: FnMut(&mut R) -> Result<(), DecodeError>,
{
    loop {
        let header = decode_block_header(reader)?;
        if header.count == 0 {
            return Ok(());
        }
        match header.byte_size {
            Some(size) => skip_exact(reader, size)?,
            None => {
                for _ in 0..header.count {
                    skip_item(reader)?;
                }
            }
        }
    }
}
