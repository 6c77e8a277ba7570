//! Variable-length integer encoding.
//!
//! Avro encodes `int` and `long` with the same scheme as Protocol Buffers:
//! - Each byte has 7 bits of data and 1 continuation bit (MSB)
//! - The continuation bit indicates if more bytes follow
//! - The least significant group comes first
//!
//! Signed values are zigzag-mapped to unsigned first so that small negative
//! numbers stay short:
//! - 0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, 2 -> 4, ...
//! - Encoding formula: (n << 1) ^ (n >> 63)
//! - Decoding formula: (n >> 1) ^ -(n & 1)

use std::io::{self, Read, Write};

use crate::error::DecodeError;

/// Longest possible encoding of a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

// ============================================================================
// Zigzag mapping
// ============================================================================

/// Map a signed integer onto the unsigned zigzag space.
#[inline]
pub fn zigzag_encode(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

/// Inverse of [`zigzag_encode`].
#[inline]
pub fn zigzag_decode(z: u64) -> i64 {
    ((z >> 1) as i64) ^ (-((z & 1) as i64))
}

// ============================================================================
// Decoding Functions
// ============================================================================

#[inline]
fn read_byte<R: Read + ?Sized>(reader: &mut R) -> Result<u8, DecodeError> {
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte)?;
    Ok(byte[0])
}

/// Decode an unsigned variable-length integer.
///
/// # Errors
/// - `DecodeError::UnexpectedEof` if the input is truncated
/// - `DecodeError::InvalidVarint` if the varint exceeds 10 bytes
#[inline]
pub fn decode_varint<R: Read + ?Sized>(reader: &mut R) -> Result<u64, DecodeError> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        let byte = read_byte(reader)?;

        result |= ((byte & 0x7F) as u64) << shift;

        if byte & 0x80 == 0 {
            return Ok(result);
        }

        shift += 7;

        // Max 10 bytes for a 64-bit varint
        if shift >= 64 {
            return Err(DecodeError::InvalidVarint);
        }
    }
}

/// Decode a signed, zigzag-encoded variable-length integer.
#[inline]
pub fn decode_zigzag<R: Read + ?Sized>(reader: &mut R) -> Result<i64, DecodeError> {
    decode_varint(reader).map(zigzag_decode)
}

/// Skip over a varint without decoding its value.
#[inline]
pub fn skip_varint<R: Read + ?Sized>(reader: &mut R) -> Result<(), DecodeError> {
    for _ in 0..MAX_VARINT_LEN {
        if read_byte(reader)? & 0x80 == 0 {
            return Ok(());
        }
    }
    Err(DecodeError::InvalidVarint)
}

// ============================================================================
// Encoding Functions
// ============================================================================

/// Write an unsigned integer as a variable-length integer.
///
/// Returns the number of bytes written.
#[inline]
pub fn encode_varint<W: Write + ?Sized>(mut value: u64, writer: &mut W) -> io::Result<usize> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let mut len = 0;
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf[len] = byte;
        len += 1;
        if value == 0 {
            break;
        }
    }
    writer.write_all(&buf[..len])?;
    Ok(len)
}

/// Write a signed integer as a zigzag-encoded variable-length integer.
#[inline]
pub fn encode_zigzag<W: Write + ?Sized>(value: i64, writer: &mut W) -> io::Result<usize> {
    encode_varint(zigzag_encode(value), writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zigzag_bytes(value: i64) -> Vec<u8> {
        let mut out = Vec::new();
        encode_zigzag(value, &mut out).unwrap();
        out
    }

    // ========================================================================
    // decode_varint tests
    // ========================================================================

    #[test]
    fn test_decode_varint_single_byte() {
        let mut cursor: &[u8] = &[0x00];
        assert_eq!(decode_varint(&mut cursor).unwrap(), 0);
        assert!(cursor.is_empty());

        let mut cursor: &[u8] = &[0x7F];
        assert_eq!(decode_varint(&mut cursor).unwrap(), 127);
    }

    #[test]
    fn test_decode_varint_multi_byte() {
        let mut cursor: &[u8] = &[0x80, 0x01];
        assert_eq!(decode_varint(&mut cursor).unwrap(), 128);
        assert!(cursor.is_empty());

        let mut cursor: &[u8] = &[0xAC, 0x02];
        assert_eq!(decode_varint(&mut cursor).unwrap(), 300);

        let mut cursor: &[u8] = &[0x80, 0x80, 0x01];
        assert_eq!(decode_varint(&mut cursor).unwrap(), 16384);
    }

    #[test]
    fn test_decode_varint_eof() {
        let mut cursor: &[u8] = &[];
        assert!(matches!(
            decode_varint(&mut cursor),
            Err(DecodeError::UnexpectedEof)
        ));

        // Continuation bit set but no more bytes
        let mut cursor: &[u8] = &[0x80];
        assert!(matches!(
            decode_varint(&mut cursor),
            Err(DecodeError::UnexpectedEof)
        ));
    }

    #[test]
    fn test_decode_varint_too_long() {
        let mut cursor: &[u8] = &[0xFF; 11];
        assert!(matches!(
            decode_varint(&mut cursor),
            Err(DecodeError::InvalidVarint)
        ));
    }

    #[test]
    fn test_decode_zigzag() {
        let mut cursor: &[u8] = &[0x00, 0x01, 0x02, 0x03, 0x04];
        let decoded: Vec<i64> = (0..5)
            .map(|_| decode_zigzag(&mut cursor).unwrap())
            .collect();
        assert_eq!(decoded, vec![0, -1, 1, -2, 2]);
    }

    #[test]
    fn test_skip_varint() {
        let mut cursor: &[u8] = &[0x80, 0x80, 0x01, 0xFF];
        skip_varint(&mut cursor).unwrap();
        assert_eq!(cursor, &[0xFF]);

        let mut cursor: &[u8] = &[];
        assert!(matches!(
            skip_varint(&mut cursor),
            Err(DecodeError::UnexpectedEof)
        ));
    }

    // ========================================================================
    // encoding tests
    // ========================================================================

    #[test]
    fn test_encode_varint() {
        let cases: [(u64, &[u8]); 5] = [
            (0, &[0x00]),
            (1, &[0x01]),
            (127, &[0x7F]),
            (128, &[0x80, 0x01]),
            (300, &[0xAC, 0x02]),
        ];
        for (value, expected) in cases {
            let mut out = Vec::new();
            let written = encode_varint(value, &mut out).unwrap();
            assert_eq!(out, expected);
            assert_eq!(written, expected.len());
        }
    }

    #[test]
    fn test_encode_zigzag_vectors() {
        assert_eq!(zigzag_bytes(0), vec![0x00]);
        assert_eq!(zigzag_bytes(-1), vec![0x01]);
        assert_eq!(zigzag_bytes(1), vec![0x02]);
        assert_eq!(zigzag_bytes(-64), vec![0x7F]);
        assert_eq!(zigzag_bytes(64), vec![0x80, 0x01]);
        assert_eq!(
            zigzag_bytes(i32::MIN as i64),
            vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]
        );
        assert_eq!(
            zigzag_bytes(i32::MAX as i64),
            vec![0xFE, 0xFF, 0xFF, 0xFF, 0x0F]
        );
    }

    #[test]
    fn test_extreme_longs_use_ten_bytes() {
        for value in [i64::MIN, i64::MAX] {
            let encoded = zigzag_bytes(value);
            assert_eq!(encoded.len(), MAX_VARINT_LEN);
            assert_eq!(decode_zigzag(&mut &encoded[..]).unwrap(), value);
        }
    }

    #[test]
    fn test_zigzag_mapping_inverse() {
        for value in [0i64, 1, -1, 63, -64, i64::MAX, i64::MIN] {
            assert_eq!(zigzag_decode(zigzag_encode(value)), value);
        }
    }
}
