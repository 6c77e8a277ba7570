//! Avro binary encoder for primitive types.
//!
//! Every function writes directly to any `std::io::Write`. Complex types
//! (arrays, maps, unions, records) are driven by the schema and live in
//! the datum writer.

use std::io::{self, Write};

use super::varint::encode_zigzag;

/// Encode a null value (writes nothing).
#[inline]
pub fn encode_null<W: Write + ?Sized>(_writer: &mut W) -> io::Result<()> {
    Ok(())
}

/// Encode a boolean as a single byte: 0x00 for false, 0x01 for true.
#[inline]
pub fn encode_boolean<W: Write + ?Sized>(value: bool, writer: &mut W) -> io::Result<()> {
    writer.write_all(&[value as u8])
}

/// Encode a 32-bit integer.
///
/// The value is sign-extended to 64 bits and written exactly like a `long`.
#[inline]
pub fn encode_int<W: Write + ?Sized>(value: i32, writer: &mut W) -> io::Result<()> {
    encode_long(value as i64, writer)
}

/// Encode a 64-bit integer as a zigzag varint.
#[inline]
pub fn encode_long<W: Write + ?Sized>(value: i64, writer: &mut W) -> io::Result<()> {
    encode_zigzag(value, writer).map(|_| ())
}

/// Encode a 32-bit IEEE 754 float (little-endian).
#[inline]
pub fn encode_float<W: Write + ?Sized>(value: f32, writer: &mut W) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

/// Encode a 64-bit IEEE 754 double (little-endian).
#[inline]
pub fn encode_double<W: Write + ?Sized>(value: f64, writer: &mut W) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

/// Encode a byte array as a `long` length followed by the bytes.
#[inline]
pub fn encode_bytes<W: Write + ?Sized>(value: &[u8], writer: &mut W) -> io::Result<()> {
    encode_long(value.len() as i64, writer)?;
    writer.write_all(value)
}

/// Encode a string as its UTF-8 bytes, length-prefixed.
#[inline]
pub fn encode_string<W: Write + ?Sized>(value: &str, writer: &mut W) -> io::Result<()> {
    encode_bytes(value.as_bytes(), writer)
}

/// Encode a fixed-size value: the raw bytes with no length prefix.
#[inline]
pub fn encode_fixed<W: Write + ?Sized>(value: &[u8], writer: &mut W) -> io::Result<()> {
    writer.write_all(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded<F: FnOnce(&mut Vec<u8>) -> io::Result<()>>(f: F) -> Vec<u8> {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        out
    }

    #[test]
    fn test_encode_null_writes_nothing() {
        assert!(encoded(|w| encode_null(w)).is_empty());
    }

    #[test]
    fn test_encode_boolean() {
        assert_eq!(encoded(|w| encode_boolean(true, w)), vec![0x01]);
        assert_eq!(encoded(|w| encode_boolean(false, w)), vec![0x00]);
    }

    #[test]
    fn test_encode_int_vectors() {
        assert_eq!(encoded(|w| encode_int(0, w)), vec![0x00]);
        assert_eq!(encoded(|w| encode_int(-1, w)), vec![0x01]);
        assert_eq!(encoded(|w| encode_int(1, w)), vec![0x02]);
        assert_eq!(
            encoded(|w| encode_int(i32::MIN, w)),
            vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]
        );
        assert_eq!(
            encoded(|w| encode_int(i32::MAX, w)),
            vec![0xFE, 0xFF, 0xFF, 0xFF, 0x0F]
        );
    }

    #[test]
    fn test_encode_float_and_double() {
        assert_eq!(
            encoded(|w| encode_float(-10.0, w)),
            vec![0x00, 0x00, 0x20, 0xC1]
        );
        assert_eq!(
            encoded(|w| encode_double(2.0, w)),
            vec![0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x40]
        );
    }

    #[test]
    fn test_encode_string_and_bytes() {
        assert_eq!(
            encoded(|w| encode_string("foo", w)),
            vec![0x06, b'f', b'o', b'o']
        );
        assert_eq!(encoded(|w| encode_bytes(&[], w)), vec![0x00]);
        assert_eq!(
            encoded(|w| encode_bytes(&[0xAA, 0xBB], w)),
            vec![0x04, 0xAA, 0xBB]
        );
    }

    #[test]
    fn test_encode_fixed_has_no_prefix() {
        assert_eq!(
            encoded(|w| encode_fixed(&[0xAA, 0xBB, 0xCC], w)),
            vec![0xAA, 0xBB, 0xCC]
        );
    }
}
