//! Avro binary encoding of primitive values.
//!
//! Stateless encode/decode/skip functions over `std::io::Write` and
//! `std::io::Read`. A `&[u8]` cursor works as a reader, a `Vec<u8>` as a
//! writer.

pub mod decode;
pub mod encode;
pub mod varint;

pub use decode::{
    decode_block_header, decode_boolean, decode_bytes, decode_double, decode_fixed, decode_float,
    decode_int, decode_long, decode_null, decode_string, skip_blocks, skip_boolean, skip_bytes,
    skip_double, skip_exact, skip_fixed, skip_float, skip_int, skip_long, skip_null, skip_string,
    BlockHeader,
};
pub use encode::{
    encode_boolean, encode_bytes, encode_double, encode_fixed, encode_float, encode_int,
    encode_long, encode_null, encode_string,
};
pub use varint::{decode_varint, encode_varint, zigzag_decode, zigzag_encode};
