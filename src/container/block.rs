//! Data block framing
//!
//! Each block is a `long` record count, a `long` payload size, the
//! codec-encoded payload and the file's sync marker.

use std::io::{Read, Write};

use bytes::Bytes;

use crate::binary::{decode_long, encode_long};
use crate::codec::Codec;
use crate::container::SYNC_SIZE;
use crate::error::{ContainerError, DecodeError};

/// A single data block with its payload already decoded by the codec.
#[derive(Debug, Clone)]
pub struct Block {
    /// Number of records in this block
    pub record_count: usize,
    /// The decoded data containing serialized records
    pub data: Bytes,
    /// Sequential block number (for error reporting)
    pub block_index: usize,
}

impl Block {
    /// Read the block starting at the current position, excluding the
    /// trailing sync marker.
    pub fn read<R: Read + ?Sized>(
        reader: &mut R,
        codec: Codec,
        block_index: usize,
    ) -> Result<Self, ContainerError> {
        let record_count = decode_long(reader)?;
        let size = decode_long(reader)?;

        if record_count < 0 {
            return Err(DecodeError::InvalidData(format!(
                "Invalid negative record count {} in block {}",
                record_count, block_index
            ))
            .into());
        }
        if size < 0 {
            return Err(DecodeError::InvalidData(format!(
                "Invalid negative block size {} in block {}",
                size, block_index
            ))
            .into());
        }

        let size = size as u64;
        let mut payload = Vec::new();
        let read = reader.take(size).read_to_end(&mut payload)?;
        if (read as u64) < size {
            return Err(DecodeError::UnexpectedEof.into());
        }

        Ok(Self {
            record_count: record_count as usize,
            data: codec.decompress(Bytes::from(payload))?,
            block_index,
        })
    }

    /// Check if this block is empty (contains no records).
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    /// Write a block of `record_count` serialized records followed by the
    /// sync marker.
    pub fn write<W: Write + ?Sized>(
        writer: &mut W,
        codec: Codec,
        record_count: usize,
        data: Bytes,
        sync_marker: &[u8; SYNC_SIZE],
    ) -> Result<usize, ContainerError> {
        let payload = codec.compress(data)?;
        encode_long(record_count as i64, writer)?;
        encode_long(payload.len() as i64, writer)?;
        writer.write_all(&payload)?;
        writer.write_all(sync_marker)?;
        Ok(payload.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_layout() {
        let mut out = Vec::new();
        let written = Block::write(
            &mut out,
            Codec::Null,
            2,
            Bytes::from_static(&[0x02, 0x04]),
            &[9u8; SYNC_SIZE],
        )
        .unwrap();
        assert_eq!(written, 2);
        assert_eq!(&out[..4], &[0x04, 0x04, 0x02, 0x04]);
        assert_eq!(&out[4..], &[9u8; SYNC_SIZE]);
    }

    #[test]
    fn test_read_block() {
        let mut data: &[u8] = &[0x04, 0x04, 0x02, 0x04, 0xaa];
        let block = Block::read(&mut data, Codec::Null, 3).unwrap();
        assert_eq!(block.record_count, 2);
        assert_eq!(&block.data[..], &[0x02, 0x04]);
        assert_eq!(block.block_index, 3);
        assert!(!block.is_empty());
        assert_eq!(data, &[0xaa]);
    }

    #[test]
    fn test_read_truncated_payload() {
        let mut data: &[u8] = &[0x02, 0x08, 0x01];
        assert!(matches!(
            Block::read(&mut data, Codec::Null, 0),
            Err(ContainerError::Decode(DecodeError::UnexpectedEof))
        ));
    }

    #[test]
    fn test_negative_count_rejected() {
        let mut data: &[u8] = &[0x01, 0x00];
        assert!(matches!(
            Block::read(&mut data, Codec::Null, 0),
            Err(ContainerError::Decode(DecodeError::InvalidData(_)))
        ));
    }
}
