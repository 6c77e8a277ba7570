//! Container file reader

use std::io::SeekFrom;

use bytes::{Buf, Bytes};
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::codec::Codec;
use crate::container::block::Block;
use crate::container::header::Header;
use crate::container::{ReaderConfig, SYNC_SIZE};
use crate::datum::{AvroValue, DatumReader};
use crate::error::ContainerError;
use crate::io::{read_up_to, Stream};
use crate::schema::AvroSchema;

/// Reads the values stored in a container file.
///
/// Values are decoded one block at a time. The reader is also an
/// [`Iterator`] over `Result<AvroValue, ContainerError>`; iteration stops
/// after the first error.
#[derive(Debug)]
pub struct DataFileReader<S: Stream> {
    stream: S,
    header: Header,
    datum_reader: DatumReader,
    /// Decoded payload of the current block, consumed as records are read
    block: Bytes,
    block_remaining: usize,
    blocks_read: usize,
    block_index: usize,
    record_index: usize,
    closed: bool,
    finished: bool,
}

impl<S: Stream> DataFileReader<S> {
    /// Open a container file on `stream`, reading its header from the
    /// current position.
    ///
    /// When `config` carries a reader schema, every value is resolved from
    /// the writer schema in the header into that schema.
    pub fn new(mut stream: S, config: ReaderConfig) -> Result<Self, ContainerError> {
        let header = Header::read(&mut stream)?;

        debug!(
            codec = %header.codec,
            sync_marker = ?header.sync_marker,
            schema = %header.schema,
            "Read container header"
        );

        let datum_reader = match config.reader_schema {
            Some(reader_schema) => {
                DatumReader::with_reader_schema(header.schema.clone(), reader_schema)
            }
            None => DatumReader::new(header.schema.clone()),
        };

        Ok(Self {
            stream,
            header,
            datum_reader,
            block: Bytes::new(),
            block_remaining: 0,
            blocks_read: 0,
            block_index: 0,
            record_index: 0,
            closed: false,
            finished: false,
        })
    }

    /// Read the next value, or `None` at the end of the file.
    pub fn next_value(&mut self) -> Result<Option<AvroValue>, ContainerError> {
        if self.closed {
            return Err(ContainerError::Closed);
        }

        while self.block_remaining == 0 {
            if !self.load_next_block()? {
                return Ok(None);
            }
        }

        let mut cursor = &self.block[..];
        let before = cursor.len();
        let value = self
            .datum_reader
            .read(&mut cursor)
            .map_err(|source| ContainerError::Record {
                block_index: self.block_index,
                record_index: self.record_index,
                source,
            })?;
        let consumed = before - cursor.len();
        self.block.advance(consumed);

        self.block_remaining -= 1;
        self.record_index += 1;
        Ok(Some(value))
    }

    /// Position past the next sync marker and load the block after it.
    ///
    /// Returns `false` at the end of the stream.
    fn load_next_block(&mut self) -> Result<bool, ContainerError> {
        if self.stream.is_eof()? {
            return Ok(false);
        }
        self.skip_sync()?;
        if self.stream.is_eof()? {
            return Ok(false);
        }

        let block = Block::read(&mut self.stream, self.header.codec, self.blocks_read)?;
        self.blocks_read += 1;

        trace!(
            block_index = block.block_index,
            records = block.record_count,
            bytes = block.data.len(),
            "Read block"
        );

        self.block_remaining = block.record_count;
        self.block_index = block.block_index;
        self.record_index = 0;
        self.block = block.data;
        Ok(true)
    }

    /// Consume the sync marker if one is next, otherwise rewind.
    fn skip_sync(&mut self) -> Result<(), ContainerError> {
        let mut candidate = [0u8; SYNC_SIZE];
        let read = read_up_to(&mut self.stream, &mut candidate)?;
        if read != SYNC_SIZE || candidate != self.header.sync_marker {
            self.stream.seek(SeekFrom::Current(-(read as i64)))?;
        }
        Ok(())
    }

    /// Read all remaining values.
    pub fn read_all(&mut self) -> Result<Vec<AvroValue>, ContainerError> {
        let mut values = Vec::new();
        while let Some(value) = self.next_value()? {
            values.push(value);
        }
        Ok(values)
    }

    /// Close the underlying stream.
    pub fn close(&mut self) -> Result<(), ContainerError> {
        if self.closed {
            return Err(ContainerError::Closed);
        }
        self.stream.close()?;
        self.closed = true;
        Ok(())
    }

    /// Hand back the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// The parsed file header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// All metadata entries in file order.
    pub fn metadata(&self) -> &IndexMap<String, Vec<u8>> {
        &self.header.metadata
    }

    /// Get a metadata value by key.
    pub fn get_metadata(&self, key: &str) -> Option<&[u8]> {
        self.header.get_metadata(key)
    }

    /// Get a metadata value as a string.
    pub fn get_metadata_string(&self, key: &str) -> Option<&str> {
        self.header.get_metadata_string(key)
    }

    /// The file's sync marker.
    pub fn sync_marker(&self) -> &[u8; SYNC_SIZE] {
        &self.header.sync_marker
    }

    /// The schema the file was written with.
    pub fn writer_schema(&self) -> &AvroSchema {
        &self.header.schema
    }

    /// The schema values are returned in.
    pub fn reader_schema(&self) -> &AvroSchema {
        self.datum_reader.reader_schema()
    }

    /// The block codec.
    pub fn codec(&self) -> Codec {
        self.header.codec
    }
}

impl<S: Stream> Iterator for DataFileReader<S> {
    type Item = Result<AvroValue, ContainerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_value() {
            Ok(Some(value)) => Some(Ok(value)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Seek;

    use super::*;
    use crate::binary::encode_long;
    use crate::container::{DataFileWriter, WriterConfig};
    use crate::io::MemoryStream;

    fn write_ints_with_sync(values: &[i32], sync_interval: usize) -> (MemoryStream, [u8; SYNC_SIZE]) {
        let mut writer = DataFileWriter::new(
            MemoryStream::new(),
            AvroSchema::Int,
            WriterConfig::new().with_sync_interval(sync_interval),
        )
        .unwrap();
        for v in values {
            writer.append(&AvroValue::Int(*v)).unwrap();
        }
        let sync = *writer.sync_marker();
        let mut stream = writer.into_inner().unwrap();
        stream.seek(SeekFrom::Start(0)).unwrap();
        (stream, sync)
    }

    fn write_ints(values: &[i32], sync_interval: usize) -> MemoryStream {
        write_ints_with_sync(values, sync_interval).0
    }

    #[test]
    fn test_read_single_block() {
        let stream = write_ints(&[1, 2, 3], 1000);
        let mut reader = DataFileReader::new(stream, ReaderConfig::new()).unwrap();
        assert_eq!(
            reader.read_all().unwrap(),
            vec![AvroValue::Int(1), AvroValue::Int(2), AvroValue::Int(3)]
        );
        assert!(reader.next_value().unwrap().is_none());
    }

    #[test]
    fn test_read_many_blocks_as_iterator() {
        let values: Vec<i32> = (0..100).collect();
        let stream = write_ints(&values, 8);
        let reader = DataFileReader::new(stream, ReaderConfig::new()).unwrap();
        let read: Vec<AvroValue> = reader.map(|v| v.unwrap()).collect();
        assert_eq!(read, values.iter().map(|v| AvroValue::Int(*v)).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_file() {
        let stream = write_ints(&[], 1000);
        let mut reader = DataFileReader::new(stream, ReaderConfig::new()).unwrap();
        assert!(reader.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_empty_block_skipped() {
        let (mut stream, sync) = write_ints_with_sync(&[5], 1000);
        stream.seek(SeekFrom::End(0)).unwrap();
        let mut empty = Vec::new();
        encode_long(0, &mut empty).unwrap();
        encode_long(0, &mut empty).unwrap();
        empty.extend_from_slice(&sync);
        std::io::Write::write_all(&mut stream, &empty).unwrap();
        stream.seek(SeekFrom::Start(0)).unwrap();

        let mut reader = DataFileReader::new(stream, ReaderConfig::new()).unwrap();
        assert_eq!(reader.read_all().unwrap(), vec![AvroValue::Int(5)]);
    }

    #[test]
    fn test_reader_schema_promotes() {
        let stream = write_ints(&[7], 1000);
        let mut reader =
            DataFileReader::new(stream, ReaderConfig::new().with_reader_schema(AvroSchema::Long))
                .unwrap();
        assert_eq!(reader.writer_schema(), &AvroSchema::Int);
        assert_eq!(reader.reader_schema(), &AvroSchema::Long);
        assert_eq!(reader.read_all().unwrap(), vec![AvroValue::Long(7)]);
    }

    #[test]
    fn test_corrupt_record_reports_position() {
        let mut stream = write_ints(&[1, 2], 1000);
        let mut bytes = stream.as_bytes().to_vec();
        // Claim three records in a block that holds two
        let block_start = bytes.len() - SYNC_SIZE - 4;
        bytes[block_start] = 0x06;
        stream = MemoryStream::from_bytes(bytes);

        let mut reader = DataFileReader::new(stream, ReaderConfig::new()).unwrap();
        let results: Vec<_> = reader.by_ref().collect();
        assert_eq!(results.len(), 3);
        assert!(matches!(
            results[2],
            Err(ContainerError::Record {
                block_index: 0,
                record_index: 2,
                ..
            })
        ));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_closed_reader() {
        let stream = write_ints(&[1], 1000);
        let mut reader = DataFileReader::new(stream, ReaderConfig::new()).unwrap();
        reader.close().unwrap();
        assert!(matches!(reader.next_value(), Err(ContainerError::Closed)));
    }
}
