//! Container file writer

use std::io::SeekFrom;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::codec::Codec;
use crate::container::block::Block;
use crate::container::header::Header;
use crate::container::{WriterConfig, SYNC_SIZE};
use crate::datum::{AvroValue, DatumWriter};
use crate::error::ContainerError;
use crate::io::Stream;
use crate::schema::AvroSchema;

/// Writes values into a container file.
///
/// Appended values are buffered in memory and written as one block once the
/// buffer reaches the configured sync interval. [`close`](Self::close)
/// writes whatever is still buffered; dropping a writer without closing it
/// loses the pending block.
pub struct DataFileWriter<S: Stream> {
    stream: S,
    header: Header,
    datum_writer: DatumWriter,
    buffer: BytesMut,
    block_count: usize,
    blocks_written: usize,
    sync_interval: usize,
    closed: bool,
}

impl<S: Stream> DataFileWriter<S> {
    /// Start a new file on `stream` and write its header.
    ///
    /// A fresh random sync marker is generated for the file.
    pub fn new(
        mut stream: S,
        schema: AvroSchema,
        config: WriterConfig,
    ) -> Result<Self, ContainerError> {
        let sync_marker: [u8; SYNC_SIZE] = rand::random();
        let header = Header::new(schema, config.codec, &config.metadata, sync_marker);
        header.write(&mut stream)?;

        debug!(
            codec = %header.codec,
            sync_marker = ?header.sync_marker,
            metadata_entries = header.metadata.len(),
            "Wrote container header"
        );

        Ok(Self::from_parts(stream, header, config.sync_interval))
    }

    /// Reopen an existing file for appending.
    ///
    /// The header is re-read from the start of the stream to recover the
    /// sync marker, codec and writer schema, then the stream is positioned
    /// at its end. Only `sync_interval` is taken from `config`; the codec
    /// and metadata of the existing file are kept.
    pub fn append_to(mut stream: S, config: WriterConfig) -> Result<Self, ContainerError> {
        stream.seek(SeekFrom::Start(0))?;
        let header = Header::read(&mut stream)?;
        let end = stream.seek(SeekFrom::End(0))?;

        debug!(
            codec = %header.codec,
            schema = %header.schema,
            offset = end,
            "Reopened container for append"
        );

        Ok(Self::from_parts(stream, header, config.sync_interval))
    }

    fn from_parts(stream: S, header: Header, sync_interval: usize) -> Self {
        Self {
            stream,
            datum_writer: DatumWriter::new(header.schema.clone()),
            header,
            buffer: BytesMut::new(),
            block_count: 0,
            blocks_written: 0,
            sync_interval,
            closed: false,
        }
    }

    /// Append one value.
    ///
    /// The value is validated against the writer schema first; a rejected
    /// value is not buffered and earlier values are unaffected.
    pub fn append(&mut self, value: &AvroValue) -> Result<(), ContainerError> {
        if self.closed {
            return Err(ContainerError::Closed);
        }

        let mut buffer = (&mut self.buffer).writer();
        self.datum_writer.write(value, &mut buffer)?;
        self.block_count += 1;

        if self.buffer.len() >= self.sync_interval {
            self.write_block()?;
        }
        Ok(())
    }

    /// Append every value from `values`, stopping at the first error.
    pub fn append_all<'a, I>(&mut self, values: I) -> Result<usize, ContainerError>
    where
        I: IntoIterator<Item = &'a AvroValue>,
    {
        let mut appended = 0;
        for value in values {
            self.append(value)?;
            appended += 1;
        }
        Ok(appended)
    }

    /// Write any buffered values as a block and flush the stream.
    pub fn flush(&mut self) -> Result<(), ContainerError> {
        if self.closed {
            return Err(ContainerError::Closed);
        }
        self.write_block()?;
        self.stream.flush()?;
        Ok(())
    }

    fn write_block(&mut self) -> Result<(), ContainerError> {
        if self.block_count == 0 {
            return Ok(());
        }

        // The pending block stays buffered until the stream accepts it
        let data = Bytes::copy_from_slice(&self.buffer);
        let size = Block::write(
            &mut self.stream,
            self.header.codec,
            self.block_count,
            data,
            &self.header.sync_marker,
        )?;
        self.buffer.clear();

        debug!(
            block_index = self.blocks_written,
            records = self.block_count,
            bytes = size,
            "Flushed block"
        );

        self.blocks_written += 1;
        self.block_count = 0;
        Ok(())
    }

    /// Write the pending block and close the stream.
    ///
    /// Closing twice is an error.
    pub fn close(&mut self) -> Result<(), ContainerError> {
        self.flush()?;
        self.stream.close()?;
        self.closed = true;
        Ok(())
    }

    /// Write the pending block, flush, and hand back the stream without
    /// closing it.
    pub fn into_inner(mut self) -> Result<S, ContainerError> {
        if !self.closed {
            self.flush()?;
        }
        Ok(self.stream)
    }

    /// The parsed header of the file being written.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The writer schema.
    pub fn schema(&self) -> &AvroSchema {
        &self.header.schema
    }

    /// The block codec.
    pub fn codec(&self) -> Codec {
        self.header.codec
    }

    /// The file's sync marker.
    pub fn sync_marker(&self) -> &[u8; SYNC_SIZE] {
        &self.header.sync_marker
    }

    /// Get a metadata value by key.
    pub fn get_metadata(&self, key: &str) -> Option<&[u8]> {
        self.header.get_metadata(key)
    }

    /// Number of values buffered but not yet written as a block.
    pub fn pending_records(&self) -> usize {
        self.block_count
    }

    /// Number of blocks written by this writer.
    pub fn blocks_written(&self) -> usize {
        self.blocks_written
    }
}
