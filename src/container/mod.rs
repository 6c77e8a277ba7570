//! Object container files
//!
//! A container file frames a sequence of values written with one schema:
//! a header (magic, metadata with the writer schema and codec, sync marker)
//! followed by blocks of encoded values, each terminated by the sync marker.

mod block;
mod header;
mod reader;
mod writer;

use std::path::Path;

use indexmap::IndexMap;

pub use block::Block;
pub use header::{metadata_schema, Header};
pub use reader::DataFileReader;
pub use writer::DataFileWriter;

use crate::codec::Codec;
use crate::error::ContainerError;
use crate::io::{FileStream, Stream};
use crate::schema::AvroSchema;

/// Magic bytes that open every container file: "Obj" followed by version 1.
pub const MAGIC: &[u8; 4] = b"Obj\x01";

/// Size of the sync marker in bytes.
pub const SYNC_SIZE: usize = 16;

/// Default buffered block size in bytes before a block is flushed.
pub const SYNC_INTERVAL: usize = 64_000;

/// Metadata key holding the codec name.
pub const METADATA_CODEC_KEY: &str = "avro.codec";

/// Metadata key holding the writer schema JSON.
pub const METADATA_SCHEMA_KEY: &str = "avro.schema";

/// Schema of the header metadata map.
pub const METADATA_SCHEMA_JSON: &str = r#"{"type":"map","values":"bytes"}"#;

/// Name of the passthrough codec.
pub const NULL_CODEC: &str = "null";

/// Prefix reserved for metadata keys defined by the format.
const RESERVED_METADATA_PREFIX: &str = "avro.";

/// Configuration for a [`DataFileWriter`].
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Buffered bytes that trigger a block flush (default: 64,000).
    pub sync_interval: usize,
    /// Block codec (default: null).
    pub codec: Codec,
    /// Extra user metadata written after the reserved entries.
    pub metadata: IndexMap<String, Vec<u8>>,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            sync_interval: SYNC_INTERVAL,
            codec: Codec::Null,
            metadata: IndexMap::new(),
        }
    }
}

impl WriterConfig {
    /// Create a new WriterConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the block flush threshold in bytes.
    pub fn with_sync_interval(mut self, sync_interval: usize) -> Self {
        self.sync_interval = sync_interval;
        self
    }

    /// Set the block codec.
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    /// Set the block codec by name.
    ///
    /// # Example
    /// ```
    /// use avrolite::container::WriterConfig;
    ///
    /// assert!(WriterConfig::new().with_codec_name("null").is_ok());
    /// assert!(WriterConfig::new().with_codec_name("deflate").is_err());
    /// ```
    pub fn with_codec_name(self, name: &str) -> Result<Self, ContainerError> {
        Ok(self.with_codec(Codec::from_name(name)?))
    }

    /// Add a user metadata entry. Keys starting with `avro.` are reserved.
    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<Vec<u8>>,
    ) -> Result<Self, ContainerError> {
        let key = key.into();
        if key.starts_with(RESERVED_METADATA_PREFIX) {
            return Err(ContainerError::ReservedMetadataKey(key));
        }
        self.metadata.insert(key, value.into());
        Ok(self)
    }
}

/// Configuration for a [`DataFileReader`].
#[derive(Debug, Clone, Default)]
pub struct ReaderConfig {
    /// Optional reader schema for schema evolution (default: None).
    pub reader_schema: Option<AvroSchema>,
}

impl ReaderConfig {
    /// Create a new ReaderConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reader schema for schema evolution.
    pub fn with_reader_schema(mut self, schema: AvroSchema) -> Self {
        self.reader_schema = Some(schema);
        self
    }
}

/// Start a new container file on `stream` with default settings.
pub fn open_for_write<S: Stream>(
    stream: S,
    schema: &AvroSchema,
) -> Result<DataFileWriter<S>, ContainerError> {
    DataFileWriter::new(stream, schema.clone(), WriterConfig::default())
}

/// Open a container file for reading, optionally resolving values into
/// `reader_schema`.
pub fn open_for_read<S: Stream>(
    stream: S,
    reader_schema: Option<&AvroSchema>,
) -> Result<DataFileReader<S>, ContainerError> {
    let config = ReaderConfig {
        reader_schema: reader_schema.cloned(),
    };
    DataFileReader::new(stream, config)
}

/// Reopen an existing container file for appending more values.
pub fn open_for_append<S: Stream>(stream: S) -> Result<DataFileWriter<S>, ContainerError> {
    DataFileWriter::append_to(stream, WriterConfig::default())
}

/// Create (or truncate) a container file at `path`.
pub fn create_file(
    path: impl AsRef<Path>,
    schema: &AvroSchema,
) -> Result<DataFileWriter<FileStream>, ContainerError> {
    open_for_write(FileStream::create(path)?, schema)
}

/// Open the container file at `path` for reading.
pub fn open_file(
    path: impl AsRef<Path>,
    reader_schema: Option<&AvroSchema>,
) -> Result<DataFileReader<FileStream>, ContainerError> {
    open_for_read(FileStream::open(path)?, reader_schema)
}

/// Open the container file at `path` for appending.
pub fn append_file(path: impl AsRef<Path>) -> Result<DataFileWriter<FileStream>, ContainerError> {
    open_for_append(FileStream::open_append(path)?)
}
