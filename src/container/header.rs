//! Container file header
//!
//! The header is the first section of a container file and contains:
//! - Magic bytes ("Obj\x01")
//! - Metadata map (including schema and codec)
//! - 16-byte sync marker

use std::io::{Read, Write};

use indexmap::IndexMap;
use tracing::warn;

use crate::codec::Codec;
use crate::container::{
    MAGIC, METADATA_CODEC_KEY, METADATA_SCHEMA_KEY, RESERVED_METADATA_PREFIX, SYNC_SIZE,
};
use crate::datum::{AvroValue, DatumReader, DatumWriter};
use crate::error::{ContainerError, DecodeError};
use crate::io::read_up_to;
use crate::schema::{parse_schema, AvroSchema};

/// Schema of the metadata map: `{"type": "map", "values": "bytes"}`.
pub fn metadata_schema() -> AvroSchema {
    AvroSchema::Map(Box::new(AvroSchema::Bytes))
}

/// Parsed container header.
#[derive(Debug, Clone)]
pub struct Header {
    /// Metadata entries in file order
    pub metadata: IndexMap<String, Vec<u8>>,
    /// 16-byte sync marker used to identify block boundaries
    pub sync_marker: [u8; SYNC_SIZE],
    /// Writer schema from `avro.schema`
    pub schema: AvroSchema,
    /// Block codec from `avro.codec`
    pub codec: Codec,
}

impl Header {
    /// Build the header of a new file.
    ///
    /// Reserved entries come first, followed by `extra` in order. Entries of
    /// `extra` under the reserved `avro.` prefix are dropped so the header
    /// always describes the schema and codec actually used.
    pub fn new(
        schema: AvroSchema,
        codec: Codec,
        extra: &IndexMap<String, Vec<u8>>,
        sync_marker: [u8; SYNC_SIZE],
    ) -> Self {
        let mut metadata = IndexMap::with_capacity(extra.len() + 2);
        metadata.insert(
            METADATA_CODEC_KEY.to_string(),
            codec.name().as_bytes().to_vec(),
        );
        metadata.insert(
            METADATA_SCHEMA_KEY.to_string(),
            schema.to_json().into_bytes(),
        );
        for (key, value) in extra {
            if key.starts_with(RESERVED_METADATA_PREFIX) {
                warn!(key = %key, "Ignoring reserved metadata key");
                continue;
            }
            metadata.insert(key.clone(), value.clone());
        }
        Self {
            metadata,
            sync_marker,
            schema,
            codec,
        }
    }

    /// Read and validate a header from the current position of `reader`.
    ///
    /// # Errors
    /// - `ContainerError::InvalidMagic` if the magic bytes are short or wrong
    /// - `ContainerError::TruncatedHeader` if the metadata or sync marker is cut off
    /// - `ContainerError::MissingMetadata` if there is no writer schema
    /// - `ContainerError::UnknownCodec` if the codec is not supported
    pub fn read<R: Read + ?Sized>(reader: &mut R) -> Result<Self, ContainerError> {
        Self::read_magic(reader)?;
        let metadata = Self::read_metadata(reader)?;

        let mut sync_marker = [0u8; SYNC_SIZE];
        let read = read_up_to(reader, &mut sync_marker)?;
        if read < SYNC_SIZE {
            return Err(ContainerError::TruncatedHeader(format!(
                "sync marker needs {} bytes, found {}",
                SYNC_SIZE, read
            )));
        }

        let schema = Self::extract_schema(&metadata)?;
        let codec = Self::extract_codec(&metadata)?;

        Ok(Self {
            metadata,
            sync_marker,
            schema,
            codec,
        })
    }

    fn read_magic<R: Read + ?Sized>(reader: &mut R) -> Result<(), ContainerError> {
        let mut magic = [0u8; 4];
        let read = read_up_to(reader, &mut magic)?;
        if read < magic.len() {
            return Err(ContainerError::InvalidMagic(format!(
                "expected {} magic bytes, found {}",
                magic.len(),
                read
            )));
        }
        if &magic != MAGIC {
            return Err(ContainerError::InvalidMagic(format!(
                "expected {:?}, found {:?}",
                MAGIC, magic
            )));
        }
        Ok(())
    }

    fn read_metadata<R: Read + ?Sized>(
        reader: &mut R,
    ) -> Result<IndexMap<String, Vec<u8>>, ContainerError> {
        let value = DatumReader::new(metadata_schema())
            .read(reader)
            .map_err(|e| match e {
                DecodeError::UnexpectedEof => {
                    ContainerError::TruncatedHeader("metadata map is cut off".to_string())
                }
                other => ContainerError::Decode(other),
            })?;

        let AvroValue::Map(entries) = value else {
            return Err(ContainerError::TruncatedHeader(
                "metadata is not a map".to_string(),
            ));
        };

        entries
            .into_iter()
            .map(|(key, value)| match value {
                AvroValue::Bytes(bytes) => Ok((key, bytes)),
                other => Err(ContainerError::TruncatedHeader(format!(
                    "metadata value for '{}' is {}",
                    key,
                    other.type_name()
                ))),
            })
            .collect()
    }

    fn extract_schema(metadata: &IndexMap<String, Vec<u8>>) -> Result<AvroSchema, ContainerError> {
        let schema_bytes = metadata
            .get(METADATA_SCHEMA_KEY)
            .ok_or(ContainerError::MissingMetadata(METADATA_SCHEMA_KEY))?;

        let schema_json = std::str::from_utf8(schema_bytes).map_err(|e| {
            ContainerError::TruncatedHeader(format!("schema is not valid UTF-8: {}", e))
        })?;

        Ok(parse_schema(schema_json)?)
    }

    /// A missing codec entry means the null codec.
    fn extract_codec(metadata: &IndexMap<String, Vec<u8>>) -> Result<Codec, ContainerError> {
        match metadata.get(METADATA_CODEC_KEY) {
            Some(codec_bytes) => {
                let name = String::from_utf8_lossy(codec_bytes);
                Codec::from_name(&name).map_err(|_| ContainerError::UnknownCodec(name.into_owned()))
            }
            None => Ok(Codec::Null),
        }
    }

    /// Write the header to `writer`.
    pub fn write<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), ContainerError> {
        writer.write_all(MAGIC)?;
        let metadata = AvroValue::Map(
            self.metadata
                .iter()
                .map(|(k, v)| (k.clone(), AvroValue::Bytes(v.clone())))
                .collect(),
        );
        DatumWriter::new(metadata_schema()).write(&metadata, writer)?;
        writer.write_all(&self.sync_marker)?;
        Ok(())
    }

    /// Get the schema as a JSON string.
    pub fn schema_json(&self) -> String {
        self.schema.to_json()
    }

    /// Get a metadata value by key.
    pub fn get_metadata(&self, key: &str) -> Option<&[u8]> {
        self.metadata.get(key).map(|v| v.as_slice())
    }

    /// Get a metadata value as a string.
    pub fn get_metadata_string(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .and_then(|v| std::str::from_utf8(v).ok())
    }
}
