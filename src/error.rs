//! Error types for schema parsing, binary encoding and container files

use std::io;
use thiserror::Error;

/// Errors raised while parsing or validating a schema definition.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema text is not valid JSON
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Structural rule violated (missing or mistyped attribute, bad union, ...)
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
    /// Name or namespace does not follow the naming rules
    #[error("Invalid name: {0}")]
    InvalidName(String),
    /// A named type was registered twice
    #[error("Name \"{0}\" is already in use")]
    DuplicateName(String),
    /// A named type uses a type keyword as its fullname
    #[error("Name \"{0}\" is a reserved type name")]
    ReservedName(String),
    /// Type keyword or reference that resolves to nothing
    #[error("Undefined type: {0}")]
    UnknownType(String),
    /// Recognized keyword that is only meaningful inside a protocol
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),
}

/// Errors raised while writing a datum.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The value does not conform to the writer schema
    #[error("The datum {value} is not an example of schema {schema}")]
    Validation { schema: String, value: String },
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised while reading a datum.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Invalid Avro data
    #[error("Invalid data: {0}")]
    InvalidData(String),
    /// Unexpected end of data
    #[error("Unexpected end of file")]
    UnexpectedEof,
    /// Invalid varint encoding
    #[error("Invalid varint encoding")]
    InvalidVarint,
    /// String is not valid UTF-8
    #[error("Invalid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    /// Writer and reader schemas cannot be reconciled
    #[error("Writer's schema {writer} and reader's schema {reader} do not match")]
    SchemaMismatch { writer: String, reader: String },
    /// IO error
    #[error("IO error: {0}")]
    Io(#[source] io::Error),
}

impl From<io::Error> for DecodeError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            DecodeError::UnexpectedEof
        } else {
            DecodeError::Io(err)
        }
    }
}

/// Errors that can occur during codec operations
#[derive(Debug, Error)]
pub enum CodecError {
    /// Unsupported codec
    #[error("Unsupported codec: {0}")]
    UnsupportedCodec(String),
}

/// Top-level container file error type
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Magic bytes missing or wrong
    #[error("Not an Avro data file: {0}")]
    InvalidMagic(String),

    /// Header ended early or is malformed
    #[error("Truncated or malformed header: {0}")]
    TruncatedHeader(String),

    /// Codec named in the file metadata is not known
    #[error("Unknown codec: {0}")]
    UnknownCodec(String),

    /// File metadata carries no writer schema
    #[error("Missing '{0}' metadata entry")]
    MissingMetadata(&'static str),

    /// User metadata tried to use a reserved `avro.` key
    #[error("Metadata key '{0}' is reserved")]
    ReservedMetadataKey(String),

    /// Operation on a writer or reader that was already closed
    #[error("Container is closed")]
    Closed,

    /// Schema error
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Codec error
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Encode error while appending a datum
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Decode error outside a data block (header, block framing)
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Decode error in a block/record
    #[error("Decode error in block {block_index}, record {record_index}: {source}")]
    Record {
        block_index: usize,
        record_index: usize,
        #[source]
        source: DecodeError,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
