//! Schema-driven Avro serialization
//!
//! This library parses Avro schemas, encodes and decodes values in the Avro
//! binary format (resolving differences between writer and reader schemas),
//! and reads and writes object container files.
//!
//! # Example
//! ```
//! use avrolite::container::{open_for_read, open_for_write};
//! use avrolite::io::MemoryStream;
//! use avrolite::{parse_schema, AvroValue};
//!
//! let schema = parse_schema(r#"{"type": "record", "name": "User", "fields": [
//!     {"name": "id", "type": "long"}
//! ]}"#).unwrap();
//!
//! let mut writer = open_for_write(MemoryStream::new(), &schema).unwrap();
//! writer.append(&AvroValue::record([("id", AvroValue::Long(1))])).unwrap();
//! let bytes = writer.into_inner().unwrap().into_inner();
//!
//! let mut reader = open_for_read(MemoryStream::from_bytes(bytes), None).unwrap();
//! let users = reader.read_all().unwrap();
//! assert_eq!(users[0].field("id"), Some(&AvroValue::Long(1)));
//! ```

pub mod binary;
pub mod codec;
pub mod container;
pub mod datum;
pub mod error;
pub mod io;
pub mod schema;

// Re-export main types
pub use codec::Codec;
pub use container::{
    append_file, create_file, open_file, open_for_append, open_for_read, open_for_write,
    DataFileReader, DataFileWriter, ReaderConfig, WriterConfig,
};
pub use datum::{AvroValue, DatumReader, DatumWriter};
pub use error::{CodecError, ContainerError, DecodeError, EncodeError, SchemaError};
pub use io::{FileStream, MemoryStream, Stream};
pub use schema::{
    is_valid_datum, parse_schema, AvroSchema, EnumSchema, FieldOrder, FieldSchema, FixedSchema,
    RecordSchema, SchemaParser,
};
