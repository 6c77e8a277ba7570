//! Generic Avro values and the schema-driven datum reader and writer.
//!
//! [`DatumWriter`] validates and encodes an [`AvroValue`] under a writer
//! schema. [`DatumReader`] decodes bytes written under a writer schema,
//! resolving them against an optional reader schema.

mod default;
mod reader;
mod value;
mod writer;

pub use default::materialize_default;
pub use reader::DatumReader;
pub use value::AvroValue;
pub use writer::DatumWriter;
