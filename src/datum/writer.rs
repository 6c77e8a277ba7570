//! Schema-driven encoding of values.

use std::io::Write;

use crate::binary::{
    encode_boolean, encode_bytes, encode_double, encode_fixed, encode_float, encode_int,
    encode_long, encode_null, encode_string,
};
use crate::datum::AvroValue;
use crate::error::EncodeError;
use crate::schema::{is_valid_datum_with_context, AvroSchema, SchemaResolutionContext};

/// Writes values in Avro binary form according to a writer schema.
///
/// Every value is validated before any byte is written, so a rejected
/// value leaves the output untouched.
///
/// # Example
/// ```
/// use avrolite::datum::{AvroValue, DatumWriter};
/// use avrolite::schema::parse_schema;
///
/// let writer = DatumWriter::new(parse_schema(r#"["null", "int"]"#).unwrap());
/// let mut out = Vec::new();
/// writer.write(&AvroValue::Int(1), &mut out).unwrap();
/// assert_eq!(out, [0x02, 0x02]);
/// ```
#[derive(Debug, Clone)]
pub struct DatumWriter {
    schema: AvroSchema,
    context: SchemaResolutionContext,
}

impl DatumWriter {
    /// Create a writer for `schema`, resolving named references against the
    /// named types the schema defines.
    pub fn new(schema: AvroSchema) -> Self {
        let context = SchemaResolutionContext::build_from_schema(&schema);
        Self { schema, context }
    }

    /// Create a writer with an explicit resolution context.
    pub fn with_context(schema: AvroSchema, context: SchemaResolutionContext) -> Self {
        Self { schema, context }
    }

    /// The writer schema.
    pub fn schema(&self) -> &AvroSchema {
        &self.schema
    }

    /// Validate `value` and encode it to `writer`.
    pub fn write<W: Write + ?Sized>(
        &self,
        value: &AvroValue,
        writer: &mut W,
    ) -> Result<(), EncodeError> {
        if !is_valid_datum_with_context(&self.schema, value, &self.context) {
            return Err(validation_error(&self.schema, value));
        }
        self.write_data(&self.schema, value, writer)
    }

    fn write_data<W: Write + ?Sized>(
        &self,
        schema: &AvroSchema,
        value: &AvroValue,
        writer: &mut W,
    ) -> Result<(), EncodeError> {
        match (schema, value) {
            (AvroSchema::Null, AvroValue::Null) => encode_null(writer)?,
            (AvroSchema::Boolean, AvroValue::Boolean(b)) => encode_boolean(*b, writer)?,
            (AvroSchema::Int, v) => {
                let n = v
                    .as_i64()
                    .and_then(|n| i32::try_from(n).ok())
                    .ok_or_else(|| validation_error(schema, v))?;
                encode_int(n, writer)?
            }
            (AvroSchema::Long, v) => {
                let n = v.as_i64().ok_or_else(|| validation_error(schema, v))?;
                encode_long(n, writer)?
            }
            (AvroSchema::Float, v) => {
                let f = v.as_f64().ok_or_else(|| validation_error(schema, v))?;
                encode_float(f as f32, writer)?
            }
            (AvroSchema::Double, v) => {
                let d = v.as_f64().ok_or_else(|| validation_error(schema, v))?;
                encode_double(d, writer)?
            }
            (AvroSchema::Bytes, AvroValue::Bytes(b)) => encode_bytes(b, writer)?,
            (AvroSchema::String, AvroValue::String(s)) => encode_string(s, writer)?,
            (AvroSchema::Fixed(_), AvroValue::Fixed(b) | AvroValue::Bytes(b)) => {
                encode_fixed(b, writer)?
            }
            (AvroSchema::Enum(e), AvroValue::Enum(s) | AvroValue::String(s)) => {
                let index = e
                    .symbol_index(s)
                    .and_then(|i| i32::try_from(i).ok())
                    .ok_or_else(|| validation_error(schema, value))?;
                encode_int(index, writer)?
            }
            (AvroSchema::Array(items), AvroValue::Array(values)) => {
                if !values.is_empty() {
                    encode_long(values.len() as i64, writer)?;
                    for item in values {
                        self.write_data(items, item, writer)?;
                    }
                }
                encode_long(0, writer)?
            }
            (AvroSchema::Map(values_schema), AvroValue::Map(entries)) => {
                if !entries.is_empty() {
                    encode_long(entries.len() as i64, writer)?;
                    for (key, item) in entries {
                        encode_string(key, writer)?;
                        self.write_data(values_schema, item, writer)?;
                    }
                }
                encode_long(0, writer)?
            }
            (AvroSchema::Union(variants), v) => {
                // First matching branch wins, not the best one
                let (index, variant) = variants
                    .iter()
                    .enumerate()
                    .find(|(_, variant)| is_valid_datum_with_context(variant, v, &self.context))
                    .ok_or_else(|| validation_error(schema, v))?;
                encode_long(index as i64, writer)?;
                self.write_data(variant, v, writer)?
            }
            (AvroSchema::Record(record), AvroValue::Record(fields)) => {
                for field in &record.fields {
                    let field_value = fields
                        .get(&field.name)
                        .ok_or_else(|| validation_error(schema, value))?;
                    self.write_data(&field.schema, field_value, writer)?;
                }
            }
            (AvroSchema::Named(name), v) => {
                let resolved = self
                    .context
                    .get(name)
                    .ok_or_else(|| validation_error(schema, v))?;
                self.write_data(resolved, v, writer)?
            }
            (schema, v) => return Err(validation_error(schema, v)),
        }
        Ok(())
    }
}

fn validation_error(schema: &AvroSchema, value: &AvroValue) -> EncodeError {
    EncodeError::Validation {
        schema: schema.to_json(),
        value: value.to_string(),
    }
}
