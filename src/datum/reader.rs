//! Schema-driven decoding with writer/reader schema resolution.

use std::collections::HashMap;
use std::io::Read;

use indexmap::IndexMap;
use tracing::warn;

use crate::binary::{
    decode_block_header, decode_boolean, decode_bytes, decode_double, decode_fixed, decode_float,
    decode_int, decode_long, decode_null, decode_string, skip_blocks, skip_boolean, skip_bytes,
    skip_double, skip_fixed, skip_float, skip_int, skip_long, skip_null, skip_string,
};
use crate::datum::default::materialize_default;
use crate::datum::AvroValue;
use crate::error::DecodeError;
use crate::schema::{schemas_match, AvroSchema, SchemaResolutionContext, TypePromotion};

/// Reads Avro binary data written with a writer schema, optionally shaping
/// the result by a different reader schema.
///
/// Fields the reader does not know are skipped without being materialized.
/// Fields only the reader knows take their declared default; a reader-only
/// field without a default is left out of the result.
#[derive(Debug, Clone)]
pub struct DatumReader {
    writer_schema: AvroSchema,
    reader_schema: Option<AvroSchema>,
    writer_context: SchemaResolutionContext,
    reader_context: SchemaResolutionContext,
}

impl DatumReader {
    /// Create a reader that decodes with the writer schema only.
    pub fn new(writer_schema: AvroSchema) -> Self {
        let writer_context = SchemaResolutionContext::build_from_schema(&writer_schema);
        Self {
            writer_schema,
            reader_schema: None,
            reader_context: writer_context.clone(),
            writer_context,
        }
    }

    /// Create a reader that resolves data written with `writer_schema` into
    /// the shape of `reader_schema`.
    pub fn with_reader_schema(writer_schema: AvroSchema, reader_schema: AvroSchema) -> Self {
        Self {
            writer_context: SchemaResolutionContext::build_from_schema(&writer_schema),
            reader_context: SchemaResolutionContext::build_from_schema(&reader_schema),
            writer_schema,
            reader_schema: Some(reader_schema),
        }
    }

    /// The schema the data was written with.
    pub fn writer_schema(&self) -> &AvroSchema {
        &self.writer_schema
    }

    /// The schema results are shaped by (the writer schema unless a reader
    /// schema was supplied).
    pub fn reader_schema(&self) -> &AvroSchema {
        self.reader_schema.as_ref().unwrap_or(&self.writer_schema)
    }

    /// Decode one value.
    pub fn read<R: Read + ?Sized>(&self, reader: &mut R) -> Result<AvroValue, DecodeError> {
        self.read_data(&self.writer_schema, self.reader_schema(), reader)
    }

    fn read_data<R: Read + ?Sized>(
        &self,
        writer: &AvroSchema,
        reader: &AvroSchema,
        input: &mut R,
    ) -> Result<AvroValue, DecodeError> {
        let writer = self.writer_context.deref(writer).ok_or_else(|| unresolved(writer))?;
        let reader = self.reader_context.deref(reader).ok_or_else(|| unresolved(reader))?;

        if !schemas_match(writer, reader) {
            return Err(mismatch(writer, reader));
        }

        // A concrete writer type read through a reader union picks the first
        // branch that accepts it
        if let AvroSchema::Union(branches) = reader {
            if !matches!(writer, AvroSchema::Union(_)) {
                for branch in branches {
                    let resolved = self
                        .reader_context
                        .deref(branch)
                        .ok_or_else(|| unresolved(branch))?;
                    if schemas_match(writer, resolved) {
                        return self.read_data(writer, resolved, input);
                    }
                }
                return Err(mismatch(writer, reader));
            }
        }

        let value = match writer {
            AvroSchema::Null => {
                decode_null(input)?;
                AvroValue::Null
            }
            AvroSchema::Boolean => AvroValue::Boolean(decode_boolean(input)?),
            AvroSchema::Int => promote(writer, reader, AvroValue::Int(decode_int(input)?)),
            AvroSchema::Long => promote(writer, reader, AvroValue::Long(decode_long(input)?)),
            AvroSchema::Float => promote(writer, reader, AvroValue::Float(decode_float(input)?)),
            AvroSchema::Double => AvroValue::Double(decode_double(input)?),
            AvroSchema::Bytes => AvroValue::Bytes(decode_bytes(input)?),
            AvroSchema::String => AvroValue::String(decode_string(input)?),
            AvroSchema::Fixed(fixed) => AvroValue::Fixed(decode_fixed(input, fixed.size)?),
            AvroSchema::Enum(writer_enum) => {
                let index = decode_int(input)?;
                let symbol = usize::try_from(index)
                    .ok()
                    .and_then(|i| writer_enum.symbols.get(i))
                    .ok_or_else(|| {
                        DecodeError::InvalidData(format!(
                            "Enum index {} out of range for enum '{}' with {} symbols",
                            index,
                            writer_enum.name,
                            writer_enum.symbols.len()
                        ))
                    })?;
                let AvroSchema::Enum(reader_enum) = reader else {
                    return Err(mismatch(writer, reader));
                };
                if reader_enum.has_symbol(symbol) {
                    AvroValue::Enum(symbol.clone())
                } else if let Some(default) = &reader_enum.default {
                    warn!(
                        symbol = %symbol,
                        default = %default,
                        "Enum symbol unknown to reader, using default"
                    );
                    AvroValue::Enum(default.clone())
                } else {
                    return Err(mismatch(writer, reader));
                }
            }
            AvroSchema::Array(writer_items) => {
                let AvroSchema::Array(reader_items) = reader else {
                    return Err(mismatch(writer, reader));
                };
                let mut items = Vec::new();
                loop {
                    let header = decode_block_header(input)?;
                    if header.count == 0 {
                        break;
                    }
                    items.reserve(header.count.min(1024));
                    for _ in 0..header.count {
                        items.push(self.read_data(writer_items, reader_items, input)?);
                    }
                }
                AvroValue::Array(items)
            }
            AvroSchema::Map(writer_values) => {
                let AvroSchema::Map(reader_values) = reader else {
                    return Err(mismatch(writer, reader));
                };
                let mut entries = IndexMap::new();
                loop {
                    let header = decode_block_header(input)?;
                    if header.count == 0 {
                        break;
                    }
                    for _ in 0..header.count {
                        let key = decode_string(input)?;
                        let value = self.read_data(writer_values, reader_values, input)?;
                        entries.insert(key, value);
                    }
                }
                AvroValue::Map(entries)
            }
            AvroSchema::Union(branches) => {
                let index = decode_long(input)?;
                let branch = usize::try_from(index)
                    .ok()
                    .and_then(|i| branches.get(i))
                    .ok_or_else(|| {
                        DecodeError::InvalidData(format!(
                            "Union index {} out of range for union with {} branches",
                            index,
                            branches.len()
                        ))
                    })?;
                self.read_data(branch, reader, input)?
            }
            AvroSchema::Record(writer_record) => {
                let AvroSchema::Record(reader_record) = reader else {
                    return Err(mismatch(writer, reader));
                };

                let mut read = HashMap::with_capacity(writer_record.fields.len());
                for writer_field in &writer_record.fields {
                    match reader_record.field(&writer_field.name) {
                        Some(reader_field) => {
                            let value =
                                self.read_data(&writer_field.schema, &reader_field.schema, input)?;
                            read.insert(writer_field.name.as_str(), value);
                        }
                        None => self.skip_data(&writer_field.schema, input)?,
                    }
                }

                let mut fields = IndexMap::with_capacity(reader_record.fields.len());
                for reader_field in &reader_record.fields {
                    if let Some(value) = read.remove(reader_field.name.as_str()) {
                        fields.insert(reader_field.name.clone(), value);
                    } else if let Some(default) = &reader_field.default {
                        let value =
                            materialize_default(default, &reader_field.schema, &self.reader_context)?;
                        fields.insert(reader_field.name.clone(), value);
                    } else {
                        warn!(
                            record = %reader_record.fullname(),
                            field = %reader_field.name,
                            "Field missing from written data and has no default, omitting"
                        );
                    }
                }
                AvroValue::Record(fields)
            }
            AvroSchema::Named(_) => return Err(unresolved(writer)),
        };
        Ok(value)
    }

    /// Consume one value of `schema` without materializing it.
    fn skip_data<R: Read + ?Sized>(
        &self,
        schema: &AvroSchema,
        input: &mut R,
    ) -> Result<(), DecodeError> {
        let schema = self.writer_context.deref(schema).ok_or_else(|| unresolved(schema))?;
        match schema {
            AvroSchema::Null => skip_null(input),
            AvroSchema::Boolean => skip_boolean(input),
            AvroSchema::Int => skip_int(input),
            AvroSchema::Long => skip_long(input),
            AvroSchema::Float => skip_float(input),
            AvroSchema::Double => skip_double(input),
            AvroSchema::Bytes => skip_bytes(input),
            AvroSchema::String => skip_string(input),
            AvroSchema::Fixed(fixed) => skip_fixed(input, fixed.size),
            AvroSchema::Enum(_) => skip_int(input),
            AvroSchema::Array(items) => skip_blocks(input, |input| self.skip_data(items, input)),
            AvroSchema::Map(values) => skip_blocks(input, |input| {
                skip_string(input)?;
                self.skip_data(values, input)
            }),
            AvroSchema::Union(branches) => {
                let index = decode_long(input)?;
                let branch = usize::try_from(index)
                    .ok()
                    .and_then(|i| branches.get(i))
                    .ok_or_else(|| {
                        DecodeError::InvalidData(format!("Union index {} out of range", index))
                    })?;
                self.skip_data(branch, input)
            }
            AvroSchema::Record(record) => {
                for field in &record.fields {
                    self.skip_data(&field.schema, input)?;
                }
                Ok(())
            }
            AvroSchema::Named(_) => Err(unresolved(schema)),
        }
    }
}

/// Widen a numeric value to the reader's type when the schemas differ.
fn promote(writer: &AvroSchema, reader: &AvroSchema, value: AvroValue) -> AvroValue {
    match (TypePromotion::between(writer, reader), value) {
        (Some(TypePromotion::IntToLong), AvroValue::Int(i)) => AvroValue::Long(i as i64),
        (Some(TypePromotion::IntToFloat), AvroValue::Int(i)) => AvroValue::Float(i as f32),
        (Some(TypePromotion::IntToDouble), AvroValue::Int(i)) => AvroValue::Double(i as f64),
        (Some(TypePromotion::LongToFloat), AvroValue::Long(l)) => AvroValue::Float(l as f32),
        (Some(TypePromotion::LongToDouble), AvroValue::Long(l)) => AvroValue::Double(l as f64),
        (Some(TypePromotion::FloatToDouble), AvroValue::Float(f)) => AvroValue::Double(f as f64),
        (_, value) => value,
    }
}

fn mismatch(writer: &AvroSchema, reader: &AvroSchema) -> DecodeError {
    DecodeError::SchemaMismatch {
        writer: writer.to_json(),
        reader: reader.to_json(),
    }
}

fn unresolved(schema: &AvroSchema) -> DecodeError {
    DecodeError::InvalidData(format!("Unresolved named type reference: {}", schema))
}
