//! Structural validation of values against a schema.

use crate::datum::AvroValue;
use crate::schema::{AvroSchema, SchemaResolutionContext};

/// Check whether `value` is an instance of `schema`.
///
/// Named references inside `schema` are resolved against the named types
/// defined in the schema itself.
///
/// # Example
/// ```
/// use avrolite::datum::AvroValue;
/// use avrolite::schema::{is_valid_datum, parse_schema};
///
/// let schema = parse_schema(r#"["null", "int"]"#).unwrap();
/// assert!(is_valid_datum(&schema, &AvroValue::Int(1)));
/// assert!(!is_valid_datum(&schema, &AvroValue::String("1".into())));
/// ```
pub fn is_valid_datum(schema: &AvroSchema, value: &AvroValue) -> bool {
    let context = SchemaResolutionContext::build_from_schema(schema);
    is_valid_datum_with_context(schema, value, &context)
}

/// Check whether `value` is an instance of `schema`, resolving named
/// references through `context`.
pub fn is_valid_datum_with_context(
    schema: &AvroSchema,
    value: &AvroValue,
    context: &SchemaResolutionContext,
) -> bool {
    match (schema, value) {
        (AvroSchema::Null, AvroValue::Null) => true,
        (AvroSchema::Boolean, AvroValue::Boolean(_)) => true,
        (AvroSchema::Int, AvroValue::Int(_)) => true,
        (AvroSchema::Int, AvroValue::Long(l)) => i32::try_from(*l).is_ok(),
        (AvroSchema::Long, AvroValue::Int(_) | AvroValue::Long(_)) => true,
        (AvroSchema::Float | AvroSchema::Double, v) => v.as_f64().is_some(),
        (AvroSchema::Bytes, AvroValue::Bytes(_)) => true,
        (AvroSchema::String, AvroValue::String(_)) => true,
        (AvroSchema::Fixed(fixed), AvroValue::Fixed(b) | AvroValue::Bytes(b)) => {
            b.len() == fixed.size
        }
        (AvroSchema::Enum(e), AvroValue::Enum(s) | AvroValue::String(s)) => e.has_symbol(s),
        (AvroSchema::Array(items), AvroValue::Array(values)) => values
            .iter()
            .all(|v| is_valid_datum_with_context(items, v, context)),
        (AvroSchema::Map(values_schema), AvroValue::Map(entries)) => entries
            .values()
            .all(|v| is_valid_datum_with_context(values_schema, v, context)),
        (AvroSchema::Union(variants), v) => variants
            .iter()
            .any(|variant| is_valid_datum_with_context(variant, v, context)),
        (AvroSchema::Record(record), AvroValue::Record(fields)) => {
            record.fields.iter().all(|field| {
                fields
                    .get(&field.name)
                    .is_some_and(|v| is_valid_datum_with_context(&field.schema, v, context))
            })
        }
        (AvroSchema::Named(name), v) => context
            .get(name)
            .is_some_and(|resolved| is_valid_datum_with_context(resolved, v, context)),
        _ => false,
    }
}
