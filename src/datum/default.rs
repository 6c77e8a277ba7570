//! Materialization of field default values from their JSON literals.

use serde_json::Value;

use crate::datum::AvroValue;
use crate::error::DecodeError;
use crate::schema::{AvroSchema, SchemaResolutionContext};

/// Convert a JSON default literal into a value of `schema`.
///
/// Union defaults always belong to the union's first branch. Bytes and
/// fixed defaults are strings whose code points `0..=255` map to single
/// bytes.
pub fn materialize_default(
    default: &Value,
    schema: &AvroSchema,
    context: &SchemaResolutionContext,
) -> Result<AvroValue, DecodeError> {
    let invalid = || {
        DecodeError::InvalidData(format!(
            "Default value {} is not valid for schema {}",
            default, schema
        ))
    };

    let schema = context.deref(schema).ok_or_else(invalid)?;
    let value = match schema {
        AvroSchema::Null => match default {
            Value::Null => AvroValue::Null,
            _ => return Err(invalid()),
        },
        AvroSchema::Boolean => AvroValue::Boolean(default.as_bool().ok_or_else(invalid)?),
        AvroSchema::Int => {
            let n = default.as_i64().ok_or_else(invalid)?;
            AvroValue::Int(i32::try_from(n).map_err(|_| invalid())?)
        }
        AvroSchema::Long => AvroValue::Long(default.as_i64().ok_or_else(invalid)?),
        AvroSchema::Float => AvroValue::Float(default.as_f64().ok_or_else(invalid)? as f32),
        AvroSchema::Double => AvroValue::Double(default.as_f64().ok_or_else(invalid)?),
        AvroSchema::String => AvroValue::String(default.as_str().ok_or_else(invalid)?.to_string()),
        AvroSchema::Bytes => AvroValue::Bytes(string_to_bytes(default.as_str().ok_or_else(invalid)?)),
        AvroSchema::Fixed(fixed) => {
            let bytes = string_to_bytes(default.as_str().ok_or_else(invalid)?);
            if bytes.len() != fixed.size {
                return Err(invalid());
            }
            AvroValue::Fixed(bytes)
        }
        AvroSchema::Enum(e) => {
            let symbol = default.as_str().ok_or_else(invalid)?;
            if !e.has_symbol(symbol) {
                return Err(invalid());
            }
            AvroValue::Enum(symbol.to_string())
        }
        AvroSchema::Array(items) => AvroValue::Array(
            default
                .as_array()
                .ok_or_else(invalid)?
                .iter()
                .map(|item| materialize_default(item, items, context))
                .collect::<Result<_, DecodeError>>()?,
        ),
        AvroSchema::Map(values) => AvroValue::Map(
            default
                .as_object()
                .ok_or_else(invalid)?
                .iter()
                .map(|(k, v)| Ok((k.clone(), materialize_default(v, values, context)?)))
                .collect::<Result<_, DecodeError>>()?,
        ),
        AvroSchema::Union(variants) => {
            let first = variants.first().ok_or_else(invalid)?;
            materialize_default(default, first, context)?
        }
        AvroSchema::Record(record) => {
            let obj = default.as_object().ok_or_else(invalid)?;
            let mut fields = indexmap::IndexMap::with_capacity(record.fields.len());
            for field in &record.fields {
                let literal = obj
                    .get(&field.name)
                    .or(field.default.as_ref())
                    .ok_or_else(invalid)?;
                fields.insert(
                    field.name.clone(),
                    materialize_default(literal, &field.schema, context)?,
                );
            }
            AvroValue::Record(fields)
        }
        AvroSchema::Named(_) => return Err(invalid()),
    };
    Ok(value)
}

/// Code points up to 255 are taken as raw bytes; anything wider falls back
/// to the UTF-8 encoding of the whole string.
fn string_to_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect::<Option<Vec<u8>>>()
        .unwrap_or_else(|| s.as_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse_schema;
    use serde_json::json;

    fn default_for(schema: &str, default: Value) -> Result<AvroValue, DecodeError> {
        let schema = parse_schema(schema).unwrap();
        let context = SchemaResolutionContext::build_from_schema(&schema);
        materialize_default(&default, &schema, &context)
    }

    #[test]
    fn test_primitive_defaults() {
        assert_eq!(default_for(r#""int""#, json!(7)).unwrap(), AvroValue::Int(7));
        assert_eq!(default_for(r#""long""#, json!(7)).unwrap(), AvroValue::Long(7));
        assert_eq!(default_for(r#""double""#, json!(1)).unwrap(), AvroValue::Double(1.0));
        assert_eq!(default_for(r#""float""#, json!(0.5)).unwrap(), AvroValue::Float(0.5));
        assert_eq!(default_for(r#""null""#, json!(null)).unwrap(), AvroValue::Null);
        assert_eq!(
            default_for(r#""string""#, json!("hi")).unwrap(),
            AvroValue::String("hi".into())
        );
        assert!(default_for(r#""int""#, json!("7")).is_err());
        assert!(default_for(r#""int""#, json!(1i64 << 40)).is_err());
    }

    #[test]
    fn test_bytes_default_uses_code_points() {
        assert_eq!(
            default_for(r#""bytes""#, json!("\u{00ff}\u{0000}")).unwrap(),
            AvroValue::Bytes(vec![0xff, 0x00])
        );
        assert_eq!(
            default_for(r#""bytes""#, json!("\u{20ac}")).unwrap(),
            AvroValue::Bytes("\u{20ac}".as_bytes().to_vec())
        );
        assert!(default_for(r#"{"type": "fixed", "name": "F", "size": 2}"#, json!("a")).is_err());
    }

    #[test]
    fn test_union_default_uses_first_branch() {
        assert_eq!(default_for(r#"["null", "int"]"#, json!(null)).unwrap(), AvroValue::Null);
        assert_eq!(default_for(r#"["int", "null"]"#, json!(3)).unwrap(), AvroValue::Int(3));
        assert!(default_for(r#"["null", "int"]"#, json!(3)).is_err());
    }

    #[test]
    fn test_nested_defaults() {
        let schema = r#"{"type": "record", "name": "R", "fields": [
            {"name": "tags", "type": {"type": "array", "items": "string"}},
            {"name": "n", "type": "int", "default": 5},
            {"name": "m", "type": {"type": "map", "values": "long"}}
        ]}"#;
        let value = default_for(schema, json!({"tags": ["a"], "m": {"x": 1}})).unwrap();
        assert_eq!(
            value,
            AvroValue::record([
                ("tags", AvroValue::Array(vec!["a".into()])),
                ("n", AvroValue::Int(5)),
                ("m", AvroValue::map([("x", AvroValue::Long(1))])),
            ])
        );
        assert!(default_for(schema, json!({"n": 1})).is_err());
    }

    #[test]
    fn test_enum_default_must_be_symbol() {
        let schema = r#"{"type": "enum", "name": "E", "symbols": ["A", "B"]}"#;
        assert_eq!(default_for(schema, json!("B")).unwrap(), AvroValue::Enum("B".into()));
        assert!(default_for(schema, json!("Z")).is_err());
    }
}
