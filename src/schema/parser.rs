//! JSON schema parser for Avro schemas.
//!
//! Parses Avro schema JSON into the AvroSchema type hierarchy.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::SchemaError;
use crate::schema::name::{Name, NamedSchemata};
use crate::schema::{
    AvroSchema, EnumSchema, FieldOrder, FieldSchema, FixedSchema, RecordSchema,
    SchemaResolutionContext,
};

/// Parse an Avro schema from a JSON string.
///
/// # Arguments
/// * `json` - JSON string representing an Avro schema
///
/// # Returns
/// The parsed AvroSchema or a SchemaError
///
/// # Example
/// ```
/// use avrolite::schema::{parse_schema, AvroSchema};
///
/// let schema = parse_schema(r#"{"type": "array", "items": "int"}"#).unwrap();
/// assert_eq!(schema, AvroSchema::Array(Box::new(AvroSchema::Int)));
/// ```
pub fn parse_schema(json: &str) -> Result<AvroSchema, SchemaError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| SchemaError::ParseError(format!("Invalid JSON: {}", e)))?;
    parse_schema_value(&value)
}

/// Parse an Avro schema from an already decoded JSON value.
pub fn parse_schema_value(value: &Value) -> Result<AvroSchema, SchemaError> {
    let mut parser = SchemaParser::new();
    let schema = parser.parse(value)?;
    debug!(
        type_name = schema.type_name(),
        named_types = parser.named_types().len(),
        "Parsed schema"
    );
    Ok(schema)
}

/// Schema parser with named type resolution context.
///
/// Maintains a registry of named types (records, enums, fixed) for resolving
/// type references during parsing. One parser corresponds to one parse
/// session: fullnames must be unique within it.
#[derive(Debug, Default)]
pub struct SchemaParser {
    /// Registry of named types by their fully qualified name
    names: NamedSchemata,
}

impl SchemaParser {
    /// Create a new SchemaParser with an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON value into an AvroSchema.
    pub fn parse(&mut self, value: &Value) -> Result<AvroSchema, SchemaError> {
        self.parse_in_namespace(value, None)
    }

    /// All named types registered so far.
    pub fn named_types(&self) -> &NamedSchemata {
        &self.names
    }

    /// Finish the session, freezing the registry into a lookup context.
    pub fn into_context(self) -> SchemaResolutionContext {
        self.names.freeze()
    }

    fn parse_in_namespace(
        &mut self,
        value: &Value,
        namespace: Option<&str>,
    ) -> Result<AvroSchema, SchemaError> {
        match value {
            Value::String(s) => self.parse_string_schema(s, namespace),
            Value::Object(obj) => self.parse_object_schema(obj, namespace),
            Value::Array(arr) => self.parse_union_schema(arr, namespace),
            other => Err(SchemaError::InvalidSchema(format!(
                "{} is not a schema we know about",
                other
            ))),
        }
    }

    /// Parse a primitive type or named type reference from a string.
    fn parse_string_schema(
        &self,
        s: &str,
        namespace: Option<&str>,
    ) -> Result<AvroSchema, SchemaError> {
        if let Some(primitive) = AvroSchema::primitive(s) {
            return Ok(primitive);
        }
        self.resolve_reference(s, namespace)
            .ok_or_else(|| SchemaError::UnknownType(s.to_string()))
    }

    /// Look a type name up in the registry, qualifying it with the enclosing
    /// namespace first and falling back to the null namespace.
    fn resolve_reference(&self, s: &str, namespace: Option<&str>) -> Option<AvroSchema> {
        let qualified = Name::new(s, None, namespace).ok()?;
        if self.names.has_name(qualified.fullname()) {
            return Some(AvroSchema::Named(qualified.fullname().to_string()));
        }
        if namespace.is_some() && !s.contains('.') && self.names.has_name(s) {
            return Some(AvroSchema::Named(s.to_string()));
        }
        None
    }

    /// Parse a complex type from a JSON object.
    fn parse_object_schema(
        &mut self,
        obj: &Map<String, Value>,
        namespace: Option<&str>,
    ) -> Result<AvroSchema, SchemaError> {
        let type_str = match obj.get("type") {
            Some(Value::String(s)) => s.as_str(),
            Some(other) => {
                return Err(SchemaError::InvalidSchema(format!(
                    "'type' attribute must be a string, found {}",
                    other
                )))
            }
            None => {
                return Err(SchemaError::InvalidSchema(
                    "Missing 'type' attribute".to_string(),
                ))
            }
        };

        // Primitive types can also appear as objects
        if let Some(primitive) = AvroSchema::primitive(type_str) {
            return Ok(primitive);
        }

        match type_str {
            "record" => self.parse_record_schema(obj, namespace, false),
            "error" => self.parse_record_schema(obj, namespace, true),
            "enum" => self.parse_enum_schema(obj, namespace),
            "fixed" => self.parse_fixed_schema(obj, namespace),
            "array" => self.parse_array_schema(obj, namespace),
            "map" => self.parse_map_schema(obj, namespace),
            "request" | "error_union" => Err(SchemaError::UnsupportedType(format!(
                "'{}' is only valid inside a protocol message",
                type_str
            ))),
            other => self
                .resolve_reference(other, namespace)
                .ok_or_else(|| SchemaError::UnknownType(other.to_string())),
        }
    }

    /// Parse a union schema from a JSON array.
    fn parse_union_schema(
        &mut self,
        arr: &[Value],
        namespace: Option<&str>,
    ) -> Result<AvroSchema, SchemaError> {
        if arr.is_empty() {
            return Err(SchemaError::InvalidSchema(
                "Union schema cannot be empty".to_string(),
            ));
        }

        let variants = arr
            .iter()
            .map(|v| self.parse_in_namespace(v, namespace))
            .collect::<Result<Vec<_>, _>>()?;

        validate_union(&variants)?;

        Ok(AvroSchema::Union(variants))
    }

    /// Resolve the name of a named type and claim it in the registry.
    fn register_name(
        &mut self,
        obj: &Map<String, Value>,
        namespace: Option<&str>,
        kind: &str,
    ) -> Result<Name, SchemaError> {
        let name = match obj.get("name") {
            Some(Value::String(s)) => s.as_str(),
            _ => {
                return Err(SchemaError::InvalidName(format!(
                    "{} requires a non-empty string \"name\" attribute",
                    kind
                )))
            }
        };

        let explicit_namespace = match obj.get("namespace") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.as_str()),
            Some(_) => {
                return Err(SchemaError::InvalidName(
                    "Namespace must be a non-empty string.".to_string(),
                ))
            }
        };

        let name = Name::new(name, explicit_namespace, namespace)?;
        self.names.register(&name)?;
        Ok(name)
    }

    /// Parse a record (or error) schema.
    fn parse_record_schema(
        &mut self,
        obj: &Map<String, Value>,
        namespace: Option<&str>,
        is_error: bool,
    ) -> Result<AvroSchema, SchemaError> {
        let name = self.register_name(obj, namespace, "Record")?;
        let doc = parse_doc(obj)?;

        let fields_value = obj.get("fields").and_then(Value::as_array).ok_or_else(|| {
            SchemaError::InvalidSchema("Record schema requires a \"fields\" list".to_string())
        })?;

        // Nested types default to the record's own namespace
        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(fields_value.len());
        for field in fields_value {
            let field = self.parse_field_schema(field, name.namespace())?;
            if !seen.insert(field.name.clone()) {
                return Err(SchemaError::InvalidSchema(format!(
                    "Field name {} is already in use",
                    field.name
                )));
            }
            fields.push(field);
        }

        let schema = AvroSchema::Record(RecordSchema {
            name: name.name().to_string(),
            namespace: name.namespace().map(String::from),
            fields,
            doc,
            is_error,
        });

        self.names.complete(name.fullname(), schema.clone());
        Ok(schema)
    }

    /// Parse a field schema within a record.
    fn parse_field_schema(
        &mut self,
        value: &Value,
        namespace: Option<&str>,
    ) -> Result<FieldSchema, SchemaError> {
        let obj = value
            .as_object()
            .ok_or_else(|| SchemaError::InvalidSchema("Field must be an object".to_string()))?;

        let name = match obj.get("name") {
            Some(Value::String(s)) => s.clone(),
            _ => {
                return Err(SchemaError::InvalidSchema(
                    "Field requires a \"name\" attribute".to_string(),
                ))
            }
        };
        if !crate::schema::name::is_well_formed_name(&name) {
            return Err(SchemaError::InvalidName(format!(
                "Invalid field name \"{}\"",
                name
            )));
        }

        let type_value = obj.get("type").ok_or_else(|| {
            SchemaError::InvalidSchema(format!("Field \"{}\" requires a \"type\" attribute", name))
        })?;
        let schema = self.parse_in_namespace(type_value, namespace)?;

        // A present key counts as a default, even when it is null
        let default = obj.get("default").cloned();

        let order = match obj.get("order") {
            None | Some(Value::Null) => FieldOrder::Ascending,
            Some(Value::String(s)) => FieldOrder::from_name(s).ok_or_else(|| {
                SchemaError::InvalidSchema(format!("Invalid field sort order {}", s))
            })?,
            Some(other) => {
                return Err(SchemaError::InvalidSchema(format!(
                    "Invalid field sort order {}",
                    other
                )))
            }
        };

        let doc = parse_doc(obj)?;

        Ok(FieldSchema {
            name,
            schema,
            default,
            doc,
            order,
        })
    }

    /// Parse an enum schema.
    fn parse_enum_schema(
        &mut self,
        obj: &Map<String, Value>,
        namespace: Option<&str>,
    ) -> Result<AvroSchema, SchemaError> {
        let name = self.register_name(obj, namespace, "Enum")?;
        let doc = parse_doc(obj)?;

        let symbols_value = obj.get("symbols").and_then(Value::as_array).ok_or_else(|| {
            SchemaError::InvalidSchema("Enum Schema symbols are not a list".to_string())
        })?;

        let mut symbols = Vec::with_capacity(symbols_value.len());
        let mut seen = HashSet::new();
        for symbol in symbols_value {
            let symbol = match symbol {
                Value::String(s) if !s.is_empty() => s.clone(),
                other => {
                    return Err(SchemaError::InvalidSchema(format!(
                        "Enum schema symbol must be a non-empty string: {}",
                        other
                    )))
                }
            };
            if !seen.insert(symbol.clone()) {
                return Err(SchemaError::InvalidSchema(format!(
                    "Duplicate symbol: {}",
                    symbol
                )));
            }
            symbols.push(symbol);
        }

        let default = match obj.get("default") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if seen.contains(s) => Some(s.clone()),
            Some(other) => {
                return Err(SchemaError::InvalidSchema(format!(
                    "Enum default {} is not one of the symbols",
                    other
                )))
            }
        };

        let schema = AvroSchema::Enum(EnumSchema {
            name: name.name().to_string(),
            namespace: name.namespace().map(String::from),
            symbols,
            doc,
            default,
        });

        self.names.complete(name.fullname(), schema.clone());
        Ok(schema)
    }

    /// Parse a fixed schema.
    fn parse_fixed_schema(
        &mut self,
        obj: &Map<String, Value>,
        namespace: Option<&str>,
    ) -> Result<AvroSchema, SchemaError> {
        let name = self.register_name(obj, namespace, "Fixed")?;

        let size = obj
            .get("size")
            .and_then(Value::as_u64)
            .and_then(|s| usize::try_from(s).ok())
            .ok_or_else(|| {
                SchemaError::InvalidSchema(
                    "Fixed Schema requires a valid integer for \"size\" attribute".to_string(),
                )
            })?;

        let schema = AvroSchema::Fixed(FixedSchema {
            name: name.name().to_string(),
            namespace: name.namespace().map(String::from),
            size,
        });

        self.names.complete(name.fullname(), schema.clone());
        Ok(schema)
    }

    /// Parse an array schema.
    fn parse_array_schema(
        &mut self,
        obj: &Map<String, Value>,
        namespace: Option<&str>,
    ) -> Result<AvroSchema, SchemaError> {
        let items = obj.get("items").ok_or_else(|| {
            SchemaError::InvalidSchema("Array schema requires an \"items\" attribute".to_string())
        })?;

        let item_schema = self.parse_in_namespace(items, namespace)?;
        Ok(AvroSchema::Array(Box::new(item_schema)))
    }

    /// Parse a map schema.
    fn parse_map_schema(
        &mut self,
        obj: &Map<String, Value>,
        namespace: Option<&str>,
    ) -> Result<AvroSchema, SchemaError> {
        let values = obj.get("values").ok_or_else(|| {
            SchemaError::InvalidSchema("Map schema requires a \"values\" attribute".to_string())
        })?;

        let value_schema = self.parse_in_namespace(values, namespace)?;
        Ok(AvroSchema::Map(Box::new(value_schema)))
    }
}

fn parse_doc(obj: &Map<String, Value>) -> Result<Option<String>, SchemaError> {
    match obj.get("doc") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(SchemaError::InvalidSchema(
            "Schema doc attribute must be a string".to_string(),
        )),
    }
}

/// Validate union schema rules.
///
/// Avro unions must:
/// - Not contain nested unions
/// - Not contain two unnamed schemas of the same type
/// - Not contain two named schemas with the same fullname
fn validate_union(variants: &[AvroSchema]) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for variant in variants {
        if matches!(variant, AvroSchema::Union(_)) {
            return Err(SchemaError::InvalidSchema(
                "Unions cannot contain other unions".to_string(),
            ));
        }

        let key = variant
            .fullname()
            .unwrap_or_else(|| variant.type_name().to_string());
        if !seen.insert(key.clone()) {
            return Err(SchemaError::InvalidSchema(format!(
                "\"{}\" is already in union",
                key
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_primitives() {
        assert_eq!(parse_schema(r#""int""#).unwrap(), AvroSchema::Int);
        assert_eq!(parse_schema(r#"{"type": "long"}"#).unwrap(), AvroSchema::Long);
        assert_eq!(
            parse_schema(r#"{"type": "string", "extra": 1}"#).unwrap(),
            AvroSchema::String
        );
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(
            parse_schema("{not json"),
            Err(SchemaError::ParseError(_))
        ));
    }

    #[test]
    fn test_parse_unknown_type() {
        assert!(matches!(
            parse_schema(r#""blob""#),
            Err(SchemaError::UnknownType(_))
        ));
        assert!(matches!(
            parse_schema(r#"{"type": "blob"}"#),
            Err(SchemaError::UnknownType(_))
        ));
        assert!(parse_schema("42").is_err());
    }

    #[test]
    fn test_parse_recursive_record() {
        let schema = parse_schema(
            r#"{
                "type": "record",
                "name": "Node",
                "namespace": "list",
                "fields": [
                    {"name": "value", "type": "int"},
                    {"name": "next", "type": ["null", "Node"]}
                ]
            }"#,
        )
        .unwrap();

        let AvroSchema::Record(record) = schema else {
            panic!("expected record");
        };
        assert_eq!(record.fullname(), "list.Node");
        assert_eq!(
            record.fields[1].schema,
            AvroSchema::Union(vec![AvroSchema::Null, AvroSchema::Named("list.Node".into())])
        );
    }

    #[test]
    fn test_nested_named_type_inherits_namespace() {
        let mut parser = SchemaParser::new();
        let value: Value = serde_json::from_str(
            r#"{
                "type": "record", "name": "Outer", "namespace": "a.b",
                "fields": [
                    {"name": "inner", "type": {"type": "fixed", "name": "Hash", "size": 4}},
                    {"name": "again", "type": "Hash"},
                    {"name": "other", "type": {"type": "enum", "name": "c.E", "symbols": ["X"]}}
                ]
            }"#,
        )
        .unwrap();
        let schema = parser.parse(&value).unwrap();

        assert!(parser.named_types().has_name("a.b.Hash"));
        assert!(parser.named_types().has_name("c.E"));
        let AvroSchema::Record(record) = schema else {
            panic!("expected record");
        };
        assert_eq!(record.fields[1].schema, AvroSchema::Named("a.b.Hash".into()));

        let context = parser.into_context();
        assert!(context.contains("a.b.Outer"));
    }

    #[test]
    fn test_duplicate_named_type() {
        let err = parse_schema(
            r#"{"type": "record", "name": "R", "fields": [
                {"name": "a", "type": {"type": "fixed", "name": "F", "size": 1}},
                {"name": "b", "type": {"type": "fixed", "name": "F", "size": 2}}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateName(ref n) if n == "F"));
    }

    #[test]
    fn test_reserved_name() {
        let err = parse_schema(r#"{"type": "fixed", "name": "long", "size": 8}"#).unwrap_err();
        assert!(matches!(err, SchemaError::ReservedName(_)));
    }

    #[test]
    fn test_union_rules() {
        assert!(parse_schema(r#"["null", "int"]"#).is_ok());
        assert!(parse_schema(r#"["int", "int"]"#).is_err());
        assert!(parse_schema(r#"["null", ["int"]]"#).is_err());
        assert!(parse_schema("[]").is_err());
        assert!(parse_schema(
            r#"[{"type": "array", "items": "int"}, {"type": "array", "items": "long"}]"#
        )
        .is_err());
        // Two different named types of the same kind are fine
        assert!(parse_schema(
            r#"[{"type": "fixed", "name": "A", "size": 1}, {"type": "fixed", "name": "B", "size": 1}]"#
        )
        .is_ok());
    }

    #[test]
    fn test_record_field_rules() {
        assert!(parse_schema(r#"{"type": "record", "name": "R"}"#).is_err());
        assert!(parse_schema(
            r#"{"type": "record", "name": "R", "fields": [{"name": "a", "type": "int"}, {"name": "a", "type": "long"}]}"#
        )
        .is_err());
        assert!(parse_schema(
            r#"{"type": "record", "name": "R", "fields": [{"name": "a", "type": "int", "order": "sideways"}]}"#
        )
        .is_err());
        assert!(parse_schema(r#"{"type": "record", "name": "R", "fields": [{"type": "int"}]}"#).is_err());
        assert!(parse_schema(
            r#"{"type": "record", "name": "R", "doc": 5, "fields": []}"#
        )
        .is_err());
    }

    #[test]
    fn test_field_null_default_is_present() {
        let schema = parse_schema(
            r#"{"type": "record", "name": "R", "fields": [
                {"name": "a", "type": ["null", "int"], "default": null},
                {"name": "b", "type": "int"}
            ]}"#,
        )
        .unwrap();
        let AvroSchema::Record(record) = schema else {
            panic!("expected record");
        };
        assert_eq!(record.fields[0].default, Some(Value::Null));
        assert!(!record.fields[1].has_default());
    }

    #[test]
    fn test_enum_rules() {
        assert!(parse_schema(r#"{"type": "enum", "name": "E", "symbols": ["A", "B"]}"#).is_ok());
        assert!(parse_schema(r#"{"type": "enum", "name": "E", "symbols": ["A", "A"]}"#).is_err());
        assert!(parse_schema(r#"{"type": "enum", "name": "E", "symbols": ["A", ""]}"#).is_err());
        assert!(parse_schema(r#"{"type": "enum", "name": "E", "symbols": "A"}"#).is_err());
        assert!(parse_schema(r#"{"type": "enum", "name": "E"}"#).is_err());
        assert!(parse_schema(
            r#"{"type": "enum", "name": "E", "symbols": ["A"], "default": "Z"}"#
        )
        .is_err());
    }

    #[test]
    fn test_fixed_size_rules() {
        assert!(parse_schema(r#"{"type": "fixed", "name": "F", "size": 0}"#).is_ok());
        assert!(parse_schema(r#"{"type": "fixed", "name": "F", "size": -1}"#).is_err());
        assert!(parse_schema(r#"{"type": "fixed", "name": "F", "size": "16"}"#).is_err());
        assert!(parse_schema(r#"{"type": "fixed", "name": "F", "size": 1.5}"#).is_err());
        assert!(parse_schema(r#"{"type": "fixed", "name": "F"}"#).is_err());
    }

    #[test]
    fn test_collections_require_attributes() {
        assert!(parse_schema(r#"{"type": "array"}"#).is_err());
        assert!(parse_schema(r#"{"type": "map"}"#).is_err());
    }

    #[test]
    fn test_protocol_only_types_unsupported() {
        assert!(matches!(
            parse_schema(r#"{"type": "request", "fields": []}"#),
            Err(SchemaError::UnsupportedType(_))
        ));
        assert!(matches!(
            parse_schema(r#"{"type": "error_union"}"#),
            Err(SchemaError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_error_type_is_record() {
        let schema = parse_schema(
            r#"{"type": "error", "name": "Failure", "fields": [{"name": "message", "type": "string"}]}"#,
        )
        .unwrap();
        assert_eq!(schema.type_name(), "error");
        assert!(schema.to_json().starts_with(r#"{"type":"error""#));
    }

    #[test]
    fn test_invalid_names_rejected() {
        assert!(matches!(
            parse_schema(r#"{"type": "fixed", "name": "1F", "size": 1}"#),
            Err(SchemaError::InvalidName(_))
        ));
        assert!(parse_schema(r#"{"type": "fixed", "name": "F", "namespace": "", "size": 1}"#).is_err());
        assert!(parse_schema(r#"{"type": "fixed", "name": "F", "namespace": 3, "size": 1}"#).is_err());
    }

    #[test]
    fn test_reference_to_null_namespace_from_namespaced_record() {
        let schema = parse_schema(
            r#"[
                {"type": "fixed", "name": "Plain", "size": 2},
                {"type": "record", "name": "R", "namespace": "ns",
                 "fields": [{"name": "p", "type": "Plain"}]}
            ]"#,
        )
        .unwrap();
        let AvroSchema::Union(variants) = schema else {
            panic!("expected union");
        };
        let AvroSchema::Record(record) = &variants[1] else {
            panic!("expected record");
        };
        assert_eq!(record.fields[0].schema, AvroSchema::Named("Plain".into()));
    }
}
