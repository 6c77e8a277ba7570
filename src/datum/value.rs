//! In-memory representation of Avro data.

use std::fmt;

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Represents a decoded (or to-be-encoded) Avro value.
///
/// Unions have no wrapper variant: a union value is simply the value of
/// whichever branch it belongs to, and the writer picks the branch.
#[derive(Debug, Clone, PartialEq)]
pub enum AvroValue {
    /// Null value
    Null,
    /// Boolean value
    Boolean(bool),
    /// 32-bit signed integer
    Int(i32),
    /// 64-bit signed integer
    Long(i64),
    /// 32-bit floating point
    Float(f32),
    /// 64-bit floating point
    Double(f64),
    /// Byte array
    Bytes(Vec<u8>),
    /// UTF-8 string
    String(String),
    /// Fixed-size byte array
    Fixed(Vec<u8>),
    /// Enum symbol
    Enum(String),
    /// Array of values
    Array(Vec<AvroValue>),
    /// Map with string keys, in insertion order
    Map(IndexMap<String, AvroValue>),
    /// Record fields by name, in schema order
    Record(IndexMap<String, AvroValue>),
}

impl AvroValue {
    /// Build a record value from `(field, value)` pairs.
    ///
    /// # Example
    /// ```
    /// use avrolite::datum::AvroValue;
    ///
    /// let user = AvroValue::record([("id", AvroValue::Long(7)), ("name", "ada".into())]);
    /// assert_eq!(user.field("id"), Some(&AvroValue::Long(7)));
    /// ```
    pub fn record<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, AvroValue)>,
    {
        AvroValue::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a map value from `(key, value)` pairs.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, AvroValue)>,
    {
        AvroValue::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// A short name for the kind of value, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            AvroValue::Null => "null",
            AvroValue::Boolean(_) => "boolean",
            AvroValue::Int(_) => "int",
            AvroValue::Long(_) => "long",
            AvroValue::Float(_) => "float",
            AvroValue::Double(_) => "double",
            AvroValue::Bytes(_) => "bytes",
            AvroValue::String(_) => "string",
            AvroValue::Fixed(_) => "fixed",
            AvroValue::Enum(_) => "enum",
            AvroValue::Array(_) => "array",
            AvroValue::Map(_) => "map",
            AvroValue::Record(_) => "record",
        }
    }

    /// Look up a record field by name.
    pub fn field(&self, name: &str) -> Option<&AvroValue> {
        match self {
            AvroValue::Record(fields) => fields.get(name),
            _ => None,
        }
    }

    /// The value as an `f64`, for any numeric variant.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AvroValue::Int(i) => Some(*i as f64),
            AvroValue::Long(l) => Some(*l as f64),
            AvroValue::Float(f) => Some(*f as f64),
            AvroValue::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// The value as an `i64`, for the integral variants.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AvroValue::Int(i) => Some(*i as i64),
            AvroValue::Long(l) => Some(*l),
            _ => None,
        }
    }

    /// The string content of a string or enum value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AvroValue::String(s) | AvroValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// The byte content of a bytes or fixed value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AvroValue::Bytes(b) | AvroValue::Fixed(b) => Some(b),
            _ => None,
        }
    }

    /// Convert the AvroValue to a serde_json::Value.
    ///
    /// Bytes and fixed values become strings with one code point per byte,
    /// the same convention used for default values in schemas.
    pub fn to_json(&self) -> Value {
        match self {
            AvroValue::Null => Value::Null,
            AvroValue::Boolean(b) => Value::Bool(*b),
            AvroValue::Int(i) => Value::Number((*i).into()),
            AvroValue::Long(l) => Value::Number((*l).into()),
            AvroValue::Float(f) => serde_json::Number::from_f64(*f as f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            AvroValue::Double(d) => serde_json::Number::from_f64(*d)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            AvroValue::Bytes(b) | AvroValue::Fixed(b) => {
                Value::String(b.iter().map(|&byte| char::from(byte)).collect())
            }
            AvroValue::String(s) | AvroValue::Enum(s) => Value::String(s.clone()),
            AvroValue::Array(items) => Value::Array(items.iter().map(|v| v.to_json()).collect()),
            AvroValue::Map(entries) | AvroValue::Record(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    map.insert(key.clone(), value.to_json());
                }
                Value::Object(map)
            }
        }
    }
}

impl fmt::Display for AvroValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<bool> for AvroValue {
    fn from(value: bool) -> Self {
        AvroValue::Boolean(value)
    }
}

impl From<i32> for AvroValue {
    fn from(value: i32) -> Self {
        AvroValue::Int(value)
    }
}

impl From<i64> for AvroValue {
    fn from(value: i64) -> Self {
        AvroValue::Long(value)
    }
}

impl From<f32> for AvroValue {
    fn from(value: f32) -> Self {
        AvroValue::Float(value)
    }
}

impl From<f64> for AvroValue {
    fn from(value: f64) -> Self {
        AvroValue::Double(value)
    }
}

impl From<&str> for AvroValue {
    fn from(value: &str) -> Self {
        AvroValue::String(value.to_string())
    }
}

impl From<String> for AvroValue {
    fn from(value: String) -> Self {
        AvroValue::String(value)
    }
}

impl From<Vec<u8>> for AvroValue {
    fn from(value: Vec<u8>) -> Self {
        AvroValue::Bytes(value)
    }
}

impl From<&[u8]> for AvroValue {
    fn from(value: &[u8]) -> Self {
        AvroValue::Bytes(value.to_vec())
    }
}

impl From<Vec<AvroValue>> for AvroValue {
    fn from(value: Vec<AvroValue>) -> Self {
        AvroValue::Array(value)
    }
}

impl<T: Into<AvroValue>> From<Option<T>> for AvroValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AvroValue::Null, Into::into)
    }
}
