//! Avro schema types and parsing.
//!
//! This module defines the Avro schema type system, JSON parsing with the
//! named-type registry, named type resolution, writer/reader schema
//! matching and datum validation.

mod name;
mod parser;
mod resolution;
mod types;
mod validate;

pub use name::{is_well_formed_name, Name, NamedSchemata, RESERVED_TYPE_NAMES};
pub use parser::{parse_schema, parse_schema_value, SchemaParser};
pub use resolution::{schemas_match, SchemaResolutionContext, TypePromotion};
pub use types::*;
pub use validate::{is_valid_datum, is_valid_datum_with_context};

impl std::str::FromStr for AvroSchema {
    type Err = crate::error::SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_schema(s)
    }
}
