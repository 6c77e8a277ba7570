//! Schema resolution for named type references and writer/reader matching.
//!
//! Named references (`AvroSchema::Named`) are looked up in a
//! [`SchemaResolutionContext`] at the point of use instead of being
//! inlined, so recursive types never need to be expanded.

use std::collections::HashMap;

use crate::schema::AvroSchema;

/// A context for resolving named type references.
///
/// This struct holds a registry of named types (records, enums, fixed)
/// that can be used to resolve `Named` references in schemas.
#[derive(Debug, Clone, Default)]
pub struct SchemaResolutionContext {
    /// Registry of named types by their fully qualified name
    named_types: HashMap<String, AvroSchema>,
}

impl SchemaResolutionContext {
    /// Create a new empty resolution context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named type in the context.
    ///
    /// # Arguments
    /// * `name` - The fully qualified name of the type
    /// * `schema` - The schema definition
    pub fn register(&mut self, name: String, schema: AvroSchema) {
        self.named_types.insert(name, schema);
    }

    /// Get a named type from the context.
    pub fn get(&self, name: &str) -> Option<&AvroSchema> {
        self.named_types.get(name)
    }

    /// Check if a named type exists in the context.
    pub fn contains(&self, name: &str) -> bool {
        self.named_types.contains_key(name)
    }

    /// Number of registered named types.
    pub fn len(&self) -> usize {
        self.named_types.len()
    }

    /// Whether no named types are registered.
    pub fn is_empty(&self) -> bool {
        self.named_types.is_empty()
    }

    /// Build a resolution context by extracting all named types from a schema.
    ///
    /// This recursively traverses the schema and registers all named types
    /// (records, enums, fixed) that it encounters.
    pub fn build_from_schema(schema: &AvroSchema) -> Self {
        let mut context = Self::new();
        context.extract_named_types(schema);
        context
    }

    /// Extract and register all named types from a schema.
    fn extract_named_types(&mut self, schema: &AvroSchema) {
        match schema {
            AvroSchema::Record(record) => {
                self.named_types.insert(record.fullname(), schema.clone());
                for field in &record.fields {
                    self.extract_named_types(&field.schema);
                }
            }
            AvroSchema::Enum(enum_schema) => {
                self.named_types
                    .insert(enum_schema.fullname(), schema.clone());
            }
            AvroSchema::Fixed(fixed_schema) => {
                self.named_types
                    .insert(fixed_schema.fullname(), schema.clone());
            }
            AvroSchema::Array(item_schema) => {
                self.extract_named_types(item_schema);
            }
            AvroSchema::Map(value_schema) => {
                self.extract_named_types(value_schema);
            }
            AvroSchema::Union(variants) => {
                for variant in variants {
                    self.extract_named_types(variant);
                }
            }
            // Primitives and Named references don't contain named type definitions
            _ => {}
        }
    }

    /// Follow a `Named` reference to its definition.
    ///
    /// Any other schema is returned unchanged. Returns `None` only for a
    /// reference this context does not know.
    pub fn deref<'a>(&'a self, schema: &'a AvroSchema) -> Option<&'a AvroSchema> {
        match schema {
            AvroSchema::Named(name) => self.named_types.get(name),
            other => Some(other),
        }
    }
}

/// Numeric widening allowed when reading data written with another schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypePromotion {
    /// int → long
    IntToLong,
    /// int → float
    IntToFloat,
    /// int → double
    IntToDouble,
    /// long → float
    LongToFloat,
    /// long → double
    LongToDouble,
    /// float → double
    FloatToDouble,
}

impl TypePromotion {
    /// The promotion that turns a `writer` value into a `reader` value, if any.
    pub fn between(writer: &AvroSchema, reader: &AvroSchema) -> Option<Self> {
        match (writer, reader) {
            (AvroSchema::Int, AvroSchema::Long) => Some(TypePromotion::IntToLong),
            (AvroSchema::Int, AvroSchema::Float) => Some(TypePromotion::IntToFloat),
            (AvroSchema::Int, AvroSchema::Double) => Some(TypePromotion::IntToDouble),
            (AvroSchema::Long, AvroSchema::Float) => Some(TypePromotion::LongToFloat),
            (AvroSchema::Long, AvroSchema::Double) => Some(TypePromotion::LongToDouble),
            (AvroSchema::Float, AvroSchema::Double) => Some(TypePromotion::FloatToDouble),
            _ => None,
        }
    }
}

/// Whether data written with `writer` can be read as `reader`.
///
/// Both schemas must already be dereferenced (no top-level `Named`). A union
/// on either side always matches here; the decision is deferred to the
/// branch actually present in the data. Arrays and maps only compare their
/// element kinds one level deep.
pub fn schemas_match(writer: &AvroSchema, reader: &AvroSchema) -> bool {
    match (writer, reader) {
        (AvroSchema::Union(_), _) | (_, AvroSchema::Union(_)) => true,
        (AvroSchema::Array(w), AvroSchema::Array(r)) => shallow_match(w, r),
        (AvroSchema::Map(w), AvroSchema::Map(r)) => shallow_match(w, r),
        (AvroSchema::Record(_), AvroSchema::Record(_))
        | (AvroSchema::Enum(_), AvroSchema::Enum(_))
        | (AvroSchema::Fixed(_), AvroSchema::Fixed(_)) => writer.fullname() == reader.fullname(),
        (w, r) if w.is_primitive() && r.is_primitive() => {
            w == r || TypePromotion::between(w, r).is_some()
        }
        _ => false,
    }
}

/// Kind-level comparison for array items and map values.
///
/// Named element types compare by kind only, so `array<A>` and `array<B>`
/// of two records match here and each item is checked when it is read. An
/// unresolved reference has no kind yet and is also left to the item check.
fn shallow_match(writer: &AvroSchema, reader: &AvroSchema) -> bool {
    match (writer, reader) {
        (AvroSchema::Union(_), _) | (_, AvroSchema::Union(_)) => true,
        (AvroSchema::Named(_), _) | (_, AvroSchema::Named(_)) => true,
        (w, r) => w.type_name() == r.type_name() || TypePromotion::between(w, r).is_some(),
    }
}
