//! Name resolution and the named-type registry used while parsing.

use std::collections::HashMap;

use crate::error::SchemaError;
use crate::schema::{AvroSchema, SchemaResolutionContext};

/// Type keywords that may never be used as the fullname of a named type.
pub const RESERVED_TYPE_NAMES: &[&str] = &[
    "null",
    "boolean",
    "int",
    "long",
    "float",
    "double",
    "bytes",
    "string",
    "record",
    "error",
    "enum",
    "fixed",
    "array",
    "map",
    "union",
    "request",
    "error_union",
];

/// Whether `name` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_well_formed_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn check_segments(dotted: &str) -> Result<(), SchemaError> {
    for segment in dotted.split('.') {
        if !is_well_formed_name(segment) {
            return Err(SchemaError::InvalidName(format!(
                "Invalid name \"{}\"",
                segment
            )));
        }
    }
    Ok(())
}

/// A resolved name: local name, namespace and the dotted fullname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    name: String,
    namespace: Option<String>,
    fullname: String,
}

impl Name {
    /// Resolve a `(name, namespace, enclosing default namespace)` triple.
    ///
    /// A name containing `.` is already a fullname and ignores both
    /// namespaces. Otherwise an explicit namespace wins over the default.
    ///
    /// # Example
    /// ```
    /// use avrolite::schema::Name;
    ///
    /// let name = Name::new("Node", None, Some("com.example")).unwrap();
    /// assert_eq!(name.fullname(), "com.example.Node");
    ///
    /// let name = Name::new("org.other.Node", Some("ignored"), None).unwrap();
    /// assert_eq!(name.namespace(), Some("org.other"));
    /// ```
    pub fn new(
        name: &str,
        namespace: Option<&str>,
        default_namespace: Option<&str>,
    ) -> Result<Self, SchemaError> {
        if name.is_empty() {
            return Err(SchemaError::InvalidName(
                "Name must be a non-empty string.".to_string(),
            ));
        }

        let fullname = if name.contains('.') {
            check_segments(name)?;
            name.to_string()
        } else if !is_well_formed_name(name) {
            return Err(SchemaError::InvalidName(format!("Invalid name \"{}\"", name)));
        } else {
            match namespace.or(default_namespace) {
                Some(ns) => {
                    if ns.is_empty() {
                        return Err(SchemaError::InvalidName(
                            "Namespace must be a non-empty string.".to_string(),
                        ));
                    }
                    check_segments(ns)?;
                    format!("{}.{}", ns, name)
                }
                None => name.to_string(),
            }
        };

        let (namespace, local) = match fullname.rsplit_once('.') {
            Some((ns, local)) => (Some(ns.to_string()), local.to_string()),
            None => (None, fullname.clone()),
        };

        Ok(Self {
            name: local,
            namespace,
            fullname,
        })
    }

    /// The local (unqualified) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The namespace, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// The dotted fullname.
    pub fn fullname(&self) -> &str {
        &self.fullname
    }

    /// The shortest name that resolves to this one from inside
    /// `enclosing_namespace`: the local name when the namespaces agree,
    /// otherwise the fullname.
    pub fn qualified_name(&self, enclosing_namespace: Option<&str>) -> &str {
        if self.namespace.is_none() || self.namespace.as_deref() == enclosing_namespace {
            &self.name
        } else {
            &self.fullname
        }
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.fullname)
    }
}

/// Append-only registry of named types, built during one parse call.
///
/// A named type is registered before its body is parsed so that the body
/// can refer to it; its definition is filled in once parsing of the body
/// completes.
#[derive(Debug, Default)]
pub struct NamedSchemata {
    schemata: HashMap<String, Option<AvroSchema>>,
}

impl NamedSchemata {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a fullname is registered (complete or in progress).
    pub fn has_name(&self, fullname: &str) -> bool {
        self.schemata.contains_key(fullname)
    }

    /// The completed definition for a fullname.
    pub fn schema(&self, fullname: &str) -> Option<&AvroSchema> {
        self.schemata.get(fullname).and_then(Option::as_ref)
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.schemata.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.schemata.is_empty()
    }

    /// Claim a fullname for a named type whose body is about to be parsed.
    pub fn register(&mut self, name: &Name) -> Result<(), SchemaError> {
        let fullname = name.fullname();
        if RESERVED_TYPE_NAMES.contains(&fullname) {
            return Err(SchemaError::ReservedName(fullname.to_string()));
        }
        if self.has_name(fullname) {
            return Err(SchemaError::DuplicateName(fullname.to_string()));
        }
        self.schemata.insert(fullname.to_string(), None);
        Ok(())
    }

    /// Record the finished definition of a registered name.
    pub(crate) fn complete(&mut self, fullname: &str, schema: AvroSchema) {
        self.schemata.insert(fullname.to_string(), Some(schema));
    }

    /// Freeze the registry into an immutable lookup context.
    pub fn freeze(self) -> SchemaResolutionContext {
        let mut context = SchemaResolutionContext::new();
        for (fullname, schema) in self.schemata {
            if let Some(schema) = schema {
                context.register(fullname, schema);
            }
        }
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_names() {
        assert!(is_well_formed_name("_a1"));
        assert!(is_well_formed_name("Z"));
        assert!(!is_well_formed_name(""));
        assert!(!is_well_formed_name("1abc"));
        assert!(!is_well_formed_name("a-b"));
        assert!(!is_well_formed_name("a.b"));
    }

    #[test]
    fn test_name_uses_explicit_then_default_namespace() {
        let n = Name::new("Rec", Some("explicit.ns"), Some("default.ns")).unwrap();
        assert_eq!(n.fullname(), "explicit.ns.Rec");

        let n = Name::new("Rec", None, Some("default.ns")).unwrap();
        assert_eq!(n.fullname(), "default.ns.Rec");
        assert_eq!(n.name(), "Rec");

        let n = Name::new("Rec", None, None).unwrap();
        assert_eq!(n.fullname(), "Rec");
        assert_eq!(n.namespace(), None);
    }

    #[test]
    fn test_dotted_name_is_fullname() {
        let n = Name::new("a.b.Rec", Some("x"), Some("y")).unwrap();
        assert_eq!(n.fullname(), "a.b.Rec");
        assert_eq!(n.namespace(), Some("a.b"));
        assert_eq!(n.name(), "Rec");
    }

    #[test]
    fn test_invalid_names() {
        assert!(matches!(
            Name::new("", None, None),
            Err(SchemaError::InvalidName(_))
        ));
        assert!(Name::new("9lives", None, None).is_err());
        assert!(Name::new("a..b", None, None).is_err());
        assert!(Name::new("Rec", Some("bad-ns"), None).is_err());
        assert!(Name::new("Rec", Some(""), None).is_err());
    }

    #[test]
    fn test_qualified_name() {
        let n = Name::new("Rec", Some("a.b"), None).unwrap();
        assert_eq!(n.qualified_name(Some("a.b")), "Rec");
        assert_eq!(n.qualified_name(Some("c")), "a.b.Rec");
        assert_eq!(n.qualified_name(None), "a.b.Rec");
    }

    #[test]
    fn test_registry_rejects_duplicates_and_reserved() {
        let mut names = NamedSchemata::new();
        let rec = Name::new("Rec", Some("ns"), None).unwrap();
        names.register(&rec).unwrap();
        assert!(names.has_name("ns.Rec"));
        assert!(names.schema("ns.Rec").is_none());
        assert!(matches!(
            names.register(&rec),
            Err(SchemaError::DuplicateName(_))
        ));

        let reserved = Name::new("int", None, None).unwrap();
        assert!(matches!(
            names.register(&reserved),
            Err(SchemaError::ReservedName(_))
        ));
    }

    #[test]
    fn test_freeze_keeps_completed_definitions() {
        let mut names = NamedSchemata::new();
        let name = Name::new("Hash", None, None).unwrap();
        names.register(&name).unwrap();
        let fixed = AvroSchema::Fixed(crate::schema::FixedSchema::new("Hash", 4));
        names.complete("Hash", fixed.clone());
        assert_eq!(names.len(), 1);

        let context = names.freeze();
        assert_eq!(context.get("Hash"), Some(&fixed));
    }
}
