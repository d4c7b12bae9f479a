//! Schema entities extracted from `components.schemas`.

use std::collections::{BTreeSet, HashMap};

use serde_json::{Map, Value};

/// Primitive JSON-schema types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Int,
    String,
    Boolean,
    Decimal,
    Float,
    Double,
    /// A `number` without a format; mapped per configuration.
    Number,
}

impl Primitive {
    /// The JSON-schema spelling, used in diagnostics.
    pub fn spec_name(self) -> &'static str {
        match self {
            Primitive::Int => "integer",
            Primitive::String => "string",
            Primitive::Boolean => "boolean",
            Primitive::Decimal => "number (decimal)",
            Primitive::Float => "number (float)",
            Primitive::Double => "number (double)",
            Primitive::Number => "number",
        }
    }
}

/// How an object treats properties it does not declare.
#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalProperties {
    Allowed,
    Forbidden,
    Typed(Box<Schema>),
}

/// `oneOf` or `anyOf`. `allOf` is flattened during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnionKind {
    OneOf,
    AnyOf,
}

/// A named property of an object schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub schema: Schema,
}

/// The shape of a schema. Exactly one shape per schema.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    Primitive(Primitive),
    Object {
        properties: Vec<Property>,
        required: BTreeSet<String>,
        additional: AdditionalProperties,
    },
    Array {
        items: Option<Box<Schema>>,
        max_items: Option<u64>,
    },
    /// Name of a component schema, resolved lazily.
    Reference(String),
    Union {
        kind: UnionKind,
        members: Vec<Schema>,
    },
}

/// One type definition, either a named component or an inline node.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub name: String,
    pub kind: SchemaKind,
    pub nullable: bool,
    pub description: Option<String>,
    /// Every `x-*` key declared on the node.
    pub extensions: Map<String, Value>,
}

impl Schema {
    pub fn new(name: impl Into<String>, kind: SchemaKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
            description: None,
            extensions: Map::new(),
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self.kind, SchemaKind::Object { .. })
    }

    /// Looks up a declared property of an object schema.
    pub fn property(&self, name: &str) -> Option<&Property> {
        match &self.kind {
            SchemaKind::Object { properties, .. } => properties.iter().find(|p| p.name == name),
            _ => None,
        }
    }

    /// Whether `name` is listed as required on an object schema.
    pub fn is_required(&self, name: &str) -> bool {
        match &self.kind {
            SchemaKind::Object { required, .. } => required.contains(name),
            _ => false,
        }
    }

    /// A string extension value, if present.
    pub fn extension_str(&self, key: &str) -> Option<&str> {
        self.extensions.get(key).and_then(Value::as_str)
    }

    /// Short description of the shape for diagnostics.
    pub fn describe(&self) -> String {
        match &self.kind {
            SchemaKind::Primitive(p) => p.spec_name().to_string(),
            SchemaKind::Object { .. } => "object".to_string(),
            SchemaKind::Array { .. } => "array".to_string(),
            SchemaKind::Reference(name) => format!("reference to '{}'", name),
            SchemaKind::Union { .. } => "union".to_string(),
        }
    }

    /// Calls `f` with every reference name reachable from this schema.
    pub fn visit_references<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        match &self.kind {
            SchemaKind::Primitive(_) => {}
            SchemaKind::Reference(name) => f(name),
            SchemaKind::Object { properties, additional, .. } => {
                for property in properties {
                    property.schema.visit_references(f);
                }
                if let AdditionalProperties::Typed(schema) = additional {
                    schema.visit_references(f);
                }
            }
            SchemaKind::Array { items, .. } => {
                if let Some(items) = items {
                    items.visit_references(f);
                }
            }
            SchemaKind::Union { members, .. } => {
                for member in members {
                    member.visit_references(f);
                }
            }
        }
    }
}

/// Ordered mapping from component schema name to schema.
///
/// Iteration order is declaration order in the spec.
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    schemas: Vec<Schema>,
    index: HashMap<String, usize>,
}

impl SchemaSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a schema, replacing any previous schema of the same name in place.
    pub fn insert(&mut self, schema: Schema) {
        match self.index.get(&schema.name) {
            Some(&i) => self.schemas[i] = schema,
            None => {
                self.index.insert(schema.name.clone(), self.schemas.len());
                self.schemas.push(schema);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.index.get(name).map(|&i| &self.schemas[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Follows references until a non-reference schema is reached.
    ///
    /// Returns `None` for dangling references and reference cycles.
    pub fn resolve<'a>(&'a self, schema: &'a Schema) -> Option<&'a Schema> {
        let mut current = schema;
        let mut hops = 0;
        while let SchemaKind::Reference(name) = &current.kind {
            current = self.get(name)?;
            hops += 1;
            if hops > self.schemas.len() {
                return None;
            }
        }
        Some(current)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.iter()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
