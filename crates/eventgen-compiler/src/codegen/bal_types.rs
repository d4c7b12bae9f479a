//! Ballerina type generation from schemas.

use std::fmt;

use crate::config::TypeOptions;
use crate::diagnostic::{GeneratorError, SpecPath};
use crate::ir::{AdditionalProperties, Primitive, Schema, SchemaKind, SchemaSet, UnionKind};
use crate::naming::{escape, type_name};

/// Largest array length Ballerina accepts for a fixed-length array.
pub const MAX_ARRAY_LENGTH: u64 = 2_147_483_637;

const INDENT: &str = "    ";

/// A Ballerina type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum BalType {
    /// `int`, `string`, `boolean`, `decimal` or `float`.
    Primitive(&'static str),
    Json,
    Named(String),
    Nullable(Box<BalType>),
    Array {
        item: Box<BalType>,
        length: Option<u64>,
    },
    Map(Box<BalType>),
    Record(RecordType),
    Union(Vec<BalType>),
}

impl BalType {
    /// Wraps in `T?` unless the type already admits nil.
    pub fn nullable(self) -> BalType {
        match self {
            BalType::Nullable(_) | BalType::Json => self,
            other => BalType::Nullable(Box::new(other)),
        }
    }

    /// Renders the type; nested records are laid out one field per line at `depth`.
    pub fn render(&self, depth: usize) -> String {
        match self {
            BalType::Primitive(name) => name.to_string(),
            BalType::Json => "json".to_string(),
            BalType::Named(name) => name.clone(),
            BalType::Nullable(inner) => match inner.as_ref() {
                BalType::Union(_) => format!("({})?", inner.render(depth)),
                _ => format!("{}?", inner.render(depth)),
            },
            BalType::Array { item, length } => {
                let item = match item.as_ref() {
                    BalType::Union(_) => format!("({})", item.render(depth)),
                    _ => item.render(depth),
                };
                match length {
                    Some(n) => format!("{}[{}]", item, n),
                    None => format!("{}[]", item),
                }
            }
            BalType::Map(value) => format!("map<{}>", value.render(depth)),
            BalType::Record(record) => record.render(depth),
            BalType::Union(members) => members
                .iter()
                .map(|m| m.render(depth))
                .collect::<Vec<_>>()
                .join("|"),
        }
    }
}

impl fmt::Display for BalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(0))
    }
}

/// A field of an inline or top-level record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    /// Escaped field name.
    pub name: String,
    pub ty: BalType,
    pub optional: bool,
    pub description: Option<String>,
}

/// A record type descriptor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordType {
    pub fields: Vec<RecordField>,
    /// Rest descriptor `T...;` for typed additional properties.
    pub rest: Option<Box<BalType>>,
    /// Closed (`record {| |}`) records admit no undeclared fields.
    pub closed: bool,
}

impl RecordType {
    /// Renders the record with its body indented one level below `depth`.
    pub fn render(&self, depth: usize) -> String {
        let (open, close) = if self.closed { ("{|", "|}") } else { ("{", "}") };
        if self.fields.is_empty() && self.rest.is_none() {
            return format!("record {}{}", open, close);
        }

        let outer = INDENT.repeat(depth);
        let inner = INDENT.repeat(depth + 1);
        let mut output = format!("record {}\n", open);

        for field in &self.fields {
            if let Some(description) = &field.description {
                output.push_str(&super::doc_comment(description, &inner));
            }
            let marker = if field.optional { "?" } else { "" };
            output.push_str(&format!(
                "{}{} {}{};\n",
                inner,
                field.ty.render(depth + 1),
                field.name,
                marker
            ));
        }
        if let Some(rest) = &self.rest {
            output.push_str(&format!("{}{}...;\n", inner, rest.render(depth + 1)));
        }

        output.push_str(&outer);
        output.push_str(close);
        output
    }
}

/// Maps schemas to Ballerina types against one schema set.
pub struct TypeMapper<'a> {
    schemas: &'a SchemaSet,
    options: TypeOptions,
}

impl<'a> TypeMapper<'a> {
    pub fn new(schemas: &'a SchemaSet, options: &TypeOptions) -> Self {
        Self {
            schemas,
            options: *options,
        }
    }

    /// Maps a top-level component schema.
    pub fn map_type(&self, schema: &Schema) -> Result<BalType, GeneratorError> {
        self.map_at(schema, &SpecPath::component_schema(&schema.name))
    }

    /// Maps a top-level object schema to a record, even when it declares no
    /// properties. Returns `None` for non-object schemas.
    pub fn map_record(&self, schema: &Schema) -> Result<Option<RecordType>, GeneratorError> {
        if !schema.is_object() {
            return Ok(None);
        }
        let path = SpecPath::component_schema(&schema.name);
        self.record(schema, &path).map(Some)
    }

    fn map_at(&self, schema: &Schema, path: &SpecPath) -> Result<BalType, GeneratorError> {
        let ty = self.map_kind(schema, path)?;
        Ok(if schema.nullable { ty.nullable() } else { ty })
    }

    fn map_kind(&self, schema: &Schema, path: &SpecPath) -> Result<BalType, GeneratorError> {
        match &schema.kind {
            SchemaKind::Reference(name) => {
                if !self.schemas.contains(name) {
                    return Err(GeneratorError::UnresolvedReference {
                        reference: name.clone(),
                        path: path.clone(),
                    });
                }
                Ok(BalType::Named(type_name(name)))
            }
            SchemaKind::Array { items, max_items } => {
                let item = match items {
                    Some(items) => self.map_at(items, &path.join("items"))?,
                    None => BalType::Json,
                };
                if let Some(max_items) = *max_items {
                    if max_items > MAX_ARRAY_LENGTH {
                        return Err(GeneratorError::ArrayLengthExceeded {
                            schema: schema.name.clone(),
                            max_items,
                            limit: MAX_ARRAY_LENGTH,
                        });
                    }
                }
                Ok(BalType::Array {
                    item: Box::new(item),
                    length: *max_items,
                })
            }
            SchemaKind::Object {
                properties,
                additional,
                ..
            } if properties.is_empty() => match additional {
                AdditionalProperties::Allowed => Ok(BalType::Map(Box::new(BalType::Json))),
                AdditionalProperties::Typed(value) => Ok(BalType::Map(Box::new(
                    self.map_at(value, &path.join("additionalProperties"))?,
                ))),
                AdditionalProperties::Forbidden => Ok(BalType::Record(RecordType {
                    closed: true,
                    ..RecordType::default()
                })),
            },
            SchemaKind::Object { .. } => Ok(BalType::Record(self.record(schema, path)?)),
            SchemaKind::Union { kind, members } => {
                self.check_response_kinds(schema, members)?;
                let keyword = match kind {
                    UnionKind::OneOf => "oneOf",
                    UnionKind::AnyOf => "anyOf",
                };
                let mut mapped = members
                    .iter()
                    .enumerate()
                    .map(|(i, member)| self.map_at(member, &path.join(keyword).join(i.to_string())))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(match mapped.len() {
                    0 => BalType::Json,
                    1 => mapped.remove(0),
                    _ => BalType::Union(mapped),
                })
            }
            SchemaKind::Primitive(primitive) => Ok(BalType::Primitive(match primitive {
                Primitive::Int => "int",
                Primitive::String => "string",
                Primitive::Boolean => "boolean",
                Primitive::Decimal => "decimal",
                Primitive::Float | Primitive::Double => "float",
                Primitive::Number => self.options.number_type.as_bal(),
            })),
        }
    }

    fn record(&self, schema: &Schema, path: &SpecPath) -> Result<RecordType, GeneratorError> {
        let SchemaKind::Object {
            properties,
            required,
            additional,
        } = &schema.kind
        else {
            return Ok(RecordType::default());
        };

        let properties_path = path.join("properties");
        let mut fields = Vec::with_capacity(properties.len());
        for property in properties {
            let mut ty = self.map_at(&property.schema, &properties_path.join(&property.name))?;
            let mut optional = !required.contains(&property.name);
            if self.options.nullable {
                ty = ty.nullable();
                optional = true;
            }
            fields.push(RecordField {
                name: escape(&property.name),
                ty,
                optional,
                description: property.schema.description.clone(),
            });
        }

        let (rest, closed) = match additional {
            AdditionalProperties::Allowed => (None, false),
            AdditionalProperties::Forbidden => (None, true),
            AdditionalProperties::Typed(value) => (
                Some(Box::new(self.map_at(value, &path.join("additionalProperties"))?)),
                true,
            ),
        };

        Ok(RecordType {
            fields,
            rest,
            closed,
        })
    }

    /// A union mixing `server-streaming` and `simple-rpc` members is rejected.
    fn check_response_kinds(&self, schema: &Schema, members: &[Schema]) -> Result<(), GeneratorError> {
        let mut streaming = false;
        let mut rpc = false;
        for member in members {
            let kind = member.extension_str("x-response-type").or_else(|| {
                self.schemas
                    .resolve(member)
                    .and_then(|resolved| resolved.extension_str("x-response-type"))
            });
            match kind {
                Some("server-streaming") => streaming = true,
                Some("simple-rpc") => rpc = true,
                _ => {}
            }
        }
        if streaming && rpc {
            return Err(GeneratorError::StreamingRpcConflict {
                schema: schema.name.clone(),
            });
        }
        Ok(())
    }
}
