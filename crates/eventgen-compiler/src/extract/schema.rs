//! Component schema extraction.
//!
//! Walks `components.schemas` in declaration order and converts every node
//! into a [`Schema`]. `$ref`s stay lazy, `allOf` is flattened into a single
//! object and `oneOf`/`anyOf` are kept as unions.

use std::collections::BTreeSet;

use crate::diagnostic::{GeneratorError, SpecPath};
use crate::document::{AdditionalNode, AsyncApiDocument, SchemaNode};
use crate::ir::{AdditionalProperties, Primitive, Property, Schema, SchemaKind, SchemaSet, UnionKind};

/// Extracts every named component schema.
pub fn extract_schemas(document: &AsyncApiDocument) -> Result<SchemaSet, GeneratorError> {
    let mut set = SchemaSet::new();
    let mut converter = SchemaConverter {
        document,
        merging: Vec::new(),
    };

    for (name, node) in document.component_schemas() {
        let schema = converter.convert(name, &node)?;
        tracing::debug!(schema = name, kind = %schema.describe(), "extracted schema");
        set.insert(schema);
    }

    Ok(set)
}

/// Fails on the first reference that does not name a schema in `schemas`.
pub fn check_references(schemas: &SchemaSet) -> Result<(), GeneratorError> {
    for schema in schemas.iter() {
        let mut dangling = None;
        schema.visit_references(&mut |name| {
            if dangling.is_none() && !schemas.contains(name) {
                dangling = Some(name.to_string());
            }
        });
        if let Some(reference) = dangling {
            return Err(GeneratorError::UnresolvedReference {
                reference,
                path: SpecPath::component_schema(&schema.name),
            });
        }
    }
    Ok(())
}

struct SchemaConverter<'a> {
    document: &'a AsyncApiDocument,
    /// Component names currently being merged into an allOf, for cycle detection.
    merging: Vec<String>,
}

impl SchemaConverter<'_> {
    fn convert(&mut self, name: &str, node: &SchemaNode<'_>) -> Result<Schema, GeneratorError> {
        if !node.is_mapping() {
            return Err(GeneratorError::malformed(&node.path, "schema must be a mapping"));
        }
        if !node.declares_type() {
            return Err(GeneratorError::malformed(
                &node.path,
                "schema declares no type, items, properties, $ref or union keyword",
            ));
        }

        let kind = if let Some(reference) = node.schema_reference() {
            SchemaKind::Reference(reference?.to_string())
        } else if let Some(members) = node.all_of() {
            self.merge_all_of(name, node, &members)?
        } else if let Some(members) = node.one_of() {
            self.convert_union(name, UnionKind::OneOf, &members)?
        } else if let Some(members) = node.any_of() {
            self.convert_union(name, UnionKind::AnyOf, &members)?
        } else {
            self.convert_typed(name, node)?
        };

        let mut schema = Schema::new(name, kind);
        schema.nullable = node.nullable();
        schema.description = node.description().map(String::from);
        schema.extensions = node.extensions();
        Ok(schema)
    }

    fn convert_typed(&mut self, name: &str, node: &SchemaNode<'_>) -> Result<SchemaKind, GeneratorError> {
        let kind = match node.type_name() {
            Some("integer") => SchemaKind::Primitive(Primitive::Int),
            Some("string") => SchemaKind::Primitive(Primitive::String),
            Some("boolean") => SchemaKind::Primitive(Primitive::Boolean),
            Some("number") => SchemaKind::Primitive(match node.format() {
                Some("float") => Primitive::Float,
                Some("double") => Primitive::Double,
                Some("decimal") => Primitive::Decimal,
                _ => Primitive::Number,
            }),
            Some("array") => self.convert_array(name, node)?,
            Some("object") => self.convert_object(node)?,
            Some(other) => {
                return Err(GeneratorError::malformed(
                    &node.path,
                    format!("unsupported type '{}'", other),
                ))
            }
            None if node.items().is_some() => self.convert_array(name, node)?,
            None => self.convert_object(node)?,
        };
        Ok(kind)
    }

    fn convert_array(&mut self, name: &str, node: &SchemaNode<'_>) -> Result<SchemaKind, GeneratorError> {
        let items = match node.items() {
            Some(items) => Some(Box::new(self.convert(&format!("{}Item", name), &items)?)),
            None => None,
        };
        Ok(SchemaKind::Array {
            items,
            max_items: node.max_items(),
        })
    }

    fn convert_object(&mut self, node: &SchemaNode<'_>) -> Result<SchemaKind, GeneratorError> {
        let mut properties = Vec::new();
        for (property_name, property_node) in node.properties().unwrap_or_default() {
            properties.push(Property {
                name: property_name.to_string(),
                schema: self.convert(property_name, &property_node)?,
            });
        }

        let required = node.required().into_iter().map(String::from).collect();

        let additional = match node.additional_properties() {
            None | Some(AdditionalNode::Flag(true)) => AdditionalProperties::Allowed,
            Some(AdditionalNode::Flag(false)) => AdditionalProperties::Forbidden,
            // `additionalProperties: {}` says nothing about the value type.
            Some(AdditionalNode::Schema(schema)) if !schema.declares_type() => {
                AdditionalProperties::Allowed
            }
            Some(AdditionalNode::Schema(schema)) => {
                AdditionalProperties::Typed(Box::new(self.convert("additionalProperties", &schema)?))
            }
        };

        Ok(SchemaKind::Object {
            properties,
            required,
            additional,
        })
    }

    fn convert_union(
        &mut self,
        name: &str,
        kind: UnionKind,
        members: &[SchemaNode<'_>],
    ) -> Result<SchemaKind, GeneratorError> {
        let members = members
            .iter()
            .enumerate()
            .map(|(i, member)| self.convert(&format!("{}{}", name, i), member))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SchemaKind::Union { kind, members })
    }

    /// Flattens `allOf` members (and any sibling `properties`) into one object.
    fn merge_all_of(
        &mut self,
        name: &str,
        node: &SchemaNode<'_>,
        members: &[SchemaNode<'_>],
    ) -> Result<SchemaKind, GeneratorError> {
        let mut properties: Vec<Property> = Vec::new();
        let mut required = BTreeSet::new();
        let mut additional = AdditionalProperties::Allowed;

        let mut parts = Vec::with_capacity(members.len() + 1);
        for member in members {
            parts.push((member.path.clone(), self.convert_all_of_member(name, member)?));
        }
        if node.properties().is_some() {
            parts.push((node.path.clone(), Schema::new(name, self.convert_object(node)?)));
        }

        for (path, part) in parts {
            let SchemaKind::Object {
                properties: part_properties,
                required: part_required,
                additional: part_additional,
            } = part.kind
            else {
                return Err(GeneratorError::malformed(
                    &path,
                    format!("allOf members must be objects, found {}", part.describe()),
                ));
            };

            for property in part_properties {
                if properties.iter().any(|p| p.name == property.name) {
                    return Err(GeneratorError::DuplicateProperty {
                        property: property.name,
                        path: node.path.clone(),
                    });
                }
                properties.push(property);
            }
            required.extend(part_required);
            if part_additional != AdditionalProperties::Allowed {
                additional = part_additional;
            }
        }
        // `required` beside `allOf` applies to the merged object.
        required.extend(node.required().into_iter().map(String::from));

        Ok(SchemaKind::Object {
            properties,
            required,
            additional,
        })
    }

    fn convert_all_of_member(&mut self, name: &str, member: &SchemaNode<'_>) -> Result<Schema, GeneratorError> {
        let Some(reference) = member.schema_reference() else {
            return self.convert(name, member);
        };
        let target = reference?;

        if self.merging.iter().any(|m| m == target) {
            return Err(GeneratorError::malformed(
                &member.path,
                format!("allOf reference cycle through '{}'", target),
            ));
        }
        let target_node = self.document.component_schema(target).ok_or_else(|| {
            GeneratorError::UnresolvedReference {
                reference: target.to_string(),
                path: member.path.clone(),
            }
        })?;

        self.merging.push(target.to_string());
        let merged = self.convert(target, &target_node);
        self.merging.pop();
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extract(components: serde_json::Value) -> Result<SchemaSet, GeneratorError> {
        let doc = AsyncApiDocument::new(json!({ "components": { "schemas": components } }));
        extract_schemas(&doc)
    }

    #[test]
    fn extracts_one_entry_per_component() {
        let set = extract(json!({
            "User": { "type": "object", "properties": { "id": { "type": "string" } } },
            "Count": { "type": "integer" },
            "Tags": { "type": "array", "items": { "type": "string" } }
        }))
        .unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.get("User").unwrap().is_object());
    }

    #[test]
    fn keeps_references_lazy() {
        let set = extract(json!({
            "Wrapper": { "type": "object", "properties": { "user": { "$ref": "#/components/schemas/Missing" } } }
        }))
        .unwrap();
        let wrapper = set.get("Wrapper").unwrap();
        let user = wrapper.property("user").unwrap();
        assert_eq!(user.schema.kind, SchemaKind::Reference("Missing".into()));

        let err = check_references(&set).err().unwrap();
        match err {
            GeneratorError::UnresolvedReference { reference, .. } => assert_eq!(reference, "Missing"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn flattens_all_of() {
        let set = extract(json!({
            "Base": {
                "type": "object",
                "required": ["id"],
                "properties": { "id": { "type": "string" } }
            },
            "Derived": {
                "allOf": [
                    { "$ref": "#/components/schemas/Base" },
                    { "type": "object", "properties": { "name": { "type": "string" } } }
                ]
            }
        }))
        .unwrap();

        let derived = set.get("Derived").unwrap();
        assert!(derived.property("id").is_some());
        assert!(derived.property("name").is_some());
        assert!(derived.is_required("id"));
        assert!(!derived.is_required("name"));
    }

    #[test]
    fn required_beside_all_of_applies_to_merged_object() {
        let set = extract(json!({
            "Base": { "type": "object", "properties": { "id": { "type": "string" } } },
            "Derived": {
                "required": ["id"],
                "allOf": [ { "$ref": "#/components/schemas/Base" } ]
            }
        }))
        .unwrap();

        assert!(set.get("Derived").unwrap().is_required("id"));
        assert!(!set.get("Base").unwrap().is_required("id"));
    }

    #[test]
    fn duplicate_all_of_properties_fail() {
        let err = extract(json!({
            "A": { "type": "object", "properties": { "id": { "type": "string" } } },
            "B": { "allOf": [
                { "$ref": "#/components/schemas/A" },
                { "type": "object", "properties": { "id": { "type": "integer" } } }
            ]}
        }))
        .err()
        .unwrap();
        match err {
            GeneratorError::DuplicateProperty { property, path } => {
                assert_eq!(property, "id");
                assert_eq!(path.to_string(), "#/components/schemas/B");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn all_of_reference_cycles_fail() {
        let err = extract(json!({
            "A": { "allOf": [ { "$ref": "#/components/schemas/B" } ] },
            "B": { "allOf": [ { "$ref": "#/components/schemas/A" } ] }
        }))
        .err()
        .unwrap();
        assert!(matches!(err, GeneratorError::MalformedSchema { .. }));
    }

    #[test]
    fn keeps_unions_unmerged() {
        let set = extract(json!({
            "Shape": { "oneOf": [ { "type": "string" }, { "type": "integer" } ] },
            "Loose": { "anyOf": [ { "type": "boolean" } ] }
        }))
        .unwrap();
        match &set.get("Shape").unwrap().kind {
            SchemaKind::Union { kind, members } => {
                assert_eq!(*kind, UnionKind::OneOf);
                assert_eq!(members.len(), 2);
            }
            other => panic!("unexpected kind: {other:?}"),
        }
        assert!(matches!(
            set.get("Loose").unwrap().kind,
            SchemaKind::Union { kind: UnionKind::AnyOf, .. }
        ));
    }

    #[test]
    fn empty_schema_is_malformed_with_path() {
        let err = extract(json!({
            "User": { "type": "object", "properties": { "name": { "description": "no type" } } }
        }))
        .err()
        .unwrap();
        match err {
            GeneratorError::MalformedSchema { path, .. } => {
                assert_eq!(path.to_string(), "#/components/schemas/User/properties/name");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn number_formats_and_nullable_markers() {
        let set = extract(json!({
            "Price": { "type": "number", "format": "float" },
            "Amount": { "type": "number" },
            "Maybe": { "type": "string", "x-nullable": true },
            "Also": { "type": "string", "nullable": true }
        }))
        .unwrap();
        assert_eq!(set.get("Price").unwrap().kind, SchemaKind::Primitive(Primitive::Float));
        assert_eq!(set.get("Amount").unwrap().kind, SchemaKind::Primitive(Primitive::Number));
        assert!(set.get("Maybe").unwrap().nullable);
        assert!(set.get("Also").unwrap().nullable);
    }

    #[test]
    fn additional_properties_shapes() {
        let set = extract(json!({
            "Free": { "type": "object" },
            "Closed": { "type": "object", "additionalProperties": false, "properties": { "a": { "type": "string" } } },
            "Counts": { "type": "object", "additionalProperties": { "type": "integer" } },
            "Untyped": { "type": "object", "additionalProperties": {} }
        }))
        .unwrap();
        let additional = |name: &str| match &set.get(name).unwrap().kind {
            SchemaKind::Object { additional, .. } => additional.clone(),
            other => panic!("unexpected kind: {other:?}"),
        };
        assert_eq!(additional("Free"), AdditionalProperties::Allowed);
        assert_eq!(additional("Closed"), AdditionalProperties::Forbidden);
        assert!(matches!(additional("Counts"), AdditionalProperties::Typed(_)));
        assert_eq!(additional("Untyped"), AdditionalProperties::Allowed);
    }

    #[test]
    fn non_component_references_are_rejected() {
        let err = extract(json!({
            "Remote": { "$ref": "https://example.com/schema.json" }
        }))
        .err()
        .unwrap();
        assert!(matches!(err, GeneratorError::MalformedSchema { .. }));
    }

    #[test]
    fn extensions_are_captured() {
        let set = extract(json!({
            "Reply": { "type": "string", "x-response-type": "simple-rpc", "format": "text" }
        }))
        .unwrap();
        let reply = set.get("Reply").unwrap();
        assert_eq!(reply.extension_str("x-response-type"), Some("simple-rpc"));
        assert_eq!(reply.extensions.len(), 1);
    }
}
