//! Thin views over raw document nodes.
//!
//! These hide `serde_json::Value` navigation behind typed getters and carry
//! the node's [`SpecPath`] for diagnostics.

use serde_json::{Map, Value};

use crate::diagnostic::{GeneratorError, SpecPath};

const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";
const MESSAGE_REF_PREFIX: &str = "#/components/messages/";

/// Collects every `x-*` key of a mapping node.
fn collect_extensions(value: &Value) -> Map<String, Value> {
    value
        .as_object()
        .map(|object| {
            object
                .iter()
                .filter(|(key, _)| key.starts_with("x-"))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        })
        .unwrap_or_default()
}

/// A parsed AsyncAPI document.
#[derive(Debug, Clone)]
pub struct AsyncApiDocument {
    root: Value,
}

impl AsyncApiDocument {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// `info.title` on a single line, or `AsyncAPI` when absent or blank.
    ///
    /// The title lands in generated comments, so runs of whitespace
    /// (including newlines of YAML block scalars) collapse to one space.
    pub fn title(&self) -> String {
        let title = self
            .root
            .pointer("/info/title")
            .and_then(Value::as_str)
            .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default();
        if title.is_empty() {
            "AsyncAPI".to_string()
        } else {
            title
        }
    }

    /// URL of the first declared server.
    pub fn server_url(&self) -> Option<String> {
        let servers = self.root.get("servers")?.as_object()?;
        let (_, server) = servers.iter().next()?;
        server.get("url").and_then(Value::as_str).map(String::from)
    }

    /// Vendor extensions declared on the document root.
    pub fn extensions(&self) -> Map<String, Value> {
        collect_extensions(&self.root)
    }

    /// Named component schemas in declaration order.
    pub fn component_schemas(&self) -> Vec<(&str, SchemaNode<'_>)> {
        self.root
            .pointer("/components/schemas")
            .and_then(Value::as_object)
            .map(|schemas| {
                schemas
                    .iter()
                    .map(|(name, value)| {
                        (name.as_str(), SchemaNode::new(value, SpecPath::component_schema(name)))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// A single component schema by name.
    pub fn component_schema(&self, name: &str) -> Option<SchemaNode<'_>> {
        self.root
            .pointer("/components/schemas")
            .and_then(|schemas| schemas.get(name))
            .map(|value| SchemaNode::new(value, SpecPath::component_schema(name)))
    }

    /// Channels in declaration order.
    pub fn channels(&self) -> Vec<ChannelNode<'_>> {
        self.root
            .get("channels")
            .and_then(Value::as_object)
            .map(|channels| {
                channels
                    .iter()
                    .map(|(name, value)| ChannelNode {
                        name: name.as_str(),
                        value,
                        path: SpecPath::channel(name),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Resolves a message node, following a `$ref` into `components.messages`.
    pub fn resolve_message<'a>(
        &'a self,
        value: &'a Value,
        path: SpecPath,
    ) -> Result<MessageNode<'a>, GeneratorError> {
        let Some(reference) = value.get("$ref").and_then(Value::as_str) else {
            let name = value
                .get("name")
                .or_else(|| value.get("messageId"))
                .and_then(Value::as_str)
                .map(String::from);
            return Ok(MessageNode { name, value, path });
        };

        let name = reference.strip_prefix(MESSAGE_REF_PREFIX).ok_or_else(|| {
            GeneratorError::malformed(&path, format!("message reference '{}' must point into {}", reference, MESSAGE_REF_PREFIX))
        })?;
        let target = self
            .root
            .pointer("/components/messages")
            .and_then(|messages| messages.get(name))
            .ok_or_else(|| GeneratorError::UnresolvedReference {
                reference: reference.to_string(),
                path: path.clone(),
            })?;

        Ok(MessageNode {
            name: Some(name.to_string()),
            value: target,
            path: SpecPath::component_message(name),
        })
    }
}

/// One entry of `channels`.
#[derive(Debug, Clone)]
pub struct ChannelNode<'a> {
    pub name: &'a str,
    value: &'a Value,
    pub path: SpecPath,
}

impl<'a> ChannelNode<'a> {
    pub fn extension_str(&self, key: &str) -> Option<&'a str> {
        self.value.get(key).and_then(Value::as_str)
    }

    pub fn has_operation(&self, operation: &str) -> bool {
        self.value.get(operation).is_some()
    }

    /// Messages of the `subscribe` or `publish` operation, expanding `oneOf`.
    pub fn operation_messages(
        &self,
        document: &'a AsyncApiDocument,
        operation: &str,
    ) -> Result<Vec<MessageNode<'a>>, GeneratorError> {
        let op_path = self.path.join(operation);
        let Some(message) = self.value.get(operation).and_then(|op| op.get("message")) else {
            return Ok(Vec::new());
        };
        let message_path = op_path.join("message");

        match message.get("oneOf").and_then(Value::as_array) {
            Some(variants) => variants
                .iter()
                .enumerate()
                .map(|(i, variant)| {
                    document.resolve_message(variant, message_path.join("oneOf").join(i.to_string()))
                })
                .collect(),
            None => Ok(vec![document.resolve_message(message, message_path)?]),
        }
    }
}

/// A (resolved) message.
#[derive(Debug, Clone)]
pub struct MessageNode<'a> {
    /// Component name, or the inline `name`/`messageId`.
    pub name: Option<String>,
    value: &'a Value,
    pub path: SpecPath,
}

impl<'a> MessageNode<'a> {
    pub fn extension_str(&self, key: &str) -> Option<&'a str> {
        self.value.get(key).and_then(Value::as_str)
    }

    pub fn extension(&self, key: &str) -> Option<&'a Value> {
        self.value.get(key)
    }

    pub fn payload(&self) -> Option<SchemaNode<'a>> {
        self.value
            .get("payload")
            .map(|value| SchemaNode::new(value, self.path.join("payload")))
    }

    pub fn headers(&self) -> Option<SchemaNode<'a>> {
        self.value
            .get("headers")
            .map(|value| SchemaNode::new(value, self.path.join("headers")))
    }
}

/// Additional properties of an object node.
pub enum AdditionalNode<'a> {
    Flag(bool),
    Schema(SchemaNode<'a>),
}

/// A schema node.
#[derive(Debug, Clone)]
pub struct SchemaNode<'a> {
    value: &'a Value,
    pub path: SpecPath,
}

impl<'a> SchemaNode<'a> {
    pub fn new(value: &'a Value, path: SpecPath) -> Self {
        Self { value, path }
    }

    fn str_field(&self, key: &str) -> Option<&'a str> {
        self.value.get(key).and_then(Value::as_str)
    }

    fn list(&self, key: &str) -> Option<Vec<SchemaNode<'a>>> {
        let items = self.value.get(key)?.as_array()?;
        let base = self.path.join(key);
        Some(
            items
                .iter()
                .enumerate()
                .map(|(i, value)| SchemaNode::new(value, base.join(i.to_string())))
                .collect(),
        )
    }

    pub fn is_mapping(&self) -> bool {
        self.value.is_object()
    }

    pub fn type_name(&self) -> Option<&'a str> {
        self.str_field("type")
    }

    pub fn format(&self) -> Option<&'a str> {
        self.str_field("format")
    }

    pub fn description(&self) -> Option<&'a str> {
        self.str_field("description")
    }

    /// Raw `$ref` string.
    pub fn reference(&self) -> Option<&'a str> {
        self.str_field("$ref")
    }

    /// Component schema name targeted by `$ref`.
    pub fn schema_reference(&self) -> Option<Result<&'a str, GeneratorError>> {
        let reference = self.reference()?;
        Some(reference.strip_prefix(SCHEMA_REF_PREFIX).ok_or_else(|| {
            GeneratorError::malformed(
                &self.path,
                format!("reference '{}' must point into {}", reference, SCHEMA_REF_PREFIX),
            )
        }))
    }

    pub fn items(&self) -> Option<SchemaNode<'a>> {
        self.value
            .get("items")
            .map(|value| SchemaNode::new(value, self.path.join("items")))
    }

    pub fn max_items(&self) -> Option<u64> {
        self.value.get("maxItems").and_then(Value::as_u64)
    }

    /// Declared properties in declaration order.
    pub fn properties(&self) -> Option<Vec<(&'a str, SchemaNode<'a>)>> {
        let properties = self.value.get("properties")?.as_object()?;
        let base = self.path.join("properties");
        Some(
            properties
                .iter()
                .map(|(name, value)| (name.as_str(), SchemaNode::new(value, base.join(name))))
                .collect(),
        )
    }

    pub fn required(&self) -> Vec<&'a str> {
        self.value
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn additional_properties(&self) -> Option<AdditionalNode<'a>> {
        let value = self.value.get("additionalProperties")?;
        Some(match value.as_bool() {
            Some(flag) => AdditionalNode::Flag(flag),
            None => AdditionalNode::Schema(SchemaNode::new(
                value,
                self.path.join("additionalProperties"),
            )),
        })
    }

    pub fn all_of(&self) -> Option<Vec<SchemaNode<'a>>> {
        self.list("allOf")
    }

    pub fn one_of(&self) -> Option<Vec<SchemaNode<'a>>> {
        self.list("oneOf")
    }

    pub fn any_of(&self) -> Option<Vec<SchemaNode<'a>>> {
        self.list("anyOf")
    }

    /// `nullable: true` or the `x-nullable` vendor marker.
    pub fn nullable(&self) -> bool {
        ["nullable", "x-nullable"]
            .iter()
            .any(|key| self.value.get(*key).and_then(Value::as_bool).unwrap_or(false))
    }

    /// Whether the node declares anything at all beyond annotations.
    pub fn declares_type(&self) -> bool {
        ["allOf", "oneOf", "anyOf"].iter().any(|key| self.value.get(*key).is_some())
            || self.type_name().is_some()
            || self.reference().is_some()
            || self.value.get("items").is_some()
            || self.value.get("properties").is_some()
            || self.value.get("additionalProperties").is_some()
    }

    pub fn extensions(&self) -> Map<String, Value> {
        collect_extensions(self.value)
    }
}
