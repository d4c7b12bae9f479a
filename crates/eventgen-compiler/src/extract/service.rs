//! Service type extraction from `subscribe` operations.

use serde::Deserialize;
use serde_json::Value;

use crate::diagnostic::{GeneratorError, SpecPath};
use crate::document::{AsyncApiDocument, MessageNode, SchemaNode};
use crate::ir::{EventIdentifierPath, Parameter, RemoteFunction, ServiceType};
use crate::naming::{function_name_for_event, get_valid_name, variable_name};

pub const SERVICE_TYPE_KEY: &str = "x-ballerina-service-type";
pub const EVENT_TYPE_KEY: &str = "x-ballerina-event-type";
pub const EVENT_IDENTIFIER_KEY: &str = "x-ballerina-event-identifier";

const SERVICE_SUFFIX: &str = "Service";
const SCHEMA_POINTER_PREFIX: &str = "#/components/schemas/";

/// Builds the service types and the event identifier path.
///
/// Every message of every `subscribe` operation becomes one remote function,
/// grouped by `x-ballerina-service-type` (message first, then channel).
/// Service types keep the order of their first appearance.
pub fn extract_service_types(
    document: &AsyncApiDocument,
) -> Result<(Vec<ServiceType>, EventIdentifierPath), GeneratorError> {
    let mut service_types: Vec<ServiceType> = Vec::new();
    let mut identifier = match document.root().get(EVENT_IDENTIFIER_KEY) {
        Some(value) => Some(parse_event_identifier(
            value,
            SpecPath::root().join(EVENT_IDENTIFIER_KEY),
        )?),
        None => None,
    };

    for channel in document.channels() {
        if !channel.has_operation("subscribe") {
            tracing::warn!(channel = channel.name, "channel has no subscribe operation; no handlers generated");
            continue;
        }

        for message in channel.operation_messages(document, "subscribe")? {
            if identifier.is_none() {
                if let Some(value) = message.extension(EVENT_IDENTIFIER_KEY) {
                    identifier = Some(parse_event_identifier(
                        value,
                        message.path.join(EVENT_IDENTIFIER_KEY),
                    )?);
                }
            }

            let key = message
                .extension_str(SERVICE_TYPE_KEY)
                .or_else(|| channel.extension_str(SERVICE_TYPE_KEY))
                .ok_or_else(|| GeneratorError::AmbiguousServiceGrouping {
                    path: message.path.clone(),
                })?;
            let service_type_name = service_type_name(key);
            let function = remote_function(document, &message)?;

            tracing::debug!(
                service_type = %service_type_name,
                function = %function.function_name,
                event = %function.event_name,
                "extracted remote function"
            );

            match service_types
                .iter_mut()
                .find(|s| s.service_type_name == service_type_name)
            {
                Some(existing) => existing.remote_functions.push(function),
                None => service_types.push(ServiceType {
                    service_type_name,
                    remote_functions: vec![function],
                }),
            }
        }
    }

    let identifier = identifier.ok_or(GeneratorError::MissingEventIdentifier)?;
    Ok((service_types, identifier))
}

/// `app_mention_handling` becomes `AppMentionHandlingService`.
pub fn service_type_name(key: &str) -> String {
    let name = get_valid_name(key, true);
    if name.ends_with(SERVICE_SUFFIX) {
        name
    } else {
        format!("{}{}", name, SERVICE_SUFFIX)
    }
}

fn remote_function(
    document: &AsyncApiDocument,
    message: &MessageNode<'_>,
) -> Result<RemoteFunction, GeneratorError> {
    let event_name = message
        .extension_str(EVENT_TYPE_KEY)
        .ok_or_else(|| GeneratorError::MissingEventType {
            path: message.path.clone(),
        })?;

    let payload = message.payload().ok_or_else(|| {
        GeneratorError::malformed(&message.path, "message declares no payload")
    })?;
    let payload_type = component_type(document, &payload)?;

    let mut parameters = vec![Parameter {
        name: variable_name(payload_type),
        type_name: payload_type.to_string(),
    }];

    if let Some(headers) = message.headers() {
        if headers.reference().is_some() {
            let headers_type = component_type(document, &headers)?;
            parameters.push(Parameter {
                name: variable_name(headers_type),
                type_name: headers_type.to_string(),
            });
        } else {
            tracing::debug!(path = %headers.path, "ignoring inline message headers");
        }
    }

    Ok(RemoteFunction {
        event_name: event_name.to_string(),
        function_name: function_name_for_event(event_name),
        event_payload_type: payload_type.to_string(),
        parameters,
    })
}

/// The component schema a message payload or headers node points at.
pub(crate) fn component_type<'a>(
    document: &AsyncApiDocument,
    node: &SchemaNode<'a>,
) -> Result<&'a str, GeneratorError> {
    let name = node.schema_reference().ok_or_else(|| {
        GeneratorError::malformed(&node.path, "expected a $ref to a component schema")
    })??;
    if document.component_schema(name).is_none() {
        return Err(GeneratorError::UnresolvedReference {
            reference: name.to_string(),
            path: node.path.clone(),
        });
    }
    Ok(name)
}

/// Raw `x-ballerina-event-identifier` declaration.
#[derive(Debug, Deserialize)]
struct EventIdentifierDecl {
    #[serde(rename = "type", alias = "location")]
    location: String,
    name: Option<String>,
    path: Option<String>,
}

fn parse_event_identifier(value: &Value, path: SpecPath) -> Result<EventIdentifierPath, GeneratorError> {
    let invalid = |reason: &str| GeneratorError::InvalidEventIdentifier {
        path: path.clone(),
        reason: reason.to_string(),
    };

    let decl: EventIdentifierDecl =
        serde_json::from_value(value.clone()).map_err(|e| invalid(&e.to_string()))?;

    match decl.location.as_str() {
        "header" => {
            let name = decl
                .name
                .filter(|name| !name.is_empty())
                .ok_or_else(|| invalid("header location requires a 'name'"))?;
            Ok(EventIdentifierPath::header(name))
        }
        "body" => {
            let pointer = decl
                .path
                .ok_or_else(|| invalid("body location requires a 'path'"))?;
            let rest = pointer
                .strip_prefix(SCHEMA_POINTER_PREFIX)
                .ok_or_else(|| invalid("path must start with #/components/schemas/"))?;

            let mut components = rest.split('/').map(|c| c.replace("~1", "/").replace("~0", "~"));
            let record = components
                .next()
                .filter(|record| !record.is_empty())
                .ok_or_else(|| invalid("path must name a record"))?;
            let fields: Vec<String> = components.collect();
            if fields.is_empty() {
                return Err(invalid("path must name at least one field below the record"));
            }
            if fields.iter().any(String::is_empty) {
                return Err(invalid("path contains an empty component"));
            }
            Ok(EventIdentifierPath::body(record, fields))
        }
        other => Err(invalid(&format!("unknown location '{}', expected header or body", other))),
    }
}
