//! Client operation extraction from `publish` operations.

use serde_json::Value;

use crate::diagnostic::GeneratorError;
use crate::document::{AsyncApiDocument, MessageNode};
use crate::ir::{ClientFunction, ClientResponse};
use crate::naming::client_function_name;

use super::service::component_type;

pub const RESPONSE_KEY: &str = "x-response";
pub const RESPONSE_TYPE_KEY: &str = "x-response-type";

const SIMPLE_RPC: &str = "simple-rpc";
const SERVER_STREAMING: &str = "server-streaming";

/// One client function per message of every `publish` operation.
pub fn extract_client_functions(document: &AsyncApiDocument) -> Result<Vec<ClientFunction>, GeneratorError> {
    let mut functions = Vec::new();

    for channel in document.channels() {
        for message in channel.operation_messages(document, "publish")? {
            let payload = message.payload().ok_or_else(|| {
                GeneratorError::malformed(&message.path, "message declares no payload")
            })?;
            let payload_type = component_type(document, &payload)?.to_string();
            let message_name = message.name.clone().unwrap_or_else(|| payload_type.clone());

            let response = client_response(document, &message, &message_name)?;
            let function = ClientFunction {
                function_name: client_function_name(&message_name),
                message_name,
                payload_type,
                response,
            };
            tracing::debug!(
                function = %function.function_name,
                streaming = function.response.as_ref().map(|r| r.streaming).unwrap_or(false),
                "extracted client function"
            );
            functions.push(function);
        }
    }

    Ok(functions)
}

fn client_response(
    document: &AsyncApiDocument,
    message: &MessageNode<'_>,
    message_name: &str,
) -> Result<Option<ClientResponse>, GeneratorError> {
    let Some(value) = message.extension(RESPONSE_KEY) else {
        return Ok(None);
    };
    let response_path = message.path.join(RESPONSE_KEY);

    let responses = match value.get("oneOf").and_then(Value::as_array) {
        Some(variants) => variants
            .iter()
            .enumerate()
            .map(|(i, variant)| {
                document.resolve_message(variant, response_path.join("oneOf").join(i.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?,
        None => vec![document.resolve_message(value, response_path.clone())?],
    };

    let mut type_names = Vec::with_capacity(responses.len());
    let mut declared = Vec::new();
    for response in &responses {
        let payload = response.payload().ok_or_else(|| {
            GeneratorError::malformed(&response.path, "response message declares no payload")
        })?;
        type_names.push(component_type(document, &payload)?.to_string());
        if let Some(kind) = response.extension_str(RESPONSE_TYPE_KEY) {
            declared.push((kind, response.path.join(RESPONSE_TYPE_KEY)));
        }
    }

    if let Some(kind) = message.extension_str(RESPONSE_TYPE_KEY) {
        declared.push((kind, message.path.join(RESPONSE_TYPE_KEY)));
    }

    let mut streaming = None;
    for (kind, path) in declared {
        let is_streaming = match kind {
            SERVER_STREAMING => true,
            SIMPLE_RPC => false,
            other => {
                return Err(GeneratorError::malformed(
                    &path,
                    format!("unknown response type '{}', expected {} or {}", other, SIMPLE_RPC, SERVER_STREAMING),
                ))
            }
        };
        match streaming {
            Some(previous) if previous != is_streaming => {
                return Err(GeneratorError::StreamingRpcConflict {
                    schema: message_name.to_string(),
                })
            }
            _ => streaming = Some(is_streaming),
        }
    }

    Ok(Some(ClientResponse {
        type_names,
        streaming: streaming.unwrap_or(false),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(channels: serde_json::Value, messages: serde_json::Value) -> AsyncApiDocument {
        AsyncApiDocument::new(json!({
            "channels": channels,
            "components": {
                "schemas": {
                    "Subscribe": { "type": "object" },
                    "Ack": { "type": "object" },
                    "Tick": { "type": "object" }
                },
                "messages": messages
            }
        }))
    }

    #[test]
    fn publish_messages_become_client_functions() {
        let doc = document(
            json!({ "/": { "publish": { "message": { "$ref": "#/components/messages/Subscribe" } } } }),
            json!({
                "Subscribe": {
                    "payload": { "$ref": "#/components/schemas/Subscribe" },
                    "x-response": { "$ref": "#/components/messages/Ack" }
                },
                "Ack": { "payload": { "$ref": "#/components/schemas/Ack" } }
            }),
        );

        let functions = extract_client_functions(&doc).unwrap();
        assert_eq!(functions.len(), 1);
        let function = &functions[0];
        assert_eq!(function.function_name, "doSubscribe");
        assert_eq!(function.payload_type, "Subscribe");
        let response = function.response.as_ref().unwrap();
        assert_eq!(response.type_names, vec!["Ack"]);
        assert!(!response.streaming);
    }

    #[test]
    fn streaming_responses() {
        let doc = document(
            json!({ "/": { "publish": { "message": { "$ref": "#/components/messages/Subscribe" } } } }),
            json!({
                "Subscribe": {
                    "payload": { "$ref": "#/components/schemas/Subscribe" },
                    "x-response-type": "server-streaming",
                    "x-response": { "oneOf": [
                        { "$ref": "#/components/messages/Ack" },
                        { "$ref": "#/components/messages/Tick" }
                    ]}
                },
                "Ack": { "payload": { "$ref": "#/components/schemas/Ack" } },
                "Tick": { "payload": { "$ref": "#/components/schemas/Tick" } }
            }),
        );

        let functions = extract_client_functions(&doc).unwrap();
        let response = functions[0].response.as_ref().unwrap();
        assert_eq!(response.type_names, vec!["Ack", "Tick"]);
        assert!(response.streaming);
    }

    #[test]
    fn mixed_response_markers_conflict() {
        let doc = document(
            json!({ "/": { "publish": { "message": { "$ref": "#/components/messages/Subscribe" } } } }),
            json!({
                "Subscribe": {
                    "payload": { "$ref": "#/components/schemas/Subscribe" },
                    "x-response": { "oneOf": [
                        { "$ref": "#/components/messages/Ack" },
                        { "$ref": "#/components/messages/Tick" }
                    ]}
                },
                "Ack": { "x-response-type": "simple-rpc", "payload": { "$ref": "#/components/schemas/Ack" } },
                "Tick": { "x-response-type": "server-streaming", "payload": { "$ref": "#/components/schemas/Tick" } }
            }),
        );

        let err = extract_client_functions(&doc).err().unwrap();
        match err {
            GeneratorError::StreamingRpcConflict { schema } => assert_eq!(schema, "Subscribe"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn fire_and_forget_without_response() {
        let doc = document(
            json!({ "/": { "publish": { "message": {
                "name": "ping_request",
                "payload": { "$ref": "#/components/schemas/Tick" }
            }}}}),
            json!({}),
        );
        let functions = extract_client_functions(&doc).unwrap();
        assert_eq!(functions[0].function_name, "doPingRequest");
        assert!(functions[0].response.is_none());
    }
}
