//! Violations reported by the dispatch validator.
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// A single naming or dispatch-shape violation.
///
/// Validation collects every violation before reporting, so these are plain
/// values rather than early returns.
#[allow(unused_assignments)]
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Function '{function}' of '{service_type}' must match ^on[A-Z][A-Za-z0-9]*$")]
    #[diagnostic(
        code(eventgen::validate::invalid_function_name),
        help("Event names must produce an 'on' + PascalCase handler name, e.g. app_mention -> onAppMention")
    )]
    InvalidFunctionName {
        function: String,
        service_type: String,
    },

    #[error("Function '{function}' of '{service_type}' collides with a reserved WebSocket handler")]
    #[diagnostic(
        code(eventgen::validate::reserved_function_name),
        help("Rename the event; onMessage, onTextMessage, onBinaryMessage, onClose, onOpen, onPing, onPong, onError and onIdleTimeout are reserved")
    )]
    ReservedFunctionName {
        function: String,
        service_type: String,
    },

    #[error("Event '{event}' is declared more than once in '{service_type}'")]
    #[diagnostic(code(eventgen::validate::duplicate_event))]
    DuplicateEventName {
        event: String,
        service_type: String,
    },

    #[error("Events {events} of '{service_type}' all map to function '{function}'")]
    #[diagnostic(
        code(eventgen::validate::duplicate_function_name),
        help("Event and message names that differ only in separators or case produce the same function; rename one of them")
    )]
    DuplicateFunctionName {
        function: String,
        events: String,
        service_type: String,
    },

    #[error("Schemas {schemas} all map to type '{type_name}'")]
    #[diagnostic(
        code(eventgen::validate::duplicate_type_name),
        help("Schema names that differ only in separators or case produce the same Ballerina type; rename one of them")
    )]
    DuplicateTypeName {
        type_name: String,
        schemas: String,
    },

    #[error("Dispatch key '{accessor}' does not exist in the schema graph")]
    #[diagnostic(
        code(eventgen::validate::dispatch_key_not_found),
        help("The event identifier path must name properties declared under #/components/schemas")
    )]
    DispatchKeyNotFound {
        accessor: String,
    },

    #[error("Dispatch key '{accessor}' is optional or nullable")]
    #[diagnostic(
        code(eventgen::validate::dispatch_key_optional),
        help("List the field under 'required' and do not mark it nullable")
    )]
    DispatchKeyOptional {
        accessor: String,
    },

    #[error("Dispatch key '{accessor}' must be a string, found {found}")]
    #[diagnostic(code(eventgen::validate::dispatch_key_not_string))]
    DispatchKeyNotString {
        accessor: String,
        found: String,
    },

    #[error("Payload '{payload_type}' of '{function}' does not carry the dispatch key '{accessor}'")]
    #[diagnostic(
        code(eventgen::validate::payload_missing_dispatch_key),
        help("Every event payload must contain the event identifier field as a required string")
    )]
    PayloadMissingDispatchKey {
        function: String,
        payload_type: String,
        accessor: String,
    },

    #[error("Function '{function}' would take {count} parameters, at most {max} are allowed")]
    #[diagnostic(
        code(eventgen::validate::too_many_parameters),
        help("Handlers receive the caller and the event payload only; drop the message headers schema")
    )]
    TooManyParameters {
        function: String,
        count: usize,
        max: usize,
    },
}
