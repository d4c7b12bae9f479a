//! Generator error types.
#![allow(unused_assignments)]

use std::path::PathBuf;
use miette::Diagnostic;
use thiserror::Error;

use super::{SpecPath, ValidationError};

/// Errors that can occur during generation.
#[allow(unused_assignments)]
#[derive(Error, Diagnostic, Debug)]
pub enum GeneratorError {
    // =========================================================================
    // Input Errors
    // =========================================================================
    #[error("I/O error on '{}': {message}", path.display())]
    #[diagnostic(code(eventgen::io::failed))]
    IoError {
        path: PathBuf,
        message: String,
    },

    #[error("Unsupported specification format: '{}'", path.display())]
    #[diagnostic(
        code(eventgen::input::unsupported_format),
        help("Specifications must have a .yaml, .yml or .json extension")
    )]
    UnsupportedSpecFormat {
        path: PathBuf,
    },

    #[error("Failed to parse specification '{}'{}: {message}", path.display(), location_suffix(*line, *column))]
    #[diagnostic(code(eventgen::input::parse_failed))]
    SpecParseError {
        path: PathBuf,
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },

    // =========================================================================
    // Schema Errors
    // =========================================================================
    #[error("Malformed schema at {path}: {reason}")]
    #[diagnostic(
        code(eventgen::schema::malformed),
        help("A schema needs a type, items, properties, a $ref or one of oneOf/anyOf/allOf")
    )]
    MalformedSchema {
        path: SpecPath,
        reason: String,
    },

    #[error("Property '{property}' is declared more than once while merging allOf at {path}")]
    #[diagnostic(
        code(eventgen::schema::duplicate_property),
        help("Rename the property in one of the allOf members")
    )]
    DuplicateProperty {
        property: String,
        path: SpecPath,
    },

    #[error("Unresolved schema reference '{reference}' at {path}")]
    #[diagnostic(
        code(eventgen::schema::unresolved_reference),
        help("References must point at a schema declared under #/components/schemas")
    )]
    UnresolvedReference {
        reference: String,
        path: SpecPath,
    },

    #[error("Schema '{schema}' mixes server-streaming and simple-rpc responses")]
    #[diagnostic(
        code(eventgen::schema::streaming_rpc_conflict),
        help("A response union must be either streaming or single-response, not both")
    )]
    StreamingRpcConflict {
        schema: String,
    },

    #[error("Array '{schema}' declares maxItems {max_items}, above the supported maximum of {limit}")]
    #[diagnostic(code(eventgen::schema::array_length_exceeded))]
    ArrayLengthExceeded {
        schema: String,
        max_items: u64,
        limit: u64,
    },

    // =========================================================================
    // Service Errors
    // =========================================================================
    #[error("No event identifier declared in the specification")]
    #[diagnostic(
        code(eventgen::service::missing_event_identifier),
        help("Add 'x-ballerina-event-identifier' with a 'type' of header or body to the document root")
    )]
    MissingEventIdentifier,

    #[error("Invalid event identifier at {path}: {reason}")]
    #[diagnostic(
        code(eventgen::service::invalid_event_identifier),
        help("Use {{ type: header, name: <header> }} or {{ type: body, path: '#/components/schemas/<Record>/<field>' }}")
    )]
    InvalidEventIdentifier {
        path: SpecPath,
        reason: String,
    },

    #[error("Message at {path} does not declare a service type")]
    #[diagnostic(
        code(eventgen::service::ambiguous_grouping),
        help("Add 'x-ballerina-service-type' to the message or its channel")
    )]
    AmbiguousServiceGrouping {
        path: SpecPath,
    },

    #[error("Message at {path} does not declare an event type")]
    #[diagnostic(
        code(eventgen::service::missing_event_type),
        help("Add 'x-ballerina-event-type' to the message")
    )]
    MissingEventType {
        path: SpecPath,
    },

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Specification failed validation with {} error(s)", errors.len())]
    #[diagnostic(code(eventgen::validate::failed))]
    ValidationFailed {
        #[related]
        errors: Vec<ValidationError>,
    },

    // =========================================================================
    // Template Errors
    // =========================================================================
    #[error("Template '{template}' is missing the anchor '{anchor}'")]
    #[diagnostic(
        code(eventgen::template::anchor_not_found),
        help("The template does not match this generator version")
    )]
    TemplateAnchorNotFound {
        template: String,
        anchor: String,
    },
}

/// ` at line L, column C` for parse errors, or nothing when unknown.
fn location_suffix(line: Option<usize>, column: Option<usize>) -> String {
    match (line, column) {
        (Some(line), Some(column)) => format!(" at line {}, column {}", line, column),
        (Some(line), None) => format!(" at line {}", line),
        _ => String::new(),
    }
}

impl GeneratorError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::IoError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a malformed schema error.
    pub fn malformed(path: &SpecPath, reason: impl Into<String>) -> Self {
        Self::MalformedSchema {
            path: path.clone(),
            reason: reason.into(),
        }
    }
}
