//! Service-side entities: service types, remote functions and the event identifier.

use crate::naming::{escape, variable_name};

/// Transport handler names of the WebSocket service framework. Generated
/// remote functions must never take one of these.
pub const RESERVED_FUNCTION_NAMES: &[&str] = &[
    "onMessage",
    "onTextMessage",
    "onBinaryMessage",
    "onClose",
    "onOpen",
    "onPing",
    "onPong",
    "onError",
    "onIdleTimeout",
];

/// A declared parameter of a remote function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    /// Component schema name of the parameter type.
    pub type_name: String,
}

/// One event handler bound to a single event name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFunction {
    /// Dispatch-key value that selects this handler.
    pub event_name: String,
    pub function_name: String,
    /// Component schema name of the event payload.
    pub event_payload_type: String,
    /// Declared parameters; the payload always comes first.
    pub parameters: Vec<Parameter>,
}

impl RemoteFunction {
    /// Parameter count once rendered, including the caller handle.
    pub fn rendered_parameter_count(&self) -> usize {
        self.parameters.len() + 1
    }
}

/// A generated service interface grouping related handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceType {
    pub service_type_name: String,
    /// Declaration order.
    pub remote_functions: Vec<RemoteFunction>,
}

/// Where the dispatch key lives in an incoming message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierLocation {
    Header,
    Body,
}

/// How to extract the dispatch key from an incoming message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventIdentifierPath {
    pub location: IdentifierLocation,
    /// Header name, for header location.
    pub header_name: Option<String>,
    /// Component schema the path starts at, for body location.
    pub record: Option<String>,
    /// Raw field components below the record.
    pub path: Vec<String>,
}

impl EventIdentifierPath {
    pub fn header(name: impl Into<String>) -> Self {
        Self {
            location: IdentifierLocation::Header,
            header_name: Some(name.into()),
            record: None,
            path: Vec::new(),
        }
    }

    pub fn body(record: impl Into<String>, path: Vec<String>) -> Self {
        Self {
            location: IdentifierLocation::Body,
            header_name: None,
            record: Some(record.into()),
            path,
        }
    }

    /// Name of the variable holding the decoded dispatch record.
    pub fn record_variable(&self) -> Option<String> {
        self.record.as_deref().map(variable_name)
    }

    /// Dot-joined, keyword-escaped accessor, e.g. `genericEvent.event.'type`.
    ///
    /// With `optional_access` every step uses `?.` instead of `.`.
    pub fn accessor(&self, optional_access: bool) -> String {
        let separator = if optional_access { "?." } else { "." };
        let mut accessor = self.record_variable().unwrap_or_default();
        for component in &self.path {
            accessor.push_str(separator);
            accessor.push_str(&escape(component));
        }
        accessor
    }

    /// Human readable form used in diagnostics.
    pub fn display_path(&self) -> String {
        match self.location {
            IdentifierLocation::Header => {
                format!("header '{}'", self.header_name.as_deref().unwrap_or_default())
            }
            IdentifierLocation::Body => self.accessor(false),
        }
    }
}

/// Response shape of a client operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientResponse {
    /// Component schema names of the possible responses.
    pub type_names: Vec<String>,
    pub streaming: bool,
}

/// One client operation, generated from a `publish` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientFunction {
    pub message_name: String,
    pub function_name: String,
    pub payload_type: String,
    pub response: Option<ClientResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_accessor_escapes_keywords() {
        let path = EventIdentifierPath::body("GenericEvent", vec!["event".into(), "type".into()]);
        assert_eq!(path.accessor(false), "genericEvent.event.'type");
        assert_eq!(path.accessor(true), "genericEvent?.event?.'type");
        assert_eq!(path.record_variable().as_deref(), Some("genericEvent"));
    }

    #[test]
    fn header_display() {
        let path = EventIdentifierPath::header("X-Event-Type");
        assert_eq!(path.display_path(), "header 'X-Event-Type'");
        assert_eq!(path.accessor(false), "");
    }

    #[test]
    fn parameter_count_includes_caller() {
        let function = RemoteFunction {
            event_name: "ping".into(),
            function_name: "onPingEvent".into(),
            event_payload_type: "Ping".into(),
            parameters: vec![Parameter { name: "ping".into(), type_name: "Ping".into() }],
        };
        assert_eq!(function.rendered_parameter_count(), 2);
    }
}
