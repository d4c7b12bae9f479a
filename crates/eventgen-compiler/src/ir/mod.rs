//! Language-agnostic entity model.
//!
//! Produced by the extractors and consumed, read-only, by the validator and
//! the code generators. Nothing here refers to the raw document tree except
//! the opaque `extensions` map on schemas.

mod schema;
mod service;

pub use schema::{AdditionalProperties, Primitive, Property, Schema, SchemaKind, SchemaSet, UnionKind};
pub use service::{
    ClientFunction, ClientResponse, EventIdentifierPath, IdentifierLocation, Parameter,
    RemoteFunction, ServiceType, RESERVED_FUNCTION_NAMES,
};

/// Everything extracted from one specification.
#[derive(Debug, Clone)]
pub struct GenerationModel {
    /// `info.title`, used in generated file headers.
    pub title: String,
    /// URL of the first declared server, if any.
    pub server_url: Option<String>,
    pub schemas: SchemaSet,
    pub service_types: Vec<ServiceType>,
    pub event_path: EventIdentifierPath,
    /// Client operations; empty unless client generation was requested.
    pub client_functions: Vec<ClientFunction>,
}

impl GenerationModel {
    /// Total number of remote functions across all service types.
    pub fn remote_function_count(&self) -> usize {
        self.service_types.iter().map(|s| s.remote_functions.len()).sum()
    }

    /// Iterates `(service type, remote function)` pairs in declaration order.
    pub fn remote_functions(&self) -> impl Iterator<Item = (&ServiceType, &RemoteFunction)> {
        self.service_types
            .iter()
            .flat_map(|s| s.remote_functions.iter().map(move |f| (s, f)))
    }
}
