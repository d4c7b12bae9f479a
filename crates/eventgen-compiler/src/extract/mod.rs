//! Document → entity extraction.
//!
//! Each extractor reads the document through the [`crate::document`] views
//! and produces plain entities. The document itself is never mutated.

mod client;
mod schema;
mod service;

pub use client::extract_client_functions;
pub use schema::{check_references, extract_schemas};
pub use service::{extract_service_types, service_type_name};

use crate::config::GenerationMode;
use crate::diagnostic::GeneratorError;
use crate::document::AsyncApiDocument;
use crate::ir::GenerationModel;

/// Runs every extractor and the model reference check.
pub fn extract_model(document: &AsyncApiDocument, mode: GenerationMode) -> Result<GenerationModel, GeneratorError> {
    let schemas = extract_schemas(document)?;
    check_references(&schemas)?;

    let (service_types, event_path) = extract_service_types(document)?;
    let client_functions = match mode {
        GenerationMode::Service => Vec::new(),
        GenerationMode::Client => extract_client_functions(document)?,
    };

    let model = GenerationModel {
        title: document.title(),
        server_url: document.server_url(),
        schemas,
        service_types,
        event_path,
        client_functions,
    };

    tracing::info!(
        schemas = model.schemas.len(),
        service_types = model.service_types.len(),
        remote_functions = model.remote_function_count(),
        client_functions = model.client_functions.len(),
        "extracted model"
    );

    Ok(model)
}
