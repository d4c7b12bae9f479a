//! Validation of the extracted model.
//!
//! Unlike extraction, validation never stops at the first problem: every
//! violation is collected so one run reports all of them.

mod dispatch;
mod names;

use crate::diagnostic::{GeneratorError, ValidationError};
use crate::ir::GenerationModel;

/// Collects every naming and dispatch-shape violation of the model.
///
/// Type name collisions come first, then handler names, client names and
/// the dispatch key.
pub fn validate_dispatch(model: &GenerationModel) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    names::validate_type_names(model, &mut errors);
    names::validate_names(model, &mut errors);
    names::validate_client_names(model, &mut errors);
    dispatch::validate_dispatch_key(model, &mut errors);
    errors
}

/// Fails with [`GeneratorError::ValidationFailed`] if any violation was found.
pub fn validate_model(model: &GenerationModel) -> Result<(), GeneratorError> {
    let errors = validate_dispatch(model);
    if errors.is_empty() {
        return Ok(());
    }
    for error in &errors {
        tracing::debug!(%error, "validation error");
    }
    Err(GeneratorError::ValidationFailed { errors })
}
