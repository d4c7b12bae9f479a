//! Dispatch-key shape rules.
//!
//! For body location the event identifier path must resolve, from the
//! declared record and from every payload type, to a required, non-nullable
//! string field. Header location has nothing to check at this level.

use crate::diagnostic::ValidationError;
use crate::ir::{GenerationModel, IdentifierLocation, Primitive, Schema, SchemaKind, SchemaSet};

/// Where a path ended up.
enum Resolved<'a> {
    Field { schema: &'a Schema, optional: bool },
    Missing,
}

/// Walks `path` down from `root`, following references at every step.
fn resolve_path<'a>(schemas: &'a SchemaSet, root: &'a Schema, path: &[String]) -> Resolved<'a> {
    let Some(mut current) = schemas.resolve(root) else {
        return Resolved::Missing;
    };
    let mut optional = false;

    for component in path {
        let Some(property) = current.property(component) else {
            return Resolved::Missing;
        };
        optional |= !current.is_required(component) || property.schema.nullable;

        let Some(next) = schemas.resolve(&property.schema) else {
            return Resolved::Missing;
        };
        optional |= next.nullable;
        current = next;
    }

    Resolved::Field {
        schema: current,
        optional,
    }
}

fn is_string(schema: &Schema) -> bool {
    schema.kind == SchemaKind::Primitive(Primitive::String)
}

pub fn validate_dispatch_key(model: &GenerationModel, errors: &mut Vec<ValidationError>) {
    let event_path = &model.event_path;
    if event_path.location != IdentifierLocation::Body {
        return;
    }
    let Some(record) = event_path.record.as_deref() else {
        return;
    };
    let accessor = event_path.accessor(false);

    match model.schemas.get(record).map(|root| resolve_path(&model.schemas, root, &event_path.path)) {
        None | Some(Resolved::Missing) => {
            errors.push(ValidationError::DispatchKeyNotFound { accessor });
            return;
        }
        Some(Resolved::Field { schema, optional }) => {
            if optional {
                errors.push(ValidationError::DispatchKeyOptional {
                    accessor: accessor.clone(),
                });
            }
            if !is_string(schema) {
                errors.push(ValidationError::DispatchKeyNotString {
                    accessor: accessor.clone(),
                    found: schema.describe(),
                });
            }
        }
    }

    for (_, function) in model.remote_functions() {
        if function.event_payload_type == record {
            continue;
        }
        let carries_key = model
            .schemas
            .get(&function.event_payload_type)
            .map(|payload| resolve_path(&model.schemas, payload, &event_path.path))
            .map(|resolved| match resolved {
                Resolved::Field { schema, optional } => !optional && is_string(schema),
                Resolved::Missing => false,
            })
            .unwrap_or(false);

        if !carries_key {
            errors.push(ValidationError::PayloadMissingDispatchKey {
                function: function.function_name.clone(),
                payload_type: function.event_payload_type.clone(),
                accessor: accessor.clone(),
            });
        }
    }
}
