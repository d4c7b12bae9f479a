//! Handler naming rules.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;

use crate::diagnostic::ValidationError;
use crate::ir::{GenerationModel, RESERVED_FUNCTION_NAMES};
use crate::naming::type_name;

/// Caller handle plus the event payload.
pub const MAX_PARAMETERS: usize = 2;

/// Owner of the generated client functions in diagnostics.
pub const CLIENT_OWNER: &str = "Client";

fn function_name_pattern() -> &'static Regex {
    static FUNCTION_NAME_RE: OnceLock<Regex> = OnceLock::new();
    FUNCTION_NAME_RE.get_or_init(|| {
        Regex::new(r"^on[A-Z][A-Za-z0-9]*$").expect("function name regex must compile")
    })
}

pub fn validate_names(model: &GenerationModel, errors: &mut Vec<ValidationError>) {
    for service_type in &model.service_types {
        let mut seen_events = HashSet::new();
        let mut seen_functions: HashMap<&str, &str> = HashMap::new();

        for function in &service_type.remote_functions {
            if RESERVED_FUNCTION_NAMES.contains(&function.function_name.as_str()) {
                errors.push(ValidationError::ReservedFunctionName {
                    function: function.function_name.clone(),
                    service_type: service_type.service_type_name.clone(),
                });
            } else if !function_name_pattern().is_match(&function.function_name) {
                errors.push(ValidationError::InvalidFunctionName {
                    function: function.function_name.clone(),
                    service_type: service_type.service_type_name.clone(),
                });
            }

            if !seen_events.insert(function.event_name.as_str()) {
                errors.push(ValidationError::DuplicateEventName {
                    event: function.event_name.clone(),
                    service_type: service_type.service_type_name.clone(),
                });
            }

            match seen_functions.get(function.function_name.as_str()) {
                Some(first) if *first != function.event_name => {
                    errors.push(ValidationError::DuplicateFunctionName {
                        function: function.function_name.clone(),
                        events: format!("'{}', '{}'", first, function.event_name),
                        service_type: service_type.service_type_name.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    seen_functions.insert(&function.function_name, &function.event_name);
                }
            }

            let count = function.rendered_parameter_count();
            if count > MAX_PARAMETERS {
                errors.push(ValidationError::TooManyParameters {
                    function: function.function_name.clone(),
                    count,
                    max: MAX_PARAMETERS,
                });
            }
        }
    }
}

/// Client operations must not share a function name.
pub fn validate_client_names(model: &GenerationModel, errors: &mut Vec<ValidationError>) {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for function in &model.client_functions {
        if let Some(first) = seen.insert(&function.function_name, &function.message_name) {
            errors.push(ValidationError::DuplicateFunctionName {
                function: function.function_name.clone(),
                events: format!("'{}', '{}'", first, function.message_name),
                service_type: CLIENT_OWNER.to_string(),
            });
        }
    }
}

/// Every schema must render to a distinct Ballerina type name.
pub fn validate_type_names(model: &GenerationModel, errors: &mut Vec<ValidationError>) {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for schema in model.schemas.iter() {
        let name = type_name(&schema.name);
        match seen.get(&name) {
            Some(first) => errors.push(ValidationError::DuplicateTypeName {
                type_name: name,
                schemas: format!("'{}', '{}'", first, schema.name),
            }),
            None => {
                seen.insert(name, &schema.name);
            }
        }
    }
}
