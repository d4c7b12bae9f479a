//! `service_types.bal`: one service object type per service type.

use crate::diagnostic::GeneratorError;
use crate::ir::{GenerationModel, RemoteFunction};
use crate::naming::type_name;

use super::template::Template;

/// Abstract remote function signature, caller first.
pub fn remote_function_signature(function: &RemoteFunction) -> String {
    let mut parameters = vec!["websocket:Caller caller".to_string()];
    parameters.extend(
        function
            .parameters
            .iter()
            .map(|p| format!("{} {}", type_name(&p.type_name), p.name)),
    );
    format!(
        "remote function {}({}) returns error?",
        function.function_name,
        parameters.join(", ")
    )
}

pub fn render_service_types(model: &GenerationModel, template: &Template) -> Result<String, GeneratorError> {
    let mut output = String::new();

    for service_type in &model.service_types {
        output.push_str(&format!(
            "public type {} service object {{\n",
            service_type.service_type_name
        ));
        for function in &service_type.remote_functions {
            output.push_str(&format!("    {};\n", remote_function_signature(function)));
        }
        output.push_str("};\n\n");
    }

    // With no service types any service may attach; the listener then rejects it.
    let generic = if model.service_types.is_empty() {
        "websocket:Service".to_string()
    } else {
        model
            .service_types
            .iter()
            .map(|s| s.service_type_name.as_str())
            .collect::<Vec<_>>()
            .join("|")
    };

    template.render(&[
        ("TITLE", model.title.as_str()),
        ("SERVICE_TYPES", output.as_str()),
        ("GENERIC_SERVICE_TYPE", generic.as_str()),
    ])
}
