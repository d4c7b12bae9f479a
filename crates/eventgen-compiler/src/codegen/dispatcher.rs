//! `dispatcher_service.bal`: routing incoming events to remote functions.
//!
//! The template ships a stub `matchRemoteFunc`; it is replaced by a function
//! that extracts the dispatch key and holds one `match` arm per event name.

use crate::config::TypeOptions;
use crate::diagnostic::GeneratorError;
use crate::ir::{GenerationModel, IdentifierLocation, RemoteFunction, ServiceType};
use crate::naming::{type_name, variable_name};

use super::template::{string_literal, Template, MATCH_REMOTE_FUNC_ANCHOR};

/// All handlers bound to one event name, in declaration order.
struct MatchArm<'a> {
    event_name: &'a str,
    handlers: Vec<(&'a ServiceType, &'a RemoteFunction)>,
}

fn match_arms(model: &GenerationModel) -> Vec<MatchArm<'_>> {
    let mut arms: Vec<MatchArm<'_>> = Vec::new();
    for (service_type, function) in model.remote_functions() {
        match arms.iter_mut().find(|arm| arm.event_name == function.event_name) {
            Some(arm) => arm.handlers.push((service_type, function)),
            None => arms.push(MatchArm {
                event_name: &function.event_name,
                handlers: vec![(service_type, function)],
            }),
        }
    }
    arms
}

/// Renders the routing function that replaces the template anchor.
pub fn render_match_function(model: &GenerationModel, options: &TypeOptions) -> String {
    let event_path = &model.event_path;
    let record = match event_path.location {
        IdentifierLocation::Body => event_path.record.as_deref(),
        IdentifierLocation::Header => None,
    };

    let mut output = String::new();
    output.push_str(
        "private function matchRemoteFunc(websocket:Caller caller, GenericDataType genericDataType) returns error? {\n",
    );

    let arms = match_arms(model);
    if arms.is_empty() {
        // A match needs at least one clause; with no handlers every event is dropped.
        output.push_str("    }");
        return output;
    }

    let dispatch_key = match record {
        Some(record) => {
            output.push_str(&format!(
                "        {} {} = check genericDataType.cloneWithType();\n",
                type_name(record),
                variable_name(record)
            ));
            event_path.accessor(options.nullable)
        }
        None => "self.dispatchHeader".to_string(),
    };

    output.push_str(&format!("        match {} {{\n", dispatch_key));
    for arm in arms {
        output.push_str(&format!("            {} => {{\n", string_literal(arm.event_name)));

        let mut declared: Vec<&str> = Vec::new();
        for (service_type, function) in &arm.handlers {
            let payload = &function.event_payload_type;
            let payload_variable = variable_name(payload);
            if Some(payload.as_str()) != record && !declared.contains(&payload.as_str()) {
                output.push_str(&format!(
                    "                {} {} = check genericDataType.cloneWithType();\n",
                    type_name(payload),
                    payload_variable
                ));
                declared.push(payload);
            }

            let service_name = &service_type.service_type_name;
            output.push_str(&format!(
                "                GenericServiceType? {} = self.services[{}];\n",
                service_variable(service_name),
                string_literal(service_name)
            ));
            output.push_str(&format!(
                "                if {} is {} {{\n",
                service_variable(service_name),
                service_name
            ));
            output.push_str(&format!(
                "                    check {}->{}(caller, {});\n",
                service_variable(service_name),
                function.function_name,
                payload_variable
            ));
            output.push_str("                }\n");
        }

        output.push_str("            }\n");
    }
    output.push_str("        }\n");
    output.push_str("    }");
    output
}

fn service_variable(service_type_name: &str) -> String {
    format!("{}Ref", variable_name(service_type_name))
}

/// Renders the dispatcher from `template`, which must contain the anchor.
pub fn render_dispatcher(
    model: &GenerationModel,
    options: &TypeOptions,
    template: &Template,
) -> Result<String, GeneratorError> {
    let function = render_match_function(model, options);
    template.render_with_anchor(&[("TITLE", model.title.as_str())], MATCH_REMOTE_FUNC_ANCHOR, &function)
}
