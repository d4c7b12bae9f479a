//! `listener.bal`: service type resolution and dispatch-header capture.

use crate::diagnostic::GeneratorError;
use crate::ir::{GenerationModel, IdentifierLocation};

use super::template::{string_literal, Template};

pub fn render_listener(model: &GenerationModel, template: &Template) -> Result<String, GeneratorError> {
    let mut resolution = String::new();
    for service_type in &model.service_types {
        let name = &service_type.service_type_name;
        resolution.push_str(&format!("        if serviceRef is {} {{\n", name));
        resolution.push_str(&format!("            return {};\n", string_literal(name)));
        resolution.push_str("        }\n");
    }
    // The template line after the marker supplies the fallthrough.
    let resolution = resolution.trim_end_matches('\n');

    let header_capture = match (model.event_path.location, model.event_path.header_name.as_deref()) {
        (IdentifierLocation::Header, Some(header)) => {
            let literal = string_literal(header);
            let mut capture = String::new();
            capture.push_str(&format!(
                "        string|http:HeaderNotFoundError dispatchHeader = req.getHeader({});\n",
                literal
            ));
            capture.push_str("        if dispatchHeader is http:HeaderNotFoundError {\n");
            capture.push_str(&format!(
                "            return error websocket:UpgradeError(\"Missing event identifier header \" + {});\n",
                literal
            ));
            capture.push_str("        }");
            capture
        }
        _ => "        string? dispatchHeader = ();".to_string(),
    };

    template.render(&[
        ("TITLE", model.title.as_str()),
        ("SERVICE_TYPE_RESOLUTION", resolution),
        ("HEADER_CAPTURE", header_capture.as_str()),
    ])
}
