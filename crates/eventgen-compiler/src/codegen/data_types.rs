//! `data_types.bal`: one type definition per component schema.

use crate::config::TypeOptions;
use crate::diagnostic::GeneratorError;
use crate::ir::GenerationModel;
use crate::naming::type_name;

use super::bal_types::TypeMapper;
use super::doc_comment;
use super::template::Template;

/// Renders every component schema in declaration order.
///
/// Object schemas become records, anything else becomes an alias.
pub fn render_data_types(
    model: &GenerationModel,
    options: &TypeOptions,
    template: &Template,
) -> Result<String, GeneratorError> {
    let mapper = TypeMapper::new(&model.schemas, options);
    let mut definitions = Vec::with_capacity(model.schemas.len());

    for schema in model.schemas.iter() {
        let mut definition = String::new();
        if let Some(description) = &schema.description {
            definition.push_str(&doc_comment(description, ""));
        }

        let body = match mapper.map_record(schema)? {
            Some(record) => record.render(0),
            None => mapper.map_type(schema)?.render(0),
        };
        definition.push_str(&format!("public type {} {};\n", type_name(&schema.name), body));
        definitions.push(definition);
    }

    let definitions = definitions.join("\n");
    template.render(&[("TITLE", model.title.as_str()), ("DATA_TYPES", definitions.as_str())])
}
