//! Ballerina code generation from the extracted model.
//!
//! Every artifact is rendered from an embedded template into memory; nothing
//! here touches the file system or the source document.
//!
//! Service mode produces:
//! - `data_types.bal` (records and aliases for component schemas)
//! - `service_types.bal` (one service object type per grouping)
//! - `listener.bal` (service type resolution, dispatch header capture)
//! - `dispatcher_service.bal` (event name → remote function routing)
//!
//! Client mode produces `data_types.bal`, `client.bal`, `utils.bal`,
//! `tests/test.bal` and `Config.toml`.

pub mod bal_types;
pub mod template;
mod client;
mod data_types;
mod dispatcher;
mod listener;
mod service_types;

pub use bal_types::{BalType, RecordField, RecordType, TypeMapper, MAX_ARRAY_LENGTH};
pub use dispatcher::render_dispatcher;
pub use template::Template;

use crate::config::{GenerationMode, GeneratorConfig};
use crate::diagnostic::GeneratorError;
use crate::ir::GenerationModel;

/// Generated Ballerina sources.
pub struct GeneratedCode {
    /// Relative path to content, in write order.
    pub files: Vec<(String, String)>,
}

/// Renders `text` as `#` doc comment lines at `indent`.
pub(crate) fn doc_comment(text: &str, indent: &str) -> String {
    text.trim()
        .lines()
        .map(|line| {
            let line = line.trim_end();
            if line.is_empty() {
                format!("{}#\n", indent)
            } else {
                format!("{}# {}\n", indent, line)
            }
        })
        .collect()
}

/// Prepends the license header, separated by a blank line.
///
/// TOML files get the header as `#` comments.
fn with_license(license: Option<&str>, path: &str, content: String) -> String {
    let Some(license) = license.filter(|l| !l.trim().is_empty()) else {
        return content;
    };
    let header = if path.ends_with(".toml") {
        license
            .trim_end()
            .lines()
            .map(|line| match line.strip_prefix("//") {
                Some(rest) => format!("#{}", rest),
                None if line.starts_with('#') => line.to_string(),
                None => format!("# {}", line).trim_end().to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        license.trim_end().to_string()
    };
    format!("{}\n\n{}", header, content)
}

/// Generates every artifact of the configured mode.
pub fn generate(model: &GenerationModel, config: &GeneratorConfig) -> Result<GeneratedCode, GeneratorError> {
    let options = config.type_options();
    let mut files = Vec::new();

    // Both modes reference the component schemas by name.
    let data_types = data_types::render_data_types(
        model,
        &options,
        &Template::new("data_types.bal", template::DATA_TYPES),
    )?;
    files.push(("data_types.bal".to_string(), data_types));

    match config.mode {
        GenerationMode::Service => {
            let service_types = service_types::render_service_types(
                model,
                &Template::new("service_types.bal", template::SERVICE_TYPES),
            )?;
            files.push(("service_types.bal".to_string(), service_types));

            let listener = listener::render_listener(model, &Template::new("listener.bal", template::LISTENER))?;
            files.push(("listener.bal".to_string(), listener));

            let dispatcher = render_dispatcher(
                model,
                &options,
                &Template::new("dispatcher_service.bal", template::DISPATCHER_SERVICE),
            )?;
            files.push(("dispatcher_service.bal".to_string(), dispatcher));
        }
        GenerationMode::Client => {
            let client = client::render_client(model, &Template::new("client.bal", template::CLIENT))?;
            files.push(("client.bal".to_string(), client));

            let utils = client::render_utils(model, &Template::new("utils.bal", template::UTILS))?;
            files.push(("utils.bal".to_string(), utils));

            let tests = client::render_client_tests(model, &Template::new("tests/test.bal", template::CLIENT_TEST))?;
            files.push(("tests/test.bal".to_string(), tests));

            let config_toml = client::render_config(model, &Template::new("Config.toml", template::CONFIG_TOML))?;
            files.push(("Config.toml".to_string(), config_toml));
        }
    }

    let license = config.license_header.as_deref();
    let files = files
        .into_iter()
        .map(|(path, content)| {
            let content = with_license(license, &path, content);
            (path, content)
        })
        .collect();

    Ok(GeneratedCode { files })
}
