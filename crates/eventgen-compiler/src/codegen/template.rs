//! Ballerina templates embedded at compile time.
//!
//! Templates live in the `templates/` directory and are embedded into the
//! generator binary using `include_str!`. Generators fill them through
//! `{{MARKER}}` placeholders or by replacing a literal anchor line.

use std::borrow::Cow;

use crate::diagnostic::GeneratorError;

pub const DATA_TYPES: &str = include_str!("../../templates/data_types.bal");
pub const SERVICE_TYPES: &str = include_str!("../../templates/service_types.bal");
pub const LISTENER: &str = include_str!("../../templates/listener.bal");
/// Contains the [`MATCH_REMOTE_FUNC_ANCHOR`] line.
pub const DISPATCHER_SERVICE: &str = include_str!("../../templates/dispatcher_service.bal");
pub const CLIENT: &str = include_str!("../../templates/client.bal");
pub const UTILS: &str = include_str!("../../templates/utils.bal");
pub const CLIENT_TEST: &str = include_str!("../../templates/tests/test.bal");
pub const CONFIG_TOML: &str = include_str!("../../templates/Config.toml");

/// Stub replaced by the generated routing function.
pub const MATCH_REMOTE_FUNC_ANCHOR: &str =
    "private isolated function matchRemoteFunc(GenericDataType genericDataType) returns error? {}";

/// A named template text.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    text: Cow<'static, str>,
}

impl Template {
    pub fn new(name: impl Into<String>, text: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replaces every `{{MARKER}}` with its text.
    ///
    /// Substitution is a single pass over the template text, so substituted
    /// text is never scanned for markers. A marker that does not occur in
    /// the template is an error; the generator and the embedded templates
    /// must agree.
    pub fn render(&self, substitutions: &[(&str, &str)]) -> Result<String, GeneratorError> {
        let mut used = vec![false; substitutions.len()];
        let mut output = String::with_capacity(self.text.len());
        substitute(&self.text, substitutions, &mut used, &mut output);
        self.check_used(substitutions, &used)?;
        Ok(output)
    }

    /// Like [`Template::render`], then swaps a literal anchor for `replacement`.
    ///
    /// The anchor is located in the template text, not in substituted text.
    pub fn render_with_anchor(
        &self,
        substitutions: &[(&str, &str)],
        anchor: &str,
        replacement: &str,
    ) -> Result<String, GeneratorError> {
        if !self.text.contains(anchor) {
            return Err(GeneratorError::TemplateAnchorNotFound {
                template: self.name.clone(),
                anchor: anchor.to_string(),
            });
        }

        let mut used = vec![false; substitutions.len()];
        let mut output = String::with_capacity(self.text.len() + replacement.len());
        for (i, part) in self.text.split(anchor).enumerate() {
            if i > 0 {
                output.push_str(replacement);
            }
            substitute(part, substitutions, &mut used, &mut output);
        }
        self.check_used(substitutions, &used)?;
        Ok(output)
    }

    fn check_used(&self, substitutions: &[(&str, &str)], used: &[bool]) -> Result<(), GeneratorError> {
        match used.iter().position(|used| !used) {
            Some(i) => Err(GeneratorError::TemplateAnchorNotFound {
                template: self.name.clone(),
                anchor: format!("{{{{{}}}}}", substitutions[i].0),
            }),
            None => Ok(()),
        }
    }
}

/// Copies `text` into `output`, expanding known `{{MARKER}}`s. Unknown
/// markers are copied verbatim.
fn substitute(text: &str, substitutions: &[(&str, &str)], used: &mut [bool], output: &mut String) {
    let mut rest = text;
    while let Some(open) = rest.find("{{") {
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            break;
        };
        output.push_str(&rest[..open]);
        let marker = &after[..close];
        match substitutions.iter().position(|(name, _)| *name == marker) {
            Some(i) => {
                output.push_str(substitutions[i].1);
                used[i] = true;
            }
            None => output.push_str(&rest[open..open + close + 4]),
        }
        rest = &after[close + 2..];
    }
    output.push_str(rest);
}

/// Formats text as a Ballerina string literal.
pub fn string_literal(value: &str) -> String {
    let mut literal = String::with_capacity(value.len() + 2);
    literal.push('"');
    for c in value.chars() {
        match c {
            '"' => literal.push_str("\\\""),
            '\\' => literal.push_str("\\\\"),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '\t' => literal.push_str("\\t"),
            other => literal.push(other),
        }
    }
    literal.push('"');
    literal
}
