//! # eventgen compiler
//!
//! This crate turns an AsyncAPI 2.x document describing an event-driven
//! WebSocket API into Ballerina sources: a listener, an event dispatcher,
//! data types and service types, or, in client mode, client stubs.
//!
//! ## Supported Inputs
//!
//! - YAML (`.yaml`, `.yml`)
//! - JSON (`.json`)
//!
//! ## Architecture
//!
//! ```text
//! Spec file (YAML / JSON)
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Document   │  Text → value tree, node views
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Extract    │  Schemas, service types, event identifier
//! │ (doc → IR)   │
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Validate   │  Naming & dispatch-shape rules
//! │   (IR)       │
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Codegen    │  Templates → Ballerina sources
//! │ (IR → .bal)  │
//! └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use eventgen_compiler::{Generator, GeneratorConfig};
//!
//! let config = GeneratorConfig {
//!     spec_path: "asyncapi.yaml".into(),
//!     out_dir: "generated".into(),
//!     ..GeneratorConfig::default()
//! };
//!
//! let result = Generator::new(config).generate()?;
//! println!("{} remote functions", result.remote_functions);
//! ```

pub mod codegen;
pub mod config;
pub mod diagnostic;
pub mod document;
pub mod extract;
pub mod ir;
pub mod naming;
pub mod validate;

use std::path::{Path, PathBuf};

pub use codegen::GeneratedCode;
pub use config::{GenerationMode, GeneratorConfig, NumberType, TypeOptions};
pub use diagnostic::{GeneratorError, SpecPath, ValidationError};
pub use ir::GenerationModel;

/// The main generator struct that orchestrates the pipeline.
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    /// Creates a new generator with the given configuration.
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Loads, extracts and validates without rendering anything.
    pub fn check(&self) -> Result<GenerationModel, GeneratorError> {
        // Phase 1: Load
        let document = document::load_document(&self.config.spec_path)?;
        tracing::info!(
            path = %self.config.spec_path.display(),
            title = %document.title(),
            "loaded specification"
        );

        // Phase 2: Extract (includes the reference check)
        let model = extract::extract_model(&document, self.config.mode)?;

        // Phase 3: Validate
        validate::validate_model(&model)?;

        Ok(model)
    }

    /// Runs the pipeline up to rendering. Nothing is written.
    pub fn render(&self) -> Result<GeneratedCode, GeneratorError> {
        self.check_and_render().map(|(_, generated)| generated)
    }

    fn check_and_render(&self) -> Result<(GenerationModel, GeneratedCode), GeneratorError> {
        let model = self.check()?;
        // Phase 4: Render
        let generated = codegen::generate(&model, &self.config)?;
        Ok((model, generated))
    }

    /// Runs the full pipeline.
    ///
    /// Every artifact is rendered before the first file is written, so a
    /// failing run leaves the output directory untouched.
    pub fn generate(&self) -> Result<GenerateResult, GeneratorError> {
        let (model, generated) = self.check_and_render()?;

        // Phase 5: Write output
        self.write_output(&generated)?;

        Ok(GenerateResult {
            schemas: model.schemas.len(),
            service_types: model.service_types.len(),
            remote_functions: model.remote_function_count(),
            files: generated.files.iter().map(|(path, _)| path.clone()).collect(),
        })
    }

    /// Writes generated files to the output directory, overwriting existing files.
    fn write_output(&self, generated: &GeneratedCode) -> Result<(), GeneratorError> {
        let out_dir = normalize_out_dir(&self.config.out_dir);
        std::fs::create_dir_all(&out_dir).map_err(|e| GeneratorError::io(&out_dir, e.to_string()))?;

        for (filename, content) in &generated.files {
            let path = out_dir.join(filename);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| GeneratorError::io(parent, e.to_string()))?;
            }
            std::fs::write(&path, content).map_err(|e| GeneratorError::io(&path, e.to_string()))?;
            tracing::info!(path = %path.display(), bytes = content.len(), "wrote artifact");
        }

        Ok(())
    }
}

/// Drops trailing separators; an empty path means the current directory.
fn normalize_out_dir(out_dir: &Path) -> PathBuf {
    let normalized: PathBuf = out_dir.components().collect();
    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

/// Result of a generator run.
#[derive(Debug, Clone)]
pub struct GenerateResult {
    /// Number of component schemas.
    pub schemas: usize,
    /// Number of service types.
    pub service_types: usize,
    /// Total number of remote functions across all service types.
    pub remote_functions: usize,
    /// Written files, relative to the output directory.
    pub files: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_out_dir() {
        assert_eq!(normalize_out_dir(Path::new("out/")), PathBuf::from("out"));
        assert_eq!(normalize_out_dir(Path::new("out//gen///")), PathBuf::from("out/gen"));
        assert_eq!(normalize_out_dir(Path::new("")), PathBuf::from("."));
    }
}
