//! Generator configuration.

use std::path::PathBuf;

/// Which set of artifacts to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationMode {
    /// Listener, dispatcher, data types and service types.
    #[default]
    Service,
    /// Client stubs, utilities, a test skeleton and `Config.toml`.
    Client,
}

/// Ballerina type used for JSON numbers without a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberType {
    #[default]
    Decimal,
    Float,
}

impl NumberType {
    pub fn as_bal(self) -> &'static str {
        match self {
            NumberType::Decimal => "decimal",
            NumberType::Float => "float",
        }
    }
}

/// Configuration for one generator run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// AsyncAPI document to read (`.yaml`, `.yml` or `.json`).
    pub spec_path: PathBuf,

    /// Directory to write generated sources.
    pub out_dir: PathBuf,

    pub mode: GenerationMode,

    /// Emit every record field as optional and nullable.
    pub nullable: bool,

    pub number_type: NumberType,

    /// Text prepended to every generated file.
    pub license_header: Option<String>,
}

impl GeneratorConfig {
    /// The slice of configuration the type mapper needs.
    pub fn type_options(&self) -> TypeOptions {
        TypeOptions {
            nullable: self.nullable,
            number_type: self.number_type,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            spec_path: PathBuf::from("asyncapi.yaml"),
            out_dir: PathBuf::from("."),
            mode: GenerationMode::Service,
            nullable: false,
            number_type: NumberType::Decimal,
            license_header: None,
        }
    }
}

/// Options that change how schemas map to Ballerina types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeOptions {
    pub nullable: bool,
    pub number_type: NumberType,
}
