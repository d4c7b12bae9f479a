//! Diagnostic types for error reporting.

mod error;
mod path;
mod validation;

pub use error::GeneratorError;
pub use path::SpecPath;
pub use validation::ValidationError;
