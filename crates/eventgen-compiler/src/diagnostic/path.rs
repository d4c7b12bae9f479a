//! Spec location tracking.

use std::fmt;

/// A JSON-pointer-like location inside the specification document.
///
/// Rendered as `#/components/schemas/User/properties/name`, so a spec author
/// can jump straight to the offending construct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecPath {
    segments: Vec<String>,
}

impl SpecPath {
    /// The document root (`#`).
    pub fn root() -> Self {
        Self::default()
    }

    /// `#/components/schemas/<name>`.
    pub fn component_schema(name: &str) -> Self {
        Self::root().join("components").join("schemas").join(name)
    }

    /// `#/components/messages/<name>`.
    pub fn component_message(name: &str) -> Self {
        Self::root().join("components").join("messages").join(name)
    }

    /// `#/channels/<name>`.
    pub fn channel(name: &str) -> Self {
        Self::root().join("channels").join(name)
    }

    /// Returns a new path with `segment` appended.
    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for SpecPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("#")?;
        for segment in &self.segments {
            write!(f, "/{}", segment.replace('~', "~0").replace('/', "~1"))?;
        }
        Ok(())
    }
}
