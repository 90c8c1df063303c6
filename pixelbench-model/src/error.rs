//! Error taxonomy for the entity model.
//!
//! Everything here is fatal for the operation that raised it. The one soft
//! condition in the system — a reference field pointing at an id that is no
//! longer present — is not an error at all: it is logged via `tracing::warn!`
//! at lookup time and resolves as absent (see `pixelbench-doc`).

use std::fmt;

use pixelbench_types::GridError;
use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised by property access, registration, and (de)serialization.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A field name that is not declared in the entity's schema.
    /// Programmer error — never silently resolved to a sentinel.
    #[error("unknown field '{field}' on entity type '{type_name}'")]
    UnknownField { type_name: String, field: String },

    /// A type name was registered twice with a different constructor or schema.
    #[error("entity type '{type_name}' is already registered with a different constructor or schema")]
    DuplicateRegistration { type_name: String },

    /// A type name that was never registered.
    #[error("unknown entity type '{type_name}'")]
    UnknownType { type_name: String },

    /// A grid node whose flat buffer disagrees with its declared dimensions.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// A value or JSON node whose shape does not fit the field's kind.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// An entity id that is not a valid UUID.
    #[error("invalid entity id '{value}'")]
    InvalidId { value: String },

    /// A list helper was applied to a field that does not hold a list.
    #[error("field '{field}' does not hold a list")]
    NotAList { field: String },
}

impl ModelError {
    pub(crate) fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// One step in the path from the document root to a JSON node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    /// Descent into a named field.
    Field(String),
    /// Descent into an array element.
    Index(usize),
}

/// The chain of field names and array indices leading to a node,
/// rendered as `root.sheets[0].data`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePath(pub Vec<PathStep>);

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "root")?;
        for step in &self.0 {
            match step {
                PathStep::Field(name) => write!(f, ".{name}")?,
                PathStep::Index(i) => write!(f, "[{i}]")?,
            }
        }
        Ok(())
    }
}

/// A structural load failure, carrying the path to the offending node.
///
/// Loading is fail-fast and whole-load-aborting: there is no partial or
/// best-effort reconstruction of a corrupt document.
#[derive(Debug, Error)]
#[error("load failed at {path}: {source}")]
pub struct LoadError {
    pub path: NodePath,
    #[source]
    pub source: ModelError,
}

impl LoadError {
    pub fn new(path: Vec<PathStep>, source: ModelError) -> Self {
        Self {
            path: NodePath(path),
            source,
        }
    }

    /// Wraps a model error as a load failure at the document root.
    pub fn at_root(source: ModelError) -> Self {
        Self::new(Vec::new(), source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_renders_fields_and_indices() {
        let path = NodePath(vec![
            PathStep::Field("sheets".into()),
            PathStep::Index(0),
            PathStep::Field("tiles".into()),
            PathStep::Index(2),
            PathStep::Field("data".into()),
        ]);
        assert_eq!(path.to_string(), "root.sheets[0].tiles[2].data");
    }

    #[test]
    fn empty_path_is_root() {
        assert_eq!(NodePath::default().to_string(), "root");
    }
}
