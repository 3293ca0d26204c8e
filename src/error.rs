//! Error types for spec normalization and rule configuration

use thiserror::Error;

/// Result type for spec operations
pub type Result<T> = std::result::Result<T, SpecError>;

/// Errors raised while turning a raw document into a [`SpecModel`] or while
/// loading a rule set. Diffing, linting, and scoring over successfully
/// normalized models never fail.
///
/// [`SpecModel`]: crate::model::SpecModel
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("parse error at {location}: {reason}")]
    Parse { location: String, reason: String },

    #[error("unresolved reference at {location}: {reference}")]
    UnresolvedReference { location: String, reference: String },

    #[error("circular reference: {cycle}")]
    CircularReference { cycle: String },

    #[error("invalid rule set: {0}")]
    RuleConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SpecError {
    /// Shorthand for a parse failure at a document location.
    pub fn parse(location: impl Into<String>, reason: impl Into<String>) -> Self {
        SpecError::Parse {
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// True for the reference-resolution subset of parse failures.
    pub fn is_reference_error(&self) -> bool {
        matches!(
            self,
            SpecError::UnresolvedReference { .. } | SpecError::CircularReference { .. }
        )
    }
}
