//! Error types for sfcplace

use thiserror::Error;

/// Main error type for loading and querying the static model.
///
/// Search outcomes (infeasible, timed out, ...) are not errors; they are
/// reported by the solver as result kinds.
#[derive(Debug, Error)]
pub enum SfcError {
    /// Schema or range violation in the input document.
    ///
    /// `path` locates the offending field, e.g. `sfcs[2].chain[1]`.
    #[error("Malformed input at `{path}`: {reason}")]
    MalformedInput { path: String, reason: String },

    /// Two nodes lie in different connected components.
    #[error("No route between node `{from}` and node `{to}`")]
    NoRoute { from: String, to: String },

    /// The input document could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The input document is not valid JSON / YAML / TOML for the schema.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl SfcError {
    pub(crate) fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SfcError::MalformedInput {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for input-document errors that must abort the run.
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, SfcError::MalformedInput { .. } | SfcError::Parse(_))
    }
}

impl From<serde_json::Error> for SfcError {
    fn from(err: serde_json::Error) -> Self {
        SfcError::Parse(format!("JSON: {err}"))
    }
}

impl From<serde_yaml::Error> for SfcError {
    fn from(err: serde_yaml::Error) -> Self {
        SfcError::Parse(format!("YAML: {err}"))
    }
}

impl From<toml::de::Error> for SfcError {
    fn from(err: toml::de::Error) -> Self {
        SfcError::Parse(format!("TOML: {err}"))
    }
}

/// Result type alias for sfcplace core operations
pub type Result<T> = std::result::Result<T, SfcError>;
