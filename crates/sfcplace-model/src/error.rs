//! Error types for model export.

use thiserror::Error;

/// Errors raised while writing a model to an external format.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A constraint subset referenced a constraint the model does not have.
    #[error("Unknown constraint index {0}")]
    UnknownConstraint(usize),
}
