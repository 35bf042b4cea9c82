//! Module-layer error types.

use thiserror::Error;

/// Errors raised by the module representation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IrError {
    /// A function with this name already exists.
    #[error("duplicate function: {0}")]
    DuplicateFunction(String),

    /// An import with this name already exists.
    #[error("duplicate import: {0}")]
    DuplicateImport(String),

    /// An export with this name already exists.
    #[error("duplicate export: {0}")]
    DuplicateExport(String),

    /// No function with this name exists.
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// A signature string contains an unknown character, a `v` parameter, or
    /// is empty.
    #[error("invalid signature: {0:?}")]
    InvalidSignature(String),
}

/// Result type used throughout the module layer.
pub type IrResult<T> = Result<T, IrError>;
