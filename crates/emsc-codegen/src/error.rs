//! Codegen error types.

use thiserror::Error;

/// Errors that can occur while lowering a module to WASM.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// A construct has no WASM encoding (e.g. a `none`-typed local).
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// The generated WASM module failed validation.
    #[error("WASM validation failed: {0}")]
    ValidationFailed(String),

    /// A function, import or type name could not be resolved.
    #[error("unresolved symbol: {0}")]
    UnresolvedSymbol(String),
}

/// Codegen result type alias.
pub type CodegenResult<T> = Result<T, CodegenError>;
