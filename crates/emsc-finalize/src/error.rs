//! Pipeline error types.

use thiserror::Error;

/// Errors surfaced by [`crate::finalize`].
#[derive(Debug, Error)]
pub enum FinalizeError {
    /// A pass failed; see [`emsc_passes::PassError::is_malformed_input`].
    #[error(transparent)]
    Pass(#[from] emsc_passes::PassError),

    /// Lowering the finished module failed.
    #[error(transparent)]
    Codegen(#[from] emsc_codegen::CodegenError),

    /// The module or options JSON could not be read.
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type used throughout the pipeline.
pub type FinalizeResult<T> = Result<T, FinalizeError>;
