//! Pass error types.

use emsc_ir::IrError;
use thiserror::Error;

/// Errors that can occur while running the finalize passes.
///
/// The `NonConstantCodePointer`, `MissingCodePointer`,
/// `UnsupportedCodePointer`, `SegmentOutOfRange`, `InvalidCode` and
/// `SignatureTooShort` variants mean the input module is malformed; see
/// [`PassError::is_malformed_input`]. Nothing is rolled back when a pass
/// fails, so the module may be partially rewritten.
#[derive(Debug, Error)]
pub enum PassError {
    /// The first operand of an asm-const call is not a constant.
    #[error("asm-const call to `{target}` in `{function}`: code pointer is not a constant")]
    NonConstantCodePointer { function: String, target: String },

    /// An asm-const call has no operands at all.
    #[error("asm-const call to `{target}` in `{function}` has no code pointer operand")]
    MissingCodePointer { function: String, target: String },

    /// The code pointer constant is not an `i32`.
    #[error("asm-const call to `{target}` in `{function}`: code pointer is a {ty} constant, expected i32")]
    UnsupportedCodePointer {
        function: String,
        target: String,
        ty: emsc_ir::ValType,
    },

    /// The segment address map points past the module's data segments.
    #[error("code pointer {address} maps to segment {index}, which does not exist")]
    SegmentOutOfRange { address: u32, index: usize },

    /// The code string at `address` is not valid UTF-8.
    #[error("code string at address {address} is not valid UTF-8: {source}")]
    InvalidCode {
        address: u32,
        source: std::str::Utf8Error,
    },

    /// An asm-const signature needs at least a result and the code parameter.
    #[error("signature {0:?} is too short to derive an asm-const signature")]
    SignatureTooShort(String),

    /// The module layer rejected an operation.
    #[error(transparent)]
    Ir(#[from] IrError),

    /// Writing the metadata record failed.
    #[error("failed to write metadata: {0}")]
    Io(#[from] std::io::Error),
}

impl PassError {
    /// Whether this error reports a malformed input module rather than an
    /// environmental failure.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            PassError::NonConstantCodePointer { .. }
                | PassError::MissingCodePointer { .. }
                | PassError::UnsupportedCodePointer { .. }
                | PassError::SegmentOutOfRange { .. }
                | PassError::InvalidCode { .. }
                | PassError::SignatureTooShort(_)
        )
    }
}

/// Pass result type alias.
pub type PassResult<T> = Result<T, PassError>;
