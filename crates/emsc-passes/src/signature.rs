//! Call signatures as seen by the host.

use emsc_ir::Expr;

use crate::error::{PassError, PassResult};

/// The signature of a call site: result code, then one code per operand.
pub fn signature_of(call: &Expr) -> Option<String> {
    emsc_ir::sig_of_call(call)
}

/// The asm-const variant of `base_sig`: the character at index 1 (the code
/// pointer parameter, which the host resolves by id) is dropped.
///
/// `"vii"` becomes `"vi"`, `"di"` becomes `"d"`.
pub fn asm_const_signature(base_sig: &str) -> PassResult<String> {
    if base_sig.chars().count() < 2 {
        return Err(PassError::SignatureTooShort(base_sig.to_string()));
    }
    Ok(base_sig
        .chars()
        .enumerate()
        .filter(|&(i, _)| i != 1)
        .map(|(_, c)| c)
        .collect())
}
