//! Signature derivation.
//!
//! Signatures are compact strings: the result type's code first, then one
//! code per parameter in order. See [`crate::types`] for the codes.

use crate::expr::Expr;
use crate::module::Function;
use crate::types::ValType;

/// Build a signature string from a result type and parameter types.
pub fn sig_from_types(result: ValType, params: impl IntoIterator<Item = ValType>) -> String {
    let mut sig = String::new();
    sig.push(result.sig_char());
    sig.extend(params.into_iter().map(ValType::sig_char));
    sig
}

/// The signature of a function definition.
pub fn sig_of_function(func: &Function) -> String {
    sig_from_types(func.result, func.params.iter().map(|p| p.ty))
}

/// The signature of a call site, derived from the call's result type and the
/// types of its operand expressions.
///
/// Returns `None` for expressions that are not calls.
pub fn sig_of_call(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Call { operands, ty, .. } | Expr::CallIndirect { operands, ty, .. } => {
            Some(sig_from_types(*ty, operands.iter().map(Expr::ty)))
        }
        _ => None,
    }
}
