//! Dynamic-call thunks.
//!
//! For every distinct signature among the table entries we synthesize
//!
//! ```text
//! dynCall_<sig>(fptr: i32, 0: T0, 1: T1, ...) -> R {
//!     call_indirect <sig> (local.get 1, local.get 2, ...) (local.get 0)
//! }
//! ```
//!
//! so the host can call any table entry without a per-function binding.
//! Signatures with an `i64` parameter or result get no thunk: the host
//! calling convention cannot carry them.

use std::collections::HashSet;

use emsc_ir::{sig_of_function, Builder, Module, Param, ValType};

use crate::config::{PassConfig, FPTR_PARAM};
use crate::error::PassResult;

/// Synthesize one thunk per distinct thunk-able signature in
/// `table_entries`, in first-seen order, and add them to the module.
///
/// Stale asm-const imports (any import whose name contains the marker) are
/// removed first; the asm-const walker recreates the ones still needed.
///
/// Returns the names of the new thunks. They are not exported.
pub fn make_dyn_call_thunks(
    module: &mut Module,
    table_entries: &[String],
    config: &PassConfig,
) -> PassResult<Vec<String>> {
    let removed = module.remove_imports_with_substring(&config.asm_const_marker);
    if !removed.is_empty() {
        log::debug!("removed {} stale asm-const imports", removed.len());
    }

    let mut generated = Vec::new();
    let mut sigs = HashSet::new();
    for entry in table_entries {
        let sig = sig_of_function(module.function(entry)?);
        let func_type = module.ensure_function_type(&sig)?.clone();
        if func_type.has_i64() {
            log::debug!("no dynCall thunk for `{entry}`: signature {sig} uses i64");
            continue;
        }
        if !sigs.insert(sig.clone()) {
            continue;
        }

        let mut params = vec![Param::new(FPTR_PARAM, ValType::I32)];
        params.extend(
            func_type
                .params
                .iter()
                .enumerate()
                .map(|(i, ty)| Param::new(i.to_string(), *ty)),
        );
        let name = config.dyncall_name(&sig);
        let mut thunk = Builder::make_function(name.clone(), params, func_type.result, vec![]);
        let fptr = Builder::make_local_get(0, ValType::I32);
        let args = func_type
            .params
            .iter()
            .enumerate()
            .map(|(i, ty)| Builder::make_local_get(i as u32 + 1, *ty))
            .collect();
        thunk.body = Builder::make_call_indirect(&func_type, fptr, args);
        module.add_function(thunk)?;
        log::debug!("added dynCall thunk `{name}`");
        generated.push(name);
    }
    Ok(generated)
}
