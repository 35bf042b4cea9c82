//! Exported memory-growth entry point.

use emsc_ir::{Builder, Export, ExportKind, Module, Param, ValType};

use crate::config::{PassConfig, NEW_SIZE_PARAM};
use crate::error::PassResult;

/// Add `grow(newSize: i32) -> i32 { memory.grow(newSize) }` under
/// `config.grow_memory_name` and export it under the same name.
///
/// Running this twice on one module fails with a duplicate-function error.
pub fn generate_memory_growth_function(module: &mut Module, config: &PassConfig) -> PassResult<()> {
    let name = config.grow_memory_name.clone();
    let mut grow = Builder::make_function(
        name.clone(),
        vec![Param::new(NEW_SIZE_PARAM, ValType::I32)],
        ValType::I32,
        vec![],
    );
    grow.body = Builder::make_memory_grow(Builder::make_local_get(0, ValType::I32));
    module.add_function(grow)?;
    module.add_export(Export {
        name: name.clone(),
        value: name,
        kind: ExportKind::Function,
    })?;
    log::debug!("added memory growth function `{}`", config.grow_memory_name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use emsc_ir::{Expr, IrError};

    #[test]
    fn adds_and_exports_grow_function() {
        let mut m = Module::new();
        generate_memory_growth_function(&mut m, &PassConfig::default()).unwrap();
        let f = m.get_function("__growWasmMemory").expect("function added");
        assert_eq!(f.params, vec![Param::new("newSize", ValType::I32)]);
        assert_eq!(f.result, ValType::I32);
        match &f.body {
            Expr::MemoryGrow { delta } => assert_eq!(
                **delta,
                Expr::LocalGet {
                    index: 0,
                    ty: ValType::I32
                }
            ),
            other => panic!("unexpected body {other:?}"),
        }
        let export = m.get_export("__growWasmMemory").expect("export added");
        assert_eq!(export.value, "__growWasmMemory");
        assert_eq!(export.kind, ExportKind::Function);
    }

    #[test]
    fn second_invocation_conflicts() {
        let mut m = Module::new();
        let cfg = PassConfig::default();
        generate_memory_growth_function(&mut m, &cfg).unwrap();
        let err = generate_memory_growth_function(&mut m, &cfg).unwrap_err();
        assert!(matches!(
            err,
            crate::PassError::Ir(IrError::DuplicateFunction(ref n)) if n == "__growWasmMemory"
        ));
        assert!(!err.is_malformed_input());
    }
}
