//! Integration tests for the module lowering.
//!
//! Tests validate:
//! - Empty and small modules lower to valid WASM
//! - Imports, exports and the table land in the right index spaces
//! - Indirect calls and memory.grow execute under `wasmi`
//! - Unresolved names are reported, not encoded

use emsc_codegen::{encode, CodegenError};
use emsc_ir::{
    Builder, Export, ExportKind, Expr, Function, Import, Literal, Module, Param, Segment, ValType,
};
use wasmparser::{ExternalKind, Parser as WasmParser, Payload};

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn encode_ok(module: &Module) -> Vec<u8> {
    encode(module).unwrap_or_else(|e| panic!("encode failed: {e}"))
}

fn export_fn(module: &mut Module, name: &str) {
    module
        .add_export(Export {
            name: name.into(),
            value: name.into(),
            kind: ExportKind::Function,
        })
        .unwrap();
}

/// Extract exports from WASM bytes.
fn get_exports(wasm: &[u8]) -> Vec<(String, ExternalKind, u32)> {
    let mut exports = Vec::new();
    for payload in WasmParser::new(0).parse_all(wasm) {
        if let Ok(Payload::ExportSection(reader)) = payload {
            for export in reader {
                let exp = export.expect("valid export");
                exports.push((exp.name.to_string(), exp.kind, exp.index));
            }
        }
    }
    exports
}

/// Extract (module, field) pairs of imports from WASM bytes.
fn get_imports(wasm: &[u8]) -> Vec<(String, String)> {
    let mut imports = Vec::new();
    for payload in WasmParser::new(0).parse_all(wasm) {
        if let Ok(Payload::ImportSection(reader)) = payload {
            for import in reader {
                let imp = import.expect("valid import");
                imports.push((imp.module.to_string(), imp.name.to_string()));
            }
        }
    }
    imports
}

/// `name(a: i32, b: i32) -> i32 { b }`
fn second_param(name: &str) -> Function {
    let mut f = Function::new(
        name,
        vec![Param::new("a", ValType::I32), Param::new("b", ValType::I32)],
        ValType::I32,
    );
    f.body = Builder::make_local_get(1, ValType::I32);
    f
}

fn instantiate(wasm: &[u8]) -> (wasmi::Store<()>, wasmi::Instance) {
    let engine = wasmi::Engine::default();
    let module = wasmi::Module::new(&engine, wasm).expect("failed to parse WASM module");
    let mut store = wasmi::Store::new(&engine, ());
    let linker = <wasmi::Linker<()>>::new(&engine);
    let instance = linker
        .instantiate(&mut store, &module)
        .expect("instantiation failed")
        .start(&mut store)
        .expect("start failed");
    (store, instance)
}

// ══════════════════════════════════════════════════════════════════════════════
// Structure
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn empty_module_is_valid() {
    let wasm = encode_ok(&Module::new());
    assert_eq!(&wasm[0..4], b"\0asm");
}

#[test]
fn imports_precede_functions_in_index_space() {
    let mut m = Module::new();
    m.ensure_function_type("vi").unwrap();
    m.add_import(Import {
        name: "puts".into(),
        module: "env".into(),
        base: "puts".into(),
        function_type: "vi".into(),
    })
    .unwrap();
    m.add_function(second_param("pick")).unwrap();
    export_fn(&mut m, "pick");
    m.add_export(Export {
        name: "memory".into(),
        value: "memory".into(),
        kind: ExportKind::Memory,
    })
    .unwrap();

    let wasm = encode_ok(&m);
    assert_eq!(get_imports(&wasm), vec![("env".to_string(), "puts".to_string())]);
    let exports = get_exports(&wasm);
    assert!(exports.contains(&("pick".to_string(), ExternalKind::Func, 1)));
    assert!(exports.contains(&("memory".to_string(), ExternalKind::Memory, 0)));
}

#[test]
fn data_segments_are_encoded() {
    let mut m = Module::new();
    m.memory.segments.push(Segment::new(1024, b"console.log(1)\0".to_vec()));
    let wasm = encode_ok(&m);
    let mut found = false;
    for payload in WasmParser::new(0).parse_all(&wasm) {
        if let Ok(Payload::DataSection(reader)) = payload {
            for data in reader {
                let data = data.expect("valid data");
                assert_eq!(data.data, b"console.log(1)\0");
                found = true;
            }
        }
    }
    assert!(found, "no data segment emitted");
}

// ══════════════════════════════════════════════════════════════════════════════
// Execution
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn call_indirect_dispatches_through_table() {
    let mut m = Module::new();
    m.add_function(second_param("pick")).unwrap();
    m.table.push("pick".into());
    let ft = m.ensure_function_type("iii").unwrap().clone();

    let mut tramp = Function::new(
        "tramp",
        vec![
            Param::new("fptr", ValType::I32),
            Param::new("0", ValType::I32),
            Param::new("1", ValType::I32),
        ],
        ValType::I32,
    );
    tramp.body = Builder::make_call_indirect(
        &ft,
        Builder::make_local_get(0, ValType::I32),
        vec![
            Builder::make_local_get(1, ValType::I32),
            Builder::make_local_get(2, ValType::I32),
        ],
    );
    m.add_function(tramp).unwrap();
    export_fn(&mut m, "tramp");

    let wasm = encode_ok(&m);
    let (mut store, instance) = instantiate(&wasm);
    let tramp = instance
        .get_typed_func::<(i32, i32, i32), i32>(&store, "tramp")
        .expect("no tramp export");
    assert_eq!(tramp.call(&mut store, (0, 7, 42)).expect("trapped"), 42);
}

#[test]
fn memory_grow_returns_previous_size() {
    let mut m = Module::new();
    let mut grow = Function::new("grow", vec![Param::new("n", ValType::I32)], ValType::I32);
    grow.body = Builder::make_memory_grow(Builder::make_local_get(0, ValType::I32));
    m.add_function(grow).unwrap();
    export_fn(&mut m, "grow");

    let wasm = encode_ok(&m);
    let (mut store, instance) = instantiate(&wasm);
    let grow = instance
        .get_typed_func::<i32, i32>(&store, "grow")
        .expect("no grow export");
    assert_eq!(grow.call(&mut store, 1).expect("trapped"), 1);
    assert_eq!(grow.call(&mut store, 2).expect("trapped"), 2);
}

#[test]
fn block_values_are_dropped_where_needed() {
    let mut m = Module::new();
    let mut f = Function::new("f", vec![], ValType::I32);
    f.vars = vec![ValType::I32];
    f.body = Builder::make_block(
        vec![
            Builder::make_const(Literal::I32(1)),
            Expr::LocalSet {
                index: 0,
                value: Box::new(Builder::make_const(Literal::I32(9))),
            },
            Builder::make_local_get(0, ValType::I32),
        ],
        ValType::I32,
    );
    m.add_function(f).unwrap();
    export_fn(&mut m, "f");

    let wasm = encode_ok(&m);
    let (mut store, instance) = instantiate(&wasm);
    let f = instance
        .get_typed_func::<(), i32>(&store, "f")
        .expect("no f export");
    assert_eq!(f.call(&mut store, ()).expect("trapped"), 9);
}

// ══════════════════════════════════════════════════════════════════════════════
// Errors
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn unresolved_call_target_is_an_error() {
    let mut m = Module::new();
    let mut f = Function::new("f", vec![], ValType::None);
    f.body = Builder::make_call("missing", vec![], ValType::None);
    m.add_function(f).unwrap();
    match encode(&m) {
        Err(CodegenError::UnresolvedSymbol(msg)) => assert!(msg.contains("missing")),
        other => panic!("expected unresolved symbol, got {other:?}"),
    }
}

#[test]
fn unresolved_import_type_is_an_error() {
    let mut m = Module::new();
    m.add_import(Import {
        name: "puts".into(),
        module: "env".into(),
        base: "puts".into(),
        function_type: "vi".into(),
    })
    .unwrap();
    assert!(matches!(encode(&m), Err(CodegenError::UnresolvedSymbol(_))));
}
