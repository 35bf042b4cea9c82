//! Module lowering.
//!
//! Index spaces are assigned in module order:
//! - types: the module's interned function types, then any signature used by
//!   a defined function that is not interned yet;
//! - functions: imports first, then defined functions.
//!
//! Table 0 is always emitted, sized to the module's table entries and filled
//! by one active element segment at offset 0.

use std::borrow::Cow;
use std::collections::HashMap;

use emsc_ir::{sig_of_function, ExportKind as IrExportKind, Module, ValType};
use wasm_encoder::{
    CodeSection, ConstExpr, DataSection, ElementSection, Elements, EntityType, ExportKind,
    ExportSection, Function, FunctionSection, ImportSection, MemorySection, MemoryType, RefType,
    TableSection, TableType, TypeSection,
};

use crate::error::{CodegenError, CodegenResult};
use crate::expr::{emit_expr, locals, val_type};

// ══════════════════════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════════════════════

/// Lower `module` to a `.wasm` binary and validate it.
pub fn encode(module: &Module) -> CodegenResult<Vec<u8>> {
    Compiler::new(module).compile()
}

// ══════════════════════════════════════════════════════════════════════════════
// Symbols
// ══════════════════════════════════════════════════════════════════════════════

/// Name → index resolution for one module.
pub struct Symbols {
    /// Type name → type index, plus the signature of each type in order.
    types: HashMap<String, u32>,
    type_list: Vec<(Vec<ValType>, ValType)>,
    /// Imports are registered before defined functions and win on clashes.
    funcs: HashMap<String, u32>,
}

impl Symbols {
    fn build(module: &Module) -> Self {
        let mut syms = Self {
            types: HashMap::new(),
            type_list: Vec::new(),
            funcs: HashMap::new(),
        };
        for ft in &module.function_types {
            syms.add_type(&ft.name, ft.params.clone(), ft.result);
        }
        for func in &module.functions {
            let sig = sig_of_function(func);
            let params = func.params.iter().map(|p| p.ty).collect();
            syms.add_type(&sig, params, func.result);
        }

        for (i, import) in module.imports.iter().enumerate() {
            syms.funcs.entry(import.name.clone()).or_insert(i as u32);
        }
        let base = module.imports.len() as u32;
        for (i, func) in module.functions.iter().enumerate() {
            syms.funcs
                .entry(func.name.clone())
                .or_insert(base + i as u32);
        }
        syms
    }

    fn add_type(&mut self, name: &str, params: Vec<ValType>, result: ValType) {
        if self.types.contains_key(name) {
            return;
        }
        self.types.insert(name.to_string(), self.type_list.len() as u32);
        self.type_list.push((params, result));
    }

    /// Index of the function or function import called `name`.
    pub fn func_index(&self, name: &str) -> CodegenResult<u32> {
        self.funcs
            .get(name)
            .copied()
            .ok_or_else(|| CodegenError::UnresolvedSymbol(format!("function `{name}`")))
    }

    /// Index of the function type called `name`.
    pub fn type_index(&self, name: &str) -> CodegenResult<u32> {
        self.types
            .get(name)
            .copied()
            .ok_or_else(|| CodegenError::UnresolvedSymbol(format!("type `{name}`")))
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Compiler
// ══════════════════════════════════════════════════════════════════════════════

struct Compiler<'a> {
    module: &'a Module,
    syms: Symbols,
}

impl<'a> Compiler<'a> {
    fn new(module: &'a Module) -> Self {
        Self {
            module,
            syms: Symbols::build(module),
        }
    }

    fn compile(&self) -> CodegenResult<Vec<u8>> {
        let mut wasm = wasm_encoder::Module::new();

        // 1. Type section
        wasm.section(&self.emit_types()?);
        // 2. Import section
        wasm.section(&self.emit_imports()?);
        // 3. Function section
        wasm.section(&self.emit_function_decls()?);
        // 4. Table section
        wasm.section(&self.emit_table());
        // 5. Memory section
        wasm.section(&self.emit_memory());
        // 6. Export section
        wasm.section(&self.emit_exports()?);
        // 7. Element section
        if !self.module.table.is_empty() {
            wasm.section(&self.emit_elements()?);
        }
        // 8. Code section
        wasm.section(&self.emit_code()?);
        // 9. Data section
        wasm.section(&self.emit_data());

        let bytes = wasm.finish();

        // 10. Validate
        wasmparser::validate(&bytes)
            .map_err(|e| CodegenError::ValidationFailed(format!("{e}")))?;

        Ok(bytes)
    }

    // ── Type section ─────────────────────────────────────────────────────

    fn emit_types(&self) -> CodegenResult<TypeSection> {
        let mut types = TypeSection::new();
        for (params, result) in &self.syms.type_list {
            let params = params
                .iter()
                .map(|ty| {
                    val_type(*ty).ok_or_else(|| {
                        CodegenError::Unsupported("`none` parameter type".to_string())
                    })
                })
                .collect::<CodegenResult<Vec<_>>>()?;
            let results: Vec<_> = val_type(*result).into_iter().collect();
            types.ty().function(params, results);
        }
        Ok(types)
    }

    // ── Import section ───────────────────────────────────────────────────

    fn emit_imports(&self) -> CodegenResult<ImportSection> {
        let mut imports = ImportSection::new();
        for import in &self.module.imports {
            let ty = self.syms.type_index(&import.function_type)?;
            imports.import(&import.module, &import.base, EntityType::Function(ty));
        }
        Ok(imports)
    }

    // ── Function section ─────────────────────────────────────────────────

    fn emit_function_decls(&self) -> CodegenResult<FunctionSection> {
        let mut funcs = FunctionSection::new();
        for func in &self.module.functions {
            funcs.function(self.syms.type_index(&sig_of_function(func))?);
        }
        Ok(funcs)
    }

    // ── Table / memory ───────────────────────────────────────────────────

    fn emit_table(&self) -> TableSection {
        let size = self.module.table.len() as u64;
        let mut tables = TableSection::new();
        tables.table(TableType {
            element_type: RefType::FUNCREF,
            table64: false,
            minimum: size,
            maximum: Some(size),
            shared: false,
        });
        tables
    }

    fn emit_memory(&self) -> MemorySection {
        let mut memory = MemorySection::new();
        memory.memory(MemoryType {
            minimum: u64::from(self.module.memory.initial),
            maximum: self.module.memory.maximum.map(u64::from),
            memory64: false,
            shared: false,
            page_size_log2: None,
        });
        memory
    }

    // ── Export section ───────────────────────────────────────────────────

    fn emit_exports(&self) -> CodegenResult<ExportSection> {
        let mut exports = ExportSection::new();
        for export in &self.module.exports {
            match export.kind {
                IrExportKind::Function => {
                    let idx = self.syms.func_index(&export.value)?;
                    exports.export(&export.name, ExportKind::Func, idx);
                }
                IrExportKind::Table => {
                    exports.export(&export.name, ExportKind::Table, 0);
                }
                IrExportKind::Memory => {
                    exports.export(&export.name, ExportKind::Memory, 0);
                }
            }
        }
        Ok(exports)
    }

    // ── Element section ──────────────────────────────────────────────────

    fn emit_elements(&self) -> CodegenResult<ElementSection> {
        let indices = self
            .module
            .table
            .iter()
            .map(|name| self.syms.func_index(name))
            .collect::<CodegenResult<Vec<_>>>()?;
        let mut elements = ElementSection::new();
        elements.active(
            Some(0),
            &ConstExpr::i32_const(0),
            Elements::Functions(Cow::Owned(indices)),
        );
        Ok(elements)
    }

    // ── Code section ─────────────────────────────────────────────────────

    fn emit_code(&self) -> CodegenResult<CodeSection> {
        let mut code = CodeSection::new();
        for func in &self.module.functions {
            let mut f = Function::new(locals(&func.vars, &func.name)?);
            emit_expr(&func.body, &self.syms, &mut f)?;
            if func.body.ty().is_concrete() && !func.result.is_concrete() {
                f.instruction(&wasm_encoder::Instruction::Drop);
            }
            f.instruction(&wasm_encoder::Instruction::End);
            code.function(&f);
        }
        Ok(code)
    }

    // ── Data section ─────────────────────────────────────────────────────

    fn emit_data(&self) -> DataSection {
        let mut data = DataSection::new();
        for seg in &self.module.memory.segments {
            data.active(0, &ConstExpr::i32_const(seg.offset as i32), seg.data.clone());
        }
        data
    }
}
