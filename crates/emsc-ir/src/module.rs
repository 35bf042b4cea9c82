//! The module: functions, imports, exports, memory, table and the interned
//! function-type registry.
//!
//! Entities are kept in insertion order so passes and the binary lowering are
//! deterministic. Names are unique per kind; adding a duplicate is an error.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::expr::Expr;
use crate::types::{FunctionType, ValType};

/// A named function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: ValType,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: ValType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A defined function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub result: ValType,
    /// Additional locals, indexed after the parameters.
    #[serde(default)]
    pub vars: Vec<ValType>,
    pub body: Expr,
}

impl Function {
    /// A function with an empty (`nop`) body and no extra locals.
    pub fn new(name: impl Into<String>, params: Vec<Param>, result: ValType) -> Self {
        Self {
            name: name.into(),
            params,
            result,
            vars: Vec::new(),
            body: Expr::Nop,
        }
    }
}

/// A function import `module.base`, known internally as `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    pub name: String,
    pub module: String,
    pub base: String,
    /// Name of the interned function type.
    pub function_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Function,
    Table,
    Memory,
}

/// An export of `value` (an internal name) under `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Export {
    pub name: String,
    pub value: String,
    pub kind: ExportKind,
}

/// An active data segment placed at `offset` in linear memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub offset: u32,
    pub data: Vec<u8>,
}

impl Segment {
    pub fn new(offset: u32, data: impl Into<Vec<u8>>) -> Self {
        Self {
            offset,
            data: data.into(),
        }
    }
}

/// Linear memory 0. Sizes are in 64 KiB pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    pub initial: u32,
    pub maximum: Option<u32>,
    #[serde(default)]
    pub segments: Vec<Segment>,
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            initial: 1,
            maximum: None,
            segments: Vec::new(),
        }
    }
}

/// A whole module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    #[serde(default)]
    pub function_types: Vec<FunctionType>,
    #[serde(default)]
    pub imports: Vec<Import>,
    #[serde(default)]
    pub functions: Vec<Function>,
    #[serde(default)]
    pub exports: Vec<Export>,
    #[serde(default)]
    pub memory: Memory,
    /// Entries of table 0, starting at index 0, by function name.
    #[serde(default)]
    pub table: Vec<String>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Functions ────────────────────────────────────────────────────────

    pub fn add_function(&mut self, func: Function) -> IrResult<()> {
        if self.get_function(&func.name).is_some() {
            return Err(IrError::DuplicateFunction(func.name));
        }
        self.functions.push(func);
        Ok(())
    }

    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Like [`Module::get_function`], but a missing function is an error.
    pub fn function(&self, name: &str) -> IrResult<&Function> {
        self.get_function(name)
            .ok_or_else(|| IrError::UnknownFunction(name.to_string()))
    }

    // ── Imports ──────────────────────────────────────────────────────────

    pub fn add_import(&mut self, import: Import) -> IrResult<()> {
        if self.get_import(&import.name).is_some() {
            return Err(IrError::DuplicateImport(import.name));
        }
        self.imports.push(import);
        Ok(())
    }

    pub fn get_import(&self, name: &str) -> Option<&Import> {
        self.imports.iter().find(|i| i.name == name)
    }

    /// Remove an import by name, returning it if it existed.
    pub fn remove_import(&mut self, name: &str) -> Option<Import> {
        let pos = self.imports.iter().position(|i| i.name == name)?;
        Some(self.imports.remove(pos))
    }

    /// Remove every import whose name contains `needle`. Returns the removed
    /// names in their original order.
    pub fn remove_imports_with_substring(&mut self, needle: &str) -> Vec<String> {
        let to_remove: Vec<String> = self
            .imports
            .iter()
            .filter(|i| i.name.contains(needle))
            .map(|i| i.name.clone())
            .collect();
        for name in &to_remove {
            self.remove_import(name);
        }
        to_remove
    }

    // ── Exports ──────────────────────────────────────────────────────────

    pub fn add_export(&mut self, export: Export) -> IrResult<()> {
        if self.get_export(&export.name).is_some() {
            return Err(IrError::DuplicateExport(export.name));
        }
        self.exports.push(export);
        Ok(())
    }

    pub fn get_export(&self, name: &str) -> Option<&Export> {
        self.exports.iter().find(|e| e.name == name)
    }

    // ── Function types ───────────────────────────────────────────────────

    pub fn get_function_type(&self, name: &str) -> Option<&FunctionType> {
        self.function_types.iter().find(|t| t.name == name)
    }

    /// Look up the function type named `sig`, interning it first if this
    /// module has not seen it yet.
    pub fn ensure_function_type(&mut self, sig: &str) -> IrResult<&FunctionType> {
        match self.function_types.iter().position(|t| t.name == sig) {
            Some(pos) => Ok(&self.function_types[pos]),
            None => {
                self.function_types.push(FunctionType::from_sig(sig)?);
                Ok(&self.function_types[self.function_types.len() - 1])
            }
        }
    }

    // ── Serialization ────────────────────────────────────────────────────

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Deserialize from JSON. Missing collections default to empty.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
