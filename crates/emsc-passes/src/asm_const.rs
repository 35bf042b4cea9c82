//! Asm-const call rewriting.
//!
//! An asm-const call passes a pointer to a NUL-terminated string of inline
//! host code as its first argument:
//!
//! ```text
//! call $emscripten_asm_const (i32.const 1024) (local.get 0)
//! ```
//!
//! The walker reads that string out of the data segment at the address,
//! assigns it a stable id, and rewrites the call to pass the id instead. The
//! call is retargeted to an import keyed by its asm-const signature (the call
//! signature without the code pointer), e.g. `emscripten_asm_const_vi`, so the
//! host needs one binding per signature rather than one per string.

use std::collections::{HashMap, HashSet};

use emsc_ir::{Expr, Import, Literal, Module, VisitMut};
use serde::{Deserialize, Serialize};

use crate::config::PassConfig;
use crate::error::{PassError, PassResult};
use crate::signature::{asm_const_signature, signature_of};

// ══════════════════════════════════════════════════════════════════════════════
// Escaping
// ══════════════════════════════════════════════════════════════════════════════

/// Escape inline host code for a double-quoted metadata field.
///
/// This is not JSON escaping and the exact bytes are relied on downstream:
/// 1. every backslash-`n` pair gets its backslash doubled (`\n` → `\\n`);
/// 2. every `"` becomes `\"`, except that a `"` already preceded by a
///    backslash becomes `\\"` (so `\"` ends up as `\\\"`).
///
/// Other control characters and lone backslashes pass through unchanged.
pub fn escape(code: &str) -> String {
    let code = code.replace("\\n", "\\\\n");

    let mut escaped = String::with_capacity(code.len());
    let mut prev = None;
    for c in code.chars() {
        if c == '"' {
            if prev == Some('\\') {
                escaped.push_str("\\\\\"");
            } else {
                escaped.push_str("\\\"");
            }
        } else {
            escaped.push(c);
        }
        prev = Some(c);
    }
    escaped
}

// ══════════════════════════════════════════════════════════════════════════════
// Segment address map
// ══════════════════════════════════════════════════════════════════════════════

/// Linear-memory address → index of the data segment starting exactly there.
///
/// Lookups are exact: an address inside a segment but past its start is not
/// resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentAddressMap {
    segments: HashMap<u32, usize>,
}

impl SegmentAddressMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map every segment's base offset to its index. When two segments share
    /// an offset the later one wins.
    pub fn from_module(module: &Module) -> Self {
        module
            .memory
            .segments
            .iter()
            .enumerate()
            .map(|(index, seg)| (seg.offset, index))
            .collect()
    }

    pub fn insert(&mut self, address: u32, segment: usize) {
        self.segments.insert(address, segment);
    }

    pub fn get(&self, address: u32) -> Option<usize> {
        self.segments.get(&address).copied()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl FromIterator<(u32, usize)> for SegmentAddressMap {
    fn from_iter<I: IntoIterator<Item = (u32, usize)>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Code registry
// ══════════════════════════════════════════════════════════════════════════════

/// One distinct (escaped) code string and the asm-const signatures it was
/// called with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeEntry {
    pub id: u32,
    pub code: String,
    /// Distinct signatures in first-seen order.
    pub sigs: Vec<String>,
}

/// Ids for code strings, assigned 0, 1, 2, … in first-encounter order.
#[derive(Debug, Clone, Default)]
pub struct CodeRegistry {
    entries: Vec<CodeEntry>,
    ids: HashMap<String, u32>,
}

impl CodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id for `code`, assigning the next one if it is new.
    pub fn id_for(&mut self, code: &str) -> u32 {
        if let Some(&id) = self.ids.get(code) {
            return id;
        }
        let id = self.entries.len() as u32;
        self.ids.insert(code.to_string(), id);
        self.entries.push(CodeEntry {
            id,
            code: code.to_string(),
            sigs: Vec::new(),
        });
        id
    }

    /// Record that `code` was called with `sig`. Assigns an id to `code` if
    /// needed.
    pub fn record_sig(&mut self, code: &str, sig: &str) {
        let id = self.id_for(code) as usize;
        let sigs = &mut self.entries[id].sigs;
        if !sigs.iter().any(|s| s == sig) {
            sigs.push(sig.to_string());
        }
    }

    pub fn get(&self, code: &str) -> Option<&CodeEntry> {
        self.ids.get(code).map(|&id| &self.entries[id as usize])
    }

    /// All entries in id order.
    pub fn entries(&self) -> &[CodeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Walker
// ══════════════════════════════════════════════════════════════════════════════

/// Rewrites every asm-const call in a module. One walker serves one run: its
/// registry is only meaningful for the metadata record of that run.
pub struct AsmConstWalker<'a> {
    config: &'a PassConfig,
    segments: &'a SegmentAddressMap,
    registry: CodeRegistry,
    /// Asm-const signatures that already have an import.
    all_sigs: HashSet<String>,
}

impl<'a> AsmConstWalker<'a> {
    pub fn new(config: &'a PassConfig, segments: &'a SegmentAddressMap) -> Self {
        Self {
            config,
            segments,
            registry: CodeRegistry::new(),
            all_sigs: HashSet::new(),
        }
    }

    /// Rewrite all function bodies, consuming the walker and returning the
    /// collected registry.
    pub fn run(mut self, module: &mut Module) -> PassResult<CodeRegistry> {
        emsc_ir::walk_module_mut(&mut self, module)?;
        log::debug!(
            "asm-const pass: {} code strings, {} signatures",
            self.registry.len(),
            self.all_sigs.len()
        );
        Ok(self.registry)
    }

    /// The escaped code string stored at `address`, or `""` when no segment
    /// starts there. The bytes up to the NUL must be UTF-8.
    fn code_for_address(&self, address: u32, module: &Module) -> PassResult<String> {
        let Some(index) = self.segments.get(address) else {
            return Ok(escape(""));
        };
        let segment = module
            .memory
            .segments
            .get(index)
            .ok_or(PassError::SegmentOutOfRange { address, index })?;
        let len = segment
            .data
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(segment.data.len());
        let code = std::str::from_utf8(&segment.data[..len])
            .map_err(|source| PassError::InvalidCode { address, source })?;
        Ok(escape(code))
    }

    fn add_import(&self, module: &mut Module, name: &str, base_sig: &str) -> PassResult<()> {
        let function_type = module.ensure_function_type(base_sig)?.name.clone();
        module.add_import(Import {
            name: name.to_string(),
            module: self.config.env_module.clone(),
            base: name.to_string(),
            function_type,
        })?;
        log::debug!("added asm-const import `{name}` of type {base_sig}");
        Ok(())
    }
}

impl VisitMut for AsmConstWalker<'_> {
    type Error = PassError;

    fn visit_expr(&mut self, expr: &mut Expr, function: &str, module: &mut Module) -> PassResult<()> {
        let Some(base_sig) = signature_of(expr) else {
            return Ok(());
        };
        let Expr::Call {
            target, operands, ..
        } = expr
        else {
            return Ok(());
        };
        // Only calls to the host import; a defined function may share the name.
        if !target.contains(self.config.asm_const_marker.as_str())
            || module.get_function(target).is_some()
        {
            return Ok(());
        }

        let address = match operands.first() {
            Some(Expr::Const { value }) => match value.as_i32() {
                Some(address) => address as u32,
                None => {
                    return Err(PassError::UnsupportedCodePointer {
                        function: function.to_string(),
                        target: target.clone(),
                        ty: value.ty(),
                    })
                }
            },
            Some(_) => {
                return Err(PassError::NonConstantCodePointer {
                    function: function.to_string(),
                    target: target.clone(),
                })
            }
            None => {
                return Err(PassError::MissingCodePointer {
                    function: function.to_string(),
                    target: target.clone(),
                })
            }
        };

        let code = self.code_for_address(address, module)?;
        let id = self.registry.id_for(&code);
        operands[0] = Expr::Const {
            value: Literal::I32(id as i32),
        };

        let sig = asm_const_signature(&base_sig)?;
        self.registry.record_sig(&code, &sig);

        let import_name = self.config.asm_const_import_name(&sig);
        log::trace!("{function}: {target} -> {import_name} (code id {id})");
        *target = import_name.clone();

        if self.all_sigs.insert(sig) {
            self.add_import(module, &import_name, &base_sig)?;
        }
        Ok(())
    }
}
