//! Names and conventions shared with the host-side glue.
//!
//! All of these are part of the contract with the JavaScript loader and the
//! build tooling that reads the metadata line, so the defaults must not
//! drift.

use serde::{Deserialize, Serialize};

// ── Defaults ─────────────────────────────────────────────────────────────────

/// Substring identifying asm-const marker imports.
pub const ASM_CONST_MARKER: &str = "emscripten_asm_const";
/// Import module for host functions.
pub const ENV_MODULE: &str = "env";
/// Name (and export name) of the synthesized memory-growth function.
pub const GROW_WASM_MEMORY: &str = "__growWasmMemory";
/// Parameter name of the memory-growth function.
pub const NEW_SIZE_PARAM: &str = "newSize";
/// Prefix of dynamic-call thunk names; the signature follows.
pub const DYNCALL_PREFIX: &str = "dynCall_";
/// Parameter name of the table index in a dynamic-call thunk.
pub const FPTR_PARAM: &str = "fptr";
/// Line prefix of the metadata record.
pub const METADATA_PREFIX: &str = ";; METADATA: ";

/// Caller-supplied names the passes rely on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassConfig {
    pub asm_const_marker: String,
    pub env_module: String,
    pub grow_memory_name: String,
    pub dyncall_prefix: String,
    pub metadata_prefix: String,
}

impl Default for PassConfig {
    fn default() -> Self {
        Self {
            asm_const_marker: ASM_CONST_MARKER.to_string(),
            env_module: ENV_MODULE.to_string(),
            grow_memory_name: GROW_WASM_MEMORY.to_string(),
            dyncall_prefix: DYNCALL_PREFIX.to_string(),
            metadata_prefix: METADATA_PREFIX.to_string(),
        }
    }
}

impl PassConfig {
    /// Parse a config from JSON; missing fields take their defaults.
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }

    /// Import name for asm-const calls with the given asm-const signature.
    pub fn asm_const_import_name(&self, asm_sig: &str) -> String {
        format!("{}_{}", self.asm_const_marker, asm_sig)
    }

    /// Thunk name for the given full signature.
    pub fn dyncall_name(&self, sig: &str) -> String {
        format!("{}{}", self.dyncall_prefix, sig)
    }
}
