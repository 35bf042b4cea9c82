//! Emscripten finalize passes over an [`emsc_ir::Module`].
//!
//! # Passes
//!
//! - [`memory_growth`]: adds and exports `__growWasmMemory(newSize) -> i32`.
//! - [`dyncall`]: adds one `dynCall_<sig>` trampoline per distinct signature
//!   among the indirect-call table entries.
//! - [`asm_const`]: rewrites `emscripten_asm_const*` calls so they pass a code
//!   id instead of a string address and target a per-signature import.
//! - [`metadata`]: drives the asm-const pass and writes the one-line metadata
//!   record consumed by the build tooling.
//!
//! ## Conventional order
//!
//! 1. `generate_memory_growth_function`
//! 2. `make_dyn_call_thunks` (also removes stale asm-const imports)
//! 3. `generate_emscripten_metadata`
//!
//! Every pass mutates the module in place and none is safe to rerun on the
//! same module.

pub mod asm_const;
pub mod config;
pub mod dyncall;
pub mod error;
pub mod memory_growth;
pub mod metadata;
pub mod signature;

pub use asm_const::{escape, AsmConstWalker, CodeEntry, CodeRegistry, SegmentAddressMap};
pub use config::PassConfig;
pub use dyncall::make_dyn_call_thunks;
pub use error::{PassError, PassResult};
pub use memory_growth::generate_memory_growth_function;
pub use metadata::{emscripten_metadata, generate_emscripten_metadata, render_metadata};
pub use signature::{asm_const_signature, signature_of};
