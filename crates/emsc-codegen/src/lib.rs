//! Lowers an [`emsc_ir::Module`] to a `.wasm` binary.
//!
//! # Layout
//!
//! The emitted module contains, in order: types, function imports, function
//! declarations, one funcref table, memory 0, exports, the table's element
//! segment, code, and active data segments. The result is checked with
//! `wasmparser::validate` before it is returned.
//!
//! This is a lowering of the IR only; nothing here parses binaries.

pub mod compiler;
pub mod error;
pub mod expr;

pub use compiler::{encode, Symbols};
pub use error::{CodegenError, CodegenResult};
