//! In-memory WebAssembly module representation for the emsc passes.
//!
//! This crate defines the module, its functions, imports, exports, memory
//! segments and table, the interned function-type registry, signature
//! derivation, a builder for synthesized code, and a mutable tree walker.
//! It does not parse binaries; `emsc-codegen` lowers a module to bytes.

mod error;
pub mod builder;
pub mod expr;
pub mod module;
pub mod sig;
pub mod types;
pub mod walk;

pub use builder::Builder;
pub use error::{IrError, IrResult};
pub use expr::Expr;
pub use module::{Export, ExportKind, Function, Import, Memory, Module, Param, Segment};
pub use sig::{sig_from_types, sig_of_call, sig_of_function};
pub use types::{FunctionType, Literal, ValType};
pub use walk::{walk_expr_mut, walk_module_mut, VisitMut};
