//! Convenience constructors for synthesized code.

use crate::expr::Expr;
use crate::module::{Function, Param};
use crate::types::{FunctionType, Literal, ValType};

/// Stateless expression and function factory.
pub struct Builder;

impl Builder {
    /// A function with the given params, result and extra locals. The body
    /// starts as `nop`.
    pub fn make_function(
        name: impl Into<String>,
        params: Vec<Param>,
        result: ValType,
        vars: Vec<ValType>,
    ) -> Function {
        let mut func = Function::new(name, params, result);
        func.vars = vars;
        func
    }

    pub fn make_const(value: Literal) -> Expr {
        Expr::Const { value }
    }

    pub fn make_local_get(index: u32, ty: ValType) -> Expr {
        Expr::LocalGet { index, ty }
    }

    pub fn make_call(target: impl Into<String>, operands: Vec<Expr>, ty: ValType) -> Expr {
        Expr::Call {
            target: target.into(),
            operands,
            ty,
        }
    }

    /// An indirect call through table 0 with the given function type. The
    /// call's value type is the type's result.
    pub fn make_call_indirect(ft: &FunctionType, target: Expr, operands: Vec<Expr>) -> Expr {
        Expr::CallIndirect {
            type_name: ft.name.clone(),
            target: Box::new(target),
            operands,
            ty: ft.result,
        }
    }

    pub fn make_memory_grow(delta: Expr) -> Expr {
        Expr::MemoryGrow {
            delta: Box::new(delta),
        }
    }

    pub fn make_drop(value: Expr) -> Expr {
        Expr::Drop {
            value: Box::new(value),
        }
    }

    pub fn make_block(body: Vec<Expr>, ty: ValType) -> Expr {
        Expr::Block { body, ty }
    }
}
