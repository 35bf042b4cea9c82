//! Expression trees.
//!
//! Function bodies are trees rather than flat instruction streams: a call
//! owns its operand expressions, so a pass can inspect or rewrite "the first
//! argument of this call" directly.

use serde::{Deserialize, Serialize};

use crate::types::{Literal, ValType};

/// A single expression node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Expr {
    /// `T.const value`
    Const { value: Literal },
    /// `local.get index`
    LocalGet { index: u32, ty: ValType },
    /// `local.set index value`
    LocalSet { index: u32, value: Box<Expr> },
    /// Direct call to a function or function import, by name.
    Call {
        target: String,
        operands: Vec<Expr>,
        ty: ValType,
    },
    /// Indirect call through table 0. `type_name` names an interned
    /// [`crate::FunctionType`].
    CallIndirect {
        type_name: String,
        target: Box<Expr>,
        operands: Vec<Expr>,
        ty: ValType,
    },
    /// `memory.grow delta`, yields the previous size in pages.
    MemoryGrow { delta: Box<Expr> },
    /// A sequence; its value is the value of the last child.
    Block { body: Vec<Expr>, ty: ValType },
    Drop { value: Box<Expr> },
    Return { value: Option<Box<Expr>> },
    Nop,
}

impl Expr {
    /// The value type this expression produces.
    pub fn ty(&self) -> ValType {
        match self {
            Expr::Const { value } => value.ty(),
            Expr::LocalGet { ty, .. } => *ty,
            Expr::Call { ty, .. } => *ty,
            Expr::CallIndirect { ty, .. } => *ty,
            Expr::MemoryGrow { .. } => ValType::I32,
            Expr::Block { ty, .. } => *ty,
            Expr::LocalSet { .. } | Expr::Drop { .. } | Expr::Return { .. } | Expr::Nop => {
                ValType::None
            }
        }
    }

    /// Mutable direct children, in evaluation order.
    pub fn children_mut(&mut self) -> Vec<&mut Expr> {
        match self {
            Expr::Const { .. } | Expr::LocalGet { .. } | Expr::Nop => Vec::new(),
            Expr::LocalSet { value, .. } | Expr::Drop { value } => vec![value.as_mut()],
            Expr::MemoryGrow { delta } => vec![delta.as_mut()],
            Expr::Return { value } => value.iter_mut().map(|v| v.as_mut()).collect(),
            Expr::Call { operands, .. } => operands.iter_mut().collect(),
            Expr::CallIndirect {
                target, operands, ..
            } => operands
                .iter_mut()
                .chain(std::iter::once(target.as_mut()))
                .collect(),
            Expr::Block { body, .. } => body.iter_mut().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_indirect_target_is_evaluated_last() {
        let mut expr = Expr::CallIndirect {
            type_name: "vi".into(),
            target: Box::new(Expr::LocalGet {
                index: 0,
                ty: ValType::I32,
            }),
            operands: vec![Expr::Const {
                value: Literal::I32(5),
            }],
            ty: ValType::None,
        };
        let children = expr.children_mut();
        assert_eq!(children.len(), 2);
        assert!(matches!(children[0], Expr::Const { .. }));
        assert!(matches!(children[1], Expr::LocalGet { .. }));
    }

    #[test]
    fn expression_types() {
        let grow = Expr::MemoryGrow {
            delta: Box::new(Expr::Const {
                value: Literal::I32(1),
            }),
        };
        assert_eq!(grow.ty(), ValType::I32);
        assert_eq!(Expr::Nop.ty(), ValType::None);
        let drop = Expr::Drop {
            value: Box::new(grow),
        };
        assert_eq!(drop.ty(), ValType::None);
    }
}
