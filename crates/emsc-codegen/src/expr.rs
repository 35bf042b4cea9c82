//! Expression lowering: trees to stack instructions.

use emsc_ir::{Expr, Literal, ValType};
use wasm_encoder::{BlockType, Function, Instruction};

use crate::compiler::Symbols;
use crate::error::{CodegenError, CodegenResult};

/// Map a value type to its encoder type. `None` has no encoding.
pub fn val_type(ty: ValType) -> Option<wasm_encoder::ValType> {
    match ty {
        ValType::None => None,
        ValType::I32 => Some(wasm_encoder::ValType::I32),
        ValType::I64 => Some(wasm_encoder::ValType::I64),
        ValType::F32 => Some(wasm_encoder::ValType::F32),
        ValType::F64 => Some(wasm_encoder::ValType::F64),
    }
}

fn block_type(ty: ValType) -> BlockType {
    match val_type(ty) {
        Some(v) => BlockType::Result(v),
        None => BlockType::Empty,
    }
}

/// Emit the instructions for `expr`, leaving its value (if any) on the stack.
pub fn emit_expr(expr: &Expr, syms: &Symbols, f: &mut Function) -> CodegenResult<()> {
    match expr {
        Expr::Const { value } => {
            let instr = match *value {
                Literal::I32(v) => Instruction::I32Const(v),
                Literal::I64(v) => Instruction::I64Const(v),
                Literal::F32(v) => Instruction::F32Const(v),
                Literal::F64(v) => Instruction::F64Const(v),
            };
            f.instruction(&instr);
        }
        Expr::LocalGet { index, .. } => {
            f.instruction(&Instruction::LocalGet(*index));
        }
        Expr::LocalSet { index, value } => {
            emit_expr(value, syms, f)?;
            f.instruction(&Instruction::LocalSet(*index));
        }
        Expr::Call {
            target, operands, ..
        } => {
            for op in operands {
                emit_expr(op, syms, f)?;
            }
            f.instruction(&Instruction::Call(syms.func_index(target)?));
        }
        Expr::CallIndirect {
            type_name,
            target,
            operands,
            ..
        } => {
            for op in operands {
                emit_expr(op, syms, f)?;
            }
            emit_expr(target, syms, f)?;
            f.instruction(&Instruction::CallIndirect {
                type_index: syms.type_index(type_name)?,
                table_index: 0,
            });
        }
        Expr::MemoryGrow { delta } => {
            emit_expr(delta, syms, f)?;
            f.instruction(&Instruction::MemoryGrow(0));
        }
        Expr::Block { body, ty } => {
            f.instruction(&Instruction::Block(block_type(*ty)));
            let last = body.len().saturating_sub(1);
            for (i, child) in body.iter().enumerate() {
                emit_expr(child, syms, f)?;
                // Only the last child may leave a value behind.
                if child.ty().is_concrete() && (i != last || !ty.is_concrete()) {
                    f.instruction(&Instruction::Drop);
                }
            }
            f.instruction(&Instruction::End);
        }
        Expr::Drop { value } => {
            emit_expr(value, syms, f)?;
            if value.ty().is_concrete() {
                f.instruction(&Instruction::Drop);
            }
        }
        Expr::Return { value } => {
            if let Some(value) = value {
                emit_expr(value, syms, f)?;
            }
            f.instruction(&Instruction::Return);
        }
        Expr::Nop => {
            f.instruction(&Instruction::Nop);
        }
    }
    Ok(())
}

/// Encode the locals declaration for a function's extra locals.
pub fn locals(vars: &[ValType], func: &str) -> CodegenResult<Vec<(u32, wasm_encoder::ValType)>> {
    vars.iter()
        .map(|ty| {
            val_type(*ty)
                .map(|v| (1, v))
                .ok_or_else(|| CodegenError::Unsupported(format!("`none` local in `{func}`")))
        })
        .collect()
}
