//! Value types, literals and function types.
//!
//! Every value type has a one-character signature code:
//!
//! | Type   | Code |
//! |--------|------|
//! | (none) | `v`  |
//! | i32    | `i`  |
//! | i64    | `j`  |
//! | f32    | `f`  |
//! | f64    | `d`  |
//!
//! A signature string is the result code followed by one code per parameter,
//! so `(i32, f64) -> void` is `"vid"`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IrError, IrResult};

/// A WebAssembly value type. `None` is the type of expressions that produce
/// no value and the result of void functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValType {
    None,
    I32,
    I64,
    F32,
    F64,
}

impl ValType {
    /// The signature character for this type.
    pub fn sig_char(self) -> char {
        match self {
            ValType::None => 'v',
            ValType::I32 => 'i',
            ValType::I64 => 'j',
            ValType::F32 => 'f',
            ValType::F64 => 'd',
        }
    }

    /// Inverse of [`ValType::sig_char`].
    pub fn from_sig_char(c: char) -> Option<Self> {
        match c {
            'v' => Some(ValType::None),
            'i' => Some(ValType::I32),
            'j' => Some(ValType::I64),
            'f' => Some(ValType::F32),
            'd' => Some(ValType::F64),
            _ => None,
        }
    }

    /// Whether the type is a concrete value (anything but `None`).
    pub fn is_concrete(self) -> bool {
        self != ValType::None
    }
}

impl fmt::Display for ValType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValType::None => "none",
            ValType::I32 => "i32",
            ValType::I64 => "i64",
            ValType::F32 => "f32",
            ValType::F64 => "f64",
        };
        f.write_str(name)
    }
}

/// A constant value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Literal {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Literal {
    pub fn ty(&self) -> ValType {
        match self {
            Literal::I32(_) => ValType::I32,
            Literal::I64(_) => ValType::I64,
            Literal::F32(_) => ValType::F32,
            Literal::F64(_) => ValType::F64,
        }
    }

    /// The value as an `i32`, if this is an `i32` literal.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Literal::I32(v) => Some(*v),
            _ => None,
        }
    }
}

/// An interned function type. Its name is its signature string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionType {
    pub name: String,
    pub params: Vec<ValType>,
    pub result: ValType,
}

impl FunctionType {
    /// Build a function type from a signature string (`"vid"` etc.).
    ///
    /// The first character is the result; the rest are parameters. A
    /// parameter may not be `v`.
    pub fn from_sig(sig: &str) -> IrResult<Self> {
        let mut chars = sig.chars();
        let result_char = chars
            .next()
            .ok_or_else(|| IrError::InvalidSignature(sig.to_string()))?;
        let result = ValType::from_sig_char(result_char)
            .ok_or_else(|| IrError::InvalidSignature(sig.to_string()))?;
        let params = chars
            .map(|c| match ValType::from_sig_char(c) {
                Some(ty) if ty.is_concrete() => Ok(ty),
                _ => Err(IrError::InvalidSignature(sig.to_string())),
            })
            .collect::<IrResult<Vec<_>>>()?;
        Ok(Self {
            name: sig.to_string(),
            params,
            result,
        })
    }

    /// Whether any parameter or the result is `i64`.
    pub fn has_i64(&self) -> bool {
        self.result == ValType::I64 || self.params.contains(&ValType::I64)
    }
}
