//! Expression nodes.

use serde::{Deserialize, Serialize};

use super::{IrNode, OperatorKind};
use crate::symbols::{FunctionInfo, VariableInfo};
use crate::types::Type;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum LiteralValue {
    Boolean(bool),
    /// byte, short, char (as its code point), int and long.
    Integral(i64),
    Floating(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    pub value: LiteralValue,
    #[serde(rename = "type")]
    pub ty: Type,
}

impl Literal {
    pub fn int(value: i64) -> Self {
        Self {
            value: LiteralValue::Integral(value),
            ty: Type::INT,
        }
    }

    pub fn as_integral(&self) -> Option<i64> {
        match self.value {
            LiteralValue::Integral(v) => Some(v),
            _ => None,
        }
    }
}

/// How a variable reference reaches its symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableAccess {
    Local,
    /// `Owner.name`.
    Static,
    /// `object.name`.
    NonStatic { object: Box<IrNode> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub info: VariableInfo,
    pub access: VariableAccess,
}

impl Variable {
    pub fn local(info: VariableInfo) -> Self {
        Self {
            info,
            access: VariableAccess::Local,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryOperator {
    pub kind: OperatorKind,
    #[serde(rename = "type")]
    pub ty: Type,
    pub left: Box<IrNode>,
    pub right: Box<IrNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryOperator {
    pub kind: OperatorKind,
    #[serde(rename = "type")]
    pub ty: Type,
    pub operand: Box<IrNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TernaryOperator {
    #[serde(rename = "type")]
    pub ty: Type,
    pub condition: Box<IrNode>,
    pub then_expr: Box<IrNode>,
    pub else_expr: Box<IrNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastOperator {
    #[serde(rename = "type")]
    pub ty: Type,
    pub expr: Box<IrNode>,
}

/// Method call, or `new K(..)` when the function is a constructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub function: FunctionInfo,
    /// Receiver for non-static methods.
    pub receiver: Option<Box<IrNode>>,
    pub args: Vec<IrNode>,
}

impl FunctionCall {
    pub fn result_type(&self) -> &Type {
        if self.function.is_constructor() {
            &self.function.owner
        } else {
            &self.function.return_type
        }
    }
}

/// `new E[s1][s2]..`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayCreation {
    #[serde(rename = "type")]
    pub ty: Type,
    pub sizes: Vec<IrNode>,
}

/// `array[i]` where the result is itself an array one dimension smaller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayElement {
    #[serde(rename = "type")]
    pub ty: Type,
    pub array: Box<IrNode>,
    pub index: Box<IrNode>,
}

/// `array[i][j]..` indexed down to a non-array element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayExtraction {
    #[serde(rename = "type")]
    pub ty: Type,
    pub array: Box<IrNode>,
    pub indices: Vec<IrNode>,
}
