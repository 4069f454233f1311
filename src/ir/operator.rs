use serde::{Deserialize, Serialize};

/// Java operators that the generator can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    Assign,
    CompoundAdd,
    CompoundSub,
    CompoundMul,
    CompoundDiv,
    CompoundMod,
    CompoundAnd,
    CompoundOr,
    CompoundXor,
    CompoundShr,
    CompoundShl,
    CompoundSar,
    Ternary,
    Or,
    And,
    BitOr,
    BitXor,
    BitAnd,
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    Shr,
    Shl,
    Sar,
    Add,
    StringAdd,
    Sub,
    Mul,
    Div,
    Mod,
    Not,
    BitNot,
    UnaryPlus,
    UnaryMinus,
    PreDec,
    PostDec,
    PreInc,
    PostInc,
}

impl OperatorKind {
    /// Java precedence, higher binds tighter. Only used by printers; the
    /// IR is already a tree.
    pub fn priority(self) -> u8 {
        use OperatorKind::*;
        match self {
            Assign | CompoundAdd | CompoundSub | CompoundMul | CompoundDiv | CompoundMod
            | CompoundAnd | CompoundOr | CompoundXor | CompoundShr | CompoundShl | CompoundSar => 1,
            Ternary => 2,
            Or => 3,
            And => 4,
            BitOr => 5,
            BitXor => 6,
            BitAnd => 7,
            Eq | Ne => 8,
            Gt | Lt | Ge | Le => 9,
            Shr | Shl | Sar => 10,
            Add | StringAdd | Sub => 11,
            Mul | Div | Mod => 12,
            Not | BitNot | UnaryPlus | UnaryMinus | PreDec | PreInc => 13,
            PostDec | PostInc => 14,
        }
    }

    pub fn text(self) -> &'static str {
        use OperatorKind::*;
        match self {
            Assign => "=",
            CompoundAdd => "+=",
            CompoundSub => "-=",
            CompoundMul => "*=",
            CompoundDiv => "/=",
            CompoundMod => "%=",
            CompoundAnd => "&=",
            CompoundOr => "|=",
            CompoundXor => "^=",
            CompoundShr => ">>=",
            CompoundShl => "<<=",
            CompoundSar => ">>>=",
            Ternary => "?:",
            Or => "||",
            And => "&&",
            BitOr => "|",
            BitXor => "^",
            BitAnd => "&",
            Eq => "==",
            Ne => "!=",
            Gt => ">",
            Lt => "<",
            Ge => ">=",
            Le => "<=",
            Shr => ">>",
            Shl => "<<",
            Sar => ">>>",
            Add | StringAdd => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
            Not => "!",
            BitNot => "~",
            UnaryPlus => "+",
            UnaryMinus => "-",
            PreDec | PostDec => "--",
            PreInc | PostInc => "++",
        }
    }

    pub fn is_assignment(self) -> bool {
        self.priority() == 1
    }

    pub fn is_inc_dec(self) -> bool {
        matches!(
            self,
            OperatorKind::PreDec | OperatorKind::PostDec | OperatorKind::PreInc | OperatorKind::PostInc
        )
    }

    pub fn is_prefix(self) -> bool {
        matches!(
            self,
            OperatorKind::Not
                | OperatorKind::BitNot
                | OperatorKind::UnaryPlus
                | OperatorKind::UnaryMinus
                | OperatorKind::PreDec
                | OperatorKind::PreInc
        )
    }

    /// The expression writes to a variable.
    pub fn has_side_effect(self) -> bool {
        self.is_assignment() || self.is_inc_dec()
    }

    /// Integral division can throw `ArithmeticException`.
    pub fn may_throw(self) -> bool {
        matches!(
            self,
            OperatorKind::Div | OperatorKind::Mod | OperatorKind::CompoundDiv | OperatorKind::CompoundMod
        )
    }
}
