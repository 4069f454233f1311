//! Statement nodes.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{IrNode, Literal, OperatorKind};
use crate::symbols::VariableInfo;
use crate::types::Type;

/// Expression evaluated for its side effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub expr: Box<IrNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub owner: Type,
    /// Result type of the enclosing function, consulted by `return`.
    pub return_type: Type,
    pub level: u32,
    pub children: Vec<IrNode>,
}

impl Block {
    pub fn empty(owner: Type, return_type: Type, level: u32) -> Self {
        Self {
            owner,
            return_type,
            level,
            children: Vec::new(),
        }
    }
}

/// Field declared without an initializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub variable: VariableInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableInitialization {
    pub variable: VariableInfo,
    pub init: Box<IrNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct If {
    pub condition: Box<IrNode>,
    pub then_block: Block,
    pub else_block: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    /// `None` for the `default` label.
    pub label: Option<Literal>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Switch {
    pub selector: Box<IrNode>,
    pub cases: Vec<SwitchCase>,
}

impl Switch {
    pub fn has_default(&self) -> bool {
        self.cases.iter().any(|c| c.label.is_none())
    }
}

pub type ExceptionVec = SmallVec<[Type; 2]>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchBlock {
    pub exceptions: ExceptionVec,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TryCatch {
    pub body: Block,
    pub catches: Vec<CatchBlock>,
    pub finally: Option<Block>,
}

// ---------------------------------------------------------------------------
// Loops
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountDirection {
    Up,
    Down,
}

/// `int counter = initial;`, declared right before the loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterInitializer {
    pub counter: VariableInfo,
    pub initial: i64,
}

/// `counter < limiter` (counting up) or `limiter < counter` (counting
/// down), possibly ANDed with extra conjuncts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopingCondition {
    pub condition: Box<IrNode>,
}

/// `counter++` or `counter--`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterManipulator {
    pub counter: VariableInfo,
    pub kind: OperatorKind,
}

/// Pieces shared by every counted loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loop {
    pub initializer: CounterInitializer,
    pub limiter: i64,
    pub direction: CountDirection,
    pub condition: LoopingCondition,
    pub manipulator: CounterManipulator,
    /// Number of times the body runs, fixed when the loop was generated.
    pub iterations: u64,
}

/// `header; for (; condition; manipulator) body`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct For {
    pub header: Block,
    #[serde(rename = "loop")]
    pub control: Loop,
    pub body: Block,
}

/// `header; while (condition) { body1; manipulator; body2 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct While {
    pub header: Block,
    #[serde(rename = "loop")]
    pub control: Loop,
    pub body1: Block,
    pub body2: Block,
}

/// `header; do { body1; manipulator; body2 } while (condition)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoWhile {
    pub header: Block,
    #[serde(rename = "loop")]
    pub control: Loop,
    pub body1: Block,
    pub body2: Block,
}

// ---------------------------------------------------------------------------
// Jumps and output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Return {
    pub expr: Option<Box<IrNode>>,
}

/// `throw new E();`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Throw {
    pub exception: Type,
}

/// Fields the printer dumps at the end of the test run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintVariables {
    pub owner: Type,
    pub variables: Vec<VariableInfo>,
}
