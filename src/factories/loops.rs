//! Counted loops: `for`, `while` and `do`/`while`.
//!
//! The iteration count is fixed before anything else is generated. The
//! counter is never entered into the symbol table, so only the loop's own
//! manipulator writes it. Extra conjuncts are ANDed onto the counter test
//! and can only end the loop sooner.

use tracing::trace;

use crate::builder::BlockParams;
use crate::context::GenContext;
use crate::error::{ensure, ProductionResult};
use crate::ir::{
    BinaryOperator, Block, CountDirection, CounterInitializer, CounterManipulator, DoWhile, For,
    IrNode, Literal, Loop, LoopingCondition, Node, OperatorKind, Variable, While,
};
use crate::rule::{BudgetSplitter, Factory, SafeFactory};
use crate::symbols::{SymbolFlags, VariableInfo};
use crate::types::Type;

/// Cheapest iteration: counter test (3), one body unit, manipulator.
const MIN_ITERATION_COMPLEXITY: u64 = 5;
const CONJUNCT_PROBABILITY: f64 = 0.3;

/// Everything but the bodies.
struct Skeleton {
    header: Block,
    control: Loop,
    /// Complexity one pass through the bodies may use.
    body_complexity: u64,
    body_statements: u64,
}

fn empty_block(p: &BlockParams) -> Block {
    Block::empty(p.owner.clone(), p.result_type.clone(), p.level + 1)
}

fn block(p: &BlockParams, ctx: &mut GenContext, limits: BodyLimits) -> ProductionResult<Block> {
    if limits.statements == 0 || limits.complexity == 0 {
        return Ok(empty_block(p));
    }
    p.builder()
        .complexity_limit(limits.complexity)
        .statement_limit(limits.statements)
        .level(p.level + 1)
        .can_have_breaks(limits.breaks)
        .can_have_continues(limits.continues)
        .can_have_returns(limits.returns)
        .block_factory()?
        .produce(ctx)
}

#[derive(Debug, Clone, Copy)]
struct BodyLimits {
    complexity: u64,
    statements: u64,
    breaks: bool,
    continues: bool,
    returns: bool,
}

fn binary(kind: OperatorKind, left: IrNode, right: IrNode) -> IrNode {
    IrNode::Binary(BinaryOperator {
        kind,
        ty: Type::BOOLEAN,
        left: Box::new(left),
        right: Box::new(right),
    })
}

/// Header, counter and condition shared by every loop kind.
fn skeleton(p: &BlockParams, ctx: &mut GenContext) -> ProductionResult<Skeleton> {
    ensure(p.statement_limit > 0, "loop: no statements left")?;
    ensure(
        p.complexity_limit > MIN_ITERATION_COMPLEXITY,
        "loop: complexity too small",
    )?;
    let iterations =
        (p.complexity_limit as f64 * ctx.params.loop_iteration_ratio * ctx.rng.random()) as u64;
    ensure(
        (1..=i32::MAX as u64).contains(&iterations),
        "loop: iteration count out of range",
    )?;
    let reserve = iterations.saturating_mul(MIN_ITERATION_COMPLEXITY);
    ensure(p.complexity_limit > reserve, "loop: complexity too small for its iterations")?;
    let mut budget = BudgetSplitter::new(p.complexity_limit - 1);

    let header_statements = ctx.rng.random_not_negative(p.statement_limit);
    let header_share = if header_statements > 0 {
        budget.take_leaving(&mut ctx.rng, reserve)
    } else {
        0
    };
    let header = block(
        p,
        ctx,
        BodyLimits {
            complexity: header_share,
            statements: header_statements,
            breaks: false,
            continues: false,
            returns: false,
        },
    )?;
    ensure(header.completes_normally(), "loop: header does not complete")?;
    budget.refund(header_share - header.complexity().min(header_share));

    let per_iteration = budget.remaining() / iterations;
    ensure(
        per_iteration >= MIN_ITERATION_COMPLEXITY,
        "loop: no complexity left per iteration",
    )?;

    let name = ctx.next_variable_name();
    let counter = VariableInfo::new(
        name,
        p.owner.clone(),
        Type::INT,
        SymbolFlags::LOCAL | SymbolFlags::INITIALIZED,
    );
    let counter_node = || IrNode::Variable(Variable::local(counter.clone()));
    let count = iterations as i64;
    let (direction, initial, limiter, test, kind) = if ctx.rng.random_boolean() {
        let test = binary(OperatorKind::Lt, counter_node(), IrNode::Literal(Literal::int(count)));
        (CountDirection::Up, 0, count, test, OperatorKind::PostInc)
    } else {
        let test = binary(OperatorKind::Lt, IrNode::Literal(Literal::int(0)), counter_node());
        (CountDirection::Down, count, 0, test, OperatorKind::PostDec)
    };

    let spare = per_iteration - MIN_ITERATION_COMPLEXITY;
    let condition = if spare >= 2 && ctx.rng.random_boolean_with(CONJUNCT_PROBABILITY) {
        let share = ctx.rng.random_not_zero(spare - 1);
        match conjunct(p, ctx, share) {
            Ok(extra) => binary(OperatorKind::And, test, extra),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                trace!(error = %e, "loop keeps the plain counter test");
                test
            }
        }
    } else {
        test
    };
    let body_complexity = per_iteration - condition.complexity() - 1;

    Ok(Skeleton {
        header,
        control: Loop {
            initializer: CounterInitializer {
                counter: counter.clone(),
                initial,
            },
            limiter,
            direction,
            condition: LoopingCondition {
                condition: Box::new(condition),
            },
            manipulator: CounterManipulator { counter, kind },
            iterations,
        },
        body_complexity,
        body_statements: p.statement_limit - header_statements,
    })
}

fn conjunct(p: &BlockParams, ctx: &mut GenContext, complexity: u64) -> ProductionResult<IrNode> {
    p.builder()
        .result_type(Type::BOOLEAN)
        .complexity_limit(complexity)
        .limited_expression_factory()?
        .produce(ctx)
}

/// Splits a skeleton's body allowance between `body1` and `body2`. `body1`
/// never jumps and must complete normally, so the manipulator after it is
/// always reached.
fn split_bodies(
    p: &BlockParams,
    ctx: &mut GenContext,
    skeleton: &Skeleton,
) -> ProductionResult<(Block, Block)> {
    let first_statements = ctx.rng.random_not_zero(skeleton.body_statements);
    let second_statements = skeleton.body_statements - first_statements;
    let mut budget = BudgetSplitter::new(skeleton.body_complexity);
    let first_share = if second_statements > 0 {
        budget.take_leaving(&mut ctx.rng, 1)
    } else {
        budget.take_rest()
    };
    let body1 = block(
        p,
        ctx,
        BodyLimits {
            complexity: first_share,
            statements: first_statements,
            breaks: false,
            continues: false,
            returns: false,
        },
    )?;
    ensure(body1.completes_normally(), "loop: first body does not complete")?;
    budget.refund(first_share - body1.complexity().min(first_share));
    let body2 = block(
        p,
        ctx,
        BodyLimits {
            complexity: budget.take_rest(),
            statements: second_statements,
            breaks: true,
            continues: false,
            returns: p.can_have_returns,
        },
    )?;
    Ok((body1, body2))
}

// ---------------------------------------------------------------------------
// Factories
// ---------------------------------------------------------------------------

/// `header; for (; cond; manip) { body }`. The manipulator runs on
/// `continue` too, so the body may use it.
#[derive(Debug, Clone)]
pub struct ForFactory {
    p: BlockParams,
}

impl ForFactory {
    pub fn new(p: BlockParams) -> Self {
        Self { p }
    }
}

impl SafeFactory<IrNode> for ForFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        let skeleton = skeleton(&self.p, ctx)?;
        let body = block(
            &self.p,
            ctx,
            BodyLimits {
                complexity: skeleton.body_complexity,
                statements: skeleton.body_statements,
                breaks: true,
                continues: true,
                returns: self.p.can_have_returns,
            },
        )?;
        Ok(IrNode::For(Box::new(For {
            header: skeleton.header,
            control: skeleton.control,
            body,
        })))
    }
}

#[derive(Debug, Clone)]
pub struct WhileFactory {
    p: BlockParams,
}

impl WhileFactory {
    pub fn new(p: BlockParams) -> Self {
        Self { p }
    }
}

impl SafeFactory<IrNode> for WhileFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        let skeleton = skeleton(&self.p, ctx)?;
        let (body1, body2) = split_bodies(&self.p, ctx, &skeleton)?;
        Ok(IrNode::While(Box::new(While {
            header: skeleton.header,
            control: skeleton.control,
            body1,
            body2,
        })))
    }
}

#[derive(Debug, Clone)]
pub struct DoWhileFactory {
    p: BlockParams,
}

impl DoWhileFactory {
    pub fn new(p: BlockParams) -> Self {
        Self { p }
    }
}

impl SafeFactory<IrNode> for DoWhileFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        let skeleton = skeleton(&self.p, ctx)?;
        let (body1, body2) = split_bodies(&self.p, ctx, &skeleton)?;
        Ok(IrNode::DoWhile(Box::new(DoWhile {
            header: skeleton.header,
            control: skeleton.control,
            body1,
            body2,
        })))
    }
}
