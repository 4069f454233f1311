//! Statement sequences.
//!
//! A block draws one statement at a time from a weighted rule until its
//! statement allowance or complexity runs out. Plain statements consume one
//! unit of the allowance. A control-flow construct receives everything that
//! is left and consumes all of it, so its inner blocks never double-count
//! the parent's allowance.

use tracing::trace;

use crate::builder::BlockParams;
use crate::context::GenContext;
use crate::error::{ensure, ProductionResult};
use crate::ir::{Block, IrNode, Node};
use crate::rule::{BudgetSplitter, Factory, Rule, SafeFactory};

const NESTED_BLOCK_WEIGHT: f64 = 0.3;
const SWITCH_WEIGHT: f64 = 0.1;
const TRY_CATCH_WEIGHT: f64 = 0.3;
const JUMP_WEIGHT: f64 = 0.1;
const NOTHING_WEIGHT: f64 = 0.1;

/// Scope-isolating block. Declarations inside never escape it.
#[derive(Debug, Clone)]
pub struct BlockFactory {
    p: BlockParams,
}

impl BlockFactory {
    pub fn new(p: BlockParams) -> Self {
        Self { p }
    }

    /// Alternatives for one position, given its complexity share and the
    /// statements left in the block.
    fn rule(&self, ctx: &GenContext, share: u64, statements: u64) -> ProductionResult<Rule<IrNode>> {
        let p = &self.p;
        let single = p.builder().complexity_limit(share).statement_limit(1);
        let mut rule = Rule::new("block_statement");
        rule.add("statement", single.statement_factory()?);
        if !ctx.params.disable_vars_in_block {
            rule.add(
                "declaration",
                single.clone().is_local(true).declaration_factory()?,
            );
        }
        rule.add_weighted("nothing", NOTHING_WEIGHT, single.nothing_factory())
            .add_weighted("break", JUMP_WEIGHT, single.break_factory())
            .add_weighted("continue", JUMP_WEIGHT, single.continue_factory())
            .add_weighted("return", JUMP_WEIGHT, single.return_factory()?)
            .add_weighted("throw", JUMP_WEIGHT, single.throw_factory()?);

        if statements < 2 {
            return Ok(rule);
        }
        let nested = p
            .builder()
            .complexity_limit(share)
            .statement_limit(statements - 1);
        rule.add_weighted("block", NESTED_BLOCK_WEIGHT, nested.sub_block_factory()?);
        // A block at level L sits under at most L - 1 deviations.
        if p.level > ctx.params.max_depth() {
            return Ok(rule);
        }
        if !ctx.params.disable_if {
            rule.add("if", nested.if_factory()?);
        }
        if !ctx.params.disable_for {
            rule.add("for", nested.for_factory()?);
        }
        if !ctx.params.disable_while {
            rule.add("while", nested.while_factory()?);
        }
        if !ctx.params.disable_do_while {
            rule.add("do_while", nested.do_while_factory()?);
        }
        if !ctx.params.disable_switch {
            rule.add_weighted("switch", SWITCH_WEIGHT, nested.switch_factory()?);
        }
        if !ctx.params.disable_try_catch {
            rule.add_weighted("try_catch", TRY_CATCH_WEIGHT, nested.try_catch_factory()?);
        }
        Ok(rule)
    }

    fn statements(&self, ctx: &mut GenContext) -> ProductionResult<Block> {
        let p = &self.p;
        let mut block = Block::empty(p.owner.clone(), p.result_type.clone(), p.level);
        let mut statements = p.statement_limit;
        let mut budget = BudgetSplitter::new(p.complexity_limit);
        while statements > 0 && !budget.is_exhausted() {
            let share = budget.take(&mut ctx.rng);
            let node = match self.rule(ctx, share, statements)?.produce(ctx) {
                Ok(node) => node,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    trace!(level = p.level, error = %e, "block ends early");
                    break;
                }
            };
            budget.refund(share.saturating_sub(node.complexity()));
            let consumed = match &node {
                IrNode::Block(inner) => (inner.children.len() as u64).clamp(1, statements),
                n if n.is_cf_deviation() => statements,
                _ => 1,
            };
            statements -= consumed;
            let ends = !node.completes_normally();
            block.children.push(node);
            if ends {
                break;
            }
        }
        Ok(block)
    }
}

impl SafeFactory<Block> for BlockFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<Block> {
        ensure(self.p.statement_limit > 0, "block: no statements left")?;
        ensure(self.p.complexity_limit > 0, "block: no complexity left")?;
        ctx.scoped(|ctx| self.statements(ctx))
    }
}

/// Block nested one level deeper, as a statement.
#[derive(Debug, Clone)]
pub struct SubBlockFactory {
    inner: BlockFactory,
}

impl SubBlockFactory {
    pub fn new(mut p: BlockParams) -> Self {
        p.level += 1;
        Self {
            inner: BlockFactory::new(p),
        }
    }
}

impl SafeFactory<IrNode> for SubBlockFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        self.inner.sproduce(ctx).map(IrNode::Block)
    }
}
