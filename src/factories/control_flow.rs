//! Branching constructs: `if`, `switch` and `try`/`catch`/`finally`.

use crate::builder::BlockParams;
use crate::context::GenContext;
use crate::error::{ensure, ProductionError, ProductionResult};
use crate::factories::literal::LiteralFactory;
use crate::factories::{exception_rank, UNCHECKED_EXCEPTIONS};
use crate::ir::{Block, CatchBlock, ExceptionVec, If, IrNode, Literal, Node, Switch, SwitchCase, TryCatch};
use crate::rule::{BudgetSplitter, Factory, SafeFactory};
use crate::types::util::get_less_capacious_or_equal_than;
use crate::types::Type;

const ELSE_PROBABILITY: f64 = 0.5;
const DEFAULT_PROBABILITY: f64 = 0.5;
const FINALLY_PROBABILITY: f64 = 0.3;
const MAX_CATCHES: u64 = 3;

/// Nested block one level below `p`.
fn sub_block(
    p: &BlockParams,
    ctx: &mut GenContext,
    complexity_limit: u64,
    statement_limit: u64,
    can_have_breaks: bool,
) -> ProductionResult<Block> {
    p.builder()
        .complexity_limit(complexity_limit)
        .statement_limit(statement_limit)
        .level(p.level + 1)
        .can_have_breaks(can_have_breaks)
        .block_factory()?
        .produce(ctx)
}

/// Shares of `budget` for `parts` consumers, each at least 1. The last
/// share takes the rest.
fn share(budget: &mut BudgetSplitter, ctx: &mut GenContext, parts_left: u64) -> u64 {
    if parts_left <= 1 {
        budget.take_rest()
    } else {
        budget.take_leaving(&mut ctx.rng, parts_left - 1)
    }
}

// ---------------------------------------------------------------------------
// If
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct IfFactory {
    p: BlockParams,
}

impl IfFactory {
    pub fn new(p: BlockParams) -> Self {
        Self { p }
    }
}

impl SafeFactory<IrNode> for IfFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        let p = &self.p;
        ensure(p.statement_limit > 0, "if: no statements left")?;
        ensure(p.complexity_limit >= 3, "if: complexity too small")?;
        let mut budget = BudgetSplitter::new(p.complexity_limit - 1);

        let cond_share = budget.take_leaving(&mut ctx.rng, 1);
        let condition = p
            .builder()
            .result_type(Type::BOOLEAN)
            .complexity_limit(cond_share)
            .expression_factory()?
            .produce(ctx)?;
        budget.refund(cond_share - condition.complexity().min(cond_share));

        let then_statements = ctx.rng.random_not_zero(p.statement_limit);
        let else_statements = p.statement_limit - then_statements;
        let with_else = else_statements > 0
            && budget.remaining() >= 2
            && ctx.rng.random_boolean_with(ELSE_PROBABILITY);

        let then_share = share(&mut budget, ctx, if with_else { 2 } else { 1 });
        let then_block = sub_block(p, ctx, then_share, then_statements, p.can_have_breaks)?;
        budget.refund(then_share - then_block.complexity().min(then_share));

        let else_block = if with_else {
            let else_share = budget.take_rest();
            Some(sub_block(p, ctx, else_share, else_statements, p.can_have_breaks)?)
        } else {
            None
        };
        Ok(IrNode::If(Box::new(If {
            condition: Box::new(condition),
            then_block,
            else_block,
        })))
    }
}

// ---------------------------------------------------------------------------
// Switch
// ---------------------------------------------------------------------------

/// `switch` over an integral selector. Case labels are distinct literals
/// that fit the selector type; bodies may `break` out of the switch.
#[derive(Debug, Clone)]
pub struct SwitchFactory {
    p: BlockParams,
}

impl SwitchFactory {
    pub fn new(p: BlockParams) -> Self {
        Self { p }
    }

    /// Distinct labels for `selector`, or a failure when one of them could
    /// not be drawn within the retry limit.
    fn labels(&self, ctx: &mut GenContext, selector: &Type, count: u64) -> ProductionResult<Vec<Literal>> {
        let (min, max) = selector
            .as_builtin()
            .and_then(|b| b.integral_range())
            .ok_or_else(|| ProductionError::failed("switch: selector is not integral"))?;
        let label_types = get_less_capacious_or_equal_than(&ctx.types.get_builtin_int(), selector);
        let mut labels: Vec<Literal> = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let mut found = None;
            for _ in 0..ctx.params.switch_case_retry_limit {
                let ty = ctx
                    .rng
                    .random_element(&label_types)
                    .cloned()
                    .ok_or_else(|| ProductionError::failed("switch: no label type"))?;
                let literal = LiteralFactory::new(ty, 1).literal(ctx)?;
                let Some(value) = literal.as_integral() else {
                    continue;
                };
                let fits = (min..=max).contains(&value);
                let taken = labels.iter().any(|l| l.as_integral() == Some(value));
                if fits && !taken {
                    found = Some(literal);
                    break;
                }
            }
            labels.push(found.ok_or_else(|| ProductionError::failed("switch: no free case label"))?);
        }
        Ok(labels)
    }

    fn with_selector(&self, ctx: &mut GenContext, selector_type: Type) -> ProductionResult<IrNode> {
        let p = &self.p;
        let case_count = ctx
            .rng
            .random_not_zero(ctx.params.switch_case_limit)
            .min(p.statement_limit);
        let with_default =
            case_count < p.statement_limit && ctx.rng.random_boolean_with(DEFAULT_PROBABILITY);
        let labels = self.labels(ctx, &selector_type, case_count)?;
        let parts = case_count + u64::from(with_default);
        ensure(p.complexity_limit > 1 + parts, "switch: complexity too small")?;

        let mut budget = BudgetSplitter::new(p.complexity_limit - 1);
        let selector_share = budget.take_leaving(&mut ctx.rng, parts);
        let selector = p
            .builder()
            .result_type(selector_type)
            .complexity_limit(selector_share)
            .limited_expression_factory()?
            .produce(ctx)?;
        budget.refund(selector_share - selector.complexity().min(selector_share));

        let mut statements = BudgetSplitter::new(p.statement_limit);
        let mut cases = Vec::with_capacity(parts as usize);
        let mut labels = labels.into_iter().map(Some).collect::<Vec<_>>();
        if with_default {
            labels.push(None);
        }
        let total = labels.len() as u64;
        for (i, label) in labels.into_iter().enumerate() {
            let left = total - i as u64;
            let complexity = share(&mut budget, ctx, left);
            let body_statements = share(&mut statements, ctx, left);
            let body = sub_block(p, ctx, complexity, body_statements, true)?;
            budget.refund(complexity - body.complexity().min(complexity));
            cases.push(SwitchCase { label, body });
        }
        Ok(IrNode::Switch(Box::new(Switch {
            selector: Box::new(selector),
            cases,
        })))
    }
}

impl SafeFactory<IrNode> for SwitchFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        ensure(self.p.statement_limit > 0, "switch: no statements left")?;
        ensure(self.p.complexity_limit >= 3, "switch: complexity too small")?;
        let mut selectors = vec![Type::BYTE, Type::SHORT, Type::CHAR, Type::INT];
        ctx.rng.shuffle(&mut selectors);
        for selector in selectors {
            match ctx.speculate(|ctx| self.with_selector(ctx, selector)) {
                Ok(node) => return Ok(node),
                Err(e) if e.is_fatal() => return Err(e),
                Err(_) => continue,
            }
        }
        Err(ProductionError::failed("switch: no selector type worked"))
    }
}

// ---------------------------------------------------------------------------
// Try / catch / finally
// ---------------------------------------------------------------------------

/// `try { } catch (E e) { } .. finally { }`. Catch clauses are ordered most
/// specific first, so none is unreachable.
#[derive(Debug, Clone)]
pub struct TryCatchFactory {
    p: BlockParams,
}

impl TryCatchFactory {
    pub fn new(p: BlockParams) -> Self {
        Self { p }
    }

    fn exceptions(ctx: &mut GenContext, count: u64) -> Vec<Type> {
        let mut all: Vec<Type> = UNCHECKED_EXCEPTIONS.iter().map(|e| Type::klass(*e)).collect();
        ctx.rng.shuffle(&mut all);
        all.truncate(count as usize);
        all.sort_by_key(exception_rank);
        all
    }
}

impl SafeFactory<IrNode> for TryCatchFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        let p = &self.p;
        ensure(p.statement_limit >= 2, "try: needs room for a handler")?;
        let catch_count = ctx
            .rng
            .random_not_negative(MAX_CATCHES + 1)
            .min(p.statement_limit - 1);
        let with_finally = catch_count == 0
            || (catch_count < p.statement_limit - 1 && ctx.rng.random_boolean_with(FINALLY_PROBABILITY));
        let parts = 1 + catch_count + u64::from(with_finally);
        ensure(p.complexity_limit > parts, "try: complexity too small")?;

        let mut budget = BudgetSplitter::new(p.complexity_limit - 1);
        let mut statements = BudgetSplitter::new(p.statement_limit);
        let mut left = parts;
        let mut next_block = |ctx: &mut GenContext, left: u64| -> ProductionResult<Block> {
            let complexity = share(&mut budget, ctx, left);
            let body_statements = share(&mut statements, ctx, left);
            let block = sub_block(p, ctx, complexity, body_statements, p.can_have_breaks)?;
            budget.refund(complexity - block.complexity().min(complexity));
            Ok(block)
        };

        let body = next_block(ctx, left)?;
        left -= 1;
        let mut catches = Vec::with_capacity(catch_count as usize);
        for exception in Self::exceptions(ctx, catch_count) {
            let block = next_block(ctx, left)?;
            left -= 1;
            let mut exceptions = ExceptionVec::new();
            exceptions.push(exception);
            catches.push(CatchBlock {
                exceptions,
                body: block,
            });
        }
        let finally = if with_finally {
            Some(next_block(ctx, left)?)
        } else {
            None
        };
        Ok(IrNode::TryCatch(Box::new(TryCatch {
            body,
            catches,
            finally,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IrNodeBuilder;
    use crate::params::ProductionParams;
    use crate::symbols::{SymbolFlags, VariableInfo};

    fn owner() -> Type {
        Type::klass("Test")
    }

    fn builder(statements: u64, complexity: u64) -> IrNodeBuilder {
        IrNodeBuilder::new()
            .owner(owner())
            .result_type(Type::VOID)
            .complexity_limit(complexity)
            .statement_limit(statements)
            .operator_limit(3)
            .level(1)
    }

    fn ctx(seed: u64) -> GenContext {
        let mut ctx = GenContext::new(seed, ProductionParams::small());
        for (name, ty) in [("var_a", Type::INT), ("var_b", Type::BOOLEAN)] {
            ctx.symbols.add(VariableInfo::new(
                name,
                owner(),
                ty,
                SymbolFlags::LOCAL | SymbolFlags::INITIALIZED,
            ));
        }
        ctx
    }

    #[test]
    fn if_has_a_boolean_condition_and_nested_blocks() {
        for seed in 0..40 {
            let mut ctx = ctx(seed);
            let node = builder(4, 300)
                .if_factory()
                .expect("params")
                .produce(&mut ctx)
                .expect("if");
            let IrNode::If(i) = &node else {
                panic!("expected if");
            };
            assert_eq!(i.condition.result_type(), Some(&Type::BOOLEAN));
            assert_eq!(i.then_block.level, 2);
            assert!(node.complexity() <= 300, "seed {seed}");
            let inner = i.else_block.as_ref().map_or(0, Block::depth);
            assert_eq!(node.depth(), 1 + i.then_block.depth().max(inner));
        }
    }

    #[test]
    fn switch_labels_are_distinct_and_fit_the_selector() {
        for seed in 0..60 {
            let mut ctx = ctx(seed);
            let Ok(node) = builder(4, 300)
                .switch_factory()
                .expect("params")
                .produce(&mut ctx)
            else {
                continue;
            };
            let IrNode::Switch(s) = &node else {
                panic!("expected switch");
            };
            let selector = s.selector.result_type().expect("selector type").clone();
            let (min, max) = selector
                .as_builtin()
                .and_then(|b| b.integral_range())
                .expect("integral selector");
            let values: Vec<i64> = s
                .cases
                .iter()
                .filter_map(|c| c.label.as_ref())
                .map(|l| l.as_integral().expect("integral label"))
                .collect();
            for (i, v) in values.iter().enumerate() {
                assert!((min..=max).contains(v), "seed {seed}: {v} does not fit {selector}");
                assert!(!values[..i].contains(v), "seed {seed}: duplicate label {v}");
            }
            if s.has_default() {
                assert!(s.cases.last().is_some_and(|c| c.label.is_none()));
            }
            assert!(s.cases.len() as u64 <= 4);
        }
    }

    #[test]
    fn catches_are_ordered_and_finally_covers_no_catch() {
        for seed in 0..60 {
            let mut ctx = ctx(seed);
            let node = builder(5, 300)
                .try_catch_factory()
                .expect("params")
                .produce(&mut ctx)
                .expect("try");
            let IrNode::TryCatch(t) = &node else {
                panic!("expected try");
            };
            assert!(t.catches.len() <= 3);
            let ranks: Vec<usize> = t.catches.iter().map(|c| exception_rank(&c.exceptions[0])).collect();
            assert!(ranks.windows(2).all(|w| w[0] < w[1]), "seed {seed}: {ranks:?}");
            if t.catches.is_empty() {
                assert!(t.finally.is_some());
            }
        }
        let mut ctx = ctx(0);
        assert!(builder(1, 300)
            .try_catch_factory()
            .expect("params")
            .produce(&mut ctx)
            .is_err());
    }
}
