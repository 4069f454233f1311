//! Simple statements: expression statements, jumps and the empty statement.

use crate::builder::{BlockParams, ExpressionParams};
use crate::context::GenContext;
use crate::error::{ensure, ProductionError, ProductionResult};
use crate::factories::operators::{assignment_rule, IncDecOperatorFactory};
use crate::factories::{THROWABLE_EXCEPTIONS, UNCHECKED_EXCEPTIONS};
use crate::ir::{IrNode, OperatorKind, PrintVariables, Return, Statement, Throw};
use crate::rule::{Factory, Rule, SafeFactory};
use crate::symbols::VariableInfo;
use crate::types::Type;

/// Result types tried per expression statement.
const STATEMENT_TYPE_TRIES: usize = 3;

/// An expression evaluated for its effect. Java only accepts assignments,
/// increments and calls in this position.
#[derive(Debug, Clone)]
pub struct StatementFactory {
    p: BlockParams,
}

impl StatementFactory {
    pub fn new(p: BlockParams) -> Self {
        Self { p }
    }

    fn expression_params(&self, ty: Type) -> ExpressionParams {
        ExpressionParams {
            owner: self.p.owner.clone(),
            result_type: ty,
            complexity_limit: self.p.complexity_limit,
            operator_limit: self.p.operator_limit,
            exception_safe: false,
            no_consts: false,
            no_side_effects: false,
        }
    }

    fn rule(&self, ty: Type) -> ProductionResult<Rule<IrNode>> {
        let ep = self.expression_params(ty.clone());
        let mut rule = Rule::new("statement");
        if !ty.is_void() {
            rule.add("assignment", assignment_rule(&ep));
        }
        if ty.is_numeric() {
            for kind in [
                OperatorKind::PreInc,
                OperatorKind::PreDec,
                OperatorKind::PostInc,
                OperatorKind::PostDec,
            ] {
                rule.add_weighted(kind.text(), 0.25, IncDecOperatorFactory::new(kind, ep.clone()));
            }
        }
        rule.add("function_call", ep.builder().function_call_factory()?);
        Ok(rule)
    }
}

impl SafeFactory<IrNode> for StatementFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        ensure(self.p.complexity_limit > 0, "statement: no complexity left")?;
        let mut types = ctx.types.get_all();
        types.push(Type::VOID);
        ctx.rng.shuffle(&mut types);
        for ty in types.into_iter().take(STATEMENT_TYPE_TRIES) {
            match self.rule(ty)?.produce(ctx) {
                Ok(expr) => {
                    return Ok(IrNode::Statement(Statement {
                        expr: Box::new(expr),
                    }))
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(_) => continue,
            }
        }
        Err(ProductionError::failed("statement: no statement expression"))
    }
}

/// `;`
#[derive(Debug, Clone, Copy)]
pub struct NothingFactory;

impl SafeFactory<IrNode> for NothingFactory {
    fn sproduce(&self, _ctx: &mut GenContext) -> ProductionResult<IrNode> {
        Ok(IrNode::Nothing)
    }
}

// ---------------------------------------------------------------------------
// Jumps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct BreakFactory {
    enabled: bool,
}

impl BreakFactory {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl SafeFactory<IrNode> for BreakFactory {
    fn sproduce(&self, _ctx: &mut GenContext) -> ProductionResult<IrNode> {
        ensure(self.enabled, "break: not inside a loop or switch")?;
        Ok(IrNode::Break)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ContinueFactory {
    enabled: bool,
}

impl ContinueFactory {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl SafeFactory<IrNode> for ContinueFactory {
    fn sproduce(&self, _ctx: &mut GenContext) -> ProductionResult<IrNode> {
        ensure(self.enabled, "continue: not inside a loop")?;
        Ok(IrNode::Continue)
    }
}

/// `return;` in void functions, `return e;` otherwise.
#[derive(Debug, Clone)]
pub struct ReturnFactory {
    p: BlockParams,
}

impl ReturnFactory {
    pub fn new(p: BlockParams) -> Self {
        Self { p }
    }
}

impl SafeFactory<IrNode> for ReturnFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        let p = &self.p;
        ensure(p.can_have_returns, "return: not allowed here")?;
        ensure(p.complexity_limit > 0, "return: no complexity left")?;
        if p.result_type.is_void() {
            return Ok(IrNode::Return(Return { expr: None }));
        }
        ensure(p.complexity_limit >= 2, "return: no complexity for a value")?;
        let expr = p
            .builder()
            .complexity_limit(p.complexity_limit - 1)
            .expression_factory()?
            .produce(ctx)?;
        Ok(IrNode::Return(Return {
            expr: Some(Box::new(expr)),
        }))
    }
}

/// `throw new E();` with a runtime exception type.
#[derive(Debug, Clone, Copy)]
pub struct ThrowFactory {
    complexity_limit: u64,
}

impl ThrowFactory {
    pub fn new(complexity_limit: u64) -> Self {
        Self { complexity_limit }
    }
}

impl SafeFactory<IrNode> for ThrowFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        ensure(self.complexity_limit > 0, "throw: no complexity left")?;
        let name = ctx
            .rng
            .random_element(&UNCHECKED_EXCEPTIONS[..THROWABLE_EXCEPTIONS])
            .copied()
            .ok_or_else(|| ProductionError::failed("throw: no exception type"))?;
        Ok(IrNode::Throw(Throw {
            exception: Type::klass(name),
        }))
    }
}

/// Fields of `owner` dumped after the test body runs.
pub fn print_variables(ctx: &GenContext, owner: &Type) -> PrintVariables {
    let variables: Vec<VariableInfo> = ctx
        .symbols
        .get_variables(owner)
        .into_iter()
        .filter(|v| !v.is_local())
        .cloned()
        .collect();
    PrintVariables {
        owner: owner.clone(),
        variables,
    }
}
