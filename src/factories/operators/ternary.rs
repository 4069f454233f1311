use super::{operand, OperatorFactory};
use crate::builder::ExpressionParams;
use crate::context::GenContext;
use crate::error::ProductionResult;
use crate::ir::{IrNode, OperatorKind, TernaryOperator};
use crate::rule::SafeFactory;
use crate::types::Type;

/// `c ? a : b` with both branches of exactly the result type.
#[derive(Debug, Clone)]
pub struct TernaryOperatorFactory {
    p: ExpressionParams,
}

impl TernaryOperatorFactory {
    pub fn new(p: ExpressionParams) -> Self {
        Self { p }
    }
}

impl OperatorFactory for TernaryOperatorFactory {
    fn kind(&self) -> OperatorKind {
        OperatorKind::Ternary
    }

    fn params(&self) -> &ExpressionParams {
        &self.p
    }

    fn is_applicable(&self, result_type: &Type) -> bool {
        !result_type.is_void()
    }

    fn min_complexity(&self) -> u64 {
        4
    }
}

impl SafeFactory<IrNode> for TernaryOperatorFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        self.check()?;
        let p = &self.p;
        let rest_c = p.complexity_limit - 1;
        let cond_c = 1 + ctx.rng.fraction_of(rest_c - 2);
        let then_c = 1 + ctx.rng.fraction_of(rest_c - cond_c - 1);
        let else_c = rest_c - cond_c - then_c;
        let rest_o = p.operator_limit - 1;
        let cond_o = ctx.rng.fraction_of(rest_o);
        let then_o = ctx.rng.fraction_of(rest_o - cond_o);
        let else_o = rest_o - cond_o - then_o;

        let condition = operand(p, ctx, Type::BOOLEAN, cond_c, cond_o)?;
        let then_expr = operand(p, ctx, p.result_type.clone(), then_c, then_o)?;
        let else_expr = operand(p, ctx, p.result_type.clone(), else_c, else_o)?;
        Ok(IrNode::Ternary(TernaryOperator {
            ty: p.result_type.clone(),
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        }))
    }
}
