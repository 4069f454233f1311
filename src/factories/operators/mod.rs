//! Operator productions.
//!
//! Each family implements [`OperatorFactory`]. Binary and unary families
//! add [`BinaryOperatorFactory`] / [`UnaryOperatorFactory`], whose provided
//! methods do the operand budgeting, so a family only decides whether it
//! applies to a result type and which operand types it wants.
//!
//! Budget policy: the operator takes one operator unit and one complexity
//! unit. The left operand draws a random share of what is left, the right
//! operand gets the remainder. Nothing is aliased.

mod assignment;
mod binary;
mod cast;
mod ternary;
mod unary;

pub use assignment::{AssignmentOperatorFactory, CompoundAssignmentFactory};
pub use binary::{
    ArithmeticOperatorFactory, BitwiseOperatorFactory, ComparisonOperatorFactory,
    EqualityOperatorFactory, LogicOperatorFactory, ShiftOperatorFactory, StringPlusFactory,
};
pub use cast::CastOperatorFactory;
pub use ternary::TernaryOperatorFactory;
pub use unary::{BitNotFactory, IncDecOperatorFactory, NotFactory, UnaryArithmeticFactory};

use crate::builder::ExpressionParams;
use crate::context::GenContext;
use crate::error::{ensure, ProductionError, ProductionResult};
use crate::ir::{BinaryOperator, IrNode, OperatorKind, UnaryOperator};
use crate::rule::{Factory, Rule};
use crate::types::{BuiltInType, Type};

/// Common shape of every operator production.
pub trait OperatorFactory {
    fn kind(&self) -> OperatorKind;

    fn params(&self) -> &ExpressionParams;

    /// Whether the operator can produce `result_type` at all.
    fn is_applicable(&self, result_type: &Type) -> bool;

    /// Smallest complexity an application can cost.
    fn min_complexity(&self) -> u64 {
        2
    }

    /// Generic preconditions shared by all operators.
    fn check(&self) -> ProductionResult<()> {
        let p = self.params();
        ensure(p.operator_limit > 0, "operator: no operators left")?;
        ensure(
            p.complexity_limit >= self.min_complexity(),
            "operator: complexity too small",
        )?;
        ensure(
            !(p.exception_safe && self.kind().may_throw()),
            "operator: may throw",
        )?;
        ensure(
            !(p.no_side_effects && self.kind().has_side_effect()),
            "operator: has side effects",
        )?;
        if !self.is_applicable(&p.result_type) {
            return Err(ProductionError::failed("operator: not applicable"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Binary
// ---------------------------------------------------------------------------

pub trait BinaryOperatorFactory: OperatorFactory {
    /// Operand types for this application.
    fn generate_types(&self, ctx: &mut GenContext) -> ProductionResult<(Type, Type)>;

    /// Left operand, produced with the left share of the budget.
    fn produce_left(
        &self,
        ctx: &mut GenContext,
        ty: Type,
        complexity_limit: u64,
        operator_limit: u64,
    ) -> ProductionResult<IrNode> {
        operand(self.params(), ctx, ty, complexity_limit, operator_limit)
    }

    fn produce_binary(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        self.check()?;
        let p = self.params();
        ensure(p.complexity_limit >= 3, "binary: complexity too small")?;
        let (left_type, right_type) = self.generate_types(ctx)?;
        let rest_c = p.complexity_limit - 1;
        let left_c = 1 + ctx.rng.fraction_of(rest_c - 1);
        let right_c = rest_c - left_c;
        let rest_o = p.operator_limit - 1;
        let left_o = ctx.rng.fraction_of(rest_o);
        let right_o = rest_o - left_o;
        let left = self.produce_left(ctx, left_type, left_c, left_o)?;
        let right = operand(p, ctx, right_type, right_c, right_o)?;
        Ok(IrNode::Binary(BinaryOperator {
            kind: self.kind(),
            ty: p.result_type.clone(),
            left: Box::new(left),
            right: Box::new(right),
        }))
    }
}

// ---------------------------------------------------------------------------
// Unary
// ---------------------------------------------------------------------------

pub trait UnaryOperatorFactory: OperatorFactory {
    fn generate_type(&self, ctx: &mut GenContext) -> ProductionResult<Type>;

    fn produce_operand(
        &self,
        ctx: &mut GenContext,
        ty: Type,
        complexity_limit: u64,
        operator_limit: u64,
    ) -> ProductionResult<IrNode> {
        operand(self.params(), ctx, ty, complexity_limit, operator_limit)
    }

    fn produce_unary(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        self.check()?;
        let p = self.params();
        let ty = self.generate_type(ctx)?;
        let operand = self.produce_operand(ctx, ty, p.complexity_limit - 1, p.operator_limit - 1)?;
        Ok(IrNode::Unary(UnaryOperator {
            kind: self.kind(),
            ty: p.result_type.clone(),
            operand: Box::new(operand),
        }))
    }
}

/// Produce an operand expression of `ty` within the given share.
fn operand(
    p: &ExpressionParams,
    ctx: &mut GenContext,
    ty: Type,
    complexity_limit: u64,
    operator_limit: u64,
) -> ProductionResult<IrNode> {
    p.builder()
        .result_type(ty)
        .complexity_limit(complexity_limit)
        .operator_limit(operator_limit)
        .expression_factory()?
        .produce(ctx)
}

// ---------------------------------------------------------------------------
// Type helpers
// ---------------------------------------------------------------------------

/// Every numeric built-in.
pub(crate) fn numeric_types() -> Vec<Type> {
    BuiltInType::VALUE_TYPES
        .iter()
        .copied()
        .filter(|b| b.is_numeric())
        .map(Type::BuiltIn)
        .collect()
}

/// Operand pair whose binary numeric promotion is exactly `result`.
///
/// An `int` result comes from any pair of int-or-narrower operands. A
/// wider result needs at least one operand of that type, the other
/// widening to it.
pub(crate) fn promoted_pair(
    ctx: &mut GenContext,
    result: BuiltInType,
) -> ProductionResult<(Type, Type)> {
    let widening: Vec<Type> = numeric_types()
        .into_iter()
        .filter(|t| {
            t.as_builtin()
                .is_some_and(|b| b.unary_promoted().can_widen_to(result))
        })
        .collect();
    let other = ctx
        .rng
        .random_element(&widening)
        .cloned()
        .ok_or_else(|| ProductionError::failed("operator: no operand types"))?;
    if result == BuiltInType::Int {
        let second = ctx
            .rng
            .random_element(&widening)
            .cloned()
            .ok_or_else(|| ProductionError::failed("operator: no operand types"))?;
        return Ok((other, second));
    }
    let exact = Type::BuiltIn(result);
    Ok(if ctx.rng.random_boolean() {
        (exact, other)
    } else {
        (other, exact)
    })
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// `+ - * / %`, unary sign and increment/decrement.
pub fn arithmetic_rule(p: &ExpressionParams) -> Rule<IrNode> {
    let mut rule = Rule::new("arithmetic");
    for kind in [
        OperatorKind::Add,
        OperatorKind::Sub,
        OperatorKind::Mul,
        OperatorKind::Div,
        OperatorKind::Mod,
    ] {
        rule.add(kind.text(), ArithmeticOperatorFactory::new(kind, p.clone()));
    }
    rule.add("unary", UnaryArithmeticFactory::new(OperatorKind::UnaryMinus, p.clone()))
        .add_weighted(
            "unary_plus",
            0.3,
            UnaryArithmeticFactory::new(OperatorKind::UnaryPlus, p.clone()),
        );
    for kind in [
        OperatorKind::PreInc,
        OperatorKind::PreDec,
        OperatorKind::PostInc,
        OperatorKind::PostDec,
    ] {
        rule.add_weighted(kind.text(), 0.5, IncDecOperatorFactory::new(kind, p.clone()));
    }
    rule
}

/// Comparisons, equality, `&& || !`.
pub fn logic_rule(p: &ExpressionParams) -> Rule<IrNode> {
    let mut rule = Rule::new("logic");
    for kind in [
        OperatorKind::Lt,
        OperatorKind::Le,
        OperatorKind::Gt,
        OperatorKind::Ge,
    ] {
        rule.add(kind.text(), ComparisonOperatorFactory::new(kind, p.clone()));
    }
    for kind in [OperatorKind::Eq, OperatorKind::Ne] {
        rule.add(kind.text(), EqualityOperatorFactory::new(kind, p.clone()));
    }
    for kind in [OperatorKind::And, OperatorKind::Or] {
        rule.add(kind.text(), LogicOperatorFactory::new(kind, p.clone()));
    }
    rule.add("!", NotFactory::new(p.clone()));
    rule
}

/// `& | ^ ~ << >> >>>`.
pub fn bitwise_rule(p: &ExpressionParams) -> Rule<IrNode> {
    let mut rule = Rule::new("bitwise");
    for kind in [OperatorKind::BitAnd, OperatorKind::BitOr, OperatorKind::BitXor] {
        rule.add(kind.text(), BitwiseOperatorFactory::new(kind, p.clone()));
    }
    for kind in [OperatorKind::Shl, OperatorKind::Shr, OperatorKind::Sar] {
        rule.add(kind.text(), ShiftOperatorFactory::new(kind, p.clone()));
    }
    rule.add("~", BitNotFactory::new(p.clone()));
    rule
}

/// `=` and the compound assignments.
pub fn assignment_rule(p: &ExpressionParams) -> Rule<IrNode> {
    let mut rule = Rule::new("assignment");
    rule.add_weighted("=", 3.0, AssignmentOperatorFactory::new(p.clone()));
    for kind in [
        OperatorKind::CompoundAdd,
        OperatorKind::CompoundSub,
        OperatorKind::CompoundMul,
        OperatorKind::CompoundDiv,
        OperatorKind::CompoundMod,
        OperatorKind::CompoundAnd,
        OperatorKind::CompoundOr,
        OperatorKind::CompoundXor,
        OperatorKind::CompoundShl,
        OperatorKind::CompoundShr,
        OperatorKind::CompoundSar,
    ] {
        rule.add_weighted(kind.text(), 0.3, CompoundAssignmentFactory::new(kind, p.clone()));
    }
    rule
}

/// Implements `SafeFactory<IrNode>` for operator structs by delegating to
/// the family's provided production method.
macro_rules! operator_production {
    ($ty:ty, $method:ident) => {
        impl $crate::rule::SafeFactory<$crate::ir::IrNode> for $ty {
            fn sproduce(
                &self,
                ctx: &mut $crate::context::GenContext,
            ) -> $crate::error::ProductionResult<$crate::ir::IrNode> {
                self.$method(ctx)
            }
        }
    };
}

pub(crate) use operator_production;

#[cfg(test)]
mod tests;
