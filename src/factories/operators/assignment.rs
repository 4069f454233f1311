use super::{numeric_types, operator_production, BinaryOperatorFactory, OperatorFactory};
use crate::builder::ExpressionParams;
use crate::context::GenContext;
use crate::error::{ProductionError, ProductionResult};
use crate::ir::{IrNode, OperatorKind};
use crate::rule::Factory;
use crate::types::util::get_implicitly_castable;
use crate::types::Type;

fn pick(ctx: &mut GenContext, candidates: &[Type]) -> ProductionResult<Type> {
    ctx.rng
        .random_element(candidates)
        .cloned()
        .ok_or_else(|| ProductionError::failed("assignment: no right-hand type"))
}

/// Assignment target: a non-final variable of exactly the result type.
fn target(
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
        .assignable(true)
        .variable_factory()?
        .produce(ctx)
}

// -- Plain assignment ---------------------------------------------------------

/// `x = e` where `e` widens to the type of `x`.
#[derive(Debug, Clone)]
pub struct AssignmentOperatorFactory {
    p: ExpressionParams,
}

impl AssignmentOperatorFactory {
    pub fn new(p: ExpressionParams) -> Self {
        Self { p }
    }
}

impl OperatorFactory for AssignmentOperatorFactory {
    fn kind(&self) -> OperatorKind {
        OperatorKind::Assign
    }

    fn params(&self) -> &ExpressionParams {
        &self.p
    }

    fn is_applicable(&self, result_type: &Type) -> bool {
        !result_type.is_void()
    }
}

impl BinaryOperatorFactory for AssignmentOperatorFactory {
    fn generate_types(&self, ctx: &mut GenContext) -> ProductionResult<(Type, Type)> {
        let candidates = get_implicitly_castable(&ctx.types.get_all(), &self.p.result_type, &ctx.types);
        let right = pick(ctx, &candidates)?;
        Ok((self.p.result_type.clone(), right))
    }

    fn produce_left(
        &self,
        ctx: &mut GenContext,
        ty: Type,
        complexity_limit: u64,
        operator_limit: u64,
    ) -> ProductionResult<IrNode> {
        target(&self.p, ctx, ty, complexity_limit, operator_limit)
    }
}

operator_production!(AssignmentOperatorFactory, produce_binary);

// -- Compound assignment ------------------------------------------------------

/// `x op= e`. Java inserts the narrowing cast back to the type of `x`, so
/// any numeric right-hand side is accepted for the arithmetic forms.
#[derive(Debug, Clone)]
pub struct CompoundAssignmentFactory {
    kind: OperatorKind,
    p: ExpressionParams,
}

impl CompoundAssignmentFactory {
    pub fn new(kind: OperatorKind, p: ExpressionParams) -> Self {
        Self { kind, p }
    }

    fn is_bitwise(&self) -> bool {
        matches!(
            self.kind,
            OperatorKind::CompoundAnd | OperatorKind::CompoundOr | OperatorKind::CompoundXor
        )
    }

    fn is_shift(&self) -> bool {
        matches!(
            self.kind,
            OperatorKind::CompoundShl | OperatorKind::CompoundShr | OperatorKind::CompoundSar
        )
    }
}

impl OperatorFactory for CompoundAssignmentFactory {
    fn kind(&self) -> OperatorKind {
        self.kind
    }

    fn params(&self) -> &ExpressionParams {
        &self.p
    }

    fn is_applicable(&self, result_type: &Type) -> bool {
        if self.is_bitwise() {
            result_type.is_integral() || *result_type == Type::BOOLEAN
        } else if self.is_shift() {
            result_type.is_integral()
        } else {
            result_type.is_numeric()
        }
    }
}

impl BinaryOperatorFactory for CompoundAssignmentFactory {
    fn generate_types(&self, ctx: &mut GenContext) -> ProductionResult<(Type, Type)> {
        let result = self.p.result_type.clone();
        let right = if result == Type::BOOLEAN {
            Type::BOOLEAN
        } else if self.is_bitwise() || self.is_shift() {
            let integral = ctx.types.get_builtin_int();
            pick(ctx, &integral)?
        } else {
            pick(ctx, &numeric_types())?
        };
        Ok((result, right))
    }

    fn produce_left(
        &self,
        ctx: &mut GenContext,
        ty: Type,
        complexity_limit: u64,
        operator_limit: u64,
    ) -> ProductionResult<IrNode> {
        target(&self.p, ctx, ty, complexity_limit, operator_limit)
    }
}

operator_production!(CompoundAssignmentFactory, produce_binary);
