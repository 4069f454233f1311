use super::{numeric_types, operator_production, OperatorFactory, UnaryOperatorFactory};
use crate::builder::ExpressionParams;
use crate::context::GenContext;
use crate::error::{ProductionError, ProductionResult};
use crate::ir::{IrNode, OperatorKind};
use crate::rule::Factory;
use crate::types::{BuiltInType, Type};

/// Operand types whose unary promotion is exactly `result`.
fn promoting_to(candidates: Vec<Type>, result: &Type) -> Vec<Type> {
    let target = result.as_builtin();
    candidates
        .into_iter()
        .filter(|t| t.as_builtin().map(BuiltInType::unary_promoted) == target)
        .collect()
}

fn pick(ctx: &mut GenContext, candidates: &[Type]) -> ProductionResult<Type> {
    ctx.rng
        .random_element(candidates)
        .cloned()
        .ok_or_else(|| ProductionError::failed("unary: no operand type"))
}

// -- Sign ---------------------------------------------------------------------

/// Unary `+` and `-`.
#[derive(Debug, Clone)]
pub struct UnaryArithmeticFactory {
    kind: OperatorKind,
    p: ExpressionParams,
}

impl UnaryArithmeticFactory {
    pub fn new(kind: OperatorKind, p: ExpressionParams) -> Self {
        Self { kind, p }
    }
}

impl OperatorFactory for UnaryArithmeticFactory {
    fn kind(&self) -> OperatorKind {
        self.kind
    }

    fn params(&self) -> &ExpressionParams {
        &self.p
    }

    fn is_applicable(&self, result_type: &Type) -> bool {
        matches!(
            result_type.as_builtin(),
            Some(BuiltInType::Int | BuiltInType::Long | BuiltInType::Float | BuiltInType::Double)
        )
    }
}

impl UnaryOperatorFactory for UnaryArithmeticFactory {
    fn generate_type(&self, ctx: &mut GenContext) -> ProductionResult<Type> {
        let candidates = promoting_to(numeric_types(), &self.p.result_type);
        pick(ctx, &candidates)
    }
}

operator_production!(UnaryArithmeticFactory, produce_unary);

// -- Bitwise complement -------------------------------------------------------

/// `~`.
#[derive(Debug, Clone)]
pub struct BitNotFactory {
    p: ExpressionParams,
}

impl BitNotFactory {
    pub fn new(p: ExpressionParams) -> Self {
        Self { p }
    }
}

impl OperatorFactory for BitNotFactory {
    fn kind(&self) -> OperatorKind {
        OperatorKind::BitNot
    }

    fn params(&self) -> &ExpressionParams {
        &self.p
    }

    fn is_applicable(&self, result_type: &Type) -> bool {
        matches!(
            result_type.as_builtin(),
            Some(BuiltInType::Int | BuiltInType::Long)
        )
    }
}

impl UnaryOperatorFactory for BitNotFactory {
    fn generate_type(&self, ctx: &mut GenContext) -> ProductionResult<Type> {
        let candidates = promoting_to(ctx.types.get_builtin_int(), &self.p.result_type);
        pick(ctx, &candidates)
    }
}

operator_production!(BitNotFactory, produce_unary);

// -- Logical not --------------------------------------------------------------

/// `!`.
#[derive(Debug, Clone)]
pub struct NotFactory {
    p: ExpressionParams,
}

impl NotFactory {
    pub fn new(p: ExpressionParams) -> Self {
        Self { p }
    }
}

impl OperatorFactory for NotFactory {
    fn kind(&self) -> OperatorKind {
        OperatorKind::Not
    }

    fn params(&self) -> &ExpressionParams {
        &self.p
    }

    fn is_applicable(&self, result_type: &Type) -> bool {
        *result_type == Type::BOOLEAN
    }
}

impl UnaryOperatorFactory for NotFactory {
    fn generate_type(&self, _ctx: &mut GenContext) -> ProductionResult<Type> {
        Ok(Type::BOOLEAN)
    }
}

operator_production!(NotFactory, produce_unary);

// -- Increment and decrement --------------------------------------------------

/// `++x`, `x++`, `--x`, `x--` on a numeric variable. The result has the
/// variable's own type, so `byte` and `char` results are possible here.
#[derive(Debug, Clone)]
pub struct IncDecOperatorFactory {
    kind: OperatorKind,
    p: ExpressionParams,
}

impl IncDecOperatorFactory {
    pub fn new(kind: OperatorKind, p: ExpressionParams) -> Self {
        Self { kind, p }
    }
}

impl OperatorFactory for IncDecOperatorFactory {
    fn kind(&self) -> OperatorKind {
        self.kind
    }

    fn params(&self) -> &ExpressionParams {
        &self.p
    }

    fn is_applicable(&self, result_type: &Type) -> bool {
        result_type.is_numeric()
    }
}

impl UnaryOperatorFactory for IncDecOperatorFactory {
    fn generate_type(&self, _ctx: &mut GenContext) -> ProductionResult<Type> {
        Ok(self.p.result_type.clone())
    }

    fn produce_operand(
        &self,
        ctx: &mut GenContext,
        ty: Type,
        complexity_limit: u64,
        operator_limit: u64,
    ) -> ProductionResult<IrNode> {
        self.p
            .builder()
            .result_type(ty)
            .complexity_limit(complexity_limit)
            .operator_limit(operator_limit)
            .assignable(true)
            .variable_factory()?
            .produce(ctx)
    }
}

operator_production!(IncDecOperatorFactory, produce_unary);
