use super::{numeric_types, operator_production, promoted_pair, BinaryOperatorFactory, OperatorFactory};
use crate::builder::ExpressionParams;
use crate::context::GenContext;
use crate::error::{ProductionError, ProductionResult};
use crate::ir::OperatorKind;
use crate::types::{BuiltInType, Type};

fn pick(ctx: &mut GenContext, candidates: &[Type]) -> ProductionResult<Type> {
    ctx.rng
        .random_element(candidates)
        .cloned()
        .ok_or_else(|| ProductionError::failed("operator: no operand types"))
}

macro_rules! binary_family {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name {
            kind: OperatorKind,
            p: ExpressionParams,
        }

        impl $name {
            pub fn new(kind: OperatorKind, p: ExpressionParams) -> Self {
                Self { kind, p }
            }
        }

        operator_production!($name, produce_binary);
    };
}

binary_family!(
    /// `+ - * / %` over int, long, float and double.
    ArithmeticOperatorFactory
);
binary_family!(
    /// `& | ^` over int, long and boolean.
    BitwiseOperatorFactory
);
binary_family!(
    /// `<< >> >>>`. The result type is the promoted left operand.
    ShiftOperatorFactory
);
binary_family!(
    /// `< <= > >=` over any two numeric operands.
    ComparisonOperatorFactory
);
binary_family!(
    /// `== !=` over two numerics or two booleans.
    EqualityOperatorFactory
);
binary_family!(
    /// `&& ||`.
    LogicOperatorFactory
);

// -- Arithmetic ---------------------------------------------------------------

impl OperatorFactory for ArithmeticOperatorFactory {
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

impl BinaryOperatorFactory for ArithmeticOperatorFactory {
    fn generate_types(&self, ctx: &mut GenContext) -> ProductionResult<(Type, Type)> {
        let result = self
            .p
            .result_type
            .as_builtin()
            .ok_or_else(|| ProductionError::failed("arithmetic: reference result"))?;
        promoted_pair(ctx, result)
    }
}

// -- Bitwise ------------------------------------------------------------------

impl OperatorFactory for BitwiseOperatorFactory {
    fn kind(&self) -> OperatorKind {
        self.kind
    }

    fn params(&self) -> &ExpressionParams {
        &self.p
    }

    fn is_applicable(&self, result_type: &Type) -> bool {
        matches!(
            result_type.as_builtin(),
            Some(BuiltInType::Int | BuiltInType::Long | BuiltInType::Boolean)
        )
    }
}

impl BinaryOperatorFactory for BitwiseOperatorFactory {
    fn generate_types(&self, ctx: &mut GenContext) -> ProductionResult<(Type, Type)> {
        match self.p.result_type.as_builtin() {
            Some(BuiltInType::Boolean) => Ok((Type::BOOLEAN, Type::BOOLEAN)),
            Some(result) => promoted_pair(ctx, result),
            None => Err(ProductionError::failed("bitwise: reference result")),
        }
    }
}

// -- Shift --------------------------------------------------------------------

impl OperatorFactory for ShiftOperatorFactory {
    fn kind(&self) -> OperatorKind {
        self.kind
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

impl BinaryOperatorFactory for ShiftOperatorFactory {
    fn generate_types(&self, ctx: &mut GenContext) -> ProductionResult<(Type, Type)> {
        let result = self.p.result_type.as_builtin();
        let lefts: Vec<Type> = ctx
            .types
            .get_builtin_int()
            .into_iter()
            .filter(|t| t.as_builtin().map(BuiltInType::unary_promoted) == result)
            .collect();
        let left = pick(ctx, &lefts)?;
        let integral = ctx.types.get_builtin_int();
        let right = pick(ctx, &integral)?;
        Ok((left, right))
    }
}

// -- Comparison and equality --------------------------------------------------

impl OperatorFactory for ComparisonOperatorFactory {
    fn kind(&self) -> OperatorKind {
        self.kind
    }

    fn params(&self) -> &ExpressionParams {
        &self.p
    }

    fn is_applicable(&self, result_type: &Type) -> bool {
        *result_type == Type::BOOLEAN
    }
}

impl BinaryOperatorFactory for ComparisonOperatorFactory {
    fn generate_types(&self, ctx: &mut GenContext) -> ProductionResult<(Type, Type)> {
        let numeric = numeric_types();
        Ok((pick(ctx, &numeric)?, pick(ctx, &numeric)?))
    }
}

impl OperatorFactory for EqualityOperatorFactory {
    fn kind(&self) -> OperatorKind {
        self.kind
    }

    fn params(&self) -> &ExpressionParams {
        &self.p
    }

    fn is_applicable(&self, result_type: &Type) -> bool {
        *result_type == Type::BOOLEAN
    }
}

impl BinaryOperatorFactory for EqualityOperatorFactory {
    fn generate_types(&self, ctx: &mut GenContext) -> ProductionResult<(Type, Type)> {
        if ctx.rng.random_boolean_with(0.25) {
            return Ok((Type::BOOLEAN, Type::BOOLEAN));
        }
        let numeric = numeric_types();
        Ok((pick(ctx, &numeric)?, pick(ctx, &numeric)?))
    }
}

// -- Logic --------------------------------------------------------------------

impl OperatorFactory for LogicOperatorFactory {
    fn kind(&self) -> OperatorKind {
        self.kind
    }

    fn params(&self) -> &ExpressionParams {
        &self.p
    }

    fn is_applicable(&self, result_type: &Type) -> bool {
        *result_type == Type::BOOLEAN
    }
}

impl BinaryOperatorFactory for LogicOperatorFactory {
    fn generate_types(&self, _ctx: &mut GenContext) -> ProductionResult<(Type, Type)> {
        Ok((Type::BOOLEAN, Type::BOOLEAN))
    }
}

// -- String concatenation -----------------------------------------------------

/// `String + x` or `x + String` where `x` is a built-in or a string.
#[derive(Debug, Clone)]
pub struct StringPlusFactory {
    p: ExpressionParams,
}

impl StringPlusFactory {
    pub fn new(p: ExpressionParams) -> Self {
        Self { p }
    }
}

impl OperatorFactory for StringPlusFactory {
    fn kind(&self) -> OperatorKind {
        OperatorKind::StringAdd
    }

    fn params(&self) -> &ExpressionParams {
        &self.p
    }

    fn is_applicable(&self, result_type: &Type) -> bool {
        result_type.is_string()
    }
}

impl BinaryOperatorFactory for StringPlusFactory {
    fn generate_types(&self, ctx: &mut GenContext) -> ProductionResult<(Type, Type)> {
        let mut values = ctx.types.get_builtin();
        values.push(Type::string());
        let other = pick(ctx, &values)?;
        Ok(if ctx.rng.random_boolean() {
            (Type::string(), other)
        } else {
            (other, Type::string())
        })
    }
}

operator_production!(StringPlusFactory, produce_binary);
