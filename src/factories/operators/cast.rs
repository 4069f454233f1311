use crate::builder::ExpressionParams;
use crate::context::GenContext;
use crate::error::{ensure, ProductionError, ProductionResult};
use crate::ir::{CastOperator, IrNode};
use crate::rule::{Factory, SafeFactory};
use crate::types::util::get_explicitly_castable;
use crate::types::Type;

/// `(T) e` where `e` has a different type that casts explicitly to `T`.
/// Reference casts can fail at runtime, so exception-safe contexts only
/// cast between built-ins.
#[derive(Debug, Clone)]
pub struct CastOperatorFactory {
    p: ExpressionParams,
}

impl CastOperatorFactory {
    pub fn new(p: ExpressionParams) -> Self {
        Self { p }
    }
}

impl SafeFactory<IrNode> for CastOperatorFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        let p = &self.p;
        ensure(p.operator_limit > 0, "cast: no operators left")?;
        ensure(p.complexity_limit >= 2, "cast: complexity too small")?;
        ensure(
            !(p.exception_safe && !p.result_type.is_builtin()),
            "cast: reference cast may throw",
        )?;
        let candidates: Vec<Type> =
            get_explicitly_castable(&ctx.types.get_all(), &p.result_type, &ctx.types)
                .into_iter()
                .filter(|t| *t != p.result_type)
                .collect();
        let from = ctx
            .rng
            .random_element(&candidates)
            .cloned()
            .ok_or_else(|| ProductionError::failed("cast: no castable type"))?;
        let expr = p
            .builder()
            .result_type(from)
            .complexity_limit(p.complexity_limit - 1)
            .operator_limit(p.operator_limit - 1)
            .expression_factory()?
            .produce(ctx)?;
        Ok(IrNode::Cast(CastOperator {
            ty: p.result_type.clone(),
            expr: Box::new(expr),
        }))
    }
}
