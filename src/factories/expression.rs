//! Root expression nonterminal.

use crate::builder::ExpressionParams;
use crate::context::GenContext;
use crate::error::{ensure, ProductionResult};
use crate::factories::operators::{
    arithmetic_rule, assignment_rule, bitwise_rule, logic_rule, CastOperatorFactory,
    StringPlusFactory, TernaryOperatorFactory,
};
use crate::ir::{IrNode, Node};
use crate::rule::{Factory, Rule, SafeFactory};

pub const CAST_WEIGHT: f64 = 0.1;
pub const FUNCTION_CALL_WEIGHT: f64 = 0.1;
const ARRAY_WEIGHT: f64 = 0.3;

/// Any expression of the requested type.
#[derive(Debug, Clone)]
pub struct ExpressionFactory {
    p: ExpressionParams,
}

impl ExpressionFactory {
    pub fn new(p: ExpressionParams) -> Self {
        Self { p }
    }

    fn rule(&self, ctx: &GenContext) -> ProductionResult<Rule<IrNode>> {
        let p = &self.p;
        let builder = p.builder();
        let mut rule = Rule::new("expression");
        if !p.no_consts {
            rule.add("literal", builder.literal_factory()?);
        }
        rule.add("variable", builder.variable_factory()?);
        if p.operator_limit == 0 {
            return Ok(rule);
        }
        rule.add("arithmetic", arithmetic_rule(p))
            .add("logic", logic_rule(p))
            .add("bitwise", bitwise_rule(p))
            .add("ternary", TernaryOperatorFactory::new(p.clone()))
            .add("string_plus", StringPlusFactory::new(p.clone()))
            .add_weighted("cast", CAST_WEIGHT, CastOperatorFactory::new(p.clone()));
        if !p.no_side_effects {
            rule.add("assignment", assignment_rule(p));
            if !p.exception_safe {
                rule.add_weighted(
                    "function_call",
                    FUNCTION_CALL_WEIGHT,
                    builder.function_call_factory()?,
                );
                if !ctx.params.disable_arrays {
                    rule.add_weighted("array_creation", ARRAY_WEIGHT, builder.array_creation_factory()?)
                        .add_weighted("array_element", ARRAY_WEIGHT, builder.array_element_factory()?)
                        .add_weighted(
                            "array_extraction",
                            ARRAY_WEIGHT,
                            builder.array_extraction_factory()?,
                        );
                }
            }
        }
        Ok(rule)
    }
}

impl SafeFactory<IrNode> for ExpressionFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        ensure(self.p.complexity_limit > 0, "expression: no complexity left")?;
        let node = self.rule(ctx)?.produce(ctx)?;
        ensure(
            node.complexity() <= self.p.complexity_limit,
            "expression: over complexity budget",
        )?;
        Ok(node)
    }
}

/// Side-effect free expression: no assignment, inc/dec, call or array.
/// Used where evaluation order or repetition must not matter, such as loop
/// conditions and switch selectors.
#[derive(Debug, Clone)]
pub struct LimitedExpressionFactory {
    inner: ExpressionFactory,
}

impl LimitedExpressionFactory {
    pub fn new(mut p: ExpressionParams) -> Self {
        p.no_side_effects = true;
        Self {
            inner: ExpressionFactory::new(p),
        }
    }
}

impl SafeFactory<IrNode> for LimitedExpressionFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        self.inner.sproduce(ctx)
    }
}

/// Whether `node` assigns, calls or touches arrays anywhere below it.
pub fn has_side_effects(node: &IrNode) -> bool {
    let here = match node {
        IrNode::Binary(b) => b.kind.has_side_effect(),
        IrNode::Unary(u) => u.kind.has_side_effect(),
        IrNode::Call(_)
        | IrNode::ArrayCreation(_)
        | IrNode::ArrayElement(_)
        | IrNode::ArrayExtraction(_) => true,
        _ => false,
    };
    let mut below = false;
    node.for_each_expr_child(&mut |child| below |= has_side_effects(child));
    here || below
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IrNodeBuilder;
    use crate::params::ProductionParams;
    use crate::symbols::{SymbolFlags, VariableInfo};
    use crate::types::Type;

    fn owner() -> Type {
        Type::klass("Test")
    }

    fn ctx_with_locals(seed: u64) -> GenContext {
        let mut ctx = GenContext::new(seed, ProductionParams::small());
        for ty in [Type::INT, Type::LONG, Type::BOOLEAN, Type::DOUBLE, Type::CHAR] {
            let name = ctx.next_variable_name();
            ctx.symbols.add(VariableInfo::new(
                name,
                owner(),
                ty,
                SymbolFlags::LOCAL | SymbolFlags::INITIALIZED,
            ));
        }
        ctx
    }

    fn builder(ty: Type) -> IrNodeBuilder {
        IrNodeBuilder::new()
            .owner(owner())
            .result_type(ty)
            .complexity_limit(200)
            .operator_limit(4)
    }

    #[test]
    fn expression_has_requested_type_and_budget() {
        for seed in 0..40 {
            let mut ctx = ctx_with_locals(seed);
            for ty in [Type::INT, Type::BOOLEAN, Type::LONG, Type::string()] {
                let factory = builder(ty.clone()).expression_factory().expect("params");
                let Ok(node) = factory.produce(&mut ctx) else {
                    continue;
                };
                assert_eq!(node.result_type(), Some(&ty), "seed {seed}: {node:?}");
                assert!(node.complexity() <= 200);
                assert_eq!(ctx.symbols.depth(), 1);
            }
        }
    }

    #[test]
    fn limited_expression_never_has_side_effects() {
        for seed in 0..60 {
            let mut ctx = ctx_with_locals(seed);
            let factory = builder(Type::BOOLEAN)
                .limited_expression_factory()
                .expect("params");
            if let Ok(node) = factory.produce(&mut ctx) {
                assert!(!has_side_effects(&node), "seed {seed}: {node:?}");
            }
        }
    }

    #[test]
    fn no_consts_root_is_never_a_literal() {
        for seed in 0..40 {
            let mut ctx = ctx_with_locals(seed);
            let factory = builder(Type::INT)
                .no_consts(true)
                .operator_limit(0)
                .expression_factory()
                .expect("params");
            let node = factory.produce(&mut ctx).expect("an int local exists");
            assert!(matches!(node, IrNode::Variable(_)), "{node:?}");
        }
    }

    #[test]
    fn zero_operators_gives_a_leaf() {
        let mut ctx = ctx_with_locals(1);
        for _ in 0..20 {
            let node = builder(Type::LONG)
                .operator_limit(0)
                .expression_factory()
                .expect("params")
                .produce(&mut ctx)
                .expect("literal or variable");
            assert!(matches!(node, IrNode::Literal(_) | IrNode::Variable(_)));
        }
    }
}
