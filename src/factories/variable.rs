//! Variable references: locals, static fields and instance fields.

use crate::builder::ExpressionParams;
use crate::context::GenContext;
use crate::error::{ensure, ProductionError, ProductionResult};
use crate::factories::is_visible_from;
use crate::ir::{IrNode, Variable, VariableAccess};
use crate::rule::{Factory, Rule, SafeFactory};
use crate::symbols::{Symbol, SymbolKind, VariableInfo};

/// Variable of exactly the requested type, from any of the three sources.
pub struct VariableFactory {
    rule: Rule<IrNode>,
}

impl VariableFactory {
    pub fn new(p: ExpressionParams, assignable: bool) -> Self {
        let mut rule = Rule::new("variable");
        rule.add(
            "local",
            LocalVariableFactory {
                p: p.clone(),
                assignable,
            },
        )
        .add(
            "static_member",
            StaticMemberVariableFactory {
                p: p.clone(),
                assignable,
            },
        )
        .add("non_static_member", NonStaticMemberVariableFactory { p, assignable });
        Self { rule }
    }
}

impl SafeFactory<IrNode> for VariableFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        self.rule.sproduce(ctx)
    }
}

fn fits(info: &VariableInfo, p: &ExpressionParams, assignable: bool) -> bool {
    info.ty == p.result_type && (!assignable || info.is_assignable())
}

/// Pick one candidate at random and clone it out of the table borrow.
fn pick(ctx: &mut GenContext, candidates: Vec<VariableInfo>, what: &'static str) -> ProductionResult<VariableInfo> {
    ctx.rng
        .random_element(&candidates)
        .cloned()
        .ok_or_else(|| ProductionError::failed(what))
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

struct LocalVariableFactory {
    p: ExpressionParams,
    assignable: bool,
}

impl SafeFactory<IrNode> for LocalVariableFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        ensure(self.p.complexity_limit >= 1, "local: no complexity left")?;
        let candidates: Vec<VariableInfo> = ctx
            .symbols
            .get_variables(&self.p.owner)
            .into_iter()
            .filter(|v| v.is_local() && fits(v, &self.p, self.assignable))
            .cloned()
            .collect();
        let info = pick(ctx, candidates, "local: no candidate")?;
        Ok(IrNode::Variable(Variable::local(info)))
    }
}

/// Static fields, always qualified with their owner.
struct StaticMemberVariableFactory {
    p: ExpressionParams,
    assignable: bool,
}

impl SafeFactory<IrNode> for StaticMemberVariableFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        ensure(self.p.complexity_limit >= 1, "static member: no complexity left")?;
        let candidates: Vec<VariableInfo> = ctx
            .symbols
            .get_all(SymbolKind::Variable)
            .into_iter()
            .filter(|s| is_visible_from(ctx, &self.p.owner, s))
            .filter_map(Symbol::as_variable)
            .filter(|v| !v.is_local() && v.is_static() && fits(v, &self.p, self.assignable))
            .cloned()
            .collect();
        let info = pick(ctx, candidates, "static member: no candidate")?;
        Ok(IrNode::Variable(Variable {
            info,
            access: VariableAccess::Static,
        }))
    }
}

/// Instance fields reached through an object expression. Member access
/// counts as one operator so that chains like `a.b.c` stay bounded.
struct NonStaticMemberVariableFactory {
    p: ExpressionParams,
    assignable: bool,
}

impl SafeFactory<IrNode> for NonStaticMemberVariableFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        let p = &self.p;
        ensure(p.complexity_limit >= 2, "non-static member: no complexity left")?;
        ensure(p.operator_limit >= 1, "non-static member: no operator left")?;
        let candidates: Vec<VariableInfo> = ctx
            .symbols
            .get_all(SymbolKind::Variable)
            .into_iter()
            .filter(|s| is_visible_from(ctx, &p.owner, s))
            .filter_map(Symbol::as_variable)
            .filter(|v| !v.is_local() && !v.is_static() && fits(v, p, self.assignable))
            .cloned()
            .collect();
        let info = pick(ctx, candidates, "non-static member: no candidate")?;
        let object = if p.exception_safe {
            // Only `this` is known to be non-null.
            let this = ctx
                .symbols
                .get_variables(&p.owner)
                .into_iter()
                .find(|v| v.is_this() && v.ty == info.owner)
                .cloned()
                .ok_or_else(|| ProductionError::failed("non-static member: no safe receiver"))?;
            IrNode::Variable(Variable::local(this))
        } else {
            p.builder()
                .result_type(info.owner.clone())
                .complexity_limit(p.complexity_limit - 1)
                .operator_limit(p.operator_limit - 1)
                .no_consts(true)
                .expression_factory()?
                .produce(ctx)?
        };
        Ok(IrNode::Variable(Variable {
            info,
            access: VariableAccess::NonStatic {
                object: Box::new(object),
            },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IrNodeBuilder;
    use crate::ir::Node;
    use crate::params::ProductionParams;
    use crate::symbols::SymbolFlags;
    use crate::types::{KlassFlags, KlassInfo, Type, OBJECT};

    fn ctx() -> GenContext {
        let mut ctx = GenContext::new(17, ProductionParams::small());
        for name in ["Test", "Other"] {
            ctx.types
                .add_klass(KlassInfo::new(name, Some(OBJECT.to_string()), KlassFlags::empty()));
        }
        ctx
    }

    fn request(ty: Type) -> IrNodeBuilder {
        IrNodeBuilder::new()
            .owner(Type::klass("Test"))
            .result_type(ty)
            .complexity_limit(20)
            .operator_limit(2)
    }

    #[test]
    fn assignable_mode_skips_final_and_this() {
        let mut ctx = ctx();
        let owner = Type::klass("Test");
        ctx.symbols.add(VariableInfo::this(owner.clone()));
        ctx.symbols.add(VariableInfo::new(
            "var_1",
            owner.clone(),
            Type::INT,
            SymbolFlags::LOCAL | SymbolFlags::FINAL | SymbolFlags::INITIALIZED,
        ));
        let err = request(owner.clone())
            .assignable(true)
            .variable_factory()
            .expect("params")
            .produce(&mut ctx);
        assert!(err.is_err());
        let err = request(Type::INT)
            .assignable(true)
            .variable_factory()
            .expect("params")
            .produce(&mut ctx);
        assert!(err.is_err());
        let node = request(Type::INT)
            .variable_factory()
            .expect("params")
            .produce(&mut ctx)
            .expect("final local is readable");
        assert!(matches!(node, IrNode::Variable(Variable { access: VariableAccess::Local, .. })));
    }

    #[test]
    fn private_fields_of_other_klasses_are_hidden() {
        let mut ctx = ctx();
        ctx.symbols.add(VariableInfo::new(
            "var_1",
            Type::klass("Other"),
            Type::LONG,
            SymbolFlags::STATIC | SymbolFlags::PRIVATE | SymbolFlags::INITIALIZED,
        ));
        let factory = request(Type::LONG).variable_factory().expect("params");
        assert!(factory.produce(&mut ctx).is_err());

        ctx.symbols.add(VariableInfo::new(
            "var_2",
            Type::klass("Other"),
            Type::LONG,
            SymbolFlags::STATIC | SymbolFlags::PUBLIC | SymbolFlags::INITIALIZED,
        ));
        let node = factory.produce(&mut ctx).expect("public static field");
        let IrNode::Variable(v) = node else {
            panic!("expected variable");
        };
        assert_eq!(v.info.name, "var_2");
        assert_eq!(v.access, VariableAccess::Static);
    }

    #[test]
    fn external_symbols_can_be_disabled() {
        let mut ctx = ctx();
        ctx.params.disable_external_symbols = true;
        ctx.symbols.add(VariableInfo::new(
            "var_1",
            Type::klass("Other"),
            Type::LONG,
            SymbolFlags::STATIC | SymbolFlags::PUBLIC,
        ));
        let factory = request(Type::LONG).variable_factory().expect("params");
        assert!(factory.produce(&mut ctx).is_err());
    }

    #[test]
    fn instance_field_goes_through_an_object() {
        let mut ctx = ctx();
        let owner = Type::klass("Test");
        ctx.symbols.add(VariableInfo::this(owner.clone()));
        ctx.symbols
            .add(VariableInfo::new("var_1", owner.clone(), Type::DOUBLE, SymbolFlags::PUBLIC));
        let node = request(Type::DOUBLE)
            .exception_safe(true)
            .variable_factory()
            .expect("params")
            .produce(&mut ctx)
            .expect("this.var_1");
        let IrNode::Variable(Variable {
            access: VariableAccess::NonStatic { object },
            ..
        }) = &node
        else {
            panic!("expected member access, got {node:?}");
        };
        assert_eq!(object.result_type(), Some(&owner));
        assert_eq!(node.complexity(), 2);
    }
}
