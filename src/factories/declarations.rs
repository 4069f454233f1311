//! Variable declarations: locals, data members and arguments.
//!
//! A declared variable enters the symbol table only after its initializer
//! has been produced, so `int var_3 = var_3 + 1;` can never be generated.

use crate::builder::DeclarationParams;
use crate::context::GenContext;
use crate::error::{ensure, ProductionResult};
use crate::factories::{random_access, random_value_type};
use crate::ir::{
    ArgumentDeclaration, IrNode, Node, VariableDeclaration, VariableDeclarationBlock,
    VariableInitialization,
};
use crate::rule::{BudgetSplitter, Factory, Rule, SafeFactory};
use crate::symbols::{SymbolFlags, VariableInfo};
use crate::types::Type;

const FINAL_PROBABILITY: f64 = 0.3;

fn final_flag(ctx: &mut GenContext) -> SymbolFlags {
    if !ctx.params.disable_final_variables && ctx.rng.random_boolean_with(FINAL_PROBABILITY) {
        SymbolFlags::FINAL
    } else {
        SymbolFlags::empty()
    }
}

/// Flags of a new variable, `FINAL` excluded.
fn base_flags(p: &DeclarationParams, ctx: &mut GenContext) -> SymbolFlags {
    if p.is_local {
        return SymbolFlags::LOCAL;
    }
    let mut flags = random_access(ctx);
    if p.is_static {
        flags |= SymbolFlags::STATIC;
    }
    flags
}

/// Local variable or data member, with or without an initializer.
pub struct DeclarationFactory {
    rule: Rule<IrNode>,
}

impl DeclarationFactory {
    pub fn new(p: DeclarationParams) -> Self {
        let mut rule = Rule::new("declaration");
        if !p.is_local {
            rule.add("declaration", VariableDeclarationFactory::new(p.clone()));
        }
        rule.add("initialization", VariableInitializationFactory::new(p));
        Self { rule }
    }
}

impl SafeFactory<IrNode> for DeclarationFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        self.rule.sproduce(ctx)
    }
}

/// Data member without an initializer. Java gives it the default value,
/// and it is never final.
#[derive(Debug, Clone)]
pub struct VariableDeclarationFactory {
    p: DeclarationParams,
}

impl VariableDeclarationFactory {
    pub fn new(p: DeclarationParams) -> Self {
        Self { p }
    }
}

impl SafeFactory<IrNode> for VariableDeclarationFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        let p = &self.p;
        ensure(!p.is_local, "declaration: locals are always initialized")?;
        ensure(p.complexity_limit > 0, "declaration: no complexity left")?;
        let ty = random_value_type(ctx, true)?;
        let flags = base_flags(p, ctx) | SymbolFlags::INITIALIZED;
        let name = ctx.next_variable_name();
        let variable = VariableInfo::new(name, p.owner.clone(), ty, flags);
        ctx.symbols.add(variable.clone());
        Ok(IrNode::Declaration(VariableDeclaration { variable }))
    }
}

/// `T name = init;`
#[derive(Debug, Clone)]
pub struct VariableInitializationFactory {
    p: DeclarationParams,
}

impl VariableInitializationFactory {
    pub fn new(p: DeclarationParams) -> Self {
        Self { p }
    }
}

impl SafeFactory<IrNode> for VariableInitializationFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        let p = &self.p;
        ensure(p.complexity_limit >= 2, "initialization: no complexity left")?;
        let ty = random_value_type(ctx, true)?;
        let init = p
            .builder()
            .result_type(ty.clone())
            .complexity_limit(p.complexity_limit - 1)
            .expression_factory()?
            .produce(ctx)?;
        let flags = base_flags(p, ctx) | final_flag(ctx) | SymbolFlags::INITIALIZED;
        let name = ctx.next_variable_name();
        let variable = VariableInfo::new(name, p.owner.clone(), ty, flags);
        ctx.symbols.add(variable.clone());
        Ok(IrNode::Initialization(VariableInitialization {
            variable,
            init: Box::new(init),
        }))
    }
}

/// Data members of a klass. Each member may be static unless statics are
/// disabled. Members that fail to generate are skipped.
#[derive(Debug, Clone)]
pub struct VariableDeclarationBlockFactory {
    p: DeclarationParams,
    member_limit: u64,
}

impl VariableDeclarationBlockFactory {
    pub fn new(p: DeclarationParams, member_limit: u64) -> Self {
        Self { p, member_limit }
    }
}

impl SafeFactory<VariableDeclarationBlock> for VariableDeclarationBlockFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<VariableDeclarationBlock> {
        let p = &self.p;
        let count = ctx.rng.random_not_negative(self.member_limit + 1);
        let mut budget = BudgetSplitter::new(p.complexity_limit);
        let mut block = VariableDeclarationBlock::default();
        for _ in 0..count {
            if budget.is_exhausted() {
                break;
            }
            let share = budget.take(&mut ctx.rng);
            let is_static = !ctx.params.disable_static && ctx.rng.random_boolean();
            let factory = p
                .builder()
                .complexity_limit(share)
                .is_local(false)
                .is_static(is_static)
                .declaration_factory()?;
            match factory.produce(ctx) {
                Ok(member) => {
                    budget.refund(share.saturating_sub(member.complexity()));
                    block.declarations.push(member);
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(_) => budget.refund(share),
            }
        }
        Ok(block)
    }
}

/// One formal parameter. Arguments are always initialized by the caller
/// and may be final.
#[derive(Debug, Clone)]
pub struct ArgumentDeclarationFactory {
    owner: Type,
}

impl ArgumentDeclarationFactory {
    pub fn new(owner: Type) -> Self {
        Self { owner }
    }
}

impl SafeFactory<ArgumentDeclaration> for ArgumentDeclarationFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<ArgumentDeclaration> {
        let ty = random_value_type(ctx, true)?;
        let flags = SymbolFlags::LOCAL | SymbolFlags::INITIALIZED | final_flag(ctx);
        let name = ctx.next_variable_name();
        Ok(ArgumentDeclaration {
            variable: VariableInfo::new(name, self.owner.clone(), ty, flags),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IrNodeBuilder;
    use crate::params::ProductionParams;

    fn owner() -> Type {
        Type::klass("Test")
    }

    fn builder() -> IrNodeBuilder {
        IrNodeBuilder::new()
            .owner(owner())
            .complexity_limit(30)
            .operator_limit(2)
    }

    #[test]
    fn locals_are_initialized_and_registered_after_their_initializer() {
        for seed in 0..30 {
            let mut ctx = GenContext::new(seed, ProductionParams::small());
            let node = builder()
                .is_local(true)
                .declaration_factory()
                .expect("params")
                .produce(&mut ctx)
                .expect("literal initializers always work");
            let IrNode::Initialization(init) = &node else {
                panic!("locals are always initialized: {node:?}");
            };
            assert!(init.variable.is_local());
            let mut mentions_itself = false;
            walk(&init.init, &mut |n| {
                if let IrNode::Variable(v) = n {
                    mentions_itself |= v.info.name == init.variable.name;
                }
            });
            assert!(!mentions_itself);
            assert!(ctx.symbols.get_variables(&owner()).contains(&&init.variable));
        }
    }

    fn walk(node: &IrNode, f: &mut dyn FnMut(&IrNode)) {
        f(node);
        node.for_each_expr_child(&mut |child| walk(child, f));
    }

    #[test]
    fn final_fields_always_have_an_initializer() {
        for seed in 0..60 {
            let mut ctx = GenContext::new(seed, ProductionParams::small());
            let block = builder()
                .member_limit(4)
                .variable_declaration_block_factory()
                .expect("params")
                .produce(&mut ctx)
                .expect("block never fails");
            for member in &block.declarations {
                if let IrNode::Declaration(d) = member {
                    assert!(!d.variable.is_final());
                    assert!(!d.variable.is_local());
                }
            }
            assert!(block.complexity() <= 30);
        }
    }

    #[test]
    fn disabled_statics_and_finals_stay_off() {
        let params = ProductionParams {
            disable_static: true,
            disable_final_variables: true,
            ..ProductionParams::small()
        };
        for seed in 0..30 {
            let mut ctx = GenContext::new(seed, params.clone());
            let block = builder()
                .member_limit(4)
                .variable_declaration_block_factory()
                .expect("params")
                .produce(&mut ctx)
                .expect("block never fails");
            for member in &block.declarations {
                let v = match member {
                    IrNode::Declaration(d) => &d.variable,
                    IrNode::Initialization(i) => &i.variable,
                    other => panic!("unexpected member {other:?}"),
                };
                assert!(!v.is_static() && !v.is_final());
            }
        }
    }

    #[test]
    fn arguments_are_local_and_initialized() {
        let mut ctx = GenContext::new(5, ProductionParams::small());
        let arg = builder()
            .argument_declaration_factory()
            .expect("params")
            .produce(&mut ctx)
            .expect("argument");
        assert!(arg.variable.is_local());
        assert!(arg.variable.flags.contains(SymbolFlags::INITIALIZED));
        assert!(!arg.variable.ty.is_void());
    }
}
