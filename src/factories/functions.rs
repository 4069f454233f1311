//! Methods, constructors and static initializers.
//!
//! A function is registered `NONRECURSIVE` before its body is generated and
//! re-registered with the body's complexity afterwards, so no body can call
//! the function it belongs to. Arguments and `this` live only in the body's
//! scope.
//!
//! Overrides need more: a call through an inherited method may dispatch
//! back into the override being generated. While an override body is
//! generated, every function of its klass and of the klass's ancestors is
//! shadowed by a `NONRECURSIVE` copy.

use tracing::debug;

use crate::builder::FunctionParams;
use crate::context::GenContext;
use crate::error::{ensure, ProductionError, ProductionResult};
use crate::factories::{random_access, random_value_type};
use crate::ir::{
    ArgumentDeclaration, Block, ConstructorDefinition, ConstructorDefinitionBlock,
    FunctionDeclaration, FunctionDeclarationBlock, FunctionDefinition, FunctionDefinitionBlock,
    FunctionRedefinition, FunctionRedefinitionBlock, Node, StaticConstructorDefinition,
};
use crate::rule::{BudgetSplitter, Factory, SafeFactory};
use crate::symbols::{FunctionInfo, Symbol, SymbolFlags, VariableInfo};
use crate::types::Type;

const VOID_PROBABILITY: f64 = 0.3;
const STATIC_PROBABILITY: f64 = 0.2;
const FINAL_PROBABILITY: f64 = 0.2;
const SYNCHRONIZED_PROBABILITY: f64 = 0.1;
/// Smallest `return e;`.
const RETURN_RESERVE: u64 = 2;

fn result_type(ctx: &mut GenContext) -> ProductionResult<Type> {
    if ctx.rng.random_boolean_with(VOID_PROBABILITY) {
        Ok(Type::VOID)
    } else {
        random_value_type(ctx, true)
    }
}

/// Public, protected or package-private.
fn overridable_access(ctx: &mut GenContext) -> SymbolFlags {
    match ctx.rng.random_not_negative(3) {
        0 => SymbolFlags::PUBLIC,
        1 => SymbolFlags::PROTECTED,
        _ => SymbolFlags::empty(),
    }
}

fn synchronized(ctx: &mut GenContext) -> SymbolFlags {
    if ctx.rng.random_boolean_with(SYNCHRONIZED_PROBABILITY) {
        SymbolFlags::SYNCHRONIZED
    } else {
        SymbolFlags::empty()
    }
}

fn arguments(p: &FunctionParams, ctx: &mut GenContext) -> ProductionResult<Vec<ArgumentDeclaration>> {
    let count = ctx
        .rng
        .random_not_negative(ctx.params.member_functions_arg_limit + 1);
    let factory = p.builder().argument_declaration_factory()?;
    (0..count).map(|_| factory.produce(ctx)).collect()
}

/// Declared argument list: the receiver first unless `this` is `None`.
fn signature(this: Option<&Type>, args: &[ArgumentDeclaration]) -> Vec<VariableInfo> {
    this.map(|owner| VariableInfo::this(owner.clone()))
        .into_iter()
        .chain(args.iter().map(|a| a.variable.clone()))
        .collect()
}

/// Swap the pending registration of `info` for the finished one.
fn finish_registration(ctx: &mut GenContext, mut info: FunctionInfo, complexity: u64) -> FunctionInfo {
    ctx.symbols.remove(&Symbol::Function(info.clone()));
    info.flags.remove(SymbolFlags::NONRECURSIVE);
    info.complexity = complexity;
    ctx.symbols.add(info.clone());
    info
}

/// What a body may see and must produce.
struct BodyShape<'a> {
    this: Option<&'a Type>,
    args: &'a [ArgumentDeclaration],
    result: Type,
    can_have_returns: bool,
    shadows: Vec<FunctionInfo>,
}

/// Function body. A non-void body that can fall off its end gets a final
/// `return`.
fn body(
    p: &FunctionParams,
    ctx: &mut GenContext,
    complexity_limit: u64,
    shape: BodyShape<'_>,
) -> ProductionResult<Block> {
    let reserve = if shape.result.is_void() { 0 } else { RETURN_RESERVE };
    ensure(complexity_limit > reserve, "function: complexity too small for a body")?;
    ctx.scoped(|ctx| {
        for shadow in shape.shadows {
            ctx.symbols.add(shadow);
        }
        if let Some(owner) = shape.this {
            ctx.symbols.add(VariableInfo::this(owner.clone()));
        }
        for arg in shape.args {
            ctx.symbols.add(arg.variable.clone());
        }
        let builder = p
            .builder()
            .result_type(shape.result.clone())
            .level(p.level + 1)
            .can_have_returns(shape.can_have_returns);
        let mut budget = BudgetSplitter::new(complexity_limit);
        let share = budget.take_leaving(&mut ctx.rng, reserve);
        let mut block = builder
            .clone()
            .complexity_limit(share)
            .block_factory()?
            .produce(ctx)?;
        budget.refund(share - block.complexity().min(share));
        if !shape.result.is_void() && block.completes_normally() {
            let ret = builder
                .complexity_limit(budget.take_rest())
                .can_have_returns(true)
                .return_factory()?
                .produce(ctx)?;
            block.children.push(ret);
        }
        Ok(block)
    })
}

/// `NONRECURSIVE` copies of every function of `owner` and its ancestors.
fn dispatch_shadows(ctx: &GenContext, owner: &Type) -> Vec<FunctionInfo> {
    let mut chain = vec![owner.clone()];
    if let Some(name) = owner.klass_name() {
        chain.extend(ctx.types.ancestors(name).into_iter().map(Type::Klass));
    }
    chain
        .iter()
        .flat_map(|klass| ctx.symbols.get_functions(klass))
        .map(|f| {
            let mut shadow = f.clone();
            shadow.flags |= SymbolFlags::NONRECURSIVE;
            shadow
        })
        .collect()
}

/// Produces up to `count` members from random shares of `complexity`.
/// Members that fail are skipped and their share is returned.
fn partitioned<T: Node>(
    ctx: &mut GenContext,
    complexity: u64,
    count: u64,
    mut make: impl FnMut(&mut GenContext, u64, u64) -> ProductionResult<T>,
) -> ProductionResult<Vec<T>> {
    let mut budget = BudgetSplitter::new(complexity);
    let mut out = Vec::with_capacity(count as usize);
    for i in 0..count {
        if budget.is_exhausted() {
            break;
        }
        let share = budget.take(&mut ctx.rng);
        match make(ctx, share, i) {
            Ok(member) => {
                budget.refund(share.saturating_sub(member.complexity()));
                out.push(member);
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                debug!(error = %e, "member skipped");
                budget.refund(share);
            }
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Methods
// ---------------------------------------------------------------------------

/// New method with a fresh name.
#[derive(Debug, Clone)]
pub struct FunctionDefinitionFactory {
    p: FunctionParams,
}

impl FunctionDefinitionFactory {
    pub fn new(p: FunctionParams) -> Self {
        Self { p }
    }
}

impl SafeFactory<FunctionDefinition> for FunctionDefinitionFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<FunctionDefinition> {
        let p = &self.p;
        ensure(!p.in_interface, "function: interfaces only declare")?;
        ensure(p.statement_limit > 0, "function: no statements left")?;
        let owner = &p.owner;
        let name = ctx.next_function_name();
        let result = result_type(ctx)?;
        let mut flags = random_access(ctx) | synchronized(ctx);
        let is_static = !ctx.params.disable_static && ctx.rng.random_boolean_with(STATIC_PROBABILITY);
        if is_static {
            flags |= SymbolFlags::STATIC;
        }
        if !ctx.params.disable_final_methods && ctx.rng.random_boolean_with(FINAL_PROBABILITY) {
            flags |= SymbolFlags::FINAL;
        }
        let args = arguments(p, ctx)?;
        let this = (!is_static).then_some(owner);

        let pending = FunctionInfo::new(
            name,
            owner.clone(),
            result.clone(),
            signature(this, &args),
            0,
            flags | SymbolFlags::NONRECURSIVE,
        );
        ctx.symbols.add(pending.clone());
        let body = body(
            p,
            ctx,
            p.complexity_limit,
            BodyShape {
                this,
                args: &args,
                result,
                can_have_returns: true,
                shadows: Vec::new(),
            },
        )?;
        let function = finish_registration(ctx, pending, body.complexity());
        debug!(function = %function.name, owner = %owner, "function defined");
        Ok(FunctionDefinition {
            function,
            args,
            body,
        })
    }
}

/// Abstract method of an interface or an abstract klass. Its recorded
/// complexity is the budget it was declared with, which bounds every
/// implementation.
#[derive(Debug, Clone)]
pub struct FunctionDeclarationFactory {
    p: FunctionParams,
}

impl FunctionDeclarationFactory {
    pub fn new(p: FunctionParams) -> Self {
        Self { p }
    }
}

impl SafeFactory<FunctionDeclaration> for FunctionDeclarationFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<FunctionDeclaration> {
        let p = &self.p;
        ensure(p.complexity_limit > 0, "declaration: no complexity left")?;
        let name = ctx.next_function_name();
        let result = result_type(ctx)?;
        let access = if p.in_interface {
            SymbolFlags::PUBLIC
        } else {
            overridable_access(ctx)
        };
        let args = arguments(p, ctx)?;
        let function = FunctionInfo::new(
            name,
            p.owner.clone(),
            result,
            signature(Some(&p.owner), &args),
            p.complexity_limit,
            access | SymbolFlags::ABSTRACT,
        );
        ctx.symbols.add(function.clone());
        Ok(FunctionDeclaration { function, args })
    }
}

/// Override of `inherited`, the copy of an ancestor's method held by the
/// owner. Name, argument types, result type and access are kept.
#[derive(Debug, Clone)]
pub struct FunctionRedefinitionFactory {
    p: FunctionParams,
    inherited: FunctionInfo,
}

impl FunctionRedefinitionFactory {
    pub fn new(p: FunctionParams, inherited: FunctionInfo) -> Self {
        Self { p, inherited }
    }
}

impl SafeFactory<FunctionRedefinition> for FunctionRedefinitionFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<FunctionRedefinition> {
        let p = &self.p;
        let inherited = &self.inherited;
        ensure(
            !inherited.is_static()
                && !inherited.is_final()
                && !inherited.is_private()
                && !inherited.is_constructor(),
            "redefinition: method cannot be overridden",
        )?;
        let owner = &p.owner;
        let arg_factory = p.builder().argument_declaration_factory()?;
        let mut args = Vec::with_capacity(inherited.explicit_args().len());
        for original in inherited.explicit_args() {
            let mut arg = arg_factory.produce(ctx)?;
            arg.variable.ty = original.ty.clone();
            args.push(arg);
        }
        let mut flags = inherited.flags
            & (SymbolFlags::ACCESS | SymbolFlags::SYNCHRONIZED);
        if !ctx.params.disable_final_methods && ctx.rng.random_boolean_with(FINAL_PROBABILITY) {
            flags |= SymbolFlags::FINAL;
        }
        let pending = FunctionInfo::new(
            inherited.name.clone(),
            owner.clone(),
            inherited.return_type.clone(),
            signature(Some(owner), &args),
            0,
            flags | SymbolFlags::NONRECURSIVE,
        );
        let shadows = dispatch_shadows(ctx, owner);
        ctx.symbols.add(pending.clone());
        let body = body(
            p,
            ctx,
            p.complexity_limit.min(inherited.complexity),
            BodyShape {
                this: Some(owner),
                args: &args,
                result: inherited.return_type.clone(),
                can_have_returns: true,
                shadows,
            },
        )?;
        let function = finish_registration(ctx, pending, body.complexity());
        debug!(function = %function.name, owner = %owner, "function redefined");
        Ok(FunctionRedefinition {
            function,
            args,
            body,
        })
    }
}

// ---------------------------------------------------------------------------
// Constructors
// ---------------------------------------------------------------------------

/// `K(args) { .. }`. Constructors carry no receiver argument; `this` is
/// in scope of the body only.
#[derive(Debug, Clone)]
pub struct ConstructorDefinitionFactory {
    p: FunctionParams,
    nullary: bool,
}

impl ConstructorDefinitionFactory {
    pub fn new(p: FunctionParams) -> Self {
        Self { p, nullary: false }
    }

    /// Constructor without arguments, the one implicit `super()` calls
    /// resolve to.
    pub fn nullary(p: FunctionParams) -> Self {
        Self { p, nullary: true }
    }
}

impl SafeFactory<ConstructorDefinition> for ConstructorDefinitionFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<ConstructorDefinition> {
        let p = &self.p;
        let owner = &p.owner;
        let name = owner
            .klass_name()
            .ok_or_else(|| ProductionError::failed("constructor: owner is not a klass"))?
            .to_string();
        let args = if self.nullary {
            Vec::new()
        } else {
            arguments(p, ctx)?
        };
        let pending = FunctionInfo::new(
            name,
            owner.clone(),
            Type::VOID,
            signature(None, &args),
            0,
            overridable_access(ctx) | SymbolFlags::CONSTRUCTOR | SymbolFlags::NONRECURSIVE,
        );
        let taken = ctx
            .symbols
            .get_functions(owner)
            .into_iter()
            .any(|f| f.is_constructor() && f.has_equal_signature(&pending));
        ensure(!taken, "constructor: argument list already used")?;
        ctx.symbols.add(pending.clone());
        let body = body(
            p,
            ctx,
            p.complexity_limit,
            BodyShape {
                this: Some(owner),
                args: &args,
                result: Type::VOID,
                can_have_returns: true,
                shadows: Vec::new(),
            },
        )?;
        let function = finish_registration(ctx, pending, body.complexity());
        Ok(ConstructorDefinition {
            function,
            args,
            body,
        })
    }
}

/// `static { .. }`: no receiver, no `return`, and it must complete
/// normally.
#[derive(Debug, Clone)]
pub struct StaticConstructorDefinitionFactory {
    p: FunctionParams,
}

impl StaticConstructorDefinitionFactory {
    pub fn new(p: FunctionParams) -> Self {
        Self { p }
    }
}

impl SafeFactory<StaticConstructorDefinition> for StaticConstructorDefinitionFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<StaticConstructorDefinition> {
        ensure(self.p.statement_limit > 0, "static initializer: no statements left")?;
        let body = body(
            &self.p,
            ctx,
            self.p.complexity_limit,
            BodyShape {
                this: None,
                args: &[],
                result: Type::VOID,
                can_have_returns: false,
                shadows: Vec::new(),
            },
        )?;
        ensure(
            body.completes_normally(),
            "static initializer: must complete normally",
        )?;
        Ok(StaticConstructorDefinition { body })
    }
}

// ---------------------------------------------------------------------------
// Member blocks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FunctionDefinitionBlockFactory {
    p: FunctionParams,
    member_limit: u64,
}

impl FunctionDefinitionBlockFactory {
    pub fn new(p: FunctionParams, member_limit: u64) -> Self {
        Self { p, member_limit }
    }
}

impl SafeFactory<FunctionDefinitionBlock> for FunctionDefinitionBlockFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<FunctionDefinitionBlock> {
        if ctx.params.disable_functions {
            return Ok(FunctionDefinitionBlock::default());
        }
        let count = ctx.rng.random_not_negative(self.member_limit + 1);
        let functions = partitioned(ctx, self.p.complexity_limit, count, |ctx, share, _| {
            self.p
                .builder()
                .complexity_limit(share)
                .function_definition_factory()?
                .produce(ctx)
        })?;
        Ok(FunctionDefinitionBlock { functions })
    }
}

#[derive(Debug, Clone)]
pub struct FunctionDeclarationBlockFactory {
    p: FunctionParams,
    member_limit: u64,
}

impl FunctionDeclarationBlockFactory {
    pub fn new(p: FunctionParams, member_limit: u64) -> Self {
        Self { p, member_limit }
    }
}

impl SafeFactory<FunctionDeclarationBlock> for FunctionDeclarationBlockFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<FunctionDeclarationBlock> {
        if ctx.params.disable_functions {
            return Ok(FunctionDeclarationBlock::default());
        }
        let count = ctx.rng.random_not_negative(self.member_limit + 1);
        let factory = self.p.builder().function_declaration_factory()?;
        let mut functions = Vec::with_capacity(count as usize);
        for _ in 0..count {
            match factory.produce(ctx) {
                Ok(f) => functions.push(f),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => debug!(error = %e, "declaration skipped"),
            }
        }
        Ok(FunctionDeclarationBlock { functions })
    }
}

/// Overrides for each of `functions`, the owner's inherited copies. A
/// successful override replaces its copy in the table; a failed one
/// leaves the copy in place.
#[derive(Debug, Clone)]
pub struct FunctionRedefinitionBlockFactory {
    p: FunctionParams,
    functions: Vec<FunctionInfo>,
}

impl FunctionRedefinitionBlockFactory {
    pub fn new(p: FunctionParams, functions: Vec<FunctionInfo>) -> Self {
        Self { p, functions }
    }
}

impl SafeFactory<FunctionRedefinitionBlock> for FunctionRedefinitionBlockFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<FunctionRedefinitionBlock> {
        let count = self.functions.len() as u64;
        let mut remaining = self.functions.iter();
        let functions = partitioned(ctx, self.p.complexity_limit, count, |ctx, share, _| {
            let inherited = remaining
                .next()
                .ok_or_else(|| ProductionError::failed("redefinition: nothing left to override"))?;
            let copy = Symbol::Function(inherited.clone());
            ctx.symbols.remove(&copy);
            let result = self
                .p
                .builder()
                .complexity_limit(share)
                .function(inherited.clone())
                .function_redefinition_factory()?
                .produce(ctx);
            if result.is_err() {
                ctx.symbols.add(copy);
            }
            result
        })?;
        Ok(FunctionRedefinitionBlock { functions })
    }
}

/// Explicit constructors. The first one takes no arguments.
#[derive(Debug, Clone)]
pub struct ConstructorDefinitionBlockFactory {
    p: FunctionParams,
    member_limit: u64,
}

impl ConstructorDefinitionBlockFactory {
    pub fn new(p: FunctionParams, member_limit: u64) -> Self {
        Self { p, member_limit }
    }
}

impl SafeFactory<ConstructorDefinitionBlock> for ConstructorDefinitionBlockFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<ConstructorDefinitionBlock> {
        let count = ctx.rng.random_not_negative(self.member_limit + 1);
        let constructors = partitioned(ctx, self.p.complexity_limit, count, |ctx, share, _| {
            let p = FunctionParams {
                complexity_limit: share,
                ..self.p.clone()
            };
            let has_nullary = ctx
                .symbols
                .get_functions(&p.owner)
                .into_iter()
                .any(|f| f.is_constructor() && f.args.is_empty());
            if has_nullary {
                ConstructorDefinitionFactory::new(p).produce(ctx)
            } else {
                ConstructorDefinitionFactory::nullary(p).produce(ctx)
            }
        })?;
        Ok(ConstructorDefinitionBlock { constructors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IrNodeBuilder;
    use crate::ir::IrNode;
    use crate::params::ProductionParams;
    use crate::types::{KlassFlags, KlassInfo};

    fn owner() -> Type {
        Type::klass("Class_1")
    }

    fn builder(complexity: u64) -> IrNodeBuilder {
        IrNodeBuilder::new()
            .owner(owner())
            .complexity_limit(complexity)
            .statement_limit(3)
            .operator_limit(3)
            .level(1)
    }

    fn ctx(seed: u64) -> GenContext {
        let mut ctx = GenContext::new(seed, ProductionParams::small());
        ctx.types
            .add_klass(KlassInfo::new("Class_1", None, KlassFlags::empty()));
        ctx
    }

    fn calls(body: &Block) -> Vec<FunctionInfo> {
        let mut out = Vec::new();
        body.walk(&mut |n| {
            if let IrNode::Call(c) = n {
                out.push(c.function.clone());
            }
        });
        out
    }

    #[test]
    fn definitions_are_registered_after_their_body() {
        let mut produced = 0;
        for seed in 0..40 {
            let mut ctx = ctx(seed);
            let Ok(def) = builder(300)
                .function_definition_factory()
                .expect("params")
                .produce(&mut ctx)
            else {
                continue;
            };
            produced += 1;
            assert!(calls(&def.body).iter().all(|f| f.name != def.function.name));
            let registered = ctx.symbols.get_functions(&owner());
            assert_eq!(registered.len(), 1, "seed {seed}");
            assert!(!registered[0].is_nonrecursive());
            assert_eq!(registered[0].complexity, def.body.complexity());
            assert_eq!(registered[0].has_receiver(), !def.function.is_static());
            assert!(ctx.symbols.get_variables(&owner()).is_empty(), "arguments leaked");
            if !def.function.return_type.is_void() {
                assert!(!def.body.completes_normally(), "seed {seed}: missing return");
            }
        }
        assert!(produced > 20);
    }

    #[test]
    fn interface_declarations_are_public_and_abstract() {
        let mut ctx = ctx(3);
        let decl = builder(50)
            .in_interface(true)
            .function_declaration_factory()
            .expect("params")
            .produce(&mut ctx)
            .expect("declaration");
        let f = &decl.function;
        assert!(f.is_abstract() && f.flags.contains(SymbolFlags::PUBLIC));
        assert!(!f.is_static() && !f.is_final());
        assert_eq!(f.complexity, 50);
        assert_eq!(f.explicit_args().len(), decl.args.len());
    }

    #[test]
    fn redefinitions_keep_the_signature() {
        let inherited = FunctionInfo::new(
            "func_100",
            owner(),
            Type::INT,
            vec![
                VariableInfo::this(owner()),
                VariableInfo::new("var_100", owner(), Type::LONG, SymbolFlags::LOCAL),
            ],
            200,
            SymbolFlags::PUBLIC,
        );
        for seed in 0..20 {
            let mut ctx = ctx(seed);
            let Ok(redef) = builder(300)
                .function(inherited.clone())
                .function_redefinition_factory()
                .expect("params")
                .produce(&mut ctx)
            else {
                continue;
            };
            assert!(redef.function.has_equal_signature(&inherited));
            assert_eq!(redef.function.return_type, Type::INT);
            assert!(redef.function.flags.contains(SymbolFlags::PUBLIC));
            assert!(redef.body.complexity() <= 200);
            assert!(calls(&redef.body).iter().all(|f| f.name != "func_100"));
        }
    }

    #[test]
    fn final_methods_cannot_be_redefined() {
        let mut ctx = ctx(1);
        let inherited = FunctionInfo::new(
            "func_7",
            owner(),
            Type::VOID,
            vec![VariableInfo::this(owner())],
            10,
            SymbolFlags::FINAL,
        );
        let result = builder(100)
            .function(inherited)
            .function_redefinition_factory()
            .expect("params")
            .produce(&mut ctx);
        assert!(result.is_err());
    }

    #[test]
    fn constructor_argument_lists_are_distinct() {
        for seed in 0..30 {
            let mut ctx = ctx(seed);
            let block = builder(600)
                .member_limit(3)
                .constructor_definition_block_factory()
                .expect("params")
                .produce(&mut ctx)
                .expect("constructor block never fails");
            if let Some(first) = block.constructors.first() {
                assert!(first.args.is_empty(), "seed {seed}");
            }
            for (i, a) in block.constructors.iter().enumerate() {
                assert!(a.function.is_constructor() && !a.function.has_receiver());
                assert_eq!(a.function.name, "Class_1");
                for b in &block.constructors[i + 1..] {
                    assert!(!a.function.has_equal_signature(&b.function), "seed {seed}");
                }
            }
        }
    }

    #[test]
    fn static_initializers_complete_and_never_return() {
        for seed in 0..30 {
            let mut ctx = ctx(seed);
            let Ok(init) = builder(200)
                .static_constructor_definition_factory()
                .expect("params")
                .produce(&mut ctx)
            else {
                continue;
            };
            assert!(init.body.completes_normally());
            init.body.walk(&mut |n| assert!(!matches!(n, IrNode::Return(_))));
        }
    }

    #[test]
    fn disabled_functions_yield_an_empty_block() {
        let params = ProductionParams {
            disable_functions: true,
            ..ProductionParams::small()
        };
        let mut ctx = GenContext::new(4, params);
        let block = builder(500)
            .member_limit(4)
            .function_definition_block_factory()
            .expect("params")
            .produce(&mut ctx)
            .expect("block");
        assert!(block.functions.is_empty());
    }
}
