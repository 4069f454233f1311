//! Klasses, interfaces, the main klass and the depth repair pass.
//!
//! A klass is generated inside one transaction: its type registration, the
//! copies of inherited members and every member it declares are committed
//! together or not at all.

use tracing::debug;

use crate::builder::{IrNodeBuilder, KlassParams};
use crate::context::GenContext;
use crate::error::{ensure, ProductionResult};
use crate::factories::statements::print_variables;
use crate::ir::{
    Block, ClassDefinitionBlock, Interface, IrNode, Klass, MainKlass, Node, TypeDefinition,
};
use crate::rule::{BudgetSplitter, Factory, SafeFactory};
use crate::symbols::{FunctionInfo, SymbolFlags, SymbolKind, VariableInfo};
use crate::types::{KlassFlags, KlassInfo, Type, OBJECT, STRING};

const INHERIT_PROBABILITY: f64 = 0.5;
const ABSTRACT_PROBABILITY: f64 = 0.2;
const FINAL_PROBABILITY: f64 = 0.2;
/// Chance that a klass leaves inherited abstract methods to its subclasses.
const LEAVE_ABSTRACT_PROBABILITY: f64 = 0.3;
const OVERRIDE_PROBABILITY: f64 = 0.5;
const STATIC_INIT_PROBABILITY: f64 = 0.3;
const INTERFACE_PROBABILITY: f64 = 0.3;

// ---------------------------------------------------------------------------
// Depth repair
// ---------------------------------------------------------------------------

/// Bring the control-flow depth of `node` into
/// `min_cfg_depth..=max_cfg_depth`. Deepening injects generated blocks in
/// front of stackable leaves, paid from `spare`; flattening strips
/// deviations that complete normally.
pub(crate) fn repair_depth<N: Node>(ctx: &mut GenContext, node: &mut N, spare: u64) {
    let min = ctx.params.min_cfg_depth;
    let max = ctx.params.max_depth();
    let mut spare = spare;
    for attempt in 0..ctx.params.depth_repair_attempts {
        if node.depth() >= min || spare == 0 {
            break;
        }
        let mut leaves = Vec::new();
        node.collect_stackable_leaves(&mut leaves);
        if leaves.is_empty() {
            break;
        }
        let i = ctx.rng.random_not_negative(leaves.len() as u64) as usize;
        let leaf = &mut *leaves[i];
        match inject(ctx, leaf, spare) {
            Some(block) => {
                spare = spare.saturating_sub(block.complexity());
                debug!(attempt, depth = block.depth(), "depth raised");
                leaf.children.insert(0, IrNode::Block(block));
            }
            None => debug!(attempt, "depth repair attempt discarded"),
        }
    }
    if node.depth() > max {
        node.strip_deviations(max);
        debug!(max, depth = node.depth(), "depth reduced");
    }
}

/// Block for the front of `leaf`. It must nest deviations and complete
/// normally. No calls are possible inside it, since the functions around
/// the leaf are complete and a call could recurse into them.
fn inject(ctx: &mut GenContext, leaf: &Block, spare: u64) -> Option<Block> {
    let builder = IrNodeBuilder::new()
        .owner(leaf.owner.clone())
        .result_type(leaf.return_type.clone())
        .complexity_limit(spare)
        .statement_limit(ctx.params.statement_limit)
        .operator_limit(ctx.params.operator_limit)
        .level(leaf.level + 1);
    let produced = ctx.scoped(|ctx| {
        let shadows: Vec<FunctionInfo> = ctx
            .symbols
            .get_all(SymbolKind::Function)
            .into_iter()
            .filter_map(|s| s.as_function())
            .map(|f| {
                let mut shadow = f.clone();
                shadow.flags |= SymbolFlags::NONRECURSIVE;
                shadow
            })
            .collect();
        for shadow in shadows {
            ctx.symbols.add(shadow);
        }
        builder.block_factory()?.produce(ctx)
    });
    produced
        .ok()
        .filter(|b| b.depth() > 0 && b.completes_normally())
}

// ---------------------------------------------------------------------------
// Inheritance
// ---------------------------------------------------------------------------

/// Members a klass receives from one direct supertype, re-owned.
fn inherited_members(ctx: &GenContext, sup: &str, owner: &Type) -> (Vec<VariableInfo>, Vec<FunctionInfo>) {
    let sup = Type::klass(sup);
    let variables = ctx
        .symbols
        .get_variables(&sup)
        .into_iter()
        .filter(|v| !v.is_private() && !v.is_this())
        .map(|v| VariableInfo {
            owner: owner.clone(),
            ..v.clone()
        })
        .collect();
    let functions = ctx
        .symbols
        .get_functions(&sup)
        .into_iter()
        .filter(|f| !f.is_private() && !f.is_constructor())
        .map(|f| f.with_owner(owner))
        .collect();
    (variables, functions)
}

/// `candidate` cannot join `present`: a method with its signature is
/// static, non-public or returns something else.
fn conflicts(present: &[FunctionInfo], candidate: &FunctionInfo) -> bool {
    present.iter().any(|f| {
        f.has_equal_signature(candidate)
            && (f.is_static()
                || candidate.is_static()
                || !f.flags.contains(SymbolFlags::PUBLIC)
                || f.return_type != candidate.return_type)
    })
}

/// Add `incoming` to `present`. An implementation beats an abstract
/// declaration of the same signature.
fn merge_functions(present: &mut Vec<FunctionInfo>, incoming: Vec<FunctionInfo>) {
    for f in incoming {
        match present.iter_mut().find(|p| p.has_equal_signature(&f)) {
            Some(existing) => {
                if existing.is_abstract() && !f.is_abstract() {
                    *existing = f;
                }
            }
            None => present.push(f),
        }
    }
}

// ---------------------------------------------------------------------------
// Klass
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct KlassFactory {
    p: KlassParams,
}

impl KlassFactory {
    pub fn new(p: KlassParams) -> Self {
        Self { p }
    }

    fn parent(&self, ctx: &mut GenContext) -> String {
        if ctx.params.disable_inheritance || !ctx.rng.random_boolean_with(INHERIT_PROBABILITY) {
            return OBJECT.to_string();
        }
        let candidates: Vec<String> = ctx
            .types
            .get_klasses()
            .into_iter()
            .filter(|k| !k.is_final() && !k.is_interface() && k.name != STRING)
            .map(|k| k.name.clone())
            .collect();
        ctx.rng
            .random_element(&candidates)
            .cloned()
            .unwrap_or_else(|| OBJECT.to_string())
    }

    /// Interfaces accepted on top of `functions`, which grows with each.
    fn interfaces(&self, ctx: &mut GenContext, owner: &Type, functions: &mut Vec<FunctionInfo>) -> Vec<String> {
        if ctx.params.disable_inheritance || ctx.params.disable_interfaces {
            return Vec::new();
        }
        let mut candidates: Vec<String> = ctx
            .types
            .get_klasses()
            .into_iter()
            .filter(|k| k.is_interface())
            .map(|k| k.name.clone())
            .collect();
        ctx.rng.shuffle(&mut candidates);
        let wanted = ctx
            .rng
            .random_not_negative(ctx.params.implementation_limit + 1) as usize;
        let mut accepted = Vec::new();
        for name in candidates {
            if accepted.len() >= wanted {
                break;
            }
            let (_, declared) = inherited_members(ctx, &name, owner);
            if declared.iter().any(|f| conflicts(functions, f)) {
                debug!(interface = %name, klass = %owner, "interface rejected");
                continue;
            }
            merge_functions(functions, declared);
            accepted.push(name);
        }
        accepted
    }

    fn klass(&self, ctx: &mut GenContext) -> ProductionResult<Klass> {
        let p = &self.p;
        ensure(p.complexity_limit > 0, "klass: no complexity left")?;
        let name = ctx.next_klass_name("Class");
        let ty = Type::klass(name.clone());
        let parent = self.parent(ctx);

        let (variables, mut functions) = inherited_members(ctx, &parent, &ty);
        let interfaces = self.interfaces(ctx, &ty, &mut functions);

        let must_implement: Vec<FunctionInfo> =
            functions.iter().filter(|f| f.is_abstract()).cloned().collect();
        let leave_abstract =
            !must_implement.is_empty() && ctx.rng.random_boolean_with(LEAVE_ABSTRACT_PROBABILITY);
        let is_abstract = leave_abstract || ctx.rng.random_boolean_with(ABSTRACT_PROBABILITY);
        let mut flags = KlassFlags::empty();
        if is_abstract {
            flags |= KlassFlags::ABSTRACT;
        } else if !ctx.params.disable_final_classes && ctx.rng.random_boolean_with(FINAL_PROBABILITY) {
            flags |= KlassFlags::FINAL;
        }

        ctx.types
            .add_klass(KlassInfo::new(name.clone(), Some(parent.clone()), flags));
        for iface in &interfaces {
            ctx.types.add_interface(&name, iface);
        }
        for v in variables {
            ctx.symbols.add(v);
        }
        for f in &functions {
            ctx.symbols.add(f.clone());
        }

        let mut to_redefine: Vec<FunctionInfo> = Vec::new();
        for f in &functions {
            let wanted = if f.is_abstract() {
                !leave_abstract || ctx.rng.random_boolean()
            } else {
                !f.is_static() && !f.is_final() && ctx.rng.random_boolean_with(OVERRIDE_PROBABILITY)
            };
            if wanted {
                to_redefine.push(f.clone());
            }
        }
        // Abstract slots first, so that budget exhaustion hits optional
        // overrides.
        to_redefine.sort_by_key(|f| !f.is_abstract());

        let builder = p.builder().owner(ty.clone());
        let mut budget = BudgetSplitter::new(p.complexity_limit);

        let share = budget.take(&mut ctx.rng);
        let data_members = builder
            .clone()
            .complexity_limit(share)
            .member_limit(ctx.params.data_member_limit)
            .exception_safe(true)
            .variable_declaration_block_factory()?
            .produce(ctx)?;
        budget.refund(share.saturating_sub(data_members.complexity()));

        let static_constructor = if !ctx.params.disable_static
            && !budget.is_exhausted()
            && ctx.rng.random_boolean_with(STATIC_INIT_PROBABILITY)
        {
            let share = budget.take(&mut ctx.rng);
            let init = builder
                .clone()
                .complexity_limit(share)
                .static_constructor_definition_factory()?
                .produce(ctx);
            match init {
                Ok(init) => {
                    budget.refund(share.saturating_sub(init.complexity()));
                    Some(init)
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(_) => {
                    budget.refund(share);
                    None
                }
            }
        } else {
            None
        };

        let share = budget.take(&mut ctx.rng);
        let constructors = builder
            .clone()
            .complexity_limit(share)
            .member_limit(ctx.params.constructors_limit)
            .constructor_definition_block_factory()?
            .produce(ctx)?;
        budget.refund(share.saturating_sub(constructors.complexity()));
        if constructors.constructors.is_empty() {
            ctx.symbols.add(FunctionInfo::new(
                name.clone(),
                ty.clone(),
                Type::VOID,
                Vec::new(),
                0,
                SymbolFlags::PUBLIC | SymbolFlags::CONSTRUCTOR,
            ));
        }

        let share = budget.take(&mut ctx.rng);
        let redefinitions = builder
            .clone()
            .complexity_limit(share)
            .functions(to_redefine)
            .function_redefinition_block_factory()?
            .produce(ctx)?;
        budget.refund(share.saturating_sub(redefinitions.complexity()));
        let unimplemented = ctx
            .symbols
            .get_functions(&ty)
            .into_iter()
            .any(FunctionInfo::is_abstract);
        ensure(
            is_abstract || !unimplemented,
            "klass: inherited abstract method left unimplemented",
        )?;

        let share = budget.take(&mut ctx.rng);
        let defined = builder
            .clone()
            .complexity_limit(share)
            .member_limit(ctx.params.member_functions_limit)
            .function_definition_block_factory()?
            .produce(ctx)?;
        budget.refund(share.saturating_sub(defined.complexity()));

        let abstract_functions = if is_abstract && !budget.is_exhausted() {
            builder
                .complexity_limit(budget.take(&mut ctx.rng))
                .member_limit(ctx.params.member_functions_limit)
                .function_declaration_block_factory()?
                .produce(ctx)?
        } else {
            Default::default()
        };

        let mut klass = Klass {
            name,
            parent: Type::klass(parent),
            interfaces: interfaces.into_iter().map(Type::Klass).collect(),
            flags,
            data_members,
            static_constructor,
            constructors,
            redefinitions,
            functions: defined,
            abstract_functions,
        };
        let spare = p.complexity_limit.saturating_sub(klass.complexity());
        repair_depth(ctx, &mut klass, spare);
        debug!(
            klass = %klass.name,
            parent = %klass.parent,
            abstract = is_abstract,
            complexity = klass.complexity(),
            "klass produced"
        );
        Ok(klass)
    }
}

impl SafeFactory<Klass> for KlassFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<Klass> {
        ctx.speculate(|ctx| self.klass(ctx))
    }
}

// ---------------------------------------------------------------------------
// Interface
// ---------------------------------------------------------------------------

/// Interface with abstract methods, optionally extending another one.
#[derive(Debug, Clone)]
pub struct InterfaceFactory {
    p: KlassParams,
}

impl InterfaceFactory {
    pub fn new(p: KlassParams) -> Self {
        Self { p }
    }

    fn interface(&self, ctx: &mut GenContext) -> ProductionResult<Interface> {
        ensure(!ctx.params.disable_interfaces, "interface: interfaces are disabled")?;
        ensure(self.p.complexity_limit > 0, "interface: no complexity left")?;
        let name = ctx.next_klass_name("Interface");
        let ty = Type::klass(name.clone());
        let parent = if ctx.params.disable_inheritance || !ctx.rng.random_boolean() {
            None
        } else {
            let known: Vec<String> = ctx
                .types
                .get_klasses()
                .into_iter()
                .filter(|k| k.is_interface())
                .map(|k| k.name.clone())
                .collect();
            ctx.rng.random_element(&known).cloned()
        };

        ctx.types
            .add_klass(KlassInfo::new(name.clone(), parent.clone(), KlassFlags::INTERFACE));
        if let Some(sup) = &parent {
            let (_, inherited) = inherited_members(ctx, sup, &ty);
            for f in inherited {
                ctx.symbols.add(f);
            }
        }
        let functions = self
            .p
            .builder()
            .owner(ty)
            .in_interface(true)
            .member_limit(ctx.params.member_functions_limit)
            .function_declaration_block_factory()?
            .produce(ctx)?;
        debug!(interface = %name, declarations = functions.functions.len(), "interface produced");
        Ok(Interface {
            name,
            parent: parent.map(Type::Klass),
            functions,
        })
    }
}

impl SafeFactory<Interface> for InterfaceFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<Interface> {
        ctx.speculate(|ctx| self.interface(ctx))
    }
}

// ---------------------------------------------------------------------------
// Class definition block
// ---------------------------------------------------------------------------

/// Up to `member_limit` klasses and interfaces. Definitions that fail are
/// skipped.
#[derive(Debug, Clone)]
pub struct ClassDefinitionBlockFactory {
    p: KlassParams,
    member_limit: u64,
}

impl ClassDefinitionBlockFactory {
    pub fn new(p: KlassParams, member_limit: u64) -> Self {
        Self { p, member_limit }
    }
}

impl SafeFactory<ClassDefinitionBlock> for ClassDefinitionBlockFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<ClassDefinitionBlock> {
        if self.member_limit == 0 {
            return Ok(ClassDefinitionBlock::default());
        }
        let count = ctx.rng.random_not_zero(self.member_limit);
        let mut budget = BudgetSplitter::new(self.p.complexity_limit);
        let mut definitions = Vec::with_capacity(count as usize);
        for _ in 0..count {
            if budget.is_exhausted() {
                break;
            }
            let share = budget.take(&mut ctx.rng);
            let builder = self.p.builder().complexity_limit(share);
            let wants_interface =
                !ctx.params.disable_interfaces && ctx.rng.random_boolean_with(INTERFACE_PROBABILITY);
            let produced = if wants_interface {
                builder
                    .interface_factory()?
                    .produce(ctx)
                    .map(TypeDefinition::Interface)
            } else {
                builder.klass_factory()?.produce(ctx).map(TypeDefinition::Klass)
            };
            match produced {
                Ok(definition) => {
                    budget.refund(share.saturating_sub(definition.complexity()));
                    definitions.push(definition);
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    debug!(error = %e, "type definition skipped");
                    budget.refund(share);
                }
            }
        }
        Ok(ClassDefinitionBlock { definitions })
    }
}

// ---------------------------------------------------------------------------
// Main klass
// ---------------------------------------------------------------------------

/// The klass holding `test()`, whose body is followed by a print of every
/// data member.
#[derive(Debug, Clone)]
pub struct MainKlassFactory {
    name: String,
    p: KlassParams,
}

impl MainKlassFactory {
    pub fn new(name: String, p: KlassParams) -> Self {
        Self { name, p }
    }

    fn main_klass(&self, ctx: &mut GenContext) -> ProductionResult<MainKlass> {
        let p = &self.p;
        ensure(p.complexity_limit > 0, "main klass: no complexity left")?;
        ensure(p.statement_limit > 0, "main klass: no statements left")?;
        let ty = Type::klass(self.name.clone());
        ensure(!ctx.types.contains(&ty), "main klass: name already taken")?;
        ctx.types.add_klass(KlassInfo::new(
            self.name.clone(),
            Some(OBJECT.to_string()),
            KlassFlags::empty(),
        ));
        ctx.symbols.add(FunctionInfo::new(
            self.name.clone(),
            ty.clone(),
            Type::VOID,
            Vec::new(),
            0,
            SymbolFlags::PUBLIC | SymbolFlags::CONSTRUCTOR,
        ));

        let builder = p.builder().owner(ty.clone());
        let mut budget = BudgetSplitter::new(p.complexity_limit);

        let share = budget.take_leaving(&mut ctx.rng, 1);
        let data_members = builder
            .clone()
            .complexity_limit(share)
            .member_limit(ctx.params.data_member_limit)
            .exception_safe(true)
            .variable_declaration_block_factory()?
            .produce(ctx)?;
        budget.refund(share.saturating_sub(data_members.complexity()));

        let share = budget.take_leaving(&mut ctx.rng, 1);
        let functions = builder
            .clone()
            .complexity_limit(share)
            .member_limit(ctx.params.member_functions_limit)
            .function_definition_block_factory()?
            .produce(ctx)?;
        budget.refund(share.saturating_sub(functions.complexity()));

        let test_builder = builder
            .result_type(Type::VOID)
            .level(p.level + 1)
            .complexity_limit(budget.take_rest());
        let mut test_body = ctx.scoped(|ctx| {
            ctx.symbols.add(VariableInfo::this(ty.clone()));
            test_builder.block_factory()?.produce(ctx)
        })?;
        // The print after the body has to stay reachable.
        while !test_body.completes_normally() {
            test_body.children.pop();
        }

        let mut main = MainKlass {
            name: self.name.clone(),
            data_members,
            functions,
            test_body,
            print_variables: print_variables(ctx, &ty),
        };
        let spare = p.complexity_limit.saturating_sub(main.complexity());
        repair_depth(ctx, &mut main, spare);
        debug!(klass = %main.name, complexity = main.complexity(), "main klass produced");
        Ok(main)
    }
}

impl SafeFactory<MainKlass> for MainKlassFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<MainKlass> {
        ctx.speculate(|ctx| self.main_klass(ctx))
    }
}
