//! Method and constructor calls.

use crate::builder::ExpressionParams;
use crate::context::GenContext;
use crate::error::{ensure, ProductionError, ProductionResult};
use crate::factories::{is_instantiable, is_visible_from};
use crate::ir::{FunctionCall, IrNode};
use crate::rule::{BudgetSplitter, Factory, SafeFactory};
use crate::symbols::{FunctionInfo, Symbol, SymbolKind};
use crate::types::Type;

/// Call of a visible function returning exactly the result type.
///
/// Functions still being generated are registered `NONRECURSIVE` and are
/// never candidates, so no call graph cycle can be formed.
#[derive(Debug, Clone)]
pub struct FunctionCallFactory {
    p: ExpressionParams,
}

impl FunctionCallFactory {
    pub fn new(p: ExpressionParams) -> Self {
        Self { p }
    }

    fn is_candidate(&self, ctx: &GenContext, f: &FunctionInfo) -> bool {
        if f.is_nonrecursive() {
            return false;
        }
        let produces = if f.is_constructor() {
            f.owner == self.p.result_type && is_instantiable(ctx, &f.owner)
        } else {
            f.return_type == self.p.result_type
        };
        let parts = f.args.len() as u64;
        produces && f.complexity.saturating_add(1 + parts) <= self.p.complexity_limit
    }

    /// Visible functions. When one owner holds several declarations of a
    /// slot (an inherited copy and its redefinition), the latest wins.
    fn candidates(&self, ctx: &GenContext) -> Vec<FunctionInfo> {
        let visible: Vec<&FunctionInfo> = ctx
            .symbols
            .get_all(SymbolKind::Function)
            .into_iter()
            .filter(|s| is_visible_from(ctx, &self.p.owner, s))
            .filter_map(Symbol::as_function)
            .collect();
        let mut latest: Vec<&FunctionInfo> = Vec::with_capacity(visible.len());
        for f in visible.into_iter().rev() {
            let hidden = latest.iter().any(|seen| {
                seen.owner == f.owner
                    && seen.is_constructor() == f.is_constructor()
                    && seen.has_equal_signature(f)
            });
            if !hidden {
                latest.push(f);
            }
        }
        latest
            .into_iter()
            .filter(|f| self.is_candidate(ctx, f))
            .cloned()
            .collect()
    }

    fn argument(
        &self,
        ctx: &mut GenContext,
        ty: Type,
        complexity_limit: u64,
        operator_limit: u64,
        no_consts: bool,
    ) -> ProductionResult<IrNode> {
        self.p
            .builder()
            .result_type(ty)
            .complexity_limit(complexity_limit)
            .operator_limit(operator_limit)
            .no_consts(no_consts)
            .expression_factory()?
            .produce(ctx)
    }
}

impl SafeFactory<IrNode> for FunctionCallFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        let p = &self.p;
        ensure(p.operator_limit > 0, "call: no operators left")?;
        let candidates = self.candidates(ctx);
        let function = ctx
            .rng
            .random_element(&candidates)
            .cloned()
            .ok_or_else(|| ProductionError::failed("call: no candidate function"))?;

        let parts = function.args.len() as u64;
        let mut complexity =
            BudgetSplitter::new(p.complexity_limit - 1 - function.complexity);
        let mut operators = BudgetSplitter::new(p.operator_limit - 1);

        let mut receiver = None;
        let mut args = Vec::with_capacity(function.explicit_args().len());
        for (i, arg) in function.args.iter().enumerate() {
            let reserve = parts - i as u64 - 1;
            let share = if reserve == 0 {
                complexity.take_rest()
            } else {
                complexity.take_leaving(&mut ctx.rng, reserve)
            };
            let ops = if reserve == 0 {
                operators.take_rest()
            } else {
                let wanted = ctx.rng.fraction_of(operators.remaining() + 1);
                operators.take_exact(wanted).unwrap_or(0)
            };
            if arg.is_this() && !function.is_constructor() {
                receiver = Some(Box::new(self.argument(ctx, arg.ty.clone(), share, ops, true)?));
            } else {
                args.push(self.argument(ctx, arg.ty.clone(), share, ops, false)?);
            }
        }
        Ok(IrNode::Call(FunctionCall {
            function,
            receiver,
            args,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IrNodeBuilder;
    use crate::ir::Node;
    use crate::params::ProductionParams;
    use crate::symbols::{SymbolFlags, VariableInfo};
    use crate::types::{KlassFlags, KlassInfo, OBJECT};

    fn ctx() -> GenContext {
        let mut ctx = GenContext::new(8, ProductionParams::small());
        ctx.types
            .add_klass(KlassInfo::new("Test", Some(OBJECT.to_string()), KlassFlags::empty()));
        ctx.types.add_klass(KlassInfo::new(
            "Shape",
            Some(OBJECT.to_string()),
            KlassFlags::ABSTRACT,
        ));
        ctx
    }

    fn owner() -> Type {
        Type::klass("Test")
    }

    fn arg(name: &str, ty: Type) -> VariableInfo {
        VariableInfo::new(name, owner(), ty, SymbolFlags::LOCAL | SymbolFlags::INITIALIZED)
    }

    fn request(ty: Type, complexity: u64) -> FunctionCallFactory {
        IrNodeBuilder::new()
            .owner(owner())
            .result_type(ty)
            .complexity_limit(complexity)
            .operator_limit(3)
            .function_call_factory()
            .expect("params")
    }

    #[test]
    fn static_call_gets_its_arguments() {
        let mut ctx = ctx();
        let f = FunctionInfo::new(
            "func_1",
            owner(),
            Type::INT,
            vec![arg("var_1", Type::LONG), arg("var_2", Type::BOOLEAN)],
            5,
            SymbolFlags::STATIC | SymbolFlags::PUBLIC,
        );
        ctx.symbols.add(f.clone());
        let node = request(Type::INT, 20).produce(&mut ctx).expect("one candidate");
        let IrNode::Call(call) = &node else {
            panic!("expected call");
        };
        assert_eq!(call.function, f);
        assert!(call.receiver.is_none());
        assert_eq!(call.args.len(), 2);
        assert_eq!(call.args[0].result_type(), Some(&Type::LONG));
        assert_eq!(call.args[1].result_type(), Some(&Type::BOOLEAN));
        assert!(node.complexity() <= 20);
    }

    #[test]
    fn nonrecursive_and_expensive_functions_are_skipped() {
        let mut ctx = ctx();
        ctx.symbols.add(FunctionInfo::new(
            "func_1",
            owner(),
            Type::INT,
            Vec::new(),
            1,
            SymbolFlags::STATIC | SymbolFlags::NONRECURSIVE,
        ));
        ctx.symbols.add(FunctionInfo::new(
            "func_2",
            owner(),
            Type::INT,
            Vec::new(),
            100,
            SymbolFlags::STATIC,
        ));
        assert!(request(Type::INT, 20).produce(&mut ctx).is_err());
        assert!(request(Type::INT, 200).produce(&mut ctx).is_ok());
    }

    #[test]
    fn abstract_klasses_are_not_instantiated() {
        let mut ctx = ctx();
        let shape = Type::klass("Shape");
        ctx.symbols.add(FunctionInfo::new(
            "Shape",
            shape.clone(),
            Type::VOID,
            Vec::new(),
            0,
            SymbolFlags::PUBLIC | SymbolFlags::CONSTRUCTOR,
        ));
        assert!(request(shape, 10).produce(&mut ctx).is_err());

        ctx.symbols.add(FunctionInfo::new(
            "Test",
            owner(),
            Type::VOID,
            Vec::new(),
            0,
            SymbolFlags::PUBLIC | SymbolFlags::CONSTRUCTOR,
        ));
        let node = request(owner(), 10).produce(&mut ctx).expect("new Test()");
        assert_eq!(node.result_type(), Some(&owner()));
    }

    #[test]
    fn latest_declaration_of_a_slot_wins() {
        let mut ctx = ctx();
        let f = FunctionInfo::new("func_1", owner(), Type::INT, Vec::new(), 1, SymbolFlags::STATIC);
        ctx.symbols.add(f.clone());
        let mut pending = f;
        pending.flags |= SymbolFlags::NONRECURSIVE;
        ctx.symbols.add(pending);
        assert!(request(Type::INT, 20).produce(&mut ctx).is_err());
    }

    #[test]
    fn instance_call_has_a_receiver() {
        let mut ctx = ctx();
        ctx.symbols.add(VariableInfo::this(owner()));
        ctx.symbols.add(FunctionInfo::new(
            "func_1",
            owner(),
            Type::DOUBLE,
            vec![VariableInfo::this(owner())],
            2,
            SymbolFlags::PUBLIC,
        ));
        let node = request(Type::DOUBLE, 10).produce(&mut ctx).expect("this.func_1()");
        let IrNode::Call(call) = &node else {
            panic!("expected call");
        };
        let receiver = call.receiver.as_ref().expect("receiver");
        assert_eq!(receiver.result_type(), Some(&owner()));
        assert!(call.args.is_empty());
    }
}
