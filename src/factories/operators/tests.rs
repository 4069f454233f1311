use super::*;
use crate::builder::IrNodeBuilder;
use crate::ir::Node;
use crate::params::ProductionParams;
use crate::rule::SafeFactory;
use crate::symbols::{SymbolFlags, VariableInfo};
use crate::types::util::{can_explicitly_cast, can_implicitly_cast};

fn owner() -> Type {
    Type::klass("Test")
}

/// Context with one assignable local of every value type.
fn ctx(seed: u64) -> GenContext {
    let mut ctx = GenContext::new(seed, ProductionParams::small());
    let mut types = numeric_types();
    types.push(Type::BOOLEAN);
    types.push(Type::string());
    for ty in types {
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

fn params(ty: Type, complexity: u64, operators: u64) -> ExpressionParams {
    IrNodeBuilder::new()
        .owner(owner())
        .result_type(ty)
        .complexity_limit(complexity)
        .operator_limit(operators)
        .expression_params("test")
        .expect("complete params")
}

fn walk(node: &IrNode, f: &mut dyn FnMut(&IrNode)) {
    f(node);
    node.for_each_expr_child(&mut |child| walk(child, f));
}

#[test]
fn arithmetic_operands_promote_to_the_result() {
    for seed in 0..50 {
        let mut ctx = ctx(seed);
        for ty in [Type::INT, Type::LONG, Type::FLOAT, Type::DOUBLE] {
            let factory = ArithmeticOperatorFactory::new(OperatorKind::Add, params(ty.clone(), 10, 2));
            let node = factory.produce(&mut ctx).expect("locals of every type exist");
            let IrNode::Binary(b) = &node else {
                panic!("expected binary, got {node:?}");
            };
            assert_eq!(b.ty, ty);
            let l = b.left.result_type().and_then(Type::as_builtin).expect("numeric");
            let r = b.right.result_type().and_then(Type::as_builtin).expect("numeric");
            let result = ty.as_builtin().expect("builtin");
            assert!(l.unary_promoted().can_widen_to(result));
            assert!(r.unary_promoted().can_widen_to(result));
            assert!(l.unary_promoted() == result || r.unary_promoted() == result);
            assert!(node.complexity() <= 10);
        }
    }
}

#[test]
fn arithmetic_rejects_narrow_and_reference_results() {
    let mut ctx = ctx(1);
    for ty in [Type::BYTE, Type::CHAR, Type::BOOLEAN, Type::string()] {
        let factory = ArithmeticOperatorFactory::new(OperatorKind::Mul, params(ty, 10, 2));
        assert!(factory.produce(&mut ctx).is_err());
    }
}

#[test]
fn operators_need_an_operator_unit() {
    let mut ctx = ctx(2);
    let factory = LogicOperatorFactory::new(OperatorKind::And, params(Type::BOOLEAN, 10, 0));
    assert!(factory.produce(&mut ctx).is_err());
    let factory = NotFactory::new(params(Type::BOOLEAN, 1, 3));
    assert!(factory.produce(&mut ctx).is_err());
}

#[test]
fn division_is_excluded_when_exception_safe() {
    let mut ctx = ctx(3);
    let mut p = params(Type::INT, 10, 2);
    p.exception_safe = true;
    for kind in [OperatorKind::Div, OperatorKind::Mod] {
        assert!(ArithmeticOperatorFactory::new(kind, p.clone())
            .produce(&mut ctx)
            .is_err());
    }
    assert!(ArithmeticOperatorFactory::new(OperatorKind::Sub, p)
        .produce(&mut ctx)
        .is_ok());
}

#[test]
fn assignment_right_side_widens_to_the_target() {
    for seed in 0..60 {
        let mut ctx = ctx(seed);
        for ty in [Type::INT, Type::DOUBLE, Type::SHORT, Type::string(), Type::BOOLEAN] {
            let Ok(node) = AssignmentOperatorFactory::new(params(ty.clone(), 12, 3)).produce(&mut ctx)
            else {
                continue;
            };
            let IrNode::Binary(b) = &node else {
                panic!("expected binary, got {node:?}");
            };
            assert_eq!(b.kind, OperatorKind::Assign);
            assert!(matches!(*b.left, IrNode::Variable(_)));
            assert_eq!(b.left.result_type(), Some(&ty));
            let right = b.right.result_type().expect("expression");
            assert!(can_implicitly_cast(right, &ty, &ctx.types), "{right} = into {ty}");
        }
    }
}

#[test]
fn compound_assignment_operand_families() {
    for seed in 0..40 {
        let mut ctx = ctx(seed);
        let node = CompoundAssignmentFactory::new(OperatorKind::CompoundShl, params(Type::CHAR, 8, 2))
            .produce(&mut ctx)
            .expect("char local exists");
        let IrNode::Binary(b) = &node else {
            panic!("expected binary");
        };
        assert!(b.right.result_type().is_some_and(Type::is_integral));
        assert!(CompoundAssignmentFactory::new(OperatorKind::CompoundShl, params(Type::FLOAT, 8, 2))
            .produce(&mut ctx)
            .is_err());
    }
}

#[test]
fn assignment_is_excluded_without_side_effects() {
    let mut ctx = ctx(4);
    let mut p = params(Type::INT, 10, 3);
    p.no_side_effects = true;
    assert!(AssignmentOperatorFactory::new(p.clone()).produce(&mut ctx).is_err());
    assert!(IncDecOperatorFactory::new(OperatorKind::PostInc, p).produce(&mut ctx).is_err());
}

#[test]
fn inc_dec_targets_a_variable_of_the_result_type() {
    let mut ctx = ctx(5);
    let node = IncDecOperatorFactory::new(OperatorKind::PreDec, params(Type::BYTE, 5, 1))
        .produce(&mut ctx)
        .expect("byte local exists");
    let IrNode::Unary(u) = &node else {
        panic!("expected unary");
    };
    assert_eq!(u.ty, Type::BYTE);
    assert!(matches!(*u.operand, IrNode::Variable(_)));
}

#[test]
fn cast_changes_the_type() {
    for seed in 0..40 {
        let mut ctx = ctx(seed);
        let node = CastOperatorFactory::new(params(Type::SHORT, 6, 2))
            .sproduce(&mut ctx)
            .expect("numeric sources exist");
        let IrNode::Cast(c) = &node else {
            panic!("expected cast");
        };
        let from = c.expr.result_type().expect("expression");
        assert_ne!(from, &Type::SHORT);
        assert!(can_explicitly_cast(from, &Type::SHORT, &ctx.types));
    }
    let mut ctx = ctx(0);
    assert!(CastOperatorFactory::new(params(Type::BOOLEAN, 6, 2))
        .produce(&mut ctx)
        .is_err());
}

#[test]
fn ternary_branches_have_the_result_type() {
    for seed in 0..40 {
        let mut ctx = ctx(seed);
        let node = TernaryOperatorFactory::new(params(Type::LONG, 9, 2))
            .produce(&mut ctx)
            .expect("boolean and long locals exist");
        let IrNode::Ternary(t) = &node else {
            panic!("expected ternary");
        };
        assert_eq!(t.condition.result_type(), Some(&Type::BOOLEAN));
        assert_eq!(t.then_expr.result_type(), Some(&Type::LONG));
        assert_eq!(t.else_expr.result_type(), Some(&Type::LONG));
        assert!(node.complexity() <= 9);
    }
}

#[test]
fn operator_count_stays_within_limit() {
    for seed in 0..40 {
        let mut ctx = ctx(seed);
        let Ok(node) = ExpressionParams::builder(&params(Type::INT, 40, 3))
            .expression_factory()
            .expect("params")
            .produce(&mut ctx)
        else {
            continue;
        };
        let mut operators = 0;
        walk(&node, &mut |n| {
            if matches!(
                n,
                IrNode::Binary(_) | IrNode::Unary(_) | IrNode::Ternary(_) | IrNode::Cast(_)
            ) {
                operators += 1;
            }
        });
        assert!(operators <= 3, "seed {seed}: {operators} operators in {node:?}");
    }
}

#[test]
fn string_plus_has_a_string_side() {
    for seed in 0..30 {
        let mut ctx = ctx(seed);
        let node = StringPlusFactory::new(params(Type::string(), 6, 2))
            .produce(&mut ctx)
            .expect("string local exists");
        let IrNode::Binary(b) = &node else {
            panic!("expected binary");
        };
        assert!(
            b.left.result_type().is_some_and(Type::is_string)
                || b.right.result_type().is_some_and(Type::is_string)
        );
    }
}
