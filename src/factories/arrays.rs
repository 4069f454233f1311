//! Array creation and indexing.
//!
//! Every dimension of every created array has `array_size` elements, so an
//! index literal drawn below that bound is always in range for arrays built
//! by the generator. Fields of array type that were never assigned are
//! still `null`; these expressions are therefore never used where
//! exceptions are forbidden.

use crate::builder::ExpressionParams;
use crate::context::GenContext;
use crate::error::{ensure, ProductionError, ProductionResult};
use crate::ir::{ArrayCreation, ArrayElement, ArrayExtraction, IrNode, Literal};
use crate::rule::{Factory, SafeFactory};
use crate::types::Type;

fn index(ctx: &mut GenContext) -> ProductionResult<IrNode> {
    let size = ctx.params.array_size;
    ensure(size > 0, "array: empty dimensions cannot be indexed")?;
    let i = ctx.rng.random_not_negative(size);
    Ok(IrNode::Literal(Literal::int(i as i64)))
}

fn source(
    p: &ExpressionParams,
    ctx: &mut GenContext,
    ty: Type,
    complexity_limit: u64,
) -> ProductionResult<IrNode> {
    ctx.types.add(ty.clone());
    p.builder()
        .result_type(ty)
        .complexity_limit(complexity_limit)
        .operator_limit(p.operator_limit - 1)
        .no_consts(true)
        .expression_factory()?
        .produce(ctx)
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// `new T[n]..[n]`.
#[derive(Debug, Clone)]
pub struct ArrayCreationFactory {
    p: ExpressionParams,
}

impl ArrayCreationFactory {
    pub fn new(p: ExpressionParams) -> Self {
        Self { p }
    }
}

impl SafeFactory<IrNode> for ArrayCreationFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        let p = &self.p;
        let array = p
            .result_type
            .as_array()
            .ok_or_else(|| ProductionError::failed("array creation: result is not an array"))?;
        ensure(p.operator_limit > 0, "array creation: no operators left")?;
        let dimensions = u64::from(array.dimensions);
        ensure(
            p.complexity_limit > dimensions,
            "array creation: complexity too small",
        )?;
        let size = ctx.params.array_size as i64;
        let sizes = (0..dimensions)
            .map(|_| IrNode::Literal(Literal::int(size)))
            .collect();
        ctx.types.add(p.result_type.clone());
        Ok(IrNode::ArrayCreation(ArrayCreation {
            ty: p.result_type.clone(),
            sizes,
        }))
    }
}

// ---------------------------------------------------------------------------
// Indexing
// ---------------------------------------------------------------------------

/// `a[i]` where `a` has one dimension more than the (array) result.
#[derive(Debug, Clone)]
pub struct ArrayElementFactory {
    p: ExpressionParams,
}

impl ArrayElementFactory {
    pub fn new(p: ExpressionParams) -> Self {
        Self { p }
    }
}

impl SafeFactory<IrNode> for ArrayElementFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        let p = &self.p;
        let array = p
            .result_type
            .as_array()
            .ok_or_else(|| ProductionError::failed("array element: result is not an array"))?;
        ensure(
            array.dimensions < ctx.params.dimensions_limit,
            "array element: source would exceed the dimension limit",
        )?;
        ensure(p.operator_limit > 0, "array element: no operators left")?;
        ensure(p.complexity_limit >= 3, "array element: complexity too small")?;
        let source_type = Type::array_of(p.result_type.clone(), 1);
        let array = source(p, ctx, source_type, p.complexity_limit - 2)?;
        let index = index(ctx)?;
        Ok(IrNode::ArrayElement(ArrayElement {
            ty: p.result_type.clone(),
            array: Box::new(array),
            index: Box::new(index),
        }))
    }
}

/// `a[i]..[j]` reaching a non-array element.
#[derive(Debug, Clone)]
pub struct ArrayExtractionFactory {
    p: ExpressionParams,
}

impl ArrayExtractionFactory {
    pub fn new(p: ExpressionParams) -> Self {
        Self { p }
    }
}

impl SafeFactory<IrNode> for ArrayExtractionFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        let p = &self.p;
        ensure(
            !p.result_type.is_array() && !p.result_type.is_void(),
            "array extraction: result must be an element type",
        )?;
        ensure(p.operator_limit > 0, "array extraction: no operators left")?;
        let dimensions = ctx
            .rng
            .random_not_zero(u64::from(ctx.params.dimensions_limit));
        ensure(
            ctx.params.dimensions_limit > 0 && p.complexity_limit >= 2 + dimensions,
            "array extraction: complexity too small",
        )?;
        let source_type = Type::array_of(p.result_type.clone(), dimensions as u32);
        let array = source(p, ctx, source_type, p.complexity_limit - 1 - dimensions)?;
        let indices = (0..dimensions)
            .map(|_| index(ctx))
            .collect::<ProductionResult<Vec<_>>>()?;
        Ok(IrNode::ArrayExtraction(ArrayExtraction {
            ty: p.result_type.clone(),
            array: Box::new(array),
            indices,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IrNodeBuilder;
    use crate::ir::Node;
    use crate::params::ProductionParams;

    fn ctx(seed: u64) -> GenContext {
        GenContext::new(seed, ProductionParams::small())
    }

    fn request(ty: Type, complexity: u64) -> IrNodeBuilder {
        IrNodeBuilder::new()
            .owner(Type::klass("Test"))
            .result_type(ty)
            .complexity_limit(complexity)
            .operator_limit(3)
    }

    #[test]
    fn creation_sizes_every_dimension() {
        let mut ctx = ctx(1);
        let ty = Type::array_of(Type::LONG, 2);
        let node = request(ty.clone(), 10)
            .array_creation_factory()
            .expect("params")
            .produce(&mut ctx)
            .expect("two dimensions fit");
        let IrNode::ArrayCreation(a) = &node else {
            panic!("expected array creation");
        };
        assert_eq!(a.sizes.len(), 2);
        for size in &a.sizes {
            let IrNode::Literal(lit) = size else {
                panic!("size must be a literal");
            };
            assert_eq!(lit.as_integral(), Some(ctx.params.array_size as i64));
        }
        assert!(ctx.types.contains(&ty));
        assert_eq!(node.complexity(), 3);
    }

    #[test]
    fn element_of_non_array_fails() {
        let mut ctx = ctx(2);
        let err = request(Type::INT, 50)
            .array_element_factory()
            .expect("params")
            .produce(&mut ctx)
            .expect_err("int is not an array");
        assert!(!err.is_fatal());
    }

    #[test]
    fn element_indexes_a_deeper_array() {
        for seed in 0..30 {
            let mut ctx = ctx(seed);
            let ty = Type::array_of(Type::INT, 1);
            let node = request(ty.clone(), 30)
                .array_element_factory()
                .expect("params")
                .produce(&mut ctx)
                .expect("int[][] can always be created");
            let IrNode::ArrayElement(e) = &node else {
                panic!("expected array element");
            };
            assert_eq!(e.ty, ty);
            assert_eq!(e.array.result_type(), Some(&Type::array_of(Type::INT, 2)));
            let IrNode::Literal(i) = &*e.index else {
                panic!("index must be a literal");
            };
            let i = i.as_integral().expect("int index");
            assert!((0..ctx.params.array_size as i64).contains(&i));
        }
    }

    #[test]
    fn extraction_reaches_the_element_type() {
        for seed in 0..30 {
            let mut ctx = ctx(seed);
            let node = request(Type::CHAR, 30)
                .array_extraction_factory()
                .expect("params")
                .produce(&mut ctx)
                .expect("char arrays can always be created");
            let IrNode::ArrayExtraction(x) = &node else {
                panic!("expected array extraction");
            };
            let dims = x.indices.len() as u32;
            assert!(dims >= 1 && dims <= ctx.params.dimensions_limit);
            assert_eq!(x.array.result_type(), Some(&Type::array_of(Type::CHAR, dims)));
            assert!(node.complexity() <= 30);
        }
    }
}
