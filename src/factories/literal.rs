use crate::context::GenContext;
use crate::error::{ensure, ProductionError, ProductionResult};
use crate::ir::{IrNode, Literal, LiteralValue};
use crate::rule::SafeFactory;
use crate::types::{BuiltInType, Type};

/// Constant of a built-in type or `String`.
#[derive(Debug, Clone)]
pub struct LiteralFactory {
    result_type: Type,
    complexity_limit: u64,
}

impl LiteralFactory {
    pub fn new(result_type: Type, complexity_limit: u64) -> Self {
        Self {
            result_type,
            complexity_limit,
        }
    }

    /// Produce the literal value without wrapping it in a node.
    pub fn literal(&self, ctx: &mut GenContext) -> ProductionResult<Literal> {
        ensure(self.complexity_limit >= 1, "literal: no complexity left")?;
        let value = if self.result_type.is_string() {
            let len = ctx
                .rng
                .random_not_negative(ctx.params.string_literal_size_limit + 1);
            let text: String = (0..len)
                .map(|_| char::from(b'a' + ctx.rng.random_not_negative(26) as u8))
                .collect();
            LiteralValue::String(text)
        } else {
            let builtin = self
                .result_type
                .as_builtin()
                .ok_or_else(|| ProductionError::failed("literal: no literal for reference type"))?;
            builtin_value(ctx, builtin)?
        };
        Ok(Literal {
            value,
            ty: self.result_type.clone(),
        })
    }
}

fn builtin_value(ctx: &mut GenContext, builtin: BuiltInType) -> ProductionResult<LiteralValue> {
    Ok(match builtin {
        BuiltInType::Boolean => LiteralValue::Boolean(ctx.rng.random_boolean()),
        BuiltInType::Char => {
            LiteralValue::Integral(i64::from(b'a') + ctx.rng.random_not_negative(26) as i64)
        }
        BuiltInType::Float | BuiltInType::Double => {
            let precision = ctx.params.floating_point_precision.min(15);
            let scale = 10f64.powi(precision as i32);
            let magnitude = ctx.rng.random() * 10f64.powi(ctx.rng.random_not_negative(6) as i32);
            let signed = if ctx.rng.random_boolean() {
                -magnitude
            } else {
                magnitude
            };
            let rounded = (signed * scale).round() / scale;
            let value = if builtin == BuiltInType::Float {
                f64::from(rounded as f32)
            } else {
                rounded
            };
            LiteralValue::Floating(value)
        }
        BuiltInType::Void => return Err(ProductionError::failed("literal: void has no values")),
        integral => {
            let (min, max) = integral
                .integral_range()
                .ok_or_else(|| ProductionError::failed("literal: unsupported type"))?;
            LiteralValue::Integral(ctx.rng.range_inclusive(min, max))
        }
    })
}

impl SafeFactory<IrNode> for LiteralFactory {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<IrNode> {
        self.literal(ctx).map(IrNode::Literal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ProductionParams;
    use crate::rule::Factory;

    fn produce(ctx: &mut GenContext, ty: Type) -> ProductionResult<IrNode> {
        LiteralFactory::new(ty, 1).produce(ctx)
    }

    #[test]
    fn boolean_literal_is_true_or_false() {
        let mut ctx = GenContext::new(3, ProductionParams::default());
        let mut seen = [false; 2];
        for _ in 0..200 {
            match produce(&mut ctx, Type::BOOLEAN) {
                Ok(IrNode::Literal(Literal {
                    value: LiteralValue::Boolean(b),
                    ty,
                })) => {
                    assert_eq!(ty, Type::BOOLEAN);
                    seen[usize::from(b)] = true;
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(seen, [true, true]);
    }

    #[test]
    fn integral_literals_fit_their_type() {
        let mut ctx = GenContext::new(4, ProductionParams::default());
        for builtin in [
            BuiltInType::Byte,
            BuiltInType::Short,
            BuiltInType::Char,
            BuiltInType::Int,
            BuiltInType::Long,
        ] {
            let (min, max) = builtin.integral_range().expect("integral");
            for _ in 0..200 {
                let lit = LiteralFactory::new(Type::BuiltIn(builtin), 1)
                    .literal(&mut ctx)
                    .expect("integral literal");
                let v = lit.as_integral().expect("integral value");
                assert!(min <= v && v <= max, "{builtin:?} literal {v}");
                if builtin == BuiltInType::Char {
                    assert!((i64::from(b'a')..=i64::from(b'z')).contains(&v));
                }
            }
        }
    }

    #[test]
    fn floating_literals_respect_precision() {
        let params = ProductionParams {
            floating_point_precision: 2,
            ..ProductionParams::default()
        };
        let mut ctx = GenContext::new(5, params);
        for _ in 0..100 {
            let lit = LiteralFactory::new(Type::DOUBLE, 1)
                .literal(&mut ctx)
                .expect("double literal");
            let LiteralValue::Floating(v) = lit.value else {
                panic!("expected floating literal");
            };
            let scaled = v * 100.0;
            assert!((scaled - scaled.round()).abs() < 1e-6, "{v} has more than 2 digits");
        }
    }

    #[test]
    fn string_literal_length_is_bounded() {
        let params = ProductionParams {
            string_literal_size_limit: 3,
            ..ProductionParams::default()
        };
        let mut ctx = GenContext::new(6, params);
        for _ in 0..100 {
            let lit = LiteralFactory::new(Type::string(), 1)
                .literal(&mut ctx)
                .expect("string literal");
            let LiteralValue::String(s) = lit.value else {
                panic!("expected string literal");
            };
            assert!(s.len() <= 3);
        }
    }

    #[test]
    fn reference_and_void_types_fail() {
        let mut ctx = GenContext::new(7, ProductionParams::default());
        assert!(produce(&mut ctx, Type::object()).is_err());
        assert!(produce(&mut ctx, Type::VOID).is_err());
        assert!(LiteralFactory::new(Type::INT, 0).produce(&mut ctx).is_err());
    }
}
