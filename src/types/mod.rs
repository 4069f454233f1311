//! Java type model used by the generator.
//!
//! A [`Type`] is identified by its name: built-ins by keyword, klasses and
//! interfaces by their declared name, arrays by element type plus
//! dimension count. Klass metadata (parent, interfaces, flags) lives in the
//! [`TypeList`] registry rather than in the `Type` value itself, so types
//! stay cheap to clone and compare.

pub mod klass;
pub mod type_list;
pub mod util;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use klass::{KlassFlags, KlassInfo};
pub use type_list::{TypeList, TypeListMark};

/// Name of the universal root type.
pub const OBJECT: &str = "java.lang.Object";
/// Name of the built-in string klass.
pub const STRING: &str = "java.lang.String";

// ---------------------------------------------------------------------------
// Built-in types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuiltInType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
}

impl BuiltInType {
    /// Every value type, i.e. all built-ins except `void`.
    pub const VALUE_TYPES: [BuiltInType; 8] = [
        BuiltInType::Boolean,
        BuiltInType::Byte,
        BuiltInType::Char,
        BuiltInType::Short,
        BuiltInType::Int,
        BuiltInType::Long,
        BuiltInType::Float,
        BuiltInType::Double,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BuiltInType::Boolean => "boolean",
            BuiltInType::Byte => "byte",
            BuiltInType::Char => "char",
            BuiltInType::Short => "short",
            BuiltInType::Int => "int",
            BuiltInType::Long => "long",
            BuiltInType::Float => "float",
            BuiltInType::Double => "double",
            BuiltInType::Void => "void",
        }
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            BuiltInType::Byte
                | BuiltInType::Char
                | BuiltInType::Short
                | BuiltInType::Int
                | BuiltInType::Long
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(self, BuiltInType::Float | BuiltInType::Double)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integral() || self.is_floating()
    }

    /// Storage capacity rank. `char` and `short` share a rank but neither
    /// widens to the other.
    pub fn rank(self) -> Option<u8> {
        match self {
            BuiltInType::Byte => Some(1),
            BuiltInType::Short | BuiltInType::Char => Some(2),
            BuiltInType::Int => Some(3),
            BuiltInType::Long => Some(4),
            BuiltInType::Float => Some(5),
            BuiltInType::Double => Some(6),
            BuiltInType::Boolean | BuiltInType::Void => None,
        }
    }

    /// Identity or widening primitive conversion.
    pub fn can_widen_to(self, to: BuiltInType) -> bool {
        if self == to {
            return self != BuiltInType::Void;
        }
        match self {
            BuiltInType::Byte => matches!(
                to,
                BuiltInType::Short
                    | BuiltInType::Int
                    | BuiltInType::Long
                    | BuiltInType::Float
                    | BuiltInType::Double
            ),
            BuiltInType::Short | BuiltInType::Char => matches!(
                to,
                BuiltInType::Int | BuiltInType::Long | BuiltInType::Float | BuiltInType::Double
            ),
            BuiltInType::Int => matches!(
                to,
                BuiltInType::Long | BuiltInType::Float | BuiltInType::Double
            ),
            BuiltInType::Long => matches!(to, BuiltInType::Float | BuiltInType::Double),
            BuiltInType::Float => to == BuiltInType::Double,
            BuiltInType::Double | BuiltInType::Boolean | BuiltInType::Void => false,
        }
    }

    /// Type of a numeric operand after unary numeric promotion.
    pub fn unary_promoted(self) -> BuiltInType {
        match self {
            BuiltInType::Byte | BuiltInType::Short | BuiltInType::Char => BuiltInType::Int,
            other => other,
        }
    }

    /// Inclusive value range of an integral type.
    pub fn integral_range(self) -> Option<(i64, i64)> {
        match self {
            BuiltInType::Byte => Some((i8::MIN as i64, i8::MAX as i64)),
            BuiltInType::Short => Some((i16::MIN as i64, i16::MAX as i64)),
            BuiltInType::Char => Some((0, u16::MAX as i64)),
            BuiltInType::Int => Some((i32::MIN as i64, i32::MAX as i64)),
            BuiltInType::Long => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArrayType {
    /// Never an array itself; nesting is expressed through `dimensions`.
    pub element: Box<Type>,
    pub dimensions: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "lowercase")]
pub enum Type {
    BuiltIn(BuiltInType),
    Klass(String),
    Array(ArrayType),
}

impl Type {
    pub const BOOLEAN: Type = Type::BuiltIn(BuiltInType::Boolean);
    pub const BYTE: Type = Type::BuiltIn(BuiltInType::Byte);
    pub const CHAR: Type = Type::BuiltIn(BuiltInType::Char);
    pub const SHORT: Type = Type::BuiltIn(BuiltInType::Short);
    pub const INT: Type = Type::BuiltIn(BuiltInType::Int);
    pub const LONG: Type = Type::BuiltIn(BuiltInType::Long);
    pub const FLOAT: Type = Type::BuiltIn(BuiltInType::Float);
    pub const DOUBLE: Type = Type::BuiltIn(BuiltInType::Double);
    pub const VOID: Type = Type::BuiltIn(BuiltInType::Void);

    pub fn klass(name: impl Into<String>) -> Type {
        Type::Klass(name.into())
    }

    pub fn object() -> Type {
        Type::Klass(OBJECT.to_string())
    }

    pub fn string() -> Type {
        Type::Klass(STRING.to_string())
    }

    /// Array of `element` with `dimensions` extra dimensions. Nested array
    /// elements are flattened into a single dimension count.
    pub fn array_of(element: Type, dimensions: u32) -> Type {
        if dimensions == 0 {
            return element;
        }
        match element {
            Type::Array(inner) => Type::Array(ArrayType {
                element: inner.element,
                dimensions: inner.dimensions + dimensions,
            }),
            other => Type::Array(ArrayType {
                element: Box::new(other),
                dimensions,
            }),
        }
    }

    pub fn as_builtin(&self) -> Option<BuiltInType> {
        match self {
            Type::BuiltIn(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayType> {
        match self {
            Type::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn klass_name(&self) -> Option<&str> {
        match self {
            Type::Klass(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Type::BuiltIn(_))
    }

    pub fn is_void(&self) -> bool {
        *self == Type::VOID
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Type::Klass(_) | Type::Array(_))
    }

    pub fn is_numeric(&self) -> bool {
        self.as_builtin().is_some_and(BuiltInType::is_numeric)
    }

    pub fn is_integral(&self) -> bool {
        self.as_builtin().is_some_and(BuiltInType::is_integral)
    }

    pub fn is_string(&self) -> bool {
        self.klass_name() == Some(STRING)
    }

    pub fn is_object(&self) -> bool {
        self.klass_name() == Some(OBJECT)
    }

    /// Element type after stripping `count` dimensions, if the array has
    /// that many.
    pub fn strip_dimensions(&self, count: u32) -> Option<Type> {
        match self {
            Type::Array(a) if a.dimensions > count => Some(Type::Array(ArrayType {
                element: a.element.clone(),
                dimensions: a.dimensions - count,
            })),
            Type::Array(a) if a.dimensions == count => Some((*a.element).clone()),
            _ if count == 0 => Some(self.clone()),
            _ => None,
        }
    }

    /// Java source name, e.g. `int`, `Class_3`, `long[][]`.
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::BuiltIn(b) => f.write_str(b.as_str()),
            Type::Klass(name) => f.write_str(name),
            Type::Array(a) => {
                write!(f, "{}", a.element)?;
                for _ in 0..a.dimensions {
                    f.write_str("[]")?;
                }
                Ok(())
            }
        }
    }
}

impl From<BuiltInType> for Type {
    fn from(b: BuiltInType) -> Self {
        Type::BuiltIn(b)
    }
}
