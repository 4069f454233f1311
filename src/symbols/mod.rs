//! Declared variables and functions.
//!
//! Every symbol has an owner klass. Locals and arguments are owned by the
//! klass whose method declares them and are told apart by the `LOCAL`
//! flag. Non-static methods carry the implicit `this` as their first
//! argument, so copying a method into a subclass means re-typing that
//! argument (see [`FunctionInfo::with_owner`]).

pub mod table;

use serde::{Deserialize, Serialize};

use crate::types::Type;

pub use table::SymbolTable;

/// Name of the implicit receiver argument.
pub const THIS: &str = "this";

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct SymbolFlags: u16 {
        const PUBLIC = 1 << 0;
        const PROTECTED = 1 << 1;
        const PRIVATE = 1 << 2;
        const STATIC = 1 << 3;
        const FINAL = 1 << 4;
        const ABSTRACT = 1 << 5;
        const SYNCHRONIZED = 1 << 6;
        const NONRECURSIVE = 1 << 7;
        const LOCAL = 1 << 8;
        const INITIALIZED = 1 << 9;
        const CONSTRUCTOR = 1 << 10;

        const ACCESS = Self::PUBLIC.bits() | Self::PROTECTED.bits() | Self::PRIVATE.bits();
    }
}

impl SymbolFlags {
    /// Package-private access: no access bit set.
    pub fn is_default_access(self) -> bool {
        !self.intersects(SymbolFlags::ACCESS)
    }

    /// Ordering used to reject overrides that weaken access.
    pub fn access_rank(self) -> u8 {
        if self.contains(SymbolFlags::PUBLIC) {
            3
        } else if self.contains(SymbolFlags::PROTECTED) {
            2
        } else if self.contains(SymbolFlags::PRIVATE) {
            0
        } else {
            1
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Variable,
    Function,
}

// ---------------------------------------------------------------------------
// Variables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableInfo {
    pub name: String,
    pub owner: Type,
    #[serde(rename = "type")]
    pub ty: Type,
    pub flags: SymbolFlags,
}

impl VariableInfo {
    pub fn new(name: impl Into<String>, owner: Type, ty: Type, flags: SymbolFlags) -> Self {
        Self {
            name: name.into(),
            owner,
            ty,
            flags,
        }
    }

    /// The implicit receiver of a non-static method of `owner`.
    pub fn this(owner: Type) -> Self {
        let ty = owner.clone();
        Self::new(
            THIS,
            owner,
            ty,
            SymbolFlags::LOCAL | SymbolFlags::FINAL | SymbolFlags::INITIALIZED,
        )
    }

    pub fn is_local(&self) -> bool {
        self.flags.contains(SymbolFlags::LOCAL)
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(SymbolFlags::STATIC)
    }

    pub fn is_final(&self) -> bool {
        self.flags.contains(SymbolFlags::FINAL)
    }

    pub fn is_private(&self) -> bool {
        self.flags.contains(SymbolFlags::PRIVATE)
    }

    pub fn is_this(&self) -> bool {
        self.name == THIS
    }

    /// May appear on the left of an assignment.
    pub fn is_assignable(&self) -> bool {
        !self.is_final() && !self.is_this()
    }
}

// ---------------------------------------------------------------------------
// Functions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    pub owner: Type,
    pub return_type: Type,
    /// Declared arguments. Non-static methods start with `this`.
    pub args: Vec<VariableInfo>,
    /// Cost of one call, i.e. the complexity of the body.
    pub complexity: u64,
    pub flags: SymbolFlags,
}

impl FunctionInfo {
    pub fn new(
        name: impl Into<String>,
        owner: Type,
        return_type: Type,
        args: Vec<VariableInfo>,
        complexity: u64,
        flags: SymbolFlags,
    ) -> Self {
        Self {
            name: name.into(),
            owner,
            return_type,
            args,
            complexity,
            flags,
        }
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(SymbolFlags::STATIC)
    }

    pub fn is_final(&self) -> bool {
        self.flags.contains(SymbolFlags::FINAL)
    }

    pub fn is_abstract(&self) -> bool {
        self.flags.contains(SymbolFlags::ABSTRACT)
    }

    pub fn is_private(&self) -> bool {
        self.flags.contains(SymbolFlags::PRIVATE)
    }

    pub fn is_constructor(&self) -> bool {
        self.flags.contains(SymbolFlags::CONSTRUCTOR)
    }

    pub fn is_nonrecursive(&self) -> bool {
        self.flags.contains(SymbolFlags::NONRECURSIVE)
    }

    /// Whether calls go through a receiver object.
    pub fn has_receiver(&self) -> bool {
        self.args.first().is_some_and(VariableInfo::is_this)
    }

    /// Arguments without the implicit receiver.
    pub fn explicit_args(&self) -> &[VariableInfo] {
        if self.has_receiver() {
            &self.args[1..]
        } else {
            &self.args
        }
    }

    /// `(name, argument types)` identity. Return type and receiver are
    /// ignored.
    pub fn has_equal_signature(&self, other: &FunctionInfo) -> bool {
        self.name == other.name
            && self.explicit_args().len() == other.explicit_args().len()
            && self
                .explicit_args()
                .iter()
                .zip(other.explicit_args())
                .all(|(a, b)| a.ty == b.ty)
    }

    /// Copy of this function as seen from `owner`: owner and receiver
    /// type are replaced.
    pub fn with_owner(&self, owner: &Type) -> FunctionInfo {
        let mut copy = self.clone();
        copy.owner = owner.clone();
        for arg in &mut copy.args {
            arg.owner = owner.clone();
            if arg.is_this() {
                arg.ty = owner.clone();
            }
        }
        copy
    }
}

// ---------------------------------------------------------------------------
// Symbol
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Symbol {
    Variable(VariableInfo),
    Function(FunctionInfo),
}

impl Symbol {
    pub fn kind(&self) -> SymbolKind {
        match self {
            Symbol::Variable(_) => SymbolKind::Variable,
            Symbol::Function(_) => SymbolKind::Function,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Symbol::Variable(v) => &v.name,
            Symbol::Function(f) => &f.name,
        }
    }

    pub fn owner(&self) -> &Type {
        match self {
            Symbol::Variable(v) => &v.owner,
            Symbol::Function(f) => &f.owner,
        }
    }

    pub fn flags(&self) -> SymbolFlags {
        match self {
            Symbol::Variable(v) => v.flags,
            Symbol::Function(f) => f.flags,
        }
    }

    pub fn as_variable(&self) -> Option<&VariableInfo> {
        match self {
            Symbol::Variable(v) => Some(v),
            Symbol::Function(_) => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionInfo> {
        match self {
            Symbol::Function(f) => Some(f),
            Symbol::Variable(_) => None,
        }
    }

    /// Same declaration slot: variables by name, functions by signature.
    pub fn same_declaration(&self, other: &Symbol) -> bool {
        match (self, other) {
            (Symbol::Variable(a), Symbol::Variable(b)) => a.name == b.name,
            (Symbol::Function(a), Symbol::Function(b)) => {
                a.has_equal_signature(b) && a.is_constructor() == b.is_constructor()
            }
            _ => false,
        }
    }
}

impl From<VariableInfo> for Symbol {
    fn from(v: VariableInfo) -> Self {
        Symbol::Variable(v)
    }
}

impl From<FunctionInfo> for Symbol {
    fn from(f: FunctionInfo) -> Self {
        Symbol::Function(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arg(name: &str, ty: Type) -> VariableInfo {
        VariableInfo::new(
            name,
            Type::klass("A"),
            ty,
            SymbolFlags::LOCAL | SymbolFlags::INITIALIZED,
        )
    }

    fn method(name: &str, ret: Type, args: Vec<VariableInfo>) -> FunctionInfo {
        let mut all = vec![VariableInfo::this(Type::klass("A"))];
        all.extend(args);
        FunctionInfo::new(name, Type::klass("A"), ret, all, 1, SymbolFlags::PUBLIC)
    }

    #[test]
    fn signature_ignores_return_type_and_receiver() {
        let f = method("func_1", Type::INT, vec![arg("var_1", Type::LONG)]);
        let g = FunctionInfo::new(
            "func_1",
            Type::klass("B"),
            Type::VOID,
            vec![arg("var_9", Type::LONG)],
            3,
            SymbolFlags::STATIC,
        );
        assert!(f.has_equal_signature(&g));
        let h = method("func_1", Type::INT, vec![arg("var_1", Type::INT)]);
        assert!(!f.has_equal_signature(&h));
        let k = method("func_2", Type::INT, vec![arg("var_1", Type::LONG)]);
        assert!(!f.has_equal_signature(&k));
    }

    #[test]
    fn with_owner_retypes_receiver() {
        let f = method("func_1", Type::INT, vec![arg("var_1", Type::LONG)]);
        let copy = f.with_owner(&Type::klass("B"));
        assert_eq!(copy.owner, Type::klass("B"));
        assert_eq!(copy.args[0].ty, Type::klass("B"));
        assert_eq!(copy.args[1].ty, Type::LONG);
        assert!(copy.has_equal_signature(&f));
    }

    #[test]
    fn explicit_args_skip_receiver() {
        let f = method("func_1", Type::INT, vec![arg("var_1", Type::LONG)]);
        assert!(f.has_receiver());
        assert_eq!(f.explicit_args().len(), 1);
    }

    #[test]
    fn this_is_not_assignable() {
        let this = VariableInfo::this(Type::klass("A"));
        assert!(!this.is_assignable());
        assert!(arg("var_1", Type::INT).is_assignable());
    }

    #[test]
    fn access_ranks() {
        assert!(SymbolFlags::PUBLIC.access_rank() > SymbolFlags::PROTECTED.access_rank());
        assert!(SymbolFlags::empty().is_default_access());
        assert!(SymbolFlags::empty().access_rank() > SymbolFlags::PRIVATE.access_rank());
    }
}
