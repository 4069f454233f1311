//! Class-level declarations: functions, constructors, klasses, programs.

use serde::{Deserialize, Serialize};

use super::{Block, IrNode, PrintVariables};
use crate::symbols::{FunctionInfo, VariableInfo};
use crate::types::{KlassFlags, Type};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentDeclaration {
    pub variable: VariableInfo,
}

/// Data members of a klass: declarations and initializations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclarationBlock {
    pub declarations: Vec<IrNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub function: FunctionInfo,
    pub args: Vec<ArgumentDeclaration>,
    pub body: Block,
}

/// Abstract method: signature only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub function: FunctionInfo,
    pub args: Vec<ArgumentDeclaration>,
}

/// Override of an inherited method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionRedefinition {
    pub function: FunctionInfo,
    pub args: Vec<ArgumentDeclaration>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorDefinition {
    pub function: FunctionInfo,
    pub args: Vec<ArgumentDeclaration>,
    pub body: Block,
}

/// `static { .. }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticConstructorDefinition {
    pub body: Block,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinitionBlock {
    pub functions: Vec<FunctionDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclarationBlock {
    pub functions: Vec<FunctionDeclaration>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionRedefinitionBlock {
    pub functions: Vec<FunctionRedefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstructorDefinitionBlock {
    pub constructors: Vec<ConstructorDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Klass {
    pub name: String,
    pub parent: Type,
    pub interfaces: Vec<Type>,
    pub flags: KlassFlags,
    pub data_members: VariableDeclarationBlock,
    pub static_constructor: Option<StaticConstructorDefinition>,
    pub constructors: ConstructorDefinitionBlock,
    pub redefinitions: FunctionRedefinitionBlock,
    pub functions: FunctionDefinitionBlock,
    pub abstract_functions: FunctionDeclarationBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    pub parent: Option<Type>,
    pub functions: FunctionDeclarationBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeDefinition {
    Klass(Klass),
    Interface(Interface),
}

impl TypeDefinition {
    pub fn name(&self) -> &str {
        match self {
            TypeDefinition::Klass(k) => &k.name,
            TypeDefinition::Interface(i) => &i.name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassDefinitionBlock {
    pub definitions: Vec<TypeDefinition>,
}

/// The class holding the test entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainKlass {
    pub name: String,
    pub data_members: VariableDeclarationBlock,
    pub functions: FunctionDefinitionBlock,
    /// Body of the non-static `test()` method.
    pub test_body: Block,
    pub print_variables: PrintVariables,
}

/// A complete generated program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub seed: u64,
    pub classes: Option<ClassDefinitionBlock>,
    pub main: MainKlass,
}
