//! Fluent parameter façade for requesting factories.
//!
//! `IrNodeBuilder` accumulates optional parameters. Each `*_factory()`
//! getter reads the subset its factory needs, packs it into the factory's
//! parameter struct and fails with [`ProductionError::MissingParameter`]
//! when a required one was never set. A missing parameter is a contract
//! violation in the caller, so the error is fatal.
//!
//! Factories keep the parameter struct they were built from and seed child
//! requests from it through `builder()`, overriding only what changes.

use crate::error::{ProductionError, ProductionResult};
use crate::factories::arrays::{ArrayCreationFactory, ArrayElementFactory, ArrayExtractionFactory};
use crate::factories::block::{BlockFactory, SubBlockFactory};
use crate::factories::classes::{
    ClassDefinitionBlockFactory, InterfaceFactory, KlassFactory, MainKlassFactory,
};
use crate::factories::control_flow::{IfFactory, SwitchFactory, TryCatchFactory};
use crate::factories::declarations::{
    ArgumentDeclarationFactory, DeclarationFactory, VariableDeclarationBlockFactory,
    VariableDeclarationFactory, VariableInitializationFactory,
};
use crate::factories::expression::{ExpressionFactory, LimitedExpressionFactory};
use crate::factories::function_call::FunctionCallFactory;
use crate::factories::functions::{
    ConstructorDefinitionBlockFactory, ConstructorDefinitionFactory,
    FunctionDeclarationBlockFactory, FunctionDeclarationFactory, FunctionDefinitionBlockFactory,
    FunctionDefinitionFactory, FunctionRedefinitionBlockFactory, FunctionRedefinitionFactory,
    StaticConstructorDefinitionFactory,
};
use crate::factories::literal::LiteralFactory;
use crate::factories::loops::{DoWhileFactory, ForFactory, WhileFactory};
use crate::factories::statements::{
    BreakFactory, ContinueFactory, NothingFactory, ReturnFactory, StatementFactory, ThrowFactory,
};
use crate::factories::variable::VariableFactory;
use crate::symbols::FunctionInfo;
use crate::types::Type;

// ---------------------------------------------------------------------------
// Parameter structs
// ---------------------------------------------------------------------------

/// Everything an expression production depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionParams {
    pub owner: Type,
    pub result_type: Type,
    pub complexity_limit: u64,
    pub operator_limit: u64,
    /// No construct that can throw at runtime.
    pub exception_safe: bool,
    /// No literal at the root of the expression.
    pub no_consts: bool,
    /// No assignment, inc/dec, call or array anywhere in the tree.
    pub no_side_effects: bool,
}

impl ExpressionParams {
    pub fn builder(&self) -> IrNodeBuilder {
        IrNodeBuilder::new()
            .owner(self.owner.clone())
            .result_type(self.result_type.clone())
            .complexity_limit(self.complexity_limit)
            .operator_limit(self.operator_limit)
            .exception_safe(self.exception_safe)
            .no_side_effects(self.no_side_effects)
    }
}

/// Parameters of blocks and of every statement that can appear in one.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockParams {
    pub owner: Type,
    /// Result type of the enclosing function.
    pub result_type: Type,
    pub complexity_limit: u64,
    pub statement_limit: u64,
    pub operator_limit: u64,
    pub level: u32,
    pub can_have_breaks: bool,
    pub can_have_continues: bool,
    pub can_have_returns: bool,
}

impl BlockParams {
    pub fn builder(&self) -> IrNodeBuilder {
        IrNodeBuilder::new()
            .owner(self.owner.clone())
            .result_type(self.result_type.clone())
            .complexity_limit(self.complexity_limit)
            .statement_limit(self.statement_limit)
            .operator_limit(self.operator_limit)
            .level(self.level)
            .can_have_breaks(self.can_have_breaks)
            .can_have_continues(self.can_have_continues)
            .can_have_returns(self.can_have_returns)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationParams {
    pub owner: Type,
    pub complexity_limit: u64,
    pub operator_limit: u64,
    /// Block-local variable rather than a data member.
    pub is_local: bool,
    /// Static data member.
    pub is_static: bool,
    pub exception_safe: bool,
}

impl DeclarationParams {
    pub fn builder(&self) -> IrNodeBuilder {
        IrNodeBuilder::new()
            .owner(self.owner.clone())
            .complexity_limit(self.complexity_limit)
            .operator_limit(self.operator_limit)
            .is_local(self.is_local)
            .is_static(self.is_static)
            .exception_safe(self.exception_safe)
    }
}

/// Parameters of functions, constructors and the blocks holding them.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionParams {
    pub owner: Type,
    pub complexity_limit: u64,
    pub statement_limit: u64,
    pub operator_limit: u64,
    pub level: u32,
    /// Declarations are generated for an interface.
    pub in_interface: bool,
}

impl FunctionParams {
    pub fn builder(&self) -> IrNodeBuilder {
        IrNodeBuilder::new()
            .owner(self.owner.clone())
            .complexity_limit(self.complexity_limit)
            .statement_limit(self.statement_limit)
            .operator_limit(self.operator_limit)
            .level(self.level)
            .in_interface(self.in_interface)
    }
}

/// Parameters of klasses, interfaces and whole programs.
#[derive(Debug, Clone, PartialEq)]
pub struct KlassParams {
    pub complexity_limit: u64,
    pub statement_limit: u64,
    pub operator_limit: u64,
    pub level: u32,
}

impl KlassParams {
    pub fn builder(&self) -> IrNodeBuilder {
        IrNodeBuilder::new()
            .complexity_limit(self.complexity_limit)
            .statement_limit(self.statement_limit)
            .operator_limit(self.operator_limit)
            .level(self.level)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct IrNodeBuilder {
    owner: Option<Type>,
    result_type: Option<Type>,
    name: Option<String>,
    function: Option<FunctionInfo>,
    functions: Option<Vec<FunctionInfo>>,
    complexity_limit: Option<u64>,
    operator_limit: Option<u64>,
    statement_limit: Option<u64>,
    level: Option<u32>,
    member_limit: Option<u64>,
    exception_safe: bool,
    no_consts: bool,
    no_side_effects: bool,
    assignable: bool,
    is_local: bool,
    is_static: bool,
    in_interface: bool,
    can_have_breaks: bool,
    can_have_continues: bool,
    can_have_returns: bool,
}

macro_rules! setter {
    ($field:ident, $ty:ty) => {
        pub fn $field(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
    (flag $field:ident) => {
        pub fn $field(mut self, value: bool) -> Self {
            self.$field = value;
            self
        }
    };
}

fn require<T: Clone>(
    value: &Option<T>,
    factory: &'static str,
    parameter: &'static str,
) -> ProductionResult<T> {
    value
        .clone()
        .ok_or(ProductionError::missing(factory, parameter))
}

impl IrNodeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setter!(owner, Type);
    setter!(result_type, Type);
    setter!(function, FunctionInfo);
    setter!(functions, Vec<FunctionInfo>);
    setter!(complexity_limit, u64);
    setter!(operator_limit, u64);
    setter!(statement_limit, u64);
    setter!(level, u32);
    setter!(member_limit, u64);
    setter!(flag exception_safe);
    setter!(flag no_consts);
    setter!(flag no_side_effects);
    setter!(flag assignable);
    setter!(flag is_local);
    setter!(flag is_static);
    setter!(flag in_interface);
    setter!(flag can_have_breaks);
    setter!(flag can_have_continues);
    setter!(flag can_have_returns);

    pub fn name(mut self, value: impl Into<String>) -> Self {
        self.name = Some(value.into());
        self
    }

    // -- Parameter packs ----------------------------------------------------

    pub fn expression_params(&self, factory: &'static str) -> ProductionResult<ExpressionParams> {
        Ok(ExpressionParams {
            owner: require(&self.owner, factory, "owner")?,
            result_type: require(&self.result_type, factory, "result_type")?,
            complexity_limit: require(&self.complexity_limit, factory, "complexity_limit")?,
            operator_limit: require(&self.operator_limit, factory, "operator_limit")?,
            exception_safe: self.exception_safe,
            no_consts: self.no_consts,
            no_side_effects: self.no_side_effects,
        })
    }

    pub fn block_params(&self, factory: &'static str) -> ProductionResult<BlockParams> {
        Ok(BlockParams {
            owner: require(&self.owner, factory, "owner")?,
            result_type: require(&self.result_type, factory, "result_type")?,
            complexity_limit: require(&self.complexity_limit, factory, "complexity_limit")?,
            statement_limit: require(&self.statement_limit, factory, "statement_limit")?,
            operator_limit: require(&self.operator_limit, factory, "operator_limit")?,
            level: require(&self.level, factory, "level")?,
            can_have_breaks: self.can_have_breaks,
            can_have_continues: self.can_have_continues,
            can_have_returns: self.can_have_returns,
        })
    }

    pub fn declaration_params(&self, factory: &'static str) -> ProductionResult<DeclarationParams> {
        Ok(DeclarationParams {
            owner: require(&self.owner, factory, "owner")?,
            complexity_limit: require(&self.complexity_limit, factory, "complexity_limit")?,
            operator_limit: require(&self.operator_limit, factory, "operator_limit")?,
            is_local: self.is_local,
            is_static: self.is_static,
            exception_safe: self.exception_safe,
        })
    }

    pub fn function_params(&self, factory: &'static str) -> ProductionResult<FunctionParams> {
        Ok(FunctionParams {
            owner: require(&self.owner, factory, "owner")?,
            complexity_limit: require(&self.complexity_limit, factory, "complexity_limit")?,
            statement_limit: require(&self.statement_limit, factory, "statement_limit")?,
            operator_limit: require(&self.operator_limit, factory, "operator_limit")?,
            level: require(&self.level, factory, "level")?,
            in_interface: self.in_interface,
        })
    }

    pub fn klass_params(&self, factory: &'static str) -> ProductionResult<KlassParams> {
        Ok(KlassParams {
            complexity_limit: require(&self.complexity_limit, factory, "complexity_limit")?,
            statement_limit: require(&self.statement_limit, factory, "statement_limit")?,
            operator_limit: require(&self.operator_limit, factory, "operator_limit")?,
            level: require(&self.level, factory, "level")?,
        })
    }

    // -- Expressions --------------------------------------------------------

    pub fn expression_factory(&self) -> ProductionResult<ExpressionFactory> {
        Ok(ExpressionFactory::new(self.expression_params("Expression")?))
    }

    pub fn limited_expression_factory(&self) -> ProductionResult<LimitedExpressionFactory> {
        Ok(LimitedExpressionFactory::new(
            self.expression_params("LimitedExpression")?,
        ))
    }

    pub fn literal_factory(&self) -> ProductionResult<LiteralFactory> {
        Ok(LiteralFactory::new(
            require(&self.result_type, "Literal", "result_type")?,
            require(&self.complexity_limit, "Literal", "complexity_limit")?,
        ))
    }

    /// Variable reference. With `assignable(true)` only targets that may
    /// appear on the left of an assignment are produced.
    pub fn variable_factory(&self) -> ProductionResult<VariableFactory> {
        Ok(VariableFactory::new(
            self.expression_params("Variable")?,
            self.assignable,
        ))
    }

    pub fn function_call_factory(&self) -> ProductionResult<FunctionCallFactory> {
        Ok(FunctionCallFactory::new(
            self.expression_params("FunctionCall")?,
        ))
    }

    pub fn array_creation_factory(&self) -> ProductionResult<ArrayCreationFactory> {
        Ok(ArrayCreationFactory::new(
            self.expression_params("ArrayCreation")?,
        ))
    }

    pub fn array_element_factory(&self) -> ProductionResult<ArrayElementFactory> {
        Ok(ArrayElementFactory::new(
            self.expression_params("ArrayElement")?,
        ))
    }

    pub fn array_extraction_factory(&self) -> ProductionResult<ArrayExtractionFactory> {
        Ok(ArrayExtractionFactory::new(
            self.expression_params("ArrayExtraction")?,
        ))
    }

    // -- Statements ---------------------------------------------------------

    pub fn block_factory(&self) -> ProductionResult<BlockFactory> {
        Ok(BlockFactory::new(self.block_params("Block")?))
    }

    pub fn sub_block_factory(&self) -> ProductionResult<SubBlockFactory> {
        Ok(SubBlockFactory::new(self.block_params("Block")?))
    }

    pub fn statement_factory(&self) -> ProductionResult<StatementFactory> {
        Ok(StatementFactory::new(self.block_params("Statement")?))
    }

    pub fn nothing_factory(&self) -> NothingFactory {
        NothingFactory
    }

    pub fn break_factory(&self) -> BreakFactory {
        BreakFactory::new(self.can_have_breaks)
    }

    pub fn continue_factory(&self) -> ContinueFactory {
        ContinueFactory::new(self.can_have_continues)
    }

    pub fn return_factory(&self) -> ProductionResult<ReturnFactory> {
        Ok(ReturnFactory::new(self.block_params("Return")?))
    }

    pub fn throw_factory(&self) -> ProductionResult<ThrowFactory> {
        Ok(ThrowFactory::new(require(
            &self.complexity_limit,
            "Throw",
            "complexity_limit",
        )?))
    }

    pub fn if_factory(&self) -> ProductionResult<IfFactory> {
        Ok(IfFactory::new(self.block_params("If")?))
    }

    pub fn switch_factory(&self) -> ProductionResult<SwitchFactory> {
        Ok(SwitchFactory::new(self.block_params("Switch")?))
    }

    pub fn try_catch_factory(&self) -> ProductionResult<TryCatchFactory> {
        Ok(TryCatchFactory::new(self.block_params("TryCatch")?))
    }

    pub fn for_factory(&self) -> ProductionResult<ForFactory> {
        Ok(ForFactory::new(self.block_params("For")?))
    }

    pub fn while_factory(&self) -> ProductionResult<WhileFactory> {
        Ok(WhileFactory::new(self.block_params("While")?))
    }

    pub fn do_while_factory(&self) -> ProductionResult<DoWhileFactory> {
        Ok(DoWhileFactory::new(self.block_params("DoWhile")?))
    }

    // -- Declarations -------------------------------------------------------

    pub fn declaration_factory(&self) -> ProductionResult<DeclarationFactory> {
        Ok(DeclarationFactory::new(
            self.declaration_params("Declaration")?,
        ))
    }

    pub fn variable_declaration_factory(&self) -> ProductionResult<VariableDeclarationFactory> {
        Ok(VariableDeclarationFactory::new(
            self.declaration_params("VariableDeclaration")?,
        ))
    }

    pub fn variable_initialization_factory(
        &self,
    ) -> ProductionResult<VariableInitializationFactory> {
        Ok(VariableInitializationFactory::new(
            self.declaration_params("VariableInitialization")?,
        ))
    }

    pub fn variable_declaration_block_factory(
        &self,
    ) -> ProductionResult<VariableDeclarationBlockFactory> {
        Ok(VariableDeclarationBlockFactory::new(
            self.declaration_params("VariableDeclarationBlock")?,
            require(&self.member_limit, "VariableDeclarationBlock", "member_limit")?,
        ))
    }

    pub fn argument_declaration_factory(&self) -> ProductionResult<ArgumentDeclarationFactory> {
        Ok(ArgumentDeclarationFactory::new(require(
            &self.owner,
            "ArgumentDeclaration",
            "owner",
        )?))
    }

    pub fn function_definition_factory(&self) -> ProductionResult<FunctionDefinitionFactory> {
        Ok(FunctionDefinitionFactory::new(
            self.function_params("FunctionDefinition")?,
        ))
    }

    pub fn function_definition_block_factory(
        &self,
    ) -> ProductionResult<FunctionDefinitionBlockFactory> {
        Ok(FunctionDefinitionBlockFactory::new(
            self.function_params("FunctionDefinitionBlock")?,
            require(&self.member_limit, "FunctionDefinitionBlock", "member_limit")?,
        ))
    }

    pub fn function_declaration_factory(&self) -> ProductionResult<FunctionDeclarationFactory> {
        Ok(FunctionDeclarationFactory::new(
            self.function_params("FunctionDeclaration")?,
        ))
    }

    pub fn function_declaration_block_factory(
        &self,
    ) -> ProductionResult<FunctionDeclarationBlockFactory> {
        Ok(FunctionDeclarationBlockFactory::new(
            self.function_params("FunctionDeclarationBlock")?,
            require(&self.member_limit, "FunctionDeclarationBlock", "member_limit")?,
        ))
    }

    pub fn function_redefinition_factory(&self) -> ProductionResult<FunctionRedefinitionFactory> {
        Ok(FunctionRedefinitionFactory::new(
            self.function_params("FunctionRedefinition")?,
            require(&self.function, "FunctionRedefinition", "function")?,
        ))
    }

    pub fn function_redefinition_block_factory(
        &self,
    ) -> ProductionResult<FunctionRedefinitionBlockFactory> {
        Ok(FunctionRedefinitionBlockFactory::new(
            self.function_params("FunctionRedefinitionBlock")?,
            require(&self.functions, "FunctionRedefinitionBlock", "functions")?,
        ))
    }

    pub fn constructor_definition_factory(&self) -> ProductionResult<ConstructorDefinitionFactory> {
        Ok(ConstructorDefinitionFactory::new(
            self.function_params("ConstructorDefinition")?,
        ))
    }

    pub fn constructor_definition_block_factory(
        &self,
    ) -> ProductionResult<ConstructorDefinitionBlockFactory> {
        Ok(ConstructorDefinitionBlockFactory::new(
            self.function_params("ConstructorDefinitionBlock")?,
            require(&self.member_limit, "ConstructorDefinitionBlock", "member_limit")?,
        ))
    }

    pub fn static_constructor_definition_factory(
        &self,
    ) -> ProductionResult<StaticConstructorDefinitionFactory> {
        Ok(StaticConstructorDefinitionFactory::new(
            self.function_params("StaticConstructorDefinition")?,
        ))
    }

    // -- Classes ------------------------------------------------------------

    pub fn klass_factory(&self) -> ProductionResult<KlassFactory> {
        Ok(KlassFactory::new(self.klass_params("Klass")?))
    }

    pub fn interface_factory(&self) -> ProductionResult<InterfaceFactory> {
        Ok(InterfaceFactory::new(self.klass_params("Interface")?))
    }

    pub fn class_definition_block_factory(&self) -> ProductionResult<ClassDefinitionBlockFactory> {
        Ok(ClassDefinitionBlockFactory::new(
            self.klass_params("ClassDefinitionBlock")?,
            require(&self.member_limit, "ClassDefinitionBlock", "member_limit")?,
        ))
    }

    pub fn main_klass_factory(&self) -> ProductionResult<MainKlassFactory> {
        Ok(MainKlassFactory::new(
            require(&self.name, "MainKlass", "name")?,
            self.klass_params("MainKlass")?,
        ))
    }
}
