//! Generated-program tree.
//!
//! Expressions and statements share the closed [`IrNode`] enum. Class level
//! constructs are plain structs in [`decl`]. Everything implements [`Node`],
//! which provides the introspection the generator needs for budgeting and
//! depth repair:
//!
//! - `complexity()`: abstract cost used for budget accounting.
//! - `depth()`: control-flow nesting, 1 per deviation on the deepest path.
//! - `completes_normally()`: Java reachability, so that no statement is
//!   generated after a `return` and no non-void body falls off its end.
//! - `collect_stackable_leaves()` / `strip_deviations()`: the hooks for the
//!   minimum and maximum depth repair passes.

pub mod decl;
pub mod expr;
pub mod operator;
pub mod stmt;

use serde::{Deserialize, Serialize};

pub use decl::*;
pub use expr::*;
pub use operator::OperatorKind;
pub use stmt::*;

use crate::types::Type;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum IrNode {
    // Expressions
    Literal(Literal),
    Variable(Variable),
    Binary(BinaryOperator),
    Unary(UnaryOperator),
    Ternary(TernaryOperator),
    Cast(CastOperator),
    Call(FunctionCall),
    ArrayCreation(ArrayCreation),
    ArrayElement(ArrayElement),
    ArrayExtraction(ArrayExtraction),

    // Statements
    Statement(Statement),
    Nothing,
    Block(Block),
    Declaration(VariableDeclaration),
    Initialization(VariableInitialization),
    If(Box<If>),
    Switch(Box<Switch>),
    TryCatch(Box<TryCatch>),
    For(Box<For>),
    While(Box<While>),
    DoWhile(Box<DoWhile>),
    Break,
    Continue,
    Return(Return),
    Throw(Throw),
    PrintVariables(PrintVariables),
}

/// Introspection shared by every generated construct.
pub trait Node {
    fn complexity(&self) -> u64;

    /// Control-flow nesting depth.
    fn depth(&self) -> u32;

    fn is_cf_deviation(&self) -> bool {
        false
    }

    fn completes_normally(&self) -> bool {
        true
    }

    /// Blocks with no control-flow deviation beneath them.
    fn collect_stackable_leaves<'a>(&'a mut self, out: &mut Vec<&'a mut Block>);

    /// Reduce nesting so that `depth() <= allowance` where that can be done
    /// without changing reachability. Deviations that end abruptly or hold
    /// a `break` for an enclosing loop or switch are kept.
    fn strip_deviations(&mut self, allowance: u32);
}

fn sum<'a, I, N>(items: I) -> u64
where
    I: IntoIterator<Item = &'a N>,
    N: Node + 'a,
{
    items
        .into_iter()
        .fold(0u64, |acc, n| acc.saturating_add(n.complexity()))
}

fn max_depth<'a, I, N>(items: I) -> u32
where
    I: IntoIterator<Item = &'a N>,
    N: Node + 'a,
{
    items.into_iter().map(|n| n.depth()).max().unwrap_or(0)
}

impl IrNode {
    /// Static type of an expression node. `None` for statements.
    pub fn result_type(&self) -> Option<&Type> {
        match self {
            IrNode::Literal(l) => Some(&l.ty),
            IrNode::Variable(v) => Some(&v.info.ty),
            IrNode::Binary(b) => Some(&b.ty),
            IrNode::Unary(u) => Some(&u.ty),
            IrNode::Ternary(t) => Some(&t.ty),
            IrNode::Cast(c) => Some(&c.ty),
            IrNode::Call(c) => Some(c.result_type()),
            IrNode::ArrayCreation(a) => Some(&a.ty),
            IrNode::ArrayElement(a) => Some(&a.ty),
            IrNode::ArrayExtraction(a) => Some(&a.ty),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            IrNode::Block(b) => Some(b),
            _ => None,
        }
    }

    /// Ends the enclosing statement sequence unconditionally.
    pub fn is_jump(&self) -> bool {
        matches!(
            self,
            IrNode::Break | IrNode::Continue | IrNode::Return(_) | IrNode::Throw(_)
        )
    }

    /// Contains a `break` that leaves the innermost enclosing loop or
    /// switch around this node.
    pub fn breaks_out(&self) -> bool {
        match self {
            IrNode::Break => true,
            IrNode::Block(b) => b.breaks_out(),
            IrNode::If(i) => {
                i.then_block.breaks_out() || i.else_block.as_ref().is_some_and(Block::breaks_out)
            }
            IrNode::TryCatch(t) => {
                t.body.breaks_out()
                    || t.catches.iter().any(|c| c.body.breaks_out())
                    || t.finally.as_ref().is_some_and(Block::breaks_out)
            }
            _ => false,
        }
    }

    /// Visit every direct expression child.
    pub fn for_each_expr_child(&self, f: &mut dyn FnMut(&IrNode)) {
        match self {
            IrNode::Variable(v) => {
                if let VariableAccess::NonStatic { object } = &v.access {
                    f(object);
                }
            }
            IrNode::Binary(b) => {
                f(&b.left);
                f(&b.right);
            }
            IrNode::Unary(u) => f(&u.operand),
            IrNode::Ternary(t) => {
                f(&t.condition);
                f(&t.then_expr);
                f(&t.else_expr);
            }
            IrNode::Cast(c) => f(&c.expr),
            IrNode::Call(c) => {
                if let Some(r) = &c.receiver {
                    f(r);
                }
                c.args.iter().for_each(|a| f(a));
            }
            IrNode::ArrayCreation(a) => a.sizes.iter().for_each(|s| f(s)),
            IrNode::ArrayElement(a) => {
                f(&a.array);
                f(&a.index);
            }
            IrNode::ArrayExtraction(a) => {
                f(&a.array);
                a.indices.iter().for_each(|i| f(i));
            }
            IrNode::Statement(s) => f(&s.expr),
            IrNode::Initialization(i) => f(&i.init),
            IrNode::Return(r) => {
                if let Some(e) = &r.expr {
                    f(e);
                }
            }
            IrNode::If(i) => f(&i.condition),
            IrNode::Switch(s) => f(&s.selector),
            IrNode::For(l) => f(&l.control.condition.condition),
            IrNode::While(l) => f(&l.control.condition.condition),
            IrNode::DoWhile(l) => f(&l.control.condition.condition),
            _ => {}
        }
    }

    /// Visit every block nested directly in this node.
    pub fn for_each_block(&self, f: &mut dyn FnMut(&Block)) {
        match self {
            IrNode::Block(b) => f(b),
            IrNode::If(i) => {
                f(&i.then_block);
                if let Some(e) = &i.else_block {
                    f(e);
                }
            }
            IrNode::Switch(s) => s.cases.iter().for_each(|c| f(&c.body)),
            IrNode::TryCatch(t) => {
                f(&t.body);
                t.catches.iter().for_each(|c| f(&c.body));
                if let Some(fin) = &t.finally {
                    f(fin);
                }
            }
            IrNode::For(l) => {
                f(&l.header);
                f(&l.body);
            }
            IrNode::While(l) => {
                f(&l.header);
                f(&l.body1);
                f(&l.body2);
            }
            IrNode::DoWhile(l) => {
                f(&l.header);
                f(&l.body1);
                f(&l.body2);
            }
            _ => {}
        }
    }

    fn blocks_mut(&mut self) -> Vec<&mut Block> {
        match self {
            IrNode::Block(b) => vec![b],
            IrNode::If(i) => {
                let If {
                    then_block,
                    else_block,
                    ..
                } = &mut **i;
                let mut out = vec![then_block];
                out.extend(else_block.as_mut());
                out
            }
            IrNode::Switch(s) => s.cases.iter_mut().map(|c| &mut c.body).collect(),
            IrNode::TryCatch(t) => {
                let TryCatch {
                    body,
                    catches,
                    finally,
                } = &mut **t;
                let mut out = vec![body];
                out.extend(catches.iter_mut().map(|c| &mut c.body));
                out.extend(finally.as_mut());
                out
            }
            IrNode::For(l) => {
                let For { header, body, .. } = &mut **l;
                vec![header, body]
            }
            IrNode::While(l) => {
                let While {
                    header,
                    body1,
                    body2,
                    ..
                } = &mut **l;
                vec![header, body1, body2]
            }
            IrNode::DoWhile(l) => {
                let DoWhile {
                    header,
                    body1,
                    body2,
                    ..
                } = &mut **l;
                vec![header, body1, body2]
            }
            _ => Vec::new(),
        }
    }
}

fn loop_complexity(control: &Loop, header: &Block, bodies: &[&Block]) -> u64 {
    let per_iteration = bodies
        .iter()
        .fold(control.condition.condition.complexity(), |acc, b| {
            acc.saturating_add(b.complexity())
        })
        .saturating_add(1);
    1u64.saturating_add(header.complexity())
        .saturating_add(control.iterations.saturating_mul(per_iteration))
}

impl Node for IrNode {
    fn complexity(&self) -> u64 {
        match self {
            IrNode::Literal(_) | IrNode::Break | IrNode::Continue | IrNode::Throw(_) => 1,
            IrNode::Declaration(_) => 1,
            IrNode::Nothing => 0,
            IrNode::Variable(v) => match &v.access {
                VariableAccess::NonStatic { object } => 1 + object.complexity(),
                _ => 1,
            },
            IrNode::Call(c) => {
                let mut total = c.function.complexity.saturating_add(1);
                self.for_each_expr_child(&mut |e| total = total.saturating_add(e.complexity()));
                total
            }
            IrNode::Statement(s) => s.expr.complexity(),
            IrNode::Block(b) => b.complexity(),
            IrNode::PrintVariables(p) => 1 + p.variables.len() as u64,
            IrNode::If(i) => {
                let mut total = 1 + i.condition.complexity();
                self.for_each_block(&mut |b| total = total.saturating_add(b.complexity()));
                total
            }
            IrNode::Switch(s) => {
                let mut total = 1 + s.selector.complexity();
                self.for_each_block(&mut |b| total = total.saturating_add(b.complexity()));
                total
            }
            IrNode::TryCatch(_) => {
                let mut total = 1u64;
                self.for_each_block(&mut |b| total = total.saturating_add(b.complexity()));
                total
            }
            IrNode::For(l) => loop_complexity(&l.control, &l.header, &[&l.body]),
            IrNode::While(l) => loop_complexity(&l.control, &l.header, &[&l.body1, &l.body2]),
            IrNode::DoWhile(l) => loop_complexity(&l.control, &l.header, &[&l.body1, &l.body2]),
            _ => {
                let mut total = 1u64;
                self.for_each_expr_child(&mut |e| total = total.saturating_add(e.complexity()));
                total
            }
        }
    }

    fn depth(&self) -> u32 {
        let mut deepest = 0;
        self.for_each_block(&mut |b| deepest = deepest.max(b.depth()));
        if self.is_cf_deviation() {
            deepest + 1
        } else {
            deepest
        }
    }

    fn is_cf_deviation(&self) -> bool {
        matches!(
            self,
            IrNode::If(_)
                | IrNode::Switch(_)
                | IrNode::TryCatch(_)
                | IrNode::For(_)
                | IrNode::While(_)
                | IrNode::DoWhile(_)
        )
    }

    fn completes_normally(&self) -> bool {
        match self {
            IrNode::Break | IrNode::Continue | IrNode::Return(_) | IrNode::Throw(_) => false,
            IrNode::Block(b) => b.completes_normally(),
            IrNode::If(i) => match &i.else_block {
                None => true,
                Some(e) => i.then_block.completes_normally() || e.completes_normally(),
            },
            IrNode::Switch(s) => {
                !s.has_default()
                    || s.cases.last().is_some_and(|c| c.body.completes_normally())
                    || s.cases.iter().any(|c| c.body.breaks_out())
            }
            IrNode::TryCatch(t) => {
                let try_or_catch = t.body.completes_normally()
                    || t.catches.iter().any(|c| c.body.completes_normally());
                try_or_catch && t.finally.as_ref().map_or(true, Block::completes_normally)
            }
            IrNode::DoWhile(l) => {
                l.body2.completes_normally() || l.body1.breaks_out() || l.body2.breaks_out()
            }
            _ => true,
        }
    }

    fn collect_stackable_leaves<'a>(&'a mut self, out: &mut Vec<&'a mut Block>) {
        for block in self.blocks_mut() {
            block.collect_stackable_leaves(out);
        }
    }

    fn strip_deviations(&mut self, allowance: u32) {
        let inner = if self.is_cf_deviation() {
            allowance.saturating_sub(1)
        } else {
            allowance
        };
        for block in self.blocks_mut() {
            block.strip_deviations(inner);
        }
    }
}

impl Block {
    pub fn breaks_out(&self) -> bool {
        self.children.iter().any(IrNode::breaks_out)
    }

    /// Visit every node below this block, statements and expressions
    /// alike, in pre-order.
    pub fn walk(&self, f: &mut dyn FnMut(&IrNode)) {
        for child in &self.children {
            child.walk(f);
        }
    }
}

impl IrNode {
    /// Visit this node and everything below it in pre-order.
    pub fn walk(&self, f: &mut dyn FnMut(&IrNode)) {
        f(self);
        self.for_each_expr_child(&mut |e| e.walk(f));
        self.for_each_block(&mut |b| b.walk(f));
    }
}

impl Node for Block {
    fn complexity(&self) -> u64 {
        sum(&self.children)
    }

    fn depth(&self) -> u32 {
        max_depth(&self.children)
    }

    fn completes_normally(&self) -> bool {
        self.children.iter().all(|c| c.completes_normally())
    }

    fn collect_stackable_leaves<'a>(&'a mut self, out: &mut Vec<&'a mut Block>) {
        if self.depth() == 0 {
            out.push(self);
            return;
        }
        for child in &mut self.children {
            child.collect_stackable_leaves(out);
        }
    }

    fn strip_deviations(&mut self, allowance: u32) {
        self.children.retain(|child| {
            !(allowance == 0
                && child.is_cf_deviation()
                && child.depth() > allowance
                && child.completes_normally()
                && !child.breaks_out())
        });
        for child in &mut self.children {
            if child.depth() > allowance {
                child.strip_deviations(allowance);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

macro_rules! body_node {
    ($ty:ty) => {
        impl Node for $ty {
            fn complexity(&self) -> u64 {
                self.body.complexity()
            }

            fn depth(&self) -> u32 {
                self.body.depth()
            }

            fn collect_stackable_leaves<'a>(&'a mut self, out: &mut Vec<&'a mut Block>) {
                self.body.collect_stackable_leaves(out);
            }

            fn strip_deviations(&mut self, allowance: u32) {
                self.body.strip_deviations(allowance);
            }
        }
    };
}

body_node!(FunctionDefinition);
body_node!(FunctionRedefinition);
body_node!(ConstructorDefinition);
body_node!(StaticConstructorDefinition);

impl Node for FunctionDeclaration {
    fn complexity(&self) -> u64 {
        1
    }

    fn depth(&self) -> u32 {
        0
    }

    fn collect_stackable_leaves<'a>(&'a mut self, _out: &mut Vec<&'a mut Block>) {}

    fn strip_deviations(&mut self, _allowance: u32) {}
}

impl Node for VariableDeclarationBlock {
    fn complexity(&self) -> u64 {
        sum(&self.declarations)
    }

    fn depth(&self) -> u32 {
        0
    }

    fn collect_stackable_leaves<'a>(&'a mut self, _out: &mut Vec<&'a mut Block>) {}

    fn strip_deviations(&mut self, _allowance: u32) {}
}

macro_rules! list_node {
    ($ty:ty, $field:ident) => {
        impl Node for $ty {
            fn complexity(&self) -> u64 {
                sum(&self.$field)
            }

            fn depth(&self) -> u32 {
                max_depth(&self.$field)
            }

            fn collect_stackable_leaves<'a>(&'a mut self, out: &mut Vec<&'a mut Block>) {
                for item in &mut self.$field {
                    item.collect_stackable_leaves(out);
                }
            }

            fn strip_deviations(&mut self, allowance: u32) {
                for item in &mut self.$field {
                    item.strip_deviations(allowance);
                }
            }
        }
    };
}

list_node!(FunctionDefinitionBlock, functions);
list_node!(FunctionDeclarationBlock, functions);
list_node!(FunctionRedefinitionBlock, functions);
list_node!(ConstructorDefinitionBlock, constructors);
list_node!(ClassDefinitionBlock, definitions);

impl Node for Klass {
    fn complexity(&self) -> u64 {
        self.data_members
            .complexity()
            .saturating_add(self.static_constructor.as_ref().map_or(0, Node::complexity))
            .saturating_add(self.constructors.complexity())
            .saturating_add(self.redefinitions.complexity())
            .saturating_add(self.functions.complexity())
            .saturating_add(self.abstract_functions.complexity())
    }

    fn depth(&self) -> u32 {
        self.static_constructor
            .as_ref()
            .map_or(0, Node::depth)
            .max(self.constructors.depth())
            .max(self.redefinitions.depth())
            .max(self.functions.depth())
    }

    fn collect_stackable_leaves<'a>(&'a mut self, out: &mut Vec<&'a mut Block>) {
        if let Some(s) = &mut self.static_constructor {
            s.collect_stackable_leaves(out);
        }
        self.constructors.collect_stackable_leaves(out);
        self.redefinitions.collect_stackable_leaves(out);
        self.functions.collect_stackable_leaves(out);
    }

    fn strip_deviations(&mut self, allowance: u32) {
        if let Some(s) = &mut self.static_constructor {
            s.strip_deviations(allowance);
        }
        self.constructors.strip_deviations(allowance);
        self.redefinitions.strip_deviations(allowance);
        self.functions.strip_deviations(allowance);
    }
}

impl Node for Interface {
    fn complexity(&self) -> u64 {
        self.functions.complexity()
    }

    fn depth(&self) -> u32 {
        0
    }

    fn collect_stackable_leaves<'a>(&'a mut self, _out: &mut Vec<&'a mut Block>) {}

    fn strip_deviations(&mut self, _allowance: u32) {}
}

impl Node for TypeDefinition {
    fn complexity(&self) -> u64 {
        match self {
            TypeDefinition::Klass(k) => k.complexity(),
            TypeDefinition::Interface(i) => i.complexity(),
        }
    }

    fn depth(&self) -> u32 {
        match self {
            TypeDefinition::Klass(k) => k.depth(),
            TypeDefinition::Interface(i) => i.depth(),
        }
    }

    fn collect_stackable_leaves<'a>(&'a mut self, out: &mut Vec<&'a mut Block>) {
        match self {
            TypeDefinition::Klass(k) => k.collect_stackable_leaves(out),
            TypeDefinition::Interface(i) => i.collect_stackable_leaves(out),
        }
    }

    fn strip_deviations(&mut self, allowance: u32) {
        match self {
            TypeDefinition::Klass(k) => k.strip_deviations(allowance),
            TypeDefinition::Interface(i) => i.strip_deviations(allowance),
        }
    }
}

impl Node for MainKlass {
    fn complexity(&self) -> u64 {
        self.data_members
            .complexity()
            .saturating_add(self.functions.complexity())
            .saturating_add(self.test_body.complexity())
            .saturating_add(1 + self.print_variables.variables.len() as u64)
    }

    fn depth(&self) -> u32 {
        self.functions.depth().max(self.test_body.depth())
    }

    fn collect_stackable_leaves<'a>(&'a mut self, out: &mut Vec<&'a mut Block>) {
        self.functions.collect_stackable_leaves(out);
        self.test_body.collect_stackable_leaves(out);
    }

    fn strip_deviations(&mut self, allowance: u32) {
        self.functions.strip_deviations(allowance);
        self.test_body.strip_deviations(allowance);
    }
}

impl Node for Program {
    fn complexity(&self) -> u64 {
        self.classes
            .as_ref()
            .map_or(0, Node::complexity)
            .saturating_add(self.main.complexity())
    }

    fn depth(&self) -> u32 {
        self.classes
            .as_ref()
            .map_or(0, Node::depth)
            .max(self.main.depth())
    }

    fn collect_stackable_leaves<'a>(&'a mut self, out: &mut Vec<&'a mut Block>) {
        if let Some(c) = &mut self.classes {
            c.collect_stackable_leaves(out);
        }
        self.main.collect_stackable_leaves(out);
    }

    fn strip_deviations(&mut self, allowance: u32) {
        if let Some(c) = &mut self.classes {
            c.strip_deviations(allowance);
        }
        self.main.strip_deviations(allowance);
    }
}
