//! Scoped symbol table with speculative scopes.
//!
//! The table is a stack of scopes. [`SymbolTable::push`] opens a scope for
//! a production that might fail; [`SymbolTable::merge`] commits it into the
//! enclosing scope and [`SymbolTable::pop`] throws it away. Lookups see
//! the union of every scope on the stack.

use std::collections::BTreeMap;

use super::{FunctionInfo, Symbol, SymbolKind, VariableInfo};
use crate::types::{Type, TypeList};

#[derive(Debug, Clone, Default, PartialEq)]
struct Scope {
    /// Owner klass to its symbols, in declaration order.
    symbols: BTreeMap<Type, Vec<Symbol>>,
}

#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    variable_number: u64,
    function_number: u64,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
            variable_number: 0,
            function_number: 0,
        }
    }

    /// Number of open scopes, the root included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    // -- Scope discipline ---------------------------------------------------

    pub fn push(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Discard the innermost scope. The root scope is never discarded.
    pub fn pop(&mut self) {
        debug_assert!(self.scopes.len() > 1, "pop of the root scope");
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Fold the innermost scope into its parent.
    pub fn merge(&mut self) {
        debug_assert!(self.scopes.len() > 1, "merge of the root scope");
        if self.scopes.len() < 2 {
            return;
        }
        let Some(top) = self.scopes.pop() else {
            return;
        };
        if let Some(parent) = self.scopes.last_mut() {
            for (owner, symbols) in top.symbols {
                parent.symbols.entry(owner).or_default().extend(symbols);
            }
        }
    }

    // -- Mutation -----------------------------------------------------------

    /// Declare `symbol` in the innermost scope.
    pub fn add(&mut self, symbol: impl Into<Symbol>) {
        let symbol = symbol.into();
        if let Some(scope) = self.scopes.last_mut() {
            scope
                .symbols
                .entry(symbol.owner().clone())
                .or_default()
                .push(symbol);
        }
    }

    /// Remove the innermost declaration occupying the same slot as
    /// `symbol`. Returns whether anything was removed.
    pub fn remove(&mut self, symbol: &Symbol) -> bool {
        for scope in self.scopes.iter_mut().rev() {
            let Some(list) = scope.symbols.get_mut(symbol.owner()) else {
                continue;
            };
            if let Some(pos) = list.iter().rposition(|s| s.same_declaration(symbol)) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    // -- Lookup -------------------------------------------------------------

    /// Visible symbols of `kind` declared on `owner`, outermost first.
    pub fn get(&self, owner: &Type, kind: SymbolKind) -> Vec<&Symbol> {
        self.scopes
            .iter()
            .filter_map(|scope| scope.symbols.get(owner))
            .flatten()
            .filter(|s| s.kind() == kind)
            .collect()
    }

    pub fn get_variables(&self, owner: &Type) -> Vec<&VariableInfo> {
        self.get(owner, SymbolKind::Variable)
            .into_iter()
            .filter_map(Symbol::as_variable)
            .collect()
    }

    pub fn get_functions(&self, owner: &Type) -> Vec<&FunctionInfo> {
        self.get(owner, SymbolKind::Function)
            .into_iter()
            .filter_map(Symbol::as_function)
            .collect()
    }

    /// Every visible symbol of `kind`, grouped by owner.
    pub fn get_all(&self, kind: SymbolKind) -> Vec<&Symbol> {
        let mut owners: Vec<&Type> = self
            .scopes
            .iter()
            .flat_map(|scope| scope.symbols.keys())
            .collect();
        owners.sort();
        owners.dedup();
        owners
            .into_iter()
            .flat_map(|owner| self.get(owner, kind))
            .collect()
    }

    /// Symbols of `kind` declared on `owner` or any of its ancestors. An
    /// entry hides ancestor entries for the same slot, so the most derived
    /// declaration wins. Within one owner the latest declaration wins.
    pub fn get_all_combined(&self, owner: &Type, kind: SymbolKind, types: &TypeList) -> Vec<&Symbol> {
        let mut chain = vec![owner.clone()];
        if let Some(name) = owner.klass_name() {
            chain.extend(types.ancestors(name).into_iter().map(Type::Klass));
        }
        let mut out: Vec<&Symbol> = Vec::new();
        for klass in &chain {
            for symbol in self.get(klass, kind).into_iter().rev() {
                let hidden = out.iter().any(|seen| seen.same_declaration(symbol));
                // Private members and constructors are not inherited.
                let inherited = klass == owner
                    || !(symbol.flags().contains(super::SymbolFlags::PRIVATE)
                        || symbol.flags().contains(super::SymbolFlags::CONSTRUCTOR));
                if !hidden && inherited {
                    out.push(symbol);
                }
            }
        }
        out
    }

    /// Every visible symbol, for scope comparisons.
    pub fn symbols(&self) -> Vec<&Symbol> {
        let mut out = self.get_all(SymbolKind::Variable);
        out.extend(self.get_all(SymbolKind::Function));
        out
    }

    // -- Naming -------------------------------------------------------------

    /// Monotonic counter for `var_N` names. Never rolled back.
    pub fn next_variable_number(&mut self) -> u64 {
        self.variable_number += 1;
        self.variable_number
    }

    /// Monotonic counter for `func_N` names. Never rolled back.
    pub fn next_function_number(&mut self) -> u64 {
        self.function_number += 1;
        self.function_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolFlags;
    use crate::types::{KlassFlags, KlassInfo, OBJECT};

    fn var(owner: &str, name: &str, ty: Type) -> VariableInfo {
        VariableInfo::new(name, Type::klass(owner), ty, SymbolFlags::INITIALIZED)
    }

    fn func(owner: &str, name: &str, flags: SymbolFlags) -> FunctionInfo {
        FunctionInfo::new(name, Type::klass(owner), Type::INT, vec![], 1, flags)
    }

    #[test]
    fn unknown_lookup_is_empty() {
        let table = SymbolTable::new();
        assert!(table.get(&Type::klass("Nope"), SymbolKind::Variable).is_empty());
        assert!(table.get_all(SymbolKind::Function).is_empty());
    }

    #[test]
    fn pop_discards_and_merge_commits() {
        let mut table = SymbolTable::new();
        table.push();
        table.add(var("A", "var_1", Type::INT));
        table.pop();
        assert!(table.get_variables(&Type::klass("A")).is_empty());
        assert_eq!(table.depth(), 1);

        table.push();
        table.add(var("A", "var_2", Type::INT));
        table.merge();
        assert_eq!(table.depth(), 1);
        let vars = table.get_variables(&Type::klass("A"));
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].name, "var_2");
    }

    #[test]
    fn nested_merge_then_pop_discards_everything() {
        let mut table = SymbolTable::new();
        table.add(var("A", "var_0", Type::INT));
        let before: Vec<Symbol> = table.symbols().into_iter().cloned().collect();

        table.push();
        table.add(var("A", "var_1", Type::INT));
        table.push();
        table.add(var("A", "var_2", Type::INT));
        table.merge();
        table.pop();

        let after: Vec<Symbol> = table.symbols().into_iter().cloned().collect();
        assert_eq!(before, after);
        assert_eq!(table.depth(), 1);
    }

    #[test]
    fn lookups_see_all_scopes_in_order() {
        let mut table = SymbolTable::new();
        table.add(var("A", "var_1", Type::INT));
        table.push();
        table.add(var("A", "var_2", Type::LONG));
        let names: Vec<&str> = table
            .get_variables(&Type::klass("A"))
            .iter()
            .map(|v| v.name.as_str())
            .collect();
        assert_eq!(names, vec!["var_1", "var_2"]);
        table.pop();
    }

    #[test]
    fn remove_takes_innermost_declaration() {
        let mut table = SymbolTable::new();
        let f = func("A", "func_1", SymbolFlags::PUBLIC | SymbolFlags::NONRECURSIVE);
        table.add(f.clone());
        assert!(table.remove(&Symbol::Function(f.clone())));
        assert!(table.get_functions(&Type::klass("A")).is_empty());
        assert!(!table.remove(&Symbol::Function(f)));
    }

    #[test]
    fn combined_lookup_walks_ancestors_and_hides_overrides() {
        let mut types = TypeList::new();
        types.add_klass(KlassInfo::new("A", Some(OBJECT.into()), KlassFlags::empty()));
        types.add_klass(KlassInfo::new("B", Some("A".into()), KlassFlags::empty()));

        let mut table = SymbolTable::new();
        table.add(func("A", "func_1", SymbolFlags::PUBLIC));
        table.add(func("A", "func_2", SymbolFlags::PRIVATE));
        table.add(func("B", "func_1", SymbolFlags::PUBLIC | SymbolFlags::FINAL));

        let combined = table.get_all_combined(&Type::klass("B"), SymbolKind::Function, &types);
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].owner(), &Type::klass("B"));
        assert!(combined[0].flags().contains(SymbolFlags::FINAL));
    }

    #[test]
    fn combined_lookup_prefers_latest_redeclaration() {
        let types = TypeList::new();
        let mut table = SymbolTable::new();
        table.add(func("A", "func_1", SymbolFlags::PUBLIC));
        table.push();
        table.add(func("A", "func_1", SymbolFlags::PUBLIC | SymbolFlags::NONRECURSIVE));
        let combined = table.get_all_combined(&Type::klass("A"), SymbolKind::Function, &types);
        assert_eq!(combined.len(), 1);
        assert!(combined[0].flags().contains(SymbolFlags::NONRECURSIVE));
        table.pop();
        let combined = table.get_all_combined(&Type::klass("A"), SymbolKind::Function, &types);
        assert!(!combined[0].flags().contains(SymbolFlags::NONRECURSIVE));
    }

    #[test]
    fn counters_are_monotonic() {
        let mut table = SymbolTable::new();
        let a = table.next_variable_number();
        table.push();
        let b = table.next_variable_number();
        table.pop();
        let c = table.next_variable_number();
        assert!(a < b && b < c);
        assert_eq!(table.next_function_number(), 1);
    }
}
