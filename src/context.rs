//! Generation context threaded through every factory.
//!
//! `GenContext` owns all mutable state of a run: the random source, the
//! type registry, the symbol table and the production limiter. Factories
//! borrow it mutably for the duration of one production.

use crate::error::ProductionResult;
use crate::limiter::ProductionLimiter;
use crate::params::ProductionParams;
use crate::random::PseudoRandom;
use crate::symbols::SymbolTable;
use crate::types::TypeList;

#[derive(Debug)]
pub struct GenContext {
    pub rng: PseudoRandom,
    pub types: TypeList,
    pub symbols: SymbolTable,
    pub limiter: ProductionLimiter,
    pub params: ProductionParams,
    klass_number: u64,
}

impl GenContext {
    pub fn new(seed: u64, params: ProductionParams) -> Self {
        Self {
            rng: PseudoRandom::new(seed),
            types: TypeList::new(),
            symbols: SymbolTable::new(),
            limiter: ProductionLimiter::new(params.production_limit),
            params,
            klass_number: 0,
        }
    }

    pub fn limit_production(&mut self) -> ProductionResult<()> {
        self.limiter.limit_production()
    }

    /// Run `f` as a transaction. On success its declarations and types are
    /// committed to the enclosing scope; on failure both are rolled back.
    pub fn speculate<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> ProductionResult<T>,
    ) -> ProductionResult<T> {
        let depth = self.symbols.depth();
        let mark = self.types.checkpoint();
        self.symbols.push();
        let result = f(self);
        debug_assert_eq!(self.symbols.depth(), depth + 1, "unbalanced scope");
        match result {
            Ok(value) => {
                self.symbols.merge();
                Ok(value)
            }
            Err(e) => {
                self.symbols.pop();
                self.types.rollback(mark);
                Err(e)
            }
        }
    }

    /// Run `f` in a scope that is always discarded. Types registered by a
    /// successful `f` are kept.
    pub fn scoped<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> ProductionResult<T>,
    ) -> ProductionResult<T> {
        let depth = self.symbols.depth();
        let mark = self.types.checkpoint();
        self.symbols.push();
        let result = f(self);
        debug_assert_eq!(self.symbols.depth(), depth + 1, "unbalanced scope");
        self.symbols.pop();
        if result.is_err() {
            self.types.rollback(mark);
        }
        result
    }

    pub fn next_variable_name(&mut self) -> String {
        format!("var_{}", self.symbols.next_variable_number())
    }

    pub fn next_function_name(&mut self) -> String {
        format!("func_{}", self.symbols.next_function_number())
    }

    /// `Class_N` or `Interface_N`. The counter is shared and never rolled
    /// back, so a name is never reused.
    pub fn next_klass_name(&mut self, prefix: &str) -> String {
        self.klass_number += 1;
        format!("{prefix}_{}", self.klass_number)
    }
}
