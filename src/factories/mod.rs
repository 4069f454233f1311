//! One factory per grammar nonterminal.
//!
//! Expression factories live in `expression`, `literal`, `variable`,
//! `operators`, `function_call` and `arrays`. Statement factories live in
//! `statements`, `declarations`, `block`, `control_flow` and `loops`.
//! Class level factories live in `functions` and `classes`.

pub mod arrays;
pub mod block;
pub mod classes;
pub mod control_flow;
pub mod declarations;
pub mod expression;
pub mod function_call;
pub mod functions;
pub mod literal;
pub mod loops;
pub mod operators;
pub mod statements;
pub mod variable;

use crate::context::GenContext;
use crate::error::{ProductionError, ProductionResult};
use crate::symbols::{Symbol, SymbolFlags};
use crate::types::Type;

/// Exceptions usable in `catch`, most specific first. Catch clauses sorted
/// by this order never shadow one another. Only the first
/// [`THROWABLE_EXCEPTIONS`] are unchecked and may be thrown without a
/// `throws` clause.
pub const UNCHECKED_EXCEPTIONS: [&str; 6] = [
    "java.lang.ArithmeticException",
    "java.lang.NullPointerException",
    "java.lang.IllegalStateException",
    "java.lang.RuntimeException",
    "java.lang.Exception",
    "java.lang.Throwable",
];

pub const THROWABLE_EXCEPTIONS: usize = 4;

/// Position of `ty` in [`UNCHECKED_EXCEPTIONS`].
pub fn exception_rank(ty: &Type) -> usize {
    ty.klass_name()
        .and_then(|name| UNCHECKED_EXCEPTIONS.iter().position(|e| *e == name))
        .unwrap_or(UNCHECKED_EXCEPTIONS.len())
}

/// Random access modifier. Package-private is represented by no bit.
pub(crate) fn random_access(ctx: &mut GenContext) -> SymbolFlags {
    match ctx.rng.random_not_negative(4) {
        0 => SymbolFlags::PUBLIC,
        1 => SymbolFlags::PROTECTED,
        2 => SymbolFlags::PRIVATE,
        _ => SymbolFlags::empty(),
    }
}

/// Random registered value type. With `allow_arrays` an array of a
/// registered element type may be created and registered on the way.
pub(crate) fn random_value_type(ctx: &mut GenContext, allow_arrays: bool) -> ProductionResult<Type> {
    let candidates: Vec<Type> = ctx
        .types
        .get_all()
        .into_iter()
        .filter(|t| !t.is_array())
        .collect();
    let element = ctx
        .rng
        .random_element(&candidates)
        .cloned()
        .ok_or_else(|| ProductionError::failed("no value types registered"))?;
    if allow_arrays && !ctx.params.disable_arrays && ctx.rng.random_boolean_with(0.2) {
        let dimensions = ctx.rng.random_not_zero(u64::from(ctx.params.dimensions_limit)) as u32;
        let array = Type::array_of(element, dimensions);
        ctx.types.add(array.clone());
        return Ok(array);
    }
    Ok(element)
}

/// Whether code in `owner` may refer to `symbol`.
///
/// Members of `owner` and its ancestors are always candidates; private
/// members of ancestors are never inherited, so callers pass those through
/// [`SymbolTable::get_all_combined`](crate::symbols::SymbolTable::get_all_combined).
/// Members of unrelated klasses are visible unless private or external
/// symbols are disabled.
pub(crate) fn is_visible_from(ctx: &GenContext, owner: &Type, symbol: &Symbol) -> bool {
    let declared = symbol.owner();
    if declared == owner {
        return true;
    }
    if let (Some(sub), Some(sup)) = (owner.klass_name(), declared.klass_name()) {
        if ctx.types.is_subtype_of(sub, sup) {
            return !symbol.flags().contains(SymbolFlags::PRIVATE);
        }
    }
    !ctx.params.disable_external_symbols && !symbol.flags().contains(SymbolFlags::PRIVATE)
}

/// `owner` names a klass that can be instantiated with `new`.
pub(crate) fn is_instantiable(ctx: &GenContext, owner: &Type) -> bool {
    ctx.types
        .klass_of(owner)
        .is_some_and(|k| !k.is_abstract())
}
