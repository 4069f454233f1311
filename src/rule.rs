//! Production rule engine.
//!
//! A factory turns the current [`GenContext`] into one node. Factories
//! implement [`SafeFactory`]; the blanket [`Factory`] impl wraps every
//! production with the limiter check and a speculative scope, so a failed
//! production never leaves declarations or types behind.
//!
//! A [`Rule`] is one nonterminal: a named, weighted list of alternative
//! factories tried in weighted random order until one succeeds.

use std::borrow::Cow;
use std::cmp::Ordering;

use crate::context::GenContext;
use crate::error::{ProductionError, ProductionResult};
use crate::random::PseudoRandom;

/// The production body. Implementations may assume they run inside a
/// fresh speculative scope.
pub trait SafeFactory<T> {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<T>;
}

/// Entry point used by callers. Do not implement directly.
pub trait Factory<T> {
    fn produce(&self, ctx: &mut GenContext) -> ProductionResult<T>;
}

impl<T, F> Factory<T> for F
where
    F: SafeFactory<T> + ?Sized,
{
    fn produce(&self, ctx: &mut GenContext) -> ProductionResult<T> {
        ctx.limit_production()?;
        ctx.speculate(|ctx| self.sproduce(ctx))
    }
}

pub const DEFAULT_WEIGHT: f64 = 1.0;

struct Alternative<T> {
    name: Cow<'static, str>,
    weight: f64,
    factory: Box<dyn Factory<T>>,
}

/// Weighted backtracking choice between alternatives.
pub struct Rule<T> {
    name: &'static str,
    alternatives: Vec<Alternative<T>>,
}

impl<T> Rule<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            alternatives: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    pub fn add(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        factory: impl Factory<T> + 'static,
    ) -> &mut Self {
        self.add_weighted(name, DEFAULT_WEIGHT, factory)
    }

    /// Alternatives with a weight of zero or less are never tried.
    pub fn add_weighted(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        weight: f64,
        factory: impl Factory<T> + 'static,
    ) -> &mut Self {
        self.alternatives.push(Alternative {
            name: name.into(),
            weight,
            factory: Box::new(factory),
        });
        self
    }

    /// Indices of the alternatives in the order they will be tried.
    ///
    /// Each alternative draws `u^(1/w)` for uniform `u`, and alternatives
    /// are tried by descending key. The first pick is thus proportional to
    /// weight, and the rest follow the same law among the remainder.
    fn weighted_order(&self, rng: &mut PseudoRandom) -> Vec<usize> {
        let mut keyed: Vec<(f64, usize)> = self
            .alternatives
            .iter()
            .enumerate()
            .filter(|(_, alt)| alt.weight > 0.0)
            .map(|(i, alt)| (rng.random().powf(1.0 / alt.weight), i))
            .collect();
        keyed.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        keyed.into_iter().map(|(_, i)| i).collect()
    }
}

impl<T> SafeFactory<T> for Rule<T> {
    fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<T> {
        for index in self.weighted_order(&mut ctx.rng) {
            let alt = &self.alternatives[index];
            match alt.factory.produce(ctx) {
                Ok(node) => return Ok(node),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::trace!(rule = self.name, alternative = %alt.name, error = %e, "alternative failed");
                }
            }
        }
        Err(ProductionError::failed(format!(
            "{}: no alternative succeeded",
            self.name
        )))
    }
}

/// Hands out random shares of a budget. Shares are taken from what is
/// left, so their sum never exceeds the initial total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetSplitter {
    remaining: u64,
}

impl BudgetSplitter {
    pub fn new(total: u64) -> Self {
        Self { remaining: total }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// A random share in `1..=remaining`, or 0 once exhausted.
    pub fn take(&mut self, rng: &mut PseudoRandom) -> u64 {
        if self.remaining == 0 {
            return 0;
        }
        let share = rng.random_not_zero(self.remaining);
        self.remaining -= share;
        share
    }

    /// A random share that leaves at least `reserve` behind, so that later
    /// parts can still get one unit each. 0 when nothing can be spared.
    pub fn take_leaving(&mut self, rng: &mut PseudoRandom, reserve: u64) -> u64 {
        if self.remaining <= reserve {
            return 0;
        }
        let share = rng.random_not_zero(self.remaining - reserve);
        self.remaining -= share;
        share
    }

    /// Exactly `amount`, or nothing if not enough is left.
    pub fn take_exact(&mut self, amount: u64) -> Option<u64> {
        if amount > self.remaining {
            return None;
        }
        self.remaining -= amount;
        Some(amount)
    }

    /// Everything left.
    pub fn take_rest(&mut self) -> u64 {
        std::mem::take(&mut self.remaining)
    }

    /// Return the unused part of a share.
    pub fn refund(&mut self, amount: u64) {
        self.remaining = self.remaining.saturating_add(amount);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::params::ProductionParams;
    use crate::symbols::{SymbolFlags, VariableInfo};
    use crate::types::Type;

    struct Fixed(u32);

    impl SafeFactory<u32> for Fixed {
        fn sproduce(&self, _ctx: &mut GenContext) -> ProductionResult<u32> {
            Ok(self.0)
        }
    }

    /// Declares a variable, then fails.
    struct Leaky(Rc<Cell<u32>>);

    impl SafeFactory<u32> for Leaky {
        fn sproduce(&self, ctx: &mut GenContext) -> ProductionResult<u32> {
            self.0.set(self.0.get() + 1);
            let name = ctx.next_variable_name();
            ctx.symbols.add(VariableInfo::new(
                name,
                Type::klass("Test"),
                Type::INT,
                SymbolFlags::LOCAL,
            ));
            Err(ProductionError::failed("leaky"))
        }
    }

    struct Fatal;

    impl SafeFactory<u32> for Fatal {
        fn sproduce(&self, _ctx: &mut GenContext) -> ProductionResult<u32> {
            Err(ProductionError::missing("Fatal", "owner"))
        }
    }

    fn ctx() -> GenContext {
        GenContext::new(5, ProductionParams::default())
    }

    #[test]
    fn first_success_wins_and_failures_leave_no_symbols() {
        let calls = Rc::new(Cell::new(0));
        let mut rule = Rule::new("test");
        rule.add("leaky_a", Leaky(calls.clone()))
            .add("leaky_b", Leaky(calls.clone()))
            .add_weighted("fixed", 0.01, Fixed(7));
        let mut ctx = ctx();
        for _ in 0..20 {
            assert_eq!(rule.produce(&mut ctx), Ok(7));
        }
        assert!(calls.get() > 0);
        assert!(ctx.symbols.symbols().is_empty());
        assert_eq!(ctx.symbols.depth(), 1);
    }

    #[test]
    fn zero_weight_is_never_tried() {
        let mut rule = Rule::new("test");
        rule.add_weighted("never", 0.0, Fixed(1)).add("always", Fixed(2));
        let mut ctx = ctx();
        for _ in 0..50 {
            assert_eq!(rule.produce(&mut ctx), Ok(2));
        }
    }

    #[test]
    fn exhausted_rule_fails_routinely() {
        let mut rule: Rule<u32> = Rule::new("empty");
        let mut ctx = ctx();
        let err = rule.produce(&mut ctx).expect_err("no alternatives");
        assert!(!err.is_fatal());
        rule.add("leaky", Leaky(Rc::new(Cell::new(0))));
        assert!(!rule.produce(&mut ctx).expect_err("all fail").is_fatal());
    }

    #[test]
    fn fatal_error_stops_the_rule() {
        let mut rule = Rule::new("test");
        rule.add_weighted("fatal", 1000.0, Fatal).add_weighted("fixed", 0.001, Fixed(3));
        let mut ctx = ctx();
        let mut saw_fatal = false;
        for _ in 0..20 {
            match rule.produce(&mut ctx) {
                Err(e) => {
                    assert!(e.is_fatal());
                    saw_fatal = true;
                }
                Ok(v) => assert_eq!(v, 3),
            }
        }
        assert!(saw_fatal);
    }

    #[test]
    fn heavier_alternatives_are_tried_first_more_often() {
        let mut rule = Rule::new("test");
        rule.add_weighted("light", 0.1, Fixed(1)).add("heavy", Fixed(2));
        let mut ctx = ctx();
        let heavy = (0..1000)
            .filter(|_| rule.produce(&mut ctx) == Ok(2))
            .count();
        // Expected share is 1 / 1.1.
        assert!(heavy > 800, "heavy won {heavy} times");
    }

    #[test]
    fn limiter_trips_fatally() {
        let mut ctx = GenContext::new(
            1,
            ProductionParams {
                production_limit: 3,
                ..ProductionParams::default()
            },
        );
        for _ in 0..3 {
            assert_eq!(Fixed(1).produce(&mut ctx), Ok(1));
        }
        let err = Fixed(1).produce(&mut ctx).expect_err("limit reached");
        assert!(matches!(err, ProductionError::LimitExceeded { limit: 3 }));
    }

    #[test]
    fn splitter_shares_never_exceed_total() {
        let mut rng = PseudoRandom::new(9);
        for total in [0u64, 1, 2, 10, 1000] {
            let mut split = BudgetSplitter::new(total);
            let mut sum = 0;
            while !split.is_exhausted() {
                let share = split.take(&mut rng);
                assert!(share >= 1);
                sum += share;
            }
            assert_eq!(sum, total);
            assert_eq!(split.take(&mut rng), 0);
        }
    }

    #[test]
    fn splitter_leaves_a_reserve() {
        let mut rng = PseudoRandom::new(3);
        for _ in 0..100 {
            let mut split = BudgetSplitter::new(10);
            let shares: Vec<u64> = (0..4).map(|i| split.take_leaving(&mut rng, 3 - i)).collect();
            assert!(shares.iter().all(|s| *s >= 1), "{shares:?}");
            assert!(shares.iter().sum::<u64>() <= 10);
        }
        assert_eq!(BudgetSplitter::new(2).take_leaving(&mut rng, 2), 0);
    }

    #[test]
    fn splitter_refund_and_exact() {
        let mut split = BudgetSplitter::new(10);
        assert_eq!(split.take_exact(4), Some(4));
        assert_eq!(split.take_exact(7), None);
        split.refund(2);
        assert_eq!(split.take_rest(), 8);
        assert!(split.is_exhausted());
    }
}
