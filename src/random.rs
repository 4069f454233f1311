//! Seeded random source shared by every factory.
//!
//! All randomness in a generation run flows through one `PseudoRandom`,
//! so a fixed seed replays the same program tree.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

pub struct PseudoRandom {
    seed: u64,
    rng: StdRng,
}

impl PseudoRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform value in `[0, 1)`.
    pub fn random(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    pub fn random_boolean(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }

    /// `true` with probability `p`. Values outside `[0, 1]` are clamped.
    pub fn random_boolean_with(&mut self, p: f64) -> bool {
        let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        self.rng.gen_bool(p)
    }

    /// Pick one element, or `None` for an empty slice.
    pub fn random_element<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    /// Value in `1..=n`. Returns 1 when `n` is 0.
    pub fn random_not_zero(&mut self, n: u64) -> u64 {
        if n <= 1 {
            return 1;
        }
        self.rng.gen_range(1..=n)
    }

    /// Value in `0..n`. Returns 0 when `n` is 0.
    pub fn random_not_negative(&mut self, n: u64) -> u64 {
        if n <= 1 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }

    /// Inclusive range helper, tolerant of `min > max`.
    pub fn range_inclusive(&mut self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    /// `floor(limit * random())`, the budget share handed to a child.
    pub fn fraction_of(&mut self, limit: u64) -> u64 {
        (limit as f64 * self.random()) as u64
    }
}

impl std::fmt::Debug for PseudoRandom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PseudoRandom")
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_replays_sequence() {
        let mut a = PseudoRandom::new(7);
        let mut b = PseudoRandom::new(7);
        for _ in 0..100 {
            assert_eq!(a.random().to_bits(), b.random().to_bits());
            assert_eq!(a.random_not_zero(50), b.random_not_zero(50));
        }
    }

    #[test]
    fn random_is_half_open_unit_interval() {
        let mut rng = PseudoRandom::new(1);
        for _ in 0..10_000 {
            let v = rng.random();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn not_zero_boundaries() {
        let mut rng = PseudoRandom::new(11);
        for _ in 0..1000 {
            assert_eq!(rng.random_not_zero(1), 1);
            let v = rng.random_not_zero(3);
            assert!((1..=3).contains(&v), "got {v}");
        }
        assert_eq!(rng.random_not_zero(0), 1);
    }

    #[test]
    fn not_negative_boundaries() {
        let mut rng = PseudoRandom::new(12);
        for _ in 0..1000 {
            assert_eq!(rng.random_not_negative(1), 0);
            let v = rng.random_not_negative(3);
            assert!(v < 3, "got {v}");
        }
        assert_eq!(rng.random_not_negative(0), 0);
    }

    #[test]
    fn not_zero_reaches_upper_bound() {
        let mut rng = PseudoRandom::new(5);
        let hit = (0..1000).any(|_| rng.random_not_zero(4) == 4);
        assert!(hit);
    }

    #[test]
    fn boolean_probability_extremes() {
        let mut rng = PseudoRandom::new(9);
        for _ in 0..100 {
            assert!(!rng.random_boolean_with(0.0));
            assert!(rng.random_boolean_with(1.0));
            assert!(rng.random_boolean_with(2.5));
            assert!(!rng.random_boolean_with(-1.0));
        }
    }

    #[test]
    fn random_element_of_empty_is_none() {
        let mut rng = PseudoRandom::new(0);
        let empty: [u8; 0] = [];
        assert!(rng.random_element(&empty).is_none());
        assert_eq!(rng.random_element(&[42]), Some(&42));
    }

    #[test]
    fn shuffle_keeps_elements() {
        let mut rng = PseudoRandom::new(21);
        let mut items: Vec<u32> = (0..20).collect();
        rng.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn fraction_never_exceeds_limit() {
        let mut rng = PseudoRandom::new(4);
        for limit in [0u64, 1, 2, 10, 1_000_000] {
            for _ in 0..200 {
                assert!(rng.fraction_of(limit) <= limit);
            }
        }
    }
}
