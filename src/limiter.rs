//! Call-count ceiling for productions.

use crate::error::{ProductionError, ProductionResult};

/// Counts production attempts and trips once the ceiling is reached.
///
/// Tripping is fatal: the grammar is expected to terminate through its
/// shrinking budgets, so reaching the ceiling means something recursed
/// without bound.
#[derive(Debug, Clone)]
pub struct ProductionLimiter {
    limit: u64,
    used: u64,
}

impl ProductionLimiter {
    pub fn new(limit: u64) -> Self {
        Self { limit, used: 0 }
    }

    pub fn used(&self) -> u64 {
        self.used
    }

    /// Record one production attempt.
    pub fn limit_production(&mut self) -> ProductionResult<()> {
        self.used += 1;
        if self.used > self.limit {
            return Err(ProductionError::LimitExceeded { limit: self.limit });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trips_after_limit() {
        let mut limiter = ProductionLimiter::new(3);
        for _ in 0..3 {
            assert!(limiter.limit_production().is_ok());
        }
        let err = limiter.limit_production().unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err, ProductionError::LimitExceeded { limit: 3 });
    }

    #[test]
    fn used_counts_every_attempt() {
        let mut limiter = ProductionLimiter::new(2);
        for _ in 0..4 {
            let _ = limiter.limit_production();
        }
        assert_eq!(limiter.used(), 4);
    }
}
