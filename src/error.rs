//! Production failure types.
//!
//! A routine [`ProductionError::Failed`] means "this alternative does not
//! fit here" and is consumed by the enclosing [`Rule`](crate::rule::Rule)
//! or sequencing logic. The other variants are fatal: they abort the run
//! and are never retried.

use std::borrow::Cow;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductionError {
    #[error("production failed: {reason}")]
    Failed { reason: Cow<'static, str> },

    #[error("production limit of {limit} calls exceeded (stack overflow protection)")]
    LimitExceeded { limit: u64 },

    #[error("{factory}: required parameter `{parameter}` is not set")]
    MissingParameter {
        factory: &'static str,
        parameter: &'static str,
    },
}

impl ProductionError {
    pub fn failed(reason: impl Into<Cow<'static, str>>) -> Self {
        ProductionError::Failed {
            reason: reason.into(),
        }
    }

    pub fn missing(factory: &'static str, parameter: &'static str) -> Self {
        ProductionError::MissingParameter { factory, parameter }
    }

    /// Fatal errors abort the whole generation run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ProductionError::Failed { .. })
    }
}

pub type ProductionResult<T> = Result<T, ProductionError>;

/// Fail with a routine production error unless `cond` holds.
pub fn ensure(cond: bool, reason: &'static str) -> ProductionResult<()> {
    if cond {
        Ok(())
    } else {
        Err(ProductionError::failed(reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_failed_is_routine() {
        assert!(!ProductionError::failed("no candidates").is_fatal());
        assert!(ProductionError::LimitExceeded { limit: 10 }.is_fatal());
        assert!(ProductionError::missing("BlockFactory", "owner_klass").is_fatal());
    }

    #[test]
    fn messages_name_the_problem() {
        let err = ProductionError::missing("ForFactory", "statement_limit");
        assert_eq!(
            err.to_string(),
            "ForFactory: required parameter `statement_limit` is not set"
        );
        let err = ProductionError::LimitExceeded { limit: 5 };
        assert!(err.to_string().contains("stack overflow protection"));
    }

    #[test]
    fn ensure_maps_false_to_failure() {
        assert!(ensure(true, "unused").is_ok());
        let err = ensure(false, "budget exhausted").unwrap_err();
        assert_eq!(err.to_string(), "production failed: budget exhausted");
    }
}
