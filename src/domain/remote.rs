use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};

/// Distinguishes the lifecycle of an asynchronously fetched value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Remote<T> {
    #[default]
    NotAsked,
    Loading,
    Success(T),
    Failure(String),
}

impl<T: Clone> Remote<T> {
    pub fn get_or_else(&self, default: T) -> T {
        match self {
            Remote::Success(value) => value.clone(),
            _ => default,
        }
    }

    /// Resolves the loaded value or fails validation with `reason`.
    pub fn get_or_fail(&self, reason: &str) -> Result<T> {
        match self {
            Remote::Success(value) => Ok(value.clone()),
            _ => Err(FlowError::validation(reason)),
        }
    }
}

impl<T> Remote<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Remote::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Remote::Success(_))
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Remote::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Remote<U> {
        match self {
            Remote::NotAsked => Remote::NotAsked,
            Remote::Loading => Remote::Loading,
            Remote::Success(value) => Remote::Success(f(value)),
            Remote::Failure(err) => Remote::Failure(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_else() {
        assert_eq!(Remote::Success(3).get_or_else(7), 3);
        assert_eq!(Remote::<u32>::Loading.get_or_else(7), 7);
        assert_eq!(Remote::<u32>::Failure("boom".into()).get_or_else(7), 7);
    }

    #[test]
    fn test_get_or_fail_carries_reason() {
        let err = Remote::<u32>::NotAsked.get_or_fail("NO_SWAP_QUOTE").unwrap_err();
        assert!(matches!(err, FlowError::Validation(reason) if reason == "NO_SWAP_QUOTE"));
        assert_eq!(Remote::Success(1).get_or_fail("unused").unwrap(), 1);
    }

    #[test]
    fn test_map_preserves_status() {
        assert_eq!(Remote::Success(2).map(|v| v * 2), Remote::Success(4));
        assert_eq!(
            Remote::<u32>::Failure("x".into()).map(|v| v * 2),
            Remote::Failure("x".into())
        );
    }
}
