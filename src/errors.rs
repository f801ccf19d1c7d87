//! Error types for the resource pool

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Error type accepted from factory and reset hooks.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Hook error kept behind an `Arc` so that [`PoolError`] stays `Clone`.
pub type SharedError = Arc<dyn StdError + Send + Sync>;

#[derive(Error, Debug, Clone)]
pub enum PoolError {
    #[error("Invalid pool configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Resource factory failed: {0}")]
    FactoryFailed(#[source] SharedError),

    #[error("Timed out after {0:?} waiting for a resource")]
    Timeout(Duration),

    #[error("Reset hook failed, resource discarded: {0}")]
    ResetFailed(#[source] SharedError),

    #[error("Pool is empty - no resources available")]
    PoolEmpty,

    #[error("Resource was leased from a different pool")]
    ForeignResource,

    #[error("Operation was cancelled")]
    Cancelled,

    #[cfg(feature = "metrics")]
    #[error("Metrics export failed: {0}")]
    MetricsExport(String),
}

impl PoolError {
    pub(crate) fn factory(err: BoxError) -> Self {
        Self::FactoryFailed(Arc::from(err))
    }

    pub(crate) fn reset(err: BoxError) -> Self {
        Self::ResetFailed(Arc::from(err))
    }

    /// Whether retrying the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::PoolEmpty | Self::FactoryFailed(_)
        )
    }
}

pub type PoolResult<T> = Result<T, PoolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_error_keeps_source() {
        let err = PoolError::factory("disk on fire".into());

        assert_eq!(err.to_string(), "Resource factory failed: disk on fire");
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("disk on fire"));
    }

    #[test]
    fn test_errors_are_cloneable() {
        let err = PoolError::reset("bad state".into());
        let copy = err.clone();

        assert_eq!(err.to_string(), copy.to_string());
        assert!(!copy.is_transient());
        assert!(PoolError::Timeout(Duration::from_millis(5)).is_transient());
    }
}
