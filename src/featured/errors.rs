//! # Featured Errors
//!
//! Failures of the tally, resolver and announcement paths. All of them are
//! infrastructure failures; an empty tally is never an error.

use thiserror::Error;

use crate::executor::ExecutorError;
use crate::query::QueryError;
use crate::store::{CacheError, StoreError};

/// Result type for featured speaker operations
pub type FeaturedResult<T> = Result<T, FeaturedError>;

/// Featured speaker errors
#[derive(Debug, Error)]
pub enum FeaturedError {
    #[error("Tally cache failure: {0}")]
    Cache(#[from] CacheError),

    #[error("Entity store failure: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Execution(#[from] ExecutorError),

    /// An internal plan violated the query rules
    #[error("{0}")]
    Plan(#[from] QueryError),
}

impl FeaturedError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            FeaturedError::Cache(e) => e.status_code(),
            FeaturedError::Store(e) => e.status_code(),
            FeaturedError::Execution(_) => 500,
            FeaturedError::Plan(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            FeaturedError::from(CacheError::Unavailable("down".into())).status_code(),
            503
        );
        assert_eq!(
            FeaturedError::from(StoreError::LockPoisoned).status_code(),
            500
        );
    }
}
