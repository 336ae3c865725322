//! # Store Errors
//!
//! Error types for the entity store and the counter cache.

use thiserror::Error;

/// Result type for entity store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for counter cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Entity store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Web-safe key could not be decoded
    #[error("Invalid entity key: {0}")]
    InvalidKey(String),

    /// Conditional update targeted a missing entity
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Entity attributes could not be (de)serialized
    #[error("Malformed entity {key}: {reason}")]
    Malformed { key: String, reason: String },

    /// Backend is unreachable or refused the operation
    #[error("Entity store unavailable: {0}")]
    Unavailable(String),

    #[error("Entity store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::InvalidKey(_) => 400,
            StoreError::NotFound(_) => 404,
            StoreError::Malformed { .. } => 500,
            StoreError::Unavailable(_) => 503,
            StoreError::LockPoisoned => 500,
        }
    }
}

/// Counter cache errors
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// Backend is unreachable or refused the operation
    #[error("Counter cache unavailable: {0}")]
    Unavailable(String),

    /// Counter operation on a text entry
    #[error("Cache entry '{0}' is not a counter")]
    NotACounter(String),

    #[error("Counter cache lock poisoned")]
    LockPoisoned,
}

impl CacheError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            CacheError::Unavailable(_) => 503,
            CacheError::NotACounter(_) => 500,
            CacheError::LockPoisoned => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(StoreError::InvalidKey("x".into()).status_code(), 400);
        assert_eq!(StoreError::NotFound("x".into()).status_code(), 404);
        assert_eq!(CacheError::Unavailable("down".into()).status_code(), 503);
    }

    #[test]
    fn test_error_display() {
        let err = CacheError::NotACounter("tally:abc:Ada".into());
        assert!(err.to_string().contains("tally:abc:Ada"));
    }
}
