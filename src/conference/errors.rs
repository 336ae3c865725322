//! # Service Errors

use thiserror::Error;

use crate::executor::ExecutorError;
use crate::featured::FeaturedError;
use crate::query::QueryError;
use crate::store::{CacheError, StoreError};
use crate::tasks::TaskError;

/// Result type for conference service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Conference service errors
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Query(#[from] QueryError),

    #[error("{0}")]
    Execution(#[from] ExecutorError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Cache(#[from] CacheError),

    #[error("{0}")]
    Featured(#[from] FeaturedError),

    #[error("{0}")]
    Task(#[from] TaskError),
}

impl ServiceError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::NotFound(_) => 404,
            ServiceError::Query(_) => 400,
            ServiceError::Execution(_) => 500,
            ServiceError::Store(e) => e.status_code(),
            ServiceError::Cache(e) => e.status_code(),
            ServiceError::Featured(e) => e.status_code(),
            ServiceError::Task(e) => match e {
                TaskError::QueueClosed => 503,
                _ => 500,
            },
        }
    }

    /// Stable machine-readable code, where the failing subsystem defines one
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            ServiceError::Query(e) => Some(e.code().code()),
            ServiceError::Execution(e) => Some(e.code().code()),
            ServiceError::Featured(FeaturedError::Execution(e)) => Some(e.code().code()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{EntityKind, QueryBuilder, RawFilter};
    use serde_json::json;

    #[test]
    fn test_status_codes() {
        assert_eq!(ServiceError::BadRequest("x".into()).status_code(), 400);
        assert_eq!(ServiceError::NotFound("x".into()).status_code(), 404);
        assert_eq!(
            ServiceError::from(StoreError::InvalidKey("zz".into())).status_code(),
            400
        );
        assert_eq!(
            ServiceError::from(CacheError::Unavailable("down".into())).status_code(),
            503
        );
    }

    #[test]
    fn test_query_errors_carry_code() {
        let err = QueryBuilder::new(EntityKind::Conference)
            .build(&[RawFilter::new("VENUE", "EQ", json!("x"))])
            .unwrap_err();
        let err = ServiceError::from(err);

        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), Some("CONF_QUERY_INVALID_FILTER"));
    }
}
