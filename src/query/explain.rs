//! Explain output for query plans.

use serde::Serialize;

use super::builder::QueryPlan;
use super::errors::QueryError;

/// Explain document: either an accepted plan or a rejection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainPlan {
    pub accepted: bool,
    pub entity: Option<String>,
    pub ancestor: Option<String>,
    pub clauses: Vec<String>,
    pub inequality_field: Option<String>,
    pub order_fields: Vec<String>,
    pub rejection_code: Option<String>,
    pub rejection_reason: Option<String>,
}

impl ExplainPlan {
    /// Explains a successful plan
    pub fn from_plan(plan: &QueryPlan) -> Self {
        Self {
            accepted: true,
            entity: Some(plan.entity.kind_name().to_string()),
            ancestor: plan.ancestor.as_ref().map(|key| key.path()),
            clauses: plan.clauses.iter().map(|c| c.describe()).collect(),
            inequality_field: plan.inequality_field.clone(),
            order_fields: plan.order_fields.clone(),
            rejection_code: None,
            rejection_reason: None,
        }
    }

    /// Explains a rejection
    pub fn from_error(err: &QueryError) -> Self {
        Self {
            accepted: false,
            entity: None,
            ancestor: None,
            clauses: Vec::new(),
            inequality_field: None,
            order_fields: Vec::new(),
            rejection_code: Some(err.code().code().to_string()),
            rejection_reason: Some(err.message().to_string()),
        }
    }

    /// Explains whatever the builder returned
    pub fn from_result(result: &Result<QueryPlan, QueryError>) -> Self {
        match result {
            Ok(plan) => Self::from_plan(plan),
            Err(err) => Self::from_error(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{EntityKind, QueryBuilder, RawFilter};
    use serde_json::json;

    #[test]
    fn test_explain_accepted() {
        let plan = QueryBuilder::new(EntityKind::Session)
            .build(&[RawFilter::new("START_TIME", "GTEQ", json!(18))])
            .unwrap();
        let explain = ExplainPlan::from_plan(&plan);

        assert!(explain.accepted);
        assert_eq!(explain.clauses, vec!["start_time >= 18"]);
        assert_eq!(explain.order_fields, vec!["start_time", "name"]);
    }

    #[test]
    fn test_explain_rejected() {
        let result = QueryBuilder::new(EntityKind::Session)
            .build(&[RawFilter::new("ROOM", "EQ", json!("A"))]);
        let explain = ExplainPlan::from_result(&result);

        assert!(!explain.accepted);
        assert_eq!(
            explain.rejection_code.as_deref(),
            Some("CONF_QUERY_INVALID_FILTER")
        );
    }
}
