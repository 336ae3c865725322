//! Query builder
//!
//! Turns client filters into an immutable, orderable plan. Building never
//! touches the store.
//!
//! Steps (strict order):
//! 1. Validate every raw filter (fail fast on the first invalid one)
//! 2. Track the first field used with a non-`EQ` operator
//! 3. Reject a second, different inequality field
//! 4. Order by `[inequality field, name]`, or `[name]` alone

use serde::Serialize;

use crate::store::EntityKey;

use super::clause::{FilterClause, RawFilter};
use super::errors::{QueryError, QueryResult};
use super::fields::EntityKind;
use super::validator::FilterSpecValidator;

/// Immutable query plan over one entity collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPlan {
    /// Target collection
    pub entity: EntityKind,
    /// Restrict to descendants of this key
    pub ancestor: Option<EntityKey>,
    /// Filter clauses (all combined with AND)
    pub clauses: Vec<FilterClause>,
    /// The single field carrying non-equality filters, if any
    pub inequality_field: Option<String>,
    /// Sort keys, most significant first
    pub order_fields: Vec<String>,
}

impl QueryPlan {
    /// Unfiltered plan ordered by the default sort field
    pub fn new(entity: EntityKind) -> Self {
        Self {
            entity,
            ancestor: None,
            clauses: Vec::new(),
            inequality_field: None,
            order_fields: vec![entity.default_sort_field().to_string()],
        }
    }

    /// Restricts the plan to descendants of `ancestor`
    pub fn with_ancestor(mut self, ancestor: EntityKey) -> Self {
        self.ancestor = Some(ancestor);
        self
    }

    /// Adds an already-typed clause, enforcing the single inequality field
    pub fn with_clause(mut self, clause: FilterClause) -> QueryResult<Self> {
        self.push_clause(clause)?;
        Ok(self)
    }

    /// Adds a clause in place
    pub fn push_clause(&mut self, clause: FilterClause) -> QueryResult<()> {
        if clause.is_inequality() {
            match &self.inequality_field {
                Some(existing) if *existing != clause.attribute => {
                    return Err(QueryError::multiple_inequality(existing, &clause.attribute));
                }
                Some(_) => {}
                None => {
                    self.inequality_field = Some(clause.attribute.clone());
                    self.order_fields = self.compute_order_fields();
                }
            }
        }

        self.clauses.push(clause);
        Ok(())
    }

    fn compute_order_fields(&self) -> Vec<String> {
        let default = self.entity.default_sort_field();
        match &self.inequality_field {
            Some(field) if field != default => vec![field.clone(), default.to_string()],
            _ => vec![default.to_string()],
        }
    }
}

/// Builds plans from client filters for one entity kind
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder {
    validator: FilterSpecValidator,
}

impl QueryBuilder {
    pub fn new(entity: EntityKind) -> Self {
        Self {
            validator: FilterSpecValidator::new(entity),
        }
    }

    /// Builds a plan over the whole collection
    pub fn build(&self, filters: &[RawFilter]) -> QueryResult<QueryPlan> {
        self.build_plan(QueryPlan::new(self.validator.entity()), filters)
    }

    /// Builds a plan restricted to descendants of `ancestor`
    pub fn build_scoped(&self, ancestor: EntityKey, filters: &[RawFilter]) -> QueryResult<QueryPlan> {
        self.build_plan(
            QueryPlan::new(self.validator.entity()).with_ancestor(ancestor),
            filters,
        )
    }

    fn build_plan(&self, mut plan: QueryPlan, filters: &[RawFilter]) -> QueryResult<QueryPlan> {
        // Validation errors win over structural ones
        let clauses = filters
            .iter()
            .map(|raw| self.validator.validate(raw))
            .collect::<QueryResult<Vec<_>>>()?;

        for clause in clauses {
            plan.push_clause(clause)?;
        }

        Ok(plan)
    }
}
