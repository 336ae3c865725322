//! Query executor for confcentral
//!
//! Executes query plans against an entity store, producing deterministic
//! results.
//!
//! Execution flow (strict order):
//! 1. Scan the plan's collection, scoped to its ancestor
//! 2. Filter entities strictly according to clauses
//! 3. Drop entities without a value for every order field
//! 4. Sort by the plan's order fields
//! 5. Apply projection (if requested)

use crate::query::QueryPlan;
use crate::store::EntityStore;

use super::errors::ExecutorResult;
use super::filters::ClauseFilter;
use super::result::ExecutionResult;
use super::sorter::EntitySorter;

/// Query executor that processes plans against a store
pub struct QueryExecutor<'a> {
    store: &'a dyn EntityStore,
}

impl<'a> QueryExecutor<'a> {
    /// Creates a new executor
    pub fn new(store: &'a dyn EntityStore) -> Self {
        Self { store }
    }

    /// Executes a query plan and returns results.
    ///
    /// Same plan + same data = same results.
    pub fn execute(&self, plan: &QueryPlan) -> ExecutorResult<ExecutionResult> {
        let scanned = self
            .store
            .scan(plan.entity.kind_name(), plan.ancestor.as_ref())?;
        let scanned_count = scanned.len();

        let mut entities: Vec<_> = scanned
            .into_iter()
            .filter(|entity| ClauseFilter::matches(entity, &plan.clauses))
            .filter(|entity| EntitySorter::has_order_fields(entity, &plan.order_fields))
            .collect();

        EntitySorter::sort(&mut entities, &plan.order_fields);

        Ok(ExecutionResult {
            entities,
            scanned_count,
        })
    }

    /// Executes a plan, keeping only the listed attributes on each result
    pub fn execute_projection(
        &self,
        plan: &QueryPlan,
        attributes: &[&str],
    ) -> ExecutorResult<ExecutionResult> {
        let mut result = self.execute(plan)?;
        result.entities = result
            .entities
            .iter()
            .map(|entity| entity.project(attributes))
            .collect();
        Ok(result)
    }
}
