//! Query execution for confcentral
//!
//! The executor consumes validated plans and produces deterministic results.
//!
//! # Execution Flow (strict order)
//!
//! 1. Scan the collection (ancestor-scoped when the plan has one)
//! 2. Filter entities strictly according to clauses
//! 3. Exclude entities missing an order field
//! 4. Sort ascending by the order fields
//! 5. Apply projection (if requested)

mod errors;
mod executor;
mod filters;
mod result;
mod sorter;

pub use errors::{ExecutorError, ExecutorErrorCode, ExecutorResult};
pub use executor::QueryExecutor;
pub use filters::ClauseFilter;
pub use result::ExecutionResult;
pub use sorter::EntitySorter;
