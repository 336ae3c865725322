//! Dynamic filter queries for confcentral
//!
//! Clients submit `(field, operator, value)` triples; this module validates
//! them against a closed per-entity whitelist and composes a `QueryPlan`.
//!
//! # Rules
//!
//! - Field and operator tokens match exactly (case-sensitive)
//! - Integer fields are coerced from JSON numbers or decimal strings
//! - At most one field may carry non-equality operators; it becomes the
//!   first sort key and `name` is always appended
//! - Validation is fail-fast in clause order and happens before any store
//!   access

mod builder;
mod clause;
mod errors;
mod explain;
mod fields;
mod validator;

pub use builder::{QueryBuilder, QueryPlan};
pub use clause::{FilterClause, OperatorKind, RawFilter, Scalar};
pub use errors::{QueryError, QueryErrorCode, QueryResult, Severity};
pub use explain::ExplainPlan;
pub use fields::{EntityKind, FieldSpec, FieldType};
pub use validator::FilterSpecValidator;
