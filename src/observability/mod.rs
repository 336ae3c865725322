//! Observability subsystem for confcentral
//!
//! - Structured logging through `tracing`
//! - Exact operational counters
//!
//! # Usage
//!
//! ```ignore
//! use confcentral::observability::{init_tracing, MetricsRegistry};
//!
//! init_tracing("info");
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_queries_planned();
//! ```

mod logging;
mod metrics;

pub use logging::init_tracing;
pub use metrics::{MetricsRegistry, MetricsSnapshot};
