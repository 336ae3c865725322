//! confcentral - conference organisation backend
//!
//! Conferences and their sessions, dynamic filter queries under a
//! single-inequality rule, and a featured speaker derived from a shared
//! counter cache.

pub mod cli;
pub mod conference;
pub mod executor;
pub mod featured;
pub mod http_server;
pub mod observability;
pub mod query;
pub mod store;
pub mod tasks;
