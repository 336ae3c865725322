//! # HTTP Server Module
//!
//! axum server exposing the conference API.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/conference/*`, `/profile/*`, `/query*`, `/announcement` - Conference API
//! - `/crons/*` - Scheduled refresh entry points
//! - `/observability/*` - Metrics

mod conference_routes;
mod errors;
mod observability_routes;
pub mod server;

pub use conference_routes::AppState;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use observability_routes::HealthResponse;
pub use server::HttpServer;
