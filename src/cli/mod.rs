//! CLI module for confcentral
//!
//! Provides command-line interface for:
//! - serve: Boot the API, task worker and cron schedules
//! - explain: One-shot query plan explain

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{explain, explain_document, run, run_command, serve};
pub use config::{AppConfig, ScheduleConfig, ServerConfig, TaskConfig};
pub use errors::{CliError, CliErrorCode, CliResult};
