//! CLI argument definitions using clap
//!
//! Commands:
//! - confcentral serve [--config <path>]
//! - confcentral explain --entity <conference|session> --filters <json>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// confcentral - conference organisation backend
#[derive(Parser, Debug)]
#[command(name = "confcentral")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API, task worker and cron schedules
    Serve {
        /// Path to configuration file; defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Build a query plan from filters and print its explain document
    Explain {
        /// Entity kind to query: conference or session
        #[arg(long)]
        entity: String,

        /// JSON array of {"field", "operator", "value"} objects
        #[arg(long, default_value = "[]")]
        filters: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
