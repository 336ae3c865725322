//! CLI command implementations

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::conference::{ConferenceService, ConferenceTaskHandler};
use crate::http_server::HttpServer;
use crate::observability::{init_tracing, MetricsRegistry};
use crate::query::{EntityKind, ExplainPlan, QueryBuilder, RawFilter};
use crate::store::{MemoryCounterCache, MemoryEntityStore};
use crate::tasks::{QueueDispatcher, TaskDispatcher, TaskWorker};

use super::args::Command;
use super::config::AppConfig;
use super::errors::{CliError, CliResult};
use super::io::write_json;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config } => serve(config.as_deref()),
        Command::Explain { entity, filters } => explain(&entity, &filters),
    }
}

/// Boot every subsystem and serve until shutdown.
///
/// 1. Load config and install tracing
/// 2. Build store, cache, dispatcher and service
/// 3. Spawn the task worker and cron schedules
/// 4. Run the HTTP server until Ctrl+C or SIGTERM
pub fn serve(config_path: Option<&Path>) -> CliResult<()> {
    let config = AppConfig::load_or_default(config_path)?;
    init_tracing(&config.log_filter);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        let metrics = Arc::new(MetricsRegistry::new());
        let (dispatcher, queue) = QueueDispatcher::channel(metrics.clone());
        let dispatcher: Arc<dyn TaskDispatcher> = Arc::new(dispatcher);

        let service = Arc::new(ConferenceService::new(
            Arc::new(MemoryEntityStore::new()),
            Arc::new(MemoryCounterCache::new()),
            dispatcher.clone(),
            metrics.clone(),
        ));

        let handler = Arc::new(ConferenceTaskHandler::new(service.clone()));
        let worker = TaskWorker::new(queue, handler, config.tasks.max_attempts, metrics);
        let worker = tokio::spawn(worker.run());

        let crons: Vec<_> = config
            .schedules()?
            .into_iter()
            .map(|schedule| {
                info!(task = %schedule.task_name, cron = %schedule.expression, "cron scheduled");
                schedule.spawn(dispatcher.clone())
            })
            .collect();

        let server = HttpServer::with_config(config.server.clone(), service);
        let result = server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)));

        for cron in crons {
            cron.abort();
        }
        worker.abort();

        result
    })
}

/// Print the explain document for a filter list
pub fn explain(entity: &str, filters: &str) -> CliResult<()> {
    write_json(&explain_document(entity, filters)?)
}

/// Explain document for `filters` over `entity`; a rejected plan is a valid
/// document, malformed arguments are errors
pub fn explain_document(entity: &str, filters: &str) -> CliResult<ExplainPlan> {
    let kind = EntityKind::parse(entity).ok_or_else(|| {
        CliError::invalid_argument(format!(
            "unknown entity '{}', expected conference or session",
            entity
        ))
    })?;

    let filters: Vec<RawFilter> = serde_json::from_str(filters).map_err(|e| {
        CliError::invalid_argument(format!("filters must be a JSON array of filters: {}", e))
    })?;

    Ok(ExplainPlan::from_result(&QueryBuilder::new(kind).build(&filters)))
}
