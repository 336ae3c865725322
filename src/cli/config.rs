//! Configuration file for `confcentral serve`
//!
//! Every field is optional; a missing file section takes the defaults below.

use std::fs;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;

use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};

use crate::tasks::{CronSchedule, REFRESH_FEATURED_SPEAKER_CACHE, SET_ANNOUNCEMENT};

use super::errors::{CliError, CliResult};

/// Service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Fallback tracing filter when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    #[serde(default)]
    pub tasks: TaskConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// Conference API listener
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// `host:port` to listen on
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,

    /// CORS allowed origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// In-process task worker settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Deliveries per task before it is dropped
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// Cron schedules for the periodic refreshes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_announcement_cron")]
    pub announcement_cron: String,

    #[serde(default = "default_featured_refresh_cron")]
    pub featured_refresh_cron: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080))
}
fn default_log_filter() -> String {
    "info".to_string()
}
fn default_max_attempts() -> u32 {
    3
}
fn default_announcement_cron() -> String {
    "0 * * * *".to_string()
}
fn default_featured_refresh_cron() -> String {
    "0 0 * * *".to_string()
}
fn default_enabled() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            log_filter: default_log_filter(),
            tasks: TaskConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Listener on `port` of every interface
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            ..Default::default()
        }
    }

    /// Origins usable as `Access-Control-Allow-Origin` values
    pub fn allowed_origins(&self) -> CliResult<Vec<HeaderValue>> {
        self.cors_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|_| {
                    CliError::config_error(format!("Invalid CORS origin: '{}'", origin))
                })
            })
            .collect()
    }
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            announcement_cron: default_announcement_cron(),
            featured_refresh_cron: default_featured_refresh_cron(),
            enabled: default_enabled(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Uses the file when given, the defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> CliResult<()> {
        if self.tasks.max_attempts == 0 {
            return Err(CliError::config_error("tasks.max_attempts must be > 0"));
        }

        self.server.allowed_origins()?;
        self.schedules()?;
        Ok(())
    }

    /// Cron schedules for the two periodic refreshes; empty when disabled
    pub fn schedules(&self) -> CliResult<Vec<CronSchedule>> {
        if !self.schedule.enabled {
            return Ok(Vec::new());
        }

        [
            (SET_ANNOUNCEMENT, &self.schedule.announcement_cron),
            (REFRESH_FEATURED_SPEAKER_CACHE, &self.schedule.featured_refresh_cron),
        ]
        .into_iter()
        .map(|(task, expression)| {
            CronSchedule::new(task, expression.as_str())
                .map_err(|e| CliError::config_error(format!("Invalid schedule: {}", e)))
        })
        .collect()
    }
}
