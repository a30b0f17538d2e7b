//! Worker configuration

use std::time::Duration;

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::Deserialize;

use domain_notifications::RetryPolicy;
use domain_requests::{SchedulerConfig, WorkflowConfig};
use infra_db::DatabaseConfig;

/// Worker configuration
///
/// Loaded in layers: compiled defaults, then `config/default.toml` and
/// `config/local.toml` when present, then environment variables with the
/// `WORKER` prefix and `__` separator, so
/// `WORKER__SCHEDULER__TRIGGER_TIME=07:30` overrides `scheduler.trigger_time`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub database: DatabaseSettings,
    pub scheduler: SchedulerSettings,
    pub notifications: NotificationSettings,
    pub workflow: WorkflowSettings,
    /// Emit log lines as JSON instead of human-readable text
    pub log_json: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            database: DatabaseSettings::default(),
            scheduler: SchedulerSettings::default(),
            notifications: NotificationSettings::default(),
            workflow: WorkflowSettings::default(),
            log_json: false,
        }
    }
}

impl WorkerConfig {
    /// Loads the layered configuration
    ///
    /// A plain `DATABASE_URL` variable overrides `database.url` when set,
    /// so deployments that follow that convention need no `WORKER` prefix
    /// for the connection string.
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut cfg: WorkerConfig = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("WORKER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        if let Ok(url) = std::env::var("DATABASE_URL") {
            cfg.database.url = url;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects values that would otherwise only fail once the scheduler
    /// computes its first trigger
    fn validate(&self) -> Result<(), config::ConfigError> {
        self.scheduler.trigger()?;
        self.scheduler.zone()?;
        Ok(())
    }

    /// Scheduler configuration assembled from this config
    pub fn scheduler_config(&self) -> Result<SchedulerConfig, config::ConfigError> {
        Ok(SchedulerConfig {
            trigger_time: self.scheduler.trigger()?,
            zone: self.scheduler.zone()?,
            sweep_on_start: self.scheduler.sweep_on_start,
            ..SchedulerConfig::default()
        })
    }

    /// Workflow configuration: the deadline window comes from this config,
    /// the rest stays at its policy defaults
    pub fn workflow_config(&self) -> WorkflowConfig {
        WorkflowConfig {
            deadline_business_days: self.workflow.deadline_business_days,
            ..WorkflowConfig::default()
        }
    }
}

/// Database connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// PostgreSQL connection string
    pub url: String,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Seconds to wait when acquiring a connection
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/incapacities".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
        }
    }
}

impl DatabaseSettings {
    /// Pool options for `infra_db::create_pool`
    pub fn pool_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.url.as_str())
            .max_connections(self.max_connections)
            .connect_timeout(Duration::from_secs(self.acquire_timeout_secs))
    }
}

/// Daily sweep settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Local time-of-day of the daily trigger, `HH:MM`
    pub trigger_time: String,
    /// IANA zone the trigger time is interpreted in
    pub timezone: String,
    /// Sweep once at startup to cover days the process was down
    pub sweep_on_start: bool,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            trigger_time: "08:00".to_string(),
            timezone: "America/Bogota".to_string(),
            sweep_on_start: true,
        }
    }
}

impl SchedulerSettings {
    pub fn trigger(&self) -> Result<NaiveTime, config::ConfigError> {
        NaiveTime::parse_from_str(&self.trigger_time, "%H:%M").map_err(|err| {
            config::ConfigError::Message(format!(
                "scheduler.trigger_time {:?} is not HH:MM: {err}",
                self.trigger_time
            ))
        })
    }

    pub fn zone(&self) -> Result<Tz, config::ConfigError> {
        self.timezone.parse().map_err(|err| {
            config::ConfigError::Message(format!(
                "scheduler.timezone {:?} is not an IANA zone name: {err}",
                self.timezone
            ))
        })
    }
}

/// Notification delivery settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// Deliver through the transport, or record in-app only
    pub enabled: bool,
    /// Sender address stamped on outgoing mail
    pub from_address: String,
    /// Sender display name
    pub from_name: String,
    /// Transport attempts per notification
    pub max_attempts: u32,
    /// Pause between attempts, in milliseconds
    pub retry_delay_ms: u64,
    /// Upper bound on one transport call, in milliseconds
    pub transport_timeout_ms: u64,
    /// Concurrent deliveries drained from the dispatch queue
    pub pool_size: u32,
    /// Jobs the dispatch queue buffers before rejecting new ones
    pub queue_depth: usize,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            from_address: "no-reply@incapacities.local".to_string(),
            from_name: "Incapacity Management".to_string(),
            max_attempts: 3,
            retry_delay_ms: 5_000,
            transport_timeout_ms: 10_000,
            pool_size: 4,
            queue_depth: 256,
        }
    }
}

impl NotificationSettings {
    /// Retry behavior for the dispatcher
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            delay: Duration::from_millis(self.retry_delay_ms),
            attempt_timeout: Duration::from_millis(self.transport_timeout_ms),
        }
    }
}

/// Request workflow settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkflowSettings {
    /// Business days a claimant gets to answer a new request
    pub deadline_business_days: u32,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            deadline_business_days: 3,
        }
    }
}
