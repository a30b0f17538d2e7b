//! Incapacity worker binary
//!
//! Long-running process that applies the daily reminder sweep over open
//! document requests and drains the background notification queue.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin incapacity-worker
//!
//! # Override the trigger and skip the startup sweep
//! WORKER__SCHEDULER__TRIGGER_TIME=07:30 \
//! WORKER__SCHEDULER__SWEEP_ON_START=false \
//! cargo run --bin incapacity-worker
//! ```
//!
//! # Configuration
//!
//! Layered: compiled defaults, then `config/{default,local}.toml` when
//! present, then environment variables with the `WORKER` prefix and `__`
//! separator. Commonly overridden:
//!
//! * `DATABASE_URL` (or `WORKER__DATABASE__URL`) - PostgreSQL connection string
//! * `WORKER__SCHEDULER__TRIGGER_TIME` - daily sweep time, `HH:MM` (default: 08:00)
//! * `WORKER__SCHEDULER__TIMEZONE` - IANA zone for the trigger (default: America/Bogota)
//! * `WORKER__SCHEDULER__SWEEP_ON_START` - sweep once at startup (default: true)
//! * `WORKER__NOTIFICATIONS__ENABLED` - deliver mail or record in-app only (default: true)
//! * `WORKER__LOG_JSON` - JSON log output (default: false)
//! * `RUST_LOG` - log filter (default: info)

use anyhow::Context;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use interface_worker::{WorkerConfig, WorkerRuntime};

/// Main entry point for the worker.
///
/// Loads configuration, initializes logging, connects to the database and
/// applies migrations, then runs the scheduler loop and the dispatch pool
/// until Ctrl+C or SIGTERM.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = WorkerConfig::load().context("configuration is invalid")?;
    init_tracing(config.log_json);

    tracing::info!(
        trigger = %config.scheduler.trigger_time,
        zone = %config.scheduler.timezone,
        sweep_on_start = config.scheduler.sweep_on_start,
        "starting incapacity worker"
    );

    let pool = infra_db::create_pool(config.database.pool_config())
        .await
        .context("database connection failed")?;
    infra_db::run_migrations(&pool)
        .await
        .context("could not apply migrations")?;

    let runtime = WorkerRuntime::build(&config, pool)?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut worker = tokio::spawn(runtime.run(shutdown_rx));

    tokio::select! {
        _ = shutdown_signal() => {
            let _ = shutdown_tx.send(true);
            worker.await.context("worker did not shut down cleanly")?;
            tracing::info!("incapacity worker stopped");
        }
        result = &mut worker => {
            result.context("worker task failed")?;
            anyhow::bail!("worker stopped without a shutdown signal");
        }
    }
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// The filter comes from `RUST_LOG` and falls back to `info`; `json`
/// switches the output format for log collectors.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// This enables graceful shutdown: the scheduler finishes its current
/// sweep and the dispatch pool drains buffered deliveries before the
/// process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
