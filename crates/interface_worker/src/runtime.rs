//! Worker wiring
//!
//! Builds the object graph of the worker process: PostgreSQL adapters,
//! business calendar, dispatcher pool, request workflow, and the reminder
//! scheduler. Every component is owned by the [`WorkerRuntime`] value and
//! dropped when it stops; nothing in the process is a global.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};

use core_kernel::{BusinessCalendar, Clock, SystemClock};
use domain_incapacity::IncapacityRepository;
use domain_notifications::{
    DispatchQueue, DispatchWorker, LoggingMailTransport, MailTransport, NotificationDispatcher,
    NotificationService, NotificationSink, NotificationStore, RecipientDirectory,
};
use domain_requests::{DocumentRequestRepository, DocumentRequestWorkflow, ReminderScheduler};
use infra_db::{
    DatabasePool, PostgresDocumentRequestRepository, PostgresIncapacityRepository,
    PostgresNotificationStore, PostgresRecipientDirectory,
};

use crate::config::WorkerConfig;

/// The assembled worker process
pub struct WorkerRuntime {
    scheduler: ReminderScheduler,
    dispatch_queue: DispatchQueue,
    dispatch_worker: DispatchWorker,
}

impl WorkerRuntime {
    /// Wires every component onto the given pool
    pub fn build(config: &WorkerConfig, pool: DatabasePool) -> Result<Self, config::ConfigError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.scheduler.zone()?));
        let calendar = BusinessCalendar::with_standard_holidays();

        let claims: Arc<dyn IncapacityRepository> =
            Arc::new(PostgresIncapacityRepository::new(pool.clone()));
        let requests: Arc<dyn DocumentRequestRepository> =
            Arc::new(PostgresDocumentRequestRepository::new(pool.clone()));
        let store: Arc<dyn NotificationStore> =
            Arc::new(PostgresNotificationStore::new(pool.clone()));
        let directory: Arc<dyn RecipientDirectory> =
            Arc::new(PostgresRecipientDirectory::new(pool));

        let transport: Arc<dyn MailTransport> = Arc::new(
            LoggingMailTransport::new(config.notifications.enabled).with_sender(
                &config.notifications.from_name,
                &config.notifications.from_address,
            ),
        );
        let dispatcher = NotificationDispatcher::new(
            store,
            transport,
            config.notifications.retry_policy(),
        );
        let (dispatch_queue, dispatch_worker) = DispatchQueue::bounded(
            Arc::clone(&directory),
            dispatcher.clone(),
            config.notifications.queue_depth,
            config.notifications.pool_size,
        );
        // Sweep actions await delivery inline so exhausted retries land in
        // the sweep stats; the queue serves fire-and-forget callers.
        let sink: Arc<dyn NotificationSink> =
            Arc::new(NotificationService::new(directory, dispatcher));

        let workflow = Arc::new(
            DocumentRequestWorkflow::new(
                claims,
                Arc::clone(&requests),
                sink,
                calendar,
                Arc::clone(&clock),
            )
            .with_config(config.workflow_config()),
        );
        let scheduler = ReminderScheduler::new(workflow, requests, clock)
            .with_config(config.scheduler_config()?);

        info!(
            pool_size = config.notifications.pool_size,
            queue_depth = config.notifications.queue_depth,
            mail_enabled = config.notifications.enabled,
            "worker components wired"
        );
        Ok(Self {
            scheduler,
            dispatch_queue,
            dispatch_worker,
        })
    }

    /// Runs the scheduler loop and the dispatch pool until `shutdown`
    /// flips to true, then waits for both to drain
    pub async fn run(self, shutdown: watch::Receiver<bool>) {
        let dispatch = tokio::spawn(self.dispatch_worker.run(shutdown.clone()));
        self.scheduler.run(shutdown).await;
        // Closing the queue handle ends the worker's receive loop even if
        // the shutdown channel is gone.
        drop(self.dispatch_queue);
        if let Err(err) = dispatch.await {
            error!(error = %err, "dispatch pool task failed");
        }
        info!("worker runtime stopped");
    }
}
