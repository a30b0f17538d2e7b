//! Daily reminder sweep
//!
//! One long-lived task owned by the composition root. Every day at the
//! configured local time it loads all pending requests due on or before
//! today, asks the escalation policy what to do with each, and executes
//! the answer through the workflow. Items fail alone: a storage error, an
//! exhausted notification, or a hung item is logged and counted without
//! stopping the sweep.
//!
//! Because the due query is date-driven, a process that was down over a
//! trigger simply covers the backlog on its next sweep; no missed-trigger
//! state is kept anywhere.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveTime, TimeZone};
use chrono_tz::Tz;
use tokio::sync::watch;
use tracing::{error, info, warn};

use core_kernel::Clock;

use crate::error::WorkflowError;
use crate::escalation::EscalationAction;
use crate::ports::DocumentRequestRepository;
use crate::workflow::DocumentRequestWorkflow;

/// Counters from one sweep
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    /// Due requests loaded for this sweep
    pub examined: u32,
    pub reminders_sent: u32,
    pub urgent_reminders_sent: u32,
    pub escalations_triggered: u32,
    /// Items that failed, timed out, or exhausted their notification
    pub errors: u32,
}

impl SweepStats {
    pub fn actions_taken(&self) -> u32 {
        self.reminders_sent + self.urgent_reminders_sent + self.escalations_triggered
    }
}

/// When and how the daily sweep runs
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Local time-of-day of the daily trigger
    pub trigger_time: NaiveTime,
    /// Zone the trigger time is interpreted in
    pub zone: Tz,
    /// Run one sweep immediately at startup to cover missed days
    pub sweep_on_start: bool,
    /// Upper bound on one item, timeouts count as that item's error
    pub item_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            trigger_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
            zone: chrono_tz::America::Bogota,
            sweep_on_start: true,
            item_timeout: Duration::from_secs(30),
        }
    }
}

/// Owns the daily trigger and drives the sweep through the workflow
pub struct ReminderScheduler {
    workflow: Arc<DocumentRequestWorkflow>,
    requests: Arc<dyn DocumentRequestRepository>,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
}

impl ReminderScheduler {
    pub fn new(
        workflow: Arc<DocumentRequestWorkflow>,
        requests: Arc<dyn DocumentRequestRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            workflow,
            requests,
            clock,
            config: SchedulerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// One full sweep over everything due today or earlier
    ///
    /// Failing to load the due list fails the sweep; everything after that
    /// is per-item and only lands in the counters.
    pub async fn run_once(&self) -> Result<SweepStats, WorkflowError> {
        let today = self.clock.today();
        let due = self.requests.list_due(today).await?;
        let mut stats = SweepStats {
            examined: due.len() as u32,
            ..SweepStats::default()
        };
        info!(%today, due = due.len(), "reminder sweep started");

        for request in due {
            let request_id = request.id;
            let action = self.workflow.assess(&request, today);
            let applied =
                tokio::time::timeout(self.config.item_timeout, self.workflow.apply(request, action))
                    .await;
            match applied {
                Ok(Ok(outcome)) => {
                    match outcome.action {
                        EscalationAction::None => {}
                        EscalationAction::FirstReminder => stats.reminders_sent += 1,
                        EscalationAction::UrgentReminder => stats.urgent_reminders_sent += 1,
                        EscalationAction::Escalate => stats.escalations_triggered += 1,
                    }
                    if outcome.delivery_failed() {
                        warn!(%request_id, "notification transport exhausted during sweep");
                        stats.errors += 1;
                    }
                }
                Ok(Err(err)) => {
                    error!(%request_id, error = %err, "sweep item failed");
                    stats.errors += 1;
                }
                Err(_) => {
                    error!(
                        %request_id,
                        timeout_ms = self.config.item_timeout.as_millis() as u64,
                        "sweep item timed out"
                    );
                    stats.errors += 1;
                }
            }
        }

        Ok(stats)
    }

    /// Runs the daily loop until shutdown is signalled
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            trigger = %self.config.trigger_time,
            zone = %self.config.zone,
            "reminder scheduler started"
        );
        if self.config.sweep_on_start {
            self.sweep_and_log().await;
        }
        loop {
            let wait = self.until_next_trigger();
            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    self.sweep_and_log().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("reminder scheduler stopping");
                        break;
                    }
                }
            }
        }
    }

    async fn sweep_and_log(&self) {
        match self.run_once().await {
            Ok(stats) if stats.errors > 0 => warn!(?stats, "sweep finished with errors"),
            Ok(stats) => info!(?stats, "sweep finished"),
            Err(err) => error!(error = %err, "sweep could not load due requests"),
        }
    }

    /// Time to sleep until the next local trigger, stepping over DST gaps
    fn until_next_trigger(&self) -> Duration {
        let now_utc = self.clock.now();
        let now_local = now_utc.with_timezone(&self.config.zone);
        let mut candidate = now_local.date_naive().and_time(self.config.trigger_time);
        if now_local.naive_local() >= candidate {
            candidate += chrono::Duration::days(1);
        }
        let target = loop {
            match self.config.zone.from_local_datetime(&candidate) {
                chrono::LocalResult::Single(t) => break t,
                chrono::LocalResult::Ambiguous(earliest, _) => break earliest,
                chrono::LocalResult::None => candidate += chrono::Duration::hours(1),
            }
        };
        (target.with_timezone(&chrono::Utc) - now_utc)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}
