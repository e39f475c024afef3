//! Daily duty reminders
//!
//! Once a day, at a configured local wall-clock time, every member of a
//! group with a duty tomorrow gets a reminder. There is no catch-up: a
//! trigger missed while the process was down is skipped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, NaiveTime};
use tracing::{debug, info, warn};

use crate::application::notifications::Notifier;
use crate::domain::calendar::{Clock, DayRange};
use crate::domain::{DomainResult, Duty, RepositoryProvider};
use crate::shared::shutdown::ShutdownSignal;

/// Totals of one reminder pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderRunReport {
    /// Duties scheduled for tomorrow
    pub duties: usize,
    /// E-mails handed to the sender successfully
    pub notified: usize,
    /// Undelivered e-mails plus duties that could not be processed
    pub failed: usize,
}

pub struct ReminderJob {
    repos: Arc<dyn RepositoryProvider>,
    notifier: Arc<Notifier>,
    clock: Arc<dyn Clock>,
    running: AtomicBool,
}

impl ReminderJob {
    pub fn new(repos: Arc<dyn RepositoryProvider>, notifier: Arc<Notifier>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repos,
            notifier,
            clock,
            running: AtomicBool::new(false),
        }
    }

    /// One pass over tomorrow's duties.
    ///
    /// Only the initial duty query can fail the pass; problems with a
    /// single duty are logged and counted.
    pub async fn run_once(&self) -> DomainResult<ReminderRunReport> {
        let tomorrow = DayRange::of(self.clock.today()).next();
        let duties = self.repos.duties().find_on(tomorrow).await?;

        let mut report = ReminderRunReport {
            duties: duties.len(),
            ..Default::default()
        };

        for duty in &duties {
            match self.remind(duty).await {
                Ok((sent, failed)) => {
                    report.notified += sent;
                    report.failed += failed;
                }
                Err(e) => {
                    warn!(duty_id = %duty.id, error = %e, "Failed to process duty reminder");
                    report.failed += 1;
                }
            }
        }

        metrics::counter!("duty_reminder_runs_total").increment(1);
        info!(
            date = %tomorrow.start.date(),
            duties = report.duties,
            notified = report.notified,
            failed = report.failed,
            "⏰ Duty reminders processed"
        );
        Ok(report)
    }

    async fn remind(&self, duty: &Duty) -> DomainResult<(usize, usize)> {
        let Some(group) = self.repos.groups().find_by_id(&duty.group_id).await? else {
            debug!(duty_id = %duty.id, group_id = %duty.group_id, "Duty has no group, skipping");
            return Ok((0, 0));
        };

        let members = self.repos.users().find_by_ids(&group.member_ids).await?;
        if members.is_empty() {
            debug!(duty_id = %duty.id, group = %group.name, "Group has no members, skipping");
            return Ok((0, 0));
        }

        let delivery = self.notifier.duty_reminder(duty, &group.name, &members).await;
        Ok((delivery.sent, delivery.failed))
    }

    /// Spawn the daily loop. It stops when `shutdown` fires.
    pub fn start(self: Arc<Self>, at: NaiveTime, shutdown: ShutdownSignal) {
        tokio::spawn(async move {
            info!(at = %at.format("%H:%M"), "⏰ Duty reminder job started");

            loop {
                let now = self.clock.now();
                let next = next_run_after(now, at);
                let wait = (next - now).to_std().unwrap_or_default();
                debug!(next_run = %next, "Next duty reminder run scheduled");

                tokio::select! {
                    _ = tokio::time::sleep(wait) => {
                        self.trigger();
                    }
                    _ = shutdown.notified().wait() => {
                        info!("⏰ Duty reminder job shutting down");
                        break;
                    }
                }
            }

            info!("⏰ Duty reminder job stopped");
        });
    }

    /// Run a pass in its own task unless the previous one is still busy.
    fn trigger(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Previous duty reminder run still in progress, skipping this trigger");
            return;
        }

        let job = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = job.run_once().await {
                warn!(error = %e, "Duty reminder run failed");
            }
            job.running.store(false, Ordering::SeqCst);
        });
    }
}

/// Next occurrence of `at` strictly after `now`.
pub fn next_run_after(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}
