//! Notification fan-out
//!
//! Renders templates and hands e-mails to the [`NotificationSender`].
//! Delivery problems are logged and counted, never returned as errors:
//! a duty is saved whether or not anybody could be told about it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::templates::{self, DutyNotice, Rendered};
use crate::application::ports::{Email, NotificationSender};
use crate::domain::duty::Duty;
use crate::domain::user::User;

/// How duty messages reach a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// One personalised e-mail per member
    #[default]
    PerMember,
    /// A single e-mail addressed to every member
    Batch,
}

/// Outcome of one fan-out, counted in e-mails handed to the sender.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub sent: usize,
    pub failed: usize,
}

impl DeliveryReport {
    pub fn merge(&mut self, other: DeliveryReport) {
        self.sent += other.sent;
        self.failed += other.failed;
    }

    fn record(&mut self, ok: bool) {
        if ok {
            self.sent += 1;
        } else {
            self.failed += 1;
        }
    }
}

pub struct Notifier {
    sender: Arc<dyn NotificationSender>,
    mode: DeliveryMode,
}

impl Notifier {
    pub fn new(sender: Arc<dyn NotificationSender>, mode: DeliveryMode) -> Self {
        Self { sender, mode }
    }

    pub fn mode(&self) -> DeliveryMode {
        self.mode
    }

    /// Tell every member of a group about a duty event.
    pub async fn duty(
        &self,
        kind: DutyNotice,
        duty: &Duty,
        group_name: &str,
        members: &[User],
    ) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        let recipients: Vec<&User> = members
            .iter()
            .filter(|m| {
                let has_address = !m.email.trim().is_empty();
                if !has_address {
                    warn!(user_id = %m.id, "Member has no e-mail address, skipping");
                }
                has_address
            })
            .collect();

        if recipients.is_empty() {
            debug!(duty_id = %duty.id, "No recipients for duty notification");
            return report;
        }

        match self.mode {
            DeliveryMode::PerMember => {
                for member in recipients {
                    let rendered =
                        templates::duty_email(kind, member.display_name(), group_name, duty);
                    let ok = self
                        .deliver(addressed(vec![member.email.clone()], rendered), kind.as_str())
                        .await;
                    report.record(ok);
                }
            }
            DeliveryMode::Batch => {
                let greeting = format!("{} members", group_name);
                let rendered = templates::duty_email(kind, &greeting, group_name, duty);
                let to = recipients.iter().map(|m| m.email.clone()).collect();
                let ok = self.deliver(addressed(to, rendered), kind.as_str()).await;
                report.record(ok);
            }
        }

        report
    }

    pub async fn duty_assigned(&self, duty: &Duty, group_name: &str, members: &[User]) -> DeliveryReport {
        self.duty(DutyNotice::Assigned, duty, group_name, members).await
    }

    pub async fn duty_updated(&self, duty: &Duty, group_name: &str, members: &[User]) -> DeliveryReport {
        self.duty(DutyNotice::Updated, duty, group_name, members).await
    }

    pub async fn duty_reminder(&self, duty: &Duty, group_name: &str, members: &[User]) -> DeliveryReport {
        self.duty(DutyNotice::Reminder, duty, group_name, members).await
    }

    pub async fn welcome(&self, user: &User) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        let rendered = templates::welcome_email(user);
        let ok = self
            .deliver(addressed(vec![user.email.clone()], rendered), "welcome")
            .await;
        report.record(ok);
        report
    }

    pub async fn password_changed(&self, user: &User, at: DateTime<Utc>) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        let when = at.format("%B %-d, %Y %H:%M UTC").to_string();
        let rendered = templates::password_changed_email(user, &when);
        let ok = self
            .deliver(addressed(vec![user.email.clone()], rendered), "password_changed")
            .await;
        report.record(ok);
        report
    }

    async fn deliver(&self, email: Email, kind: &'static str) -> bool {
        match self.sender.send(&email).await {
            Ok(()) => {
                metrics::counter!("notifications_sent_total", "kind" => kind).increment(1);
                debug!(kind, recipients = email.to.len(), subject = %email.subject, "Notification sent");
                true
            }
            Err(e) => {
                metrics::counter!("notifications_failed_total", "kind" => kind).increment(1);
                warn!(kind, recipients = ?email.to, error = %e, "Notification delivery failed");
                false
            }
        }
    }
}

fn addressed(to: Vec<String>, rendered: Rendered) -> Email {
    Email {
        to,
        subject: rendered.subject,
        html: rendered.html,
    }
}
