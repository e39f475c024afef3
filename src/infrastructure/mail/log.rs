//! Sender used when SMTP is disabled: logs the message and succeeds.

use async_trait::async_trait;
use tracing::info;

use crate::application::ports::{Email, NotificationSender, NotifyError};

#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotificationSender;

#[async_trait]
impl NotificationSender for LogNotificationSender {
    async fn send(&self, email: &Email) -> Result<(), NotifyError> {
        info!(to = ?email.to, subject = %email.subject, "📧 Mail delivery disabled, message logged");
        Ok(())
    }
}
