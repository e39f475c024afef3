//! Outbound ports: what the application needs from the outside world
//!
//! [`NotificationSender`] decouples the rule components from the mail
//! transport. Production wiring uses the SMTP sender from
//! `infrastructure::mail`; tests plug in a recording fake.

use async_trait::async_trait;
use thiserror::Error;

/// A rendered e-mail ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    /// One or more recipient addresses
    pub to: Vec<String>,
    pub subject: String,
    /// HTML body
    pub html: String,
}

impl Email {
    pub fn to_one(to: impl Into<String>, subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            to: vec![to.into()],
            subject: subject.into(),
            html: html.into(),
        }
    }
}

/// Delivery failure. Never surfaces to API callers; senders' callers log it.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    #[error("could not build message: {0}")]
    Build(String),

    #[error("transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), NotifyError>;
}
