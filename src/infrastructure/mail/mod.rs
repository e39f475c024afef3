//! Outbound e-mail adapters

pub mod log;
pub mod smtp;

pub use self::log::LogNotificationSender;
pub use smtp::SmtpNotificationSender;
