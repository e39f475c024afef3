//! SMTP delivery through `lettre`

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use crate::application::ports::{Email, NotificationSender, NotifyError};

/// Sends e-mail through an authenticated SMTP relay.
///
/// Port 465 uses implicit TLS, any other port STARTTLS. A message with
/// several recipients is addressed to the sender and Bcc'd to everyone
/// else, so members never see each other's addresses.
pub struct SmtpNotificationSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotificationSender {
    pub fn new(
        host: &str,
        port: u16,
        username: &str,
        password: &str,
        from_name: &str,
        from_address: &str,
    ) -> Result<Self, NotifyError> {
        let parameters =
            TlsParameters::new(host.to_string()).map_err(|e| NotifyError::Transport(e.to_string()))?;
        let tls = if port == 465 {
            Tls::Wrapper(parameters)
        } else {
            Tls::Required(parameters)
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .port(port)
            .tls(tls)
            .build();

        let address = from_address
            .parse()
            .map_err(|_| NotifyError::InvalidAddress(from_address.to_string()))?;
        let from = Mailbox::new(Some(from_name.to_string()), address);

        Ok(Self { transport, from })
    }

    fn build(&self, email: &Email) -> Result<Message, NotifyError> {
        let recipients = email
            .to
            .iter()
            .map(|addr| {
                addr.parse::<Mailbox>()
                    .map_err(|_| NotifyError::InvalidAddress(addr.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_HTML);

        match recipients.as_slice() {
            [] => return Err(NotifyError::InvalidAddress("no recipients".into())),
            [single] => builder = builder.to(single.clone()),
            many => {
                builder = builder.to(self.from.clone());
                for mailbox in many {
                    builder = builder.bcc(mailbox.clone());
                }
            }
        }

        builder
            .body(email.html.clone())
            .map_err(|e| NotifyError::Build(e.to_string()))
    }
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
    async fn send(&self, email: &Email) -> Result<(), NotifyError> {
        let message = self.build(email)?;
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        debug!(code = %response.code(), recipients = email.to.len(), "SMTP message accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> SmtpNotificationSender {
        SmtpNotificationSender::new(
            "smtp.example.com",
            587,
            "mailer",
            "secret",
            "MCare",
            "noreply@example.com",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn invalid_from_address_is_rejected() {
        let result = SmtpNotificationSender::new("smtp.example.com", 587, "u", "p", "MCare", "not an address");
        assert!(matches!(result, Err(NotifyError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn several_recipients_go_to_bcc() {
        let email = Email {
            to: vec!["a@example.com".into(), "b@example.com".into()],
            subject: "Duty".into(),
            html: "<p>hi</p>".into(),
        };
        let message = sender().build(&email).unwrap();
        let envelope = message.envelope();
        assert_eq!(envelope.to().len(), 3);

        let headers = String::from_utf8(message.formatted()).unwrap();
        assert!(!headers.contains("a@example.com"));
    }

    #[tokio::test]
    async fn bad_recipient_is_reported_before_sending() {
        let email = Email::to_one("nope", "Duty", "<p>hi</p>");
        assert!(matches!(sender().build(&email), Err(NotifyError::InvalidAddress(a)) if a == "nope"));
    }
}
