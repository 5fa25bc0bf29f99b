//! SMTP mailer built on lettre.
//!
//! Plain SMTP (`use_tls = false`) is meant for local servers such as
//! MailHog or Mailpit.

use anyhow::Context;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{debug, info, warn};

use super::{MailRequest, Mailer};
use crate::config::SmtpSettings;

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> anyhow::Result<Self> {
        let transport = Self::build_transport(settings)?;
        let from: Mailbox = format!("{} <{}>", settings.from_name, settings.from_email)
            .parse()
            .with_context(|| format!("Invalid from address: {}", settings.from_email))?;

        Ok(Self { transport, from })
    }

    fn build_transport(
        settings: &SmtpSettings,
    ) -> anyhow::Result<AsyncSmtpTransport<Tokio1Executor>> {
        let credentials = match (&settings.username, &settings.password) {
            (Some(username), Some(password)) => {
                Some(Credentials::new(username.clone(), password.clone()))
            }
            _ => None,
        };

        let mut builder = if settings.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
                .with_context(|| format!("Failed to create SMTP relay for {}", settings.host))?
                .port(settings.port)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
                .port(settings.port)
        };

        if let Some(credentials) = credentials {
            builder = builder.credentials(credentials);
        }

        Ok(builder.build())
    }

    fn build_message(&self, request: &MailRequest) -> anyhow::Result<Message> {
        let to: Mailbox = request
            .to
            .parse()
            .with_context(|| format!("Invalid recipient address: {}", request.to))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&request.subject)
            .header(ContentType::TEXT_HTML)
            .body(request.body.clone())
            .context("Failed to build email message")
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_mail(&self, request: &MailRequest) -> anyhow::Result<bool> {
        debug!(
            to = %request.to,
            template = %request.template_id,
            language = %request.language,
            "Sending email via SMTP"
        );

        let message = self.build_message(request)?;
        let response = self
            .transport
            .send(message)
            .await
            .context("SMTP send failed")?;

        if response.is_positive() {
            info!(to = %request.to, code = %response.code(), "Email accepted by SMTP server");
        } else {
            warn!(to = %request.to, code = %response.code(), "Email rejected by SMTP server");
        }

        Ok(response.is_positive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(to: &str) -> MailRequest {
        MailRequest {
            template_id: "account_alert".to_string(),
            to: to.to_string(),
            language: "en".to_string(),
            subject: "Account alert".to_string(),
            body: "<p>Hello</p>".to_string(),
        }
    }

    #[test]
    fn test_build_message_with_valid_recipient() {
        let mailer = SmtpMailer::new(&SmtpSettings::default()).unwrap();
        assert!(mailer.build_message(&request("ada@example.com")).is_ok());
    }

    #[test]
    fn test_build_message_rejects_invalid_recipient() {
        let mailer = SmtpMailer::new(&SmtpSettings::default()).unwrap();
        let err = mailer.build_message(&request("not an address")).unwrap_err();
        assert!(err.to_string().contains("Invalid recipient address"));
    }

    #[test]
    fn test_invalid_sender_is_rejected() {
        let settings = SmtpSettings {
            from_email: "broken".to_string(),
            ..Default::default()
        };
        assert!(SmtpMailer::new(&settings).is_err());
    }
}
