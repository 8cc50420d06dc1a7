use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use super::{EmailMessage, MailTransport};
use crate::config::SmtpConfig;
use crate::error::{AppError, AppResult};

/// SMTP 发信（lettre 阻塞传输放在 spawn_blocking 中执行）
#[derive(Clone)]
pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> AppResult<Self> {
        let transport = SmtpTransport::relay(&config.host)
            .map_err(|e| AppError::ConfigError(format!("SMTP relay error: {e}")))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        let from = format!("{} <{}>", config.from_name, config.from_email)
            .parse::<Mailbox>()
            .map_err(|e| AppError::ConfigError(format!("Invalid from address: {e}")))?;

        Ok(Self { transport, from })
    }

    fn build_message(&self, message: &EmailMessage) -> AppResult<Message> {
        let to = format!("{} <{}>", message.to_name, message.to)
            .parse::<Mailbox>()
            .or_else(|_| message.to.parse::<Mailbox>())
            .map_err(|e| AppError::InvalidInput(format!("Invalid to address: {e}")))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                message.body_text.clone(),
                message.body_html.clone(),
            ))
            .map_err(|e| AppError::ExternalApiError(format!("Failed to build email: {e}")))
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn deliver(&self, message: &EmailMessage) -> AppResult<()> {
        let email = self.build_message(message)?;
        let mailer = self.transport.clone();

        tokio::task::spawn_blocking(move || {
            mailer
                .send(&email)
                .map_err(|e| AppError::ExternalApiError(format!("Failed to send email: {e}")))
        })
        .await
        .map_err(|e| AppError::InternalError(format!("Email task failed: {e}")))?
        .map(|_| ())
    }
}
