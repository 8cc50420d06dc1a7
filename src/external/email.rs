//! Outbound email.
//!
//! Workflow code only sees [`Notifier`]. Delivery failures are logged and never
//! propagated: a claim or check-in that has already been persisted stays valid
//! even if the mail server is down.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::SmtpConfig;
use crate::error::AppResult;
use crate::external::{ConsoleTransport, SmtpMailer};
use crate::models::{Employee, Event, Guest, Prize, Raffle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub to_name: String,
    pub subject: String,
    pub body_text: String,
    pub body_html: String,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, message: &EmailMessage) -> AppResult<()>;
}

#[derive(Clone)]
pub struct Notifier {
    transport: Arc<dyn MailTransport>,
}

impl Notifier {
    pub fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self { transport }
    }

    /// smtp.enabled = false 时邮件只写日志
    pub fn from_config(config: &SmtpConfig) -> AppResult<Self> {
        let transport: Arc<dyn MailTransport> = if config.enabled {
            Arc::new(SmtpMailer::new(config)?)
        } else {
            Arc::new(ConsoleTransport)
        };
        Ok(Self::new(transport))
    }

    /// 发送并记录结果；返回是否投递成功
    async fn dispatch(&self, message: EmailMessage) -> bool {
        match self.transport.deliver(&message).await {
            Ok(()) => {
                log::info!("Email sent to {}: {}", message.to, message.subject);
                true
            }
            Err(e) => {
                log::error!(
                    "Failed to send email to {} ({}): {}",
                    message.to,
                    message.subject,
                    e
                );
                false
            }
        }
    }

    pub async fn send_winner_notification(
        &self,
        employee: &Employee,
        raffle: &Raffle,
        prize: &Prize,
    ) -> bool {
        let subject = format!("Congratulations! You won a prize in {}", raffle.name);
        let body_text = format!(
            "Hi {},\n\nYou have won \"{}\" in the raffle \"{}\".\n{}\n\nPlease contact the organizers to collect your prize.",
            employee.name, prize.name, raffle.name, prize.description
        );
        let body_html = layout(
            "Congratulations!",
            &format!(
                "<p>Hi {},</p><p>You have won <strong>{}</strong> in the raffle <strong>{}</strong>.</p><p>{}</p><p>Please contact the organizers to collect your prize.</p>",
                escape_html(&employee.name),
                escape_html(&prize.name),
                escape_html(&raffle.name),
                escape_html(&prize.description),
            ),
        );
        self.dispatch(EmailMessage {
            to: employee.email.clone(),
            to_name: employee.name.clone(),
            subject,
            body_text,
            body_html,
        })
        .await
    }

    pub async fn send_raffle_reminder(&self, employee: &Employee, raffle: &Raffle) -> bool {
        let subject = format!("Reminder: {} is coming up", raffle.name);
        let body_text = format!(
            "Hi {},\n\nYou are registered for the raffle \"{}\" but have not checked in yet. Check in at the event to be included in the draw.",
            employee.name, raffle.name
        );
        let body_html = layout(
            "Don't miss the raffle",
            &format!(
                "<p>Hi {},</p><p>You are registered for the raffle <strong>{}</strong> but have not checked in yet. Check in at the event to be included in the draw.</p>",
                escape_html(&employee.name),
                escape_html(&raffle.name),
            ),
        );
        self.dispatch(EmailMessage {
            to: employee.email.clone(),
            to_name: employee.name.clone(),
            subject,
            body_text,
            body_html,
        })
        .await
    }

    /// 抽奖邀请，附带签到码（二维码内容）
    pub async fn send_participant_invitation(
        &self,
        employee: &Employee,
        raffle: &Raffle,
        check_in_code: &str,
    ) -> bool {
        let subject = format!("You're invited to {}", raffle.name);
        let body_text = format!(
            "Hi {},\n\nYou have been added to the raffle \"{}\".\nShow this check-in code at the entrance:\n\n{}\n",
            employee.name, raffle.name, check_in_code
        );
        let body_html = layout(
            "You're in the draw",
            &format!(
                "<p>Hi {},</p><p>You have been added to the raffle <strong>{}</strong>.</p><p>Show this check-in code at the entrance:</p><pre>{}</pre>",
                escape_html(&employee.name),
                escape_html(&raffle.name),
                escape_html(check_in_code),
            ),
        );
        self.dispatch(EmailMessage {
            to: employee.email.clone(),
            to_name: employee.name.clone(),
            subject,
            body_text,
            body_html,
        })
        .await
    }

    pub async fn send_event_invitation(
        &self,
        guest: &Guest,
        event: &Event,
        check_in_code: &str,
    ) -> bool {
        let when = event.date.format("%Y-%m-%d %H:%M UTC");
        let subject = format!("Invitation: {}", event.name);
        let body_text = format!(
            "Hi {},\n\nYou are invited to \"{}\" on {} at {}.\nShow this check-in code at the entrance:\n\n{}\n",
            guest.name, event.name, when, event.location, check_in_code
        );
        let body_html = layout(
            "You're invited",
            &format!(
                "<p>Hi {},</p><p>You are invited to <strong>{}</strong> on {} at {}.</p><p>Show this check-in code at the entrance:</p><pre>{}</pre>",
                escape_html(&guest.name),
                escape_html(&event.name),
                when,
                escape_html(&event.location),
                escape_html(check_in_code),
            ),
        );
        self.dispatch(EmailMessage {
            to: guest.email.clone(),
            to_name: guest.name.clone(),
            subject,
            body_text,
            body_html,
        })
        .await
    }

    pub async fn send_event_reminder(&self, guest: &Guest, event: &Event) -> bool {
        let when = event.date.format("%Y-%m-%d %H:%M UTC");
        let subject = format!("Reminder: {}", event.name);
        let body_text = format!(
            "Hi {},\n\nThis is a reminder that \"{}\" takes place on {} at {}.",
            guest.name, event.name, when, event.location
        );
        let body_html = layout(
            "Event reminder",
            &format!(
                "<p>Hi {},</p><p>This is a reminder that <strong>{}</strong> takes place on {} at {}.</p>",
                escape_html(&guest.name),
                escape_html(&event.name),
                when,
                escape_html(&event.location),
            ),
        );
        self.dispatch(EmailMessage {
            to: guest.email.clone(),
            to_name: guest.name.clone(),
            subject,
            body_text,
            body_html,
        })
        .await
    }
}

fn layout(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>{title}</title></head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2 style="color: #2563eb;">{title}</h2>
        {content}
    </div>
</body>
</html>"#
    )
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
