use async_trait::async_trait;
use std::sync::Mutex;

use super::{EmailMessage, MailTransport};
use crate::error::{AppError, AppResult};

/// 记录所有发出的邮件（测试用）
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn deliver(&self, message: &EmailMessage) -> AppResult<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message.clone());
        }
        Ok(())
    }
}

/// 每次投递都失败（测试用）
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingTransport;

#[async_trait]
impl MailTransport for FailingTransport {
    async fn deliver(&self, _message: &EmailMessage) -> AppResult<()> {
        Err(AppError::ExternalApiError("SMTP server unavailable".into()))
    }
}
