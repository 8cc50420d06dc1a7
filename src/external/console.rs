use async_trait::async_trait;

use super::{EmailMessage, MailTransport};
use crate::error::AppResult;

/// 开发环境：邮件只写入日志
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleTransport;

#[async_trait]
impl MailTransport for ConsoleTransport {
    async fn deliver(&self, message: &EmailMessage) -> AppResult<()> {
        log::info!(
            "[console mail] to={} subject={:?}\n{}",
            message.to,
            message.subject,
            message.body_text
        );
        Ok(())
    }
}
