use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::debug;

use super::{DigestEmail, MailTransport};
use crate::{config::MailConfig, errors::DeliveryError};

/// 隐式 TLS 的 SMTP 发送：每封邮件单独连接、登录、发送
pub struct SmtpMailer {
    config: MailConfig,
}

impl SmtpMailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }
}

impl MailTransport for SmtpMailer {
    async fn deliver(&self, email: &DigestEmail) -> Result<(), DeliveryError> {
        let from: Mailbox = self.config.sender.parse()?;
        let to: Mailbox = self.config.recipient.parse()?;
        let message = email.to_message(from, to)?;

        let creds = Credentials::new(self.config.sender.clone(), self.config.password.clone());

        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
                .map_err(|e| DeliveryError::transport(e.to_string()))?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build();

        mailer
            .send(message)
            .await
            .map_err(|e| DeliveryError::transport(e.to_string()))?;

        debug!(
            to = %self.config.recipient,
            subject = %email.subject,
            "邮件已发送"
        );

        Ok(())
    }
}
