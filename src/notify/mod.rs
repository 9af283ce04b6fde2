//! 每日面试题邮件的组装与发送

mod smtp;

pub use smtp::SmtpMailer;

use std::path::Path;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::Message;
use tracing::debug;

use crate::{errors::DeliveryError, util::RunContext};

const BODY_PREAMBLE: &str = "Daily Interview Prep is ready!\n\n\
Check the attached PDF for the full deep dive and architectural diagram.\n\n";

const ATTACHMENT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// 组装完成的邮件，与具体的发送通道无关
#[derive(Debug, Clone)]
pub struct DigestEmail {
    pub subject: String,
    pub body: String,
    pub attachments: Vec<EmailAttachment>,
}

impl DigestEmail {
    /// 从磁盘读取两个附件，任一缺失或为空即失败，此时不会连接邮件服务器
    pub fn compose(
        content: &str,
        image_path: &Path,
        pdf_path: &Path,
        run: &RunContext,
    ) -> Result<Self, DeliveryError> {
        let attachments = [image_path, pdf_path]
            .into_iter()
            .map(read_attachment)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            subject: format!("🚀 [{}] C# & ASP.NET Prep", run.display_date()),
            body: format!("{BODY_PREAMBLE}{content}"),
            attachments,
        })
    }

    pub fn to_message(&self, from: Mailbox, to: Mailbox) -> Result<Message, DeliveryError> {
        let content_type = ContentType::parse(ATTACHMENT_CONTENT_TYPE)?;

        let multipart = self.attachments.iter().fold(
            MultiPart::mixed().singlepart(SinglePart::plain(self.body.clone())),
            |multipart, attachment| {
                multipart.singlepart(
                    Attachment::new(attachment.file_name.clone())
                        .body(attachment.data.clone(), content_type.clone()),
                )
            },
        );

        Ok(Message::builder()
            .from(from)
            .to(to)
            .subject(self.subject.clone())
            .multipart(multipart)?)
    }
}

fn read_attachment(path: &Path) -> Result<EmailAttachment, DeliveryError> {
    let data = std::fs::read(path).map_err(|source| DeliveryError::Attachment {
        path: path.to_path_buf(),
        source,
    })?;

    if data.is_empty() {
        return Err(DeliveryError::EmptyAttachment(path.to_path_buf()));
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(EmailAttachment { file_name, data })
}

/// 发送一封已组装的邮件，生产环境使用 SMTP 实现
#[allow(async_fn_in_trait)]
pub trait MailTransport {
    async fn deliver(&self, email: &DigestEmail) -> Result<(), DeliveryError>;
}

pub struct Notifier<T> {
    transport: T,
}

impl<T: MailTransport> Notifier<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn send(
        &self,
        content: &str,
        image_path: &Path,
        pdf_path: &Path,
        run: &RunContext,
    ) -> Result<(), DeliveryError> {
        let email = DigestEmail::compose(content, image_path, pdf_path, run)?;
        debug!(
            subject = %email.subject,
            attachments = email.attachments.len(),
            "邮件已组装"
        );

        self.transport.deliver(&email).await
    }
}
