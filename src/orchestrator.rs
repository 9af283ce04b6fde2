use std::path::PathBuf;

use crate::{
    capabilities::ContentGenerator,
    config::AppConfig,
    document::DocumentAssembler,
    errors::Result,
    notify::{MailTransport, Notifier, SmtpMailer},
    providers::openai::OpenAiClient,
    util::{ArtifactWriter, RunContext},
};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RunReport {
    pub date_stamp: String,
    pub image_path: PathBuf,
    pub pdf_path: PathBuf,
}

/// 生成 → 排版 → 发送，按顺序各执行一次
///
/// 任何阶段失败都立即返回，已写入磁盘的产物保留不动。
pub struct DigestPipeline<T> {
    content: ContentGenerator,
    assembler: DocumentAssembler,
    notifier: Notifier<T>,
}

impl DigestPipeline<SmtpMailer> {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::with_transport(config, SmtpMailer::new(config.mail.clone()))
    }
}

impl<T: MailTransport> DigestPipeline<T> {
    pub fn with_transport(config: &AppConfig, transport: T) -> Result<Self> {
        let client = OpenAiClient::from_config(&config.openai)?;
        let writer = ArtifactWriter::new(config.output_dir.clone());

        Ok(Self {
            content: ContentGenerator::new(client, writer),
            assembler: DocumentAssembler::new(config.output_dir.clone()),
            notifier: Notifier::new(transport),
        })
    }

    pub fn notifier(&self) -> &Notifier<T> {
        &self.notifier
    }

    pub async fn run(&self, run: &RunContext) -> Result<RunReport> {
        debug!(date = %run.date_stamp(), "开始生成内容");
        let generated = self.content.generate(run).await?;

        debug!(image = %generated.image_path.display(), "开始排版 PDF");
        let pdf_path = self
            .assembler
            .assemble(&generated.text, &generated.image_path, run)?;

        debug!(pdf = %pdf_path.display(), "开始发送邮件");
        self.notifier
            .send(&generated.text, &generated.image_path, &pdf_path, run)
            .await?;

        Ok(RunReport {
            date_stamp: run.date_stamp(),
            image_path: generated.image_path,
            pdf_path,
        })
    }
}
