use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// 文本或图像生成服务调用失败
#[derive(Debug, Error)]
pub enum ExternalServiceError {
    #[error("网络请求失败: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} 请求失败 ({status}): {body}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("响应格式异常: {0}")]
    MalformedResponse(String),

    #[error("图像数据解码失败: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("写入图像文件失败: {0}")]
    Io(#[from] std::io::Error),
}

impl ExternalServiceError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("无法加载图像 {path:?}: {message}")]
    Image { path: PathBuf, message: String },

    #[error("PDF 生成失败: {0}")]
    Pdf(String),

    #[error("字符 {ch:?} (偏移 {offset}) 无法用内置 Helvetica 字体编码")]
    UnsupportedChar { ch: char, offset: usize },

    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("读取附件 {path:?} 失败: {source}")]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("附件为空: {0:?}")]
    EmptyAttachment(PathBuf),

    #[error("邮箱地址无效: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("附件类型无效: {0}")]
    ContentType(#[from] lettre::message::header::ContentTypeErr),

    #[error("邮件构建失败: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP 发送失败: {0}")]
    Transport(String),
}

impl DeliveryError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

/// 流水线任一阶段的失败，统一在入口处报告
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("内容生成失败: {0}")]
    Content(#[from] ExternalServiceError),

    #[error("文档生成失败: {0}")]
    Render(#[from] RenderError),

    #[error("邮件发送失败: {0}")]
    Delivery(#[from] DeliveryError),
}
