//! 每日面试题推送：生成题目与示意图，排版为 PDF 后发送到固定收件人

pub mod capabilities;
pub mod config;
pub mod document;
pub mod errors;
pub mod notify;
pub mod orchestrator;
pub mod providers;
pub mod util;
