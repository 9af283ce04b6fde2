use chrono::{DateTime, Local, NaiveDate};

pub fn now_local() -> DateTime<Local> {
    Local::now()
}

pub fn format_local(now: &DateTime<Local>, pattern: &str) -> String {
    now.format(pattern).to_string()
}

/// 单次运行的日期标记，用于命名产物和标注输出
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunContext {
    date: NaiveDate,
}

impl RunContext {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    pub fn today() -> Self {
        Self::new(now_local().date_naive())
    }

    /// `2024-01-15`
    pub fn date_stamp(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// `Jan 15, 2024`
    pub fn display_date(&self) -> String {
        self.date.format("%b %d, %Y").to_string()
    }

    pub fn image_file_name(&self) -> String {
        format!("diagram_{}.png", self.date_stamp())
    }

    pub fn pdf_file_name(&self) -> String {
        format!("Interview_Prep_{}.pdf", self.date_stamp())
    }
}
