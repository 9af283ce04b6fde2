use interview_digest::{
    config::AppConfig,
    orchestrator::{DigestPipeline, RunReport},
    util::{RunContext, format_local, now_local},
};
use tracing::{error, info};
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    init_tracing();

    // 所有错误在此统一报告，进程始终正常退出
    let outcome = run().await;
    let line = outcome_line(&outcome);
    match outcome {
        Ok(_) => info!("{}", line),
        Err(_) => error!("{}", line),
    }
}

/// 每层错误的 Display 已包含下层信息，只取最外层避免重复
fn outcome_line(outcome: &anyhow::Result<RunReport>) -> String {
    match outcome {
        Ok(report) => format!(
            "✅ Success: Email sent with OpenAI-generated content for {}",
            report.date_stamp
        ),
        Err(err) => format!("❌ Error: {}", err),
    }
}

async fn run() -> anyhow::Result<RunReport> {
    let config = AppConfig::load()?;
    let run = config
        .run_date
        .map(RunContext::new)
        .unwrap_or_else(RunContext::today);

    let pipeline = DigestPipeline::from_config(&config)?;
    Ok(pipeline.run(&run).await?)
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_timer(LocalTimer)
        .init();
}

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = now_local();
        write!(w, "{}", format_local(&now, "%Y-%m-%d %H:%M:%S%:z"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_digest::errors::{ExternalServiceError, PipelineError};
    use std::path::PathBuf;

    #[test]
    fn success_line_names_date() {
        let report = RunReport {
            date_stamp: "2024-01-15".to_string(),
            image_path: PathBuf::from("diagram_2024-01-15.png"),
            pdf_path: PathBuf::from("Interview_Prep_2024-01-15.pdf"),
        };
        assert_eq!(
            outcome_line(&Ok(report)),
            "✅ Success: Email sent with OpenAI-generated content for 2024-01-15"
        );
    }

    #[test]
    fn failure_line_reports_cause_once() {
        let err = PipelineError::from(ExternalServiceError::malformed("quota exhausted"));
        let line = outcome_line(&Err(err.into()));

        assert!(line.starts_with("❌ Error: 内容生成失败: "));
        assert_eq!(line.matches("quota exhausted").count(), 1);
    }
}
