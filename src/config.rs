use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::anyhow;
use chrono::NaiveDate;
use ::config::{Config, Environment, File, FileFormat, Map};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/app_config.toml";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_CHAT_MODEL: &str = "gpt-4.1";
const DEFAULT_IMAGE_MODEL: &str = "gpt-image-1";
const DEFAULT_IMAGE_SIZE: &str = "1792x1024";
const DEFAULT_IMAGE_QUALITY: &str = "high";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 465;

/// 历史遗留的环境变量名，优先级最高
const LEGACY_VARS: [(&str, &str); 4] = [
    ("OPENAI_API_KEY", "openai.api_key"),
    ("SENDER_EMAIL", "mail.sender"),
    ("SENDER_PASSWORD", "mail.password"),
    ("RECEIVER_EMAIL", "mail.recipient"),
];

#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub chat_model: String,
    pub image_model: String,
    pub image_size: String,
    pub image_quality: String,
    pub request_timeout: Option<Duration>,
}

#[derive(Clone, Debug)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub sender: String,
    pub password: String,
    pub recipient: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub openai: OpenAiConfig,
    pub mail: MailConfig,
    pub output_dir: PathBuf,
    /// 固定运行日期，用于补跑；为空时取本地当天
    pub run_date: Option<NaiveDate>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config_path =
            env::var("APP_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        Self::load_with(Path::new(&config_path), env::vars())
    }

    /// 依次叠加：配置文件 < `DIGEST_` 前缀环境变量 < 历史环境变量
    pub fn load_with(
        config_path: &Path,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> anyhow::Result<Self> {
        let vars: Map<String, String> = vars.into_iter().collect();

        let mut builder = Config::builder()
            .add_source(File::from(config_path).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix("DIGEST")
                    .prefix_separator("_")
                    .separator("__")
                    .source(Some(vars.clone())),
            );

        for (var, key) in LEGACY_VARS {
            builder = builder.set_override_option(key, vars.get(var).cloned())?;
        }

        let file_config: FileConfig = builder
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(|e| anyhow!("解析配置 {:?} 失败: {}", config_path, e))?;

        file_config.into_domain()
    }
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    output_dir: Option<String>,
    #[serde(default)]
    run_date: Option<String>,
    #[serde(default)]
    openai: Option<FileOpenAiConfig>,
    #[serde(default)]
    mail: Option<FileMailConfig>,
}

impl FileConfig {
    fn into_domain(self) -> anyhow::Result<AppConfig> {
        let output_dir = match self.output_dir {
            Some(dir) => PathBuf::from(dir),
            None => env::current_dir()?,
        };

        let run_date = self
            .run_date
            .map(|value| {
                NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                    .map_err(|e| anyhow!("解析 run_date 失败: {}: {}", value, e))
            })
            .transpose()?;

        Ok(AppConfig {
            openai: self.openai.unwrap_or_default().into_domain(),
            mail: self.mail.unwrap_or_default().into_domain()?,
            output_dir,
            run_date,
        })
    }
}

#[derive(Debug, Deserialize, Default)]
struct FileOpenAiConfig {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    chat_model: Option<String>,
    #[serde(default)]
    image_model: Option<String>,
    #[serde(default)]
    image_size: Option<String>,
    #[serde(default)]
    image_quality: Option<String>,
    #[serde(default)]
    request_timeout_seconds: Option<u64>,
}

impl FileOpenAiConfig {
    fn into_domain(self) -> OpenAiConfig {
        OpenAiConfig {
            // 缺失的密钥不在此处校验，调用时以鉴权失败的形式暴露
            api_key: self.api_key.unwrap_or_default(),
            base_url: self
                .base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            chat_model: self
                .chat_model
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            image_model: self
                .image_model
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            image_size: self
                .image_size
                .unwrap_or_else(|| DEFAULT_IMAGE_SIZE.to_string()),
            image_quality: self
                .image_quality
                .unwrap_or_else(|| DEFAULT_IMAGE_QUALITY.to_string()),
            request_timeout: self.request_timeout_seconds.map(Duration::from_secs),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct FileMailConfig {
    #[serde(default)]
    smtp_host: Option<String>,
    #[serde(default)]
    smtp_port: Option<String>,
    #[serde(default)]
    sender: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    recipient: Option<String>,
}

impl FileMailConfig {
    fn into_domain(self) -> anyhow::Result<MailConfig> {
        let smtp_port = match self.smtp_port {
            Some(port) => port
                .trim()
                .parse::<u16>()
                .map_err(|e| anyhow!("解析 mail.smtp_port 失败: {}: {}", port, e))?,
            None => DEFAULT_SMTP_PORT,
        };

        Ok(MailConfig {
            smtp_host: self
                .smtp_host
                .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            smtp_port,
            sender: self.sender.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
            recipient: self.recipient.unwrap_or_default(),
        })
    }
}
