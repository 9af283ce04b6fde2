use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::{config::OpenAiConfig, errors::ExternalServiceError};

type Result<T> = std::result::Result<T, ExternalServiceError>;

/// OpenAI 文本 (Responses API) 与图像 (Images API) 的最小客户端
///
/// 每次调用都是一次独立的请求-响应，不做重试。
#[derive(Clone)]
pub struct OpenAiClient {
    http_client: HttpClient,
    api_key: String,
    base_url: String,
    chat_model: String,
    image_model: String,
    image_size: String,
    image_quality: String,
}

impl OpenAiClient {
    pub fn from_config(config: &OpenAiConfig) -> Result<Self> {
        let mut builder = HttpClient::builder().user_agent("InterviewDigest/0.1");
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http_client: builder.build()?,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            chat_model: config.chat_model.clone(),
            image_model: config.image_model.clone(),
            image_size: config.image_size.clone(),
            image_quality: config.image_quality.clone(),
        })
    }

    pub async fn create_response(&self, prompt: &str) -> Result<String> {
        let payload = ResponsesRequest {
            model: &self.chat_model,
            input: prompt,
        };

        let response: ResponsesResponse = self.post_json("responses", &payload).await?;

        response
            .extract_text()
            .ok_or_else(|| ExternalServiceError::malformed("responses 返回结果为空"))
    }

    /// 返回 base64 编码的图像数据
    pub async fn generate_image(&self, prompt: &str) -> Result<String> {
        let payload = ImagesRequest {
            model: &self.image_model,
            prompt,
            size: &self.image_size,
            quality: &self.image_quality,
            n: 1,
        };

        let response: ImagesResponse = self.post_json("images/generations", &payload).await?;

        response
            .data
            .into_iter()
            .next()
            .and_then(|image| image.b64_json)
            .ok_or_else(|| ExternalServiceError::malformed("images/generations 未返回 b64_json"))
    }

    async fn post_json<P, R>(&self, endpoint: &'static str, payload: &P) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExternalServiceError::Status {
                endpoint,
                status,
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ExternalServiceError::malformed(format!("解析 {} 响应失败: {}", endpoint, e)))
    }
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Vec<ResponseOutputItem>,
}

impl ResponsesResponse {
    fn extract_text(&self) -> Option<String> {
        if let Some(text) = self.output_text.as_deref().filter(|t| !t.is_empty()) {
            return Some(text.to_string());
        }

        let text = self
            .output
            .iter()
            .filter(|item| item.kind == "message")
            .flat_map(|item| item.content.iter())
            .filter(|part| part.kind == "output_text")
            .filter_map(|part| part.text.as_deref())
            .collect::<String>();

        if text.is_empty() { None } else { Some(text) }
    }
}

#[derive(Deserialize)]
struct ResponseOutputItem {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    content: Vec<ResponseContentPart>,
}

#[derive(Deserialize)]
struct ResponseContentPart {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Serialize)]
struct ImagesRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    quality: &'a str,
    n: u8,
}

#[derive(Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    #[serde(default)]
    b64_json: Option<String>,
}
