use crate::{capabilities::BinaryArtifact, errors::ExternalServiceError, providers::openai::OpenAiClient};
use base64::{Engine as _, engine::general_purpose};

pub struct ImageGenerator {
    client: OpenAiClient,
}

impl ImageGenerator {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }

    /// 返回解码后的 PNG 字节
    pub async fn generate(&self, prompt: &str) -> Result<BinaryArtifact, ExternalServiceError> {
        let encoded = self.client.generate_image(prompt).await?;
        let data = general_purpose::STANDARD.decode(encoded.trim())?;

        Ok(BinaryArtifact::new(data, "image/png"))
    }
}
