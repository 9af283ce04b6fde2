use std::path::PathBuf;

use crate::{
    capabilities::ImageGenerator,
    errors::ExternalServiceError,
    providers::openai::OpenAiClient,
    util::{ArtifactWriter, RunContext},
};
use tracing::debug;

pub const TEXT_PROMPT: &str = "
    Generate exactly 1 advanced C# or ASP.NET Core interview question.
    Format clearly with headers:
    Question:
    Answer:
    Deep Dive:
    Code:

    Do NOT use ASCII diagrams.
    ";

/// 图像提示词中主题行的最大字符数，按字符截断，不考虑单词边界
const TOPIC_MAX_CHARS: usize = 60;

const IMAGE_PROMPT_PREFIX: &str = "A professional, clean technical architectural diagram for ";
const IMAGE_PROMPT_SUFFIX: &str = ". Minimalist, dark mode, modern UI, sharp lines, enterprise-grade, \
high quality, 16:9 aspect ratio.";

/// 视为换行的字符，包括 `\r` 单独出现以及 Unicode 行/段分隔符
fn is_line_boundary(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// 取生成文本的首行 (截断到 60 个字符) 填入固定模板
pub fn image_prompt(text: &str) -> String {
    let topic: String = text
        .split(is_line_boundary)
        .next()
        .unwrap_or_default()
        .chars()
        .take(TOPIC_MAX_CHARS)
        .collect();

    format!("{IMAGE_PROMPT_PREFIX}{topic}{IMAGE_PROMPT_SUFFIX}")
}

#[derive(Debug, Clone)]
pub struct GeneratedContent {
    /// 模型返回的原始文本，不做解析
    pub text: String,
    pub image_path: PathBuf,
}

pub struct ContentGenerator {
    client: OpenAiClient,
    image: ImageGenerator,
    writer: ArtifactWriter,
}

impl ContentGenerator {
    pub fn new(client: OpenAiClient, writer: ArtifactWriter) -> Self {
        let image = ImageGenerator::new(client.clone());
        Self {
            client,
            image,
            writer,
        }
    }

    pub async fn generate(
        &self,
        run: &RunContext,
    ) -> Result<GeneratedContent, ExternalServiceError> {
        let text = self.client.create_response(TEXT_PROMPT).await?;
        debug!(chars = text.chars().count(), "文本生成完成");

        let prompt = image_prompt(&text);
        let artifact = self.image.generate(&prompt).await?;
        debug!(prompt = %prompt, bytes = artifact.data.len(), "图像生成完成");

        let image_path = self
            .writer
            .persist(&run.image_file_name(), &artifact)
            .await?;

        Ok(GeneratedContent { text, image_path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_first_line() {
        let prompt = image_prompt("Question: What is middleware?\nAnswer: ...");
        assert_eq!(
            prompt,
            "A professional, clean technical architectural diagram for Question: What is middleware?. \
Minimalist, dark mode, modern UI, sharp lines, enterprise-grade, high quality, 16:9 aspect ratio."
        );
    }

    #[test]
    fn topic_is_cut_at_sixty_chars_mid_word() {
        let line = "Question: Explain the differences between IHostedService and BackgroundService";
        let prompt = image_prompt(line);

        let topic: String = line.chars().take(60).collect();
        assert!(prompt.contains(&format!("for {topic}. Minimalist")));
        assert!(!prompt.contains(line));
        assert_eq!(
            prompt.chars().count(),
            IMAGE_PROMPT_PREFIX.len() + 60 + IMAGE_PROMPT_SUFFIX.len()
        );
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let line = "é".repeat(80);
        let prompt = image_prompt(&line);
        assert!(prompt.contains(&"é".repeat(60)));
        assert!(!prompt.contains(&"é".repeat(61)));
    }

    #[test]
    fn leading_blank_line_gives_empty_topic() {
        let prompt = image_prompt("\nQuestion: hidden");
        assert!(prompt.starts_with(&format!("{IMAGE_PROMPT_PREFIX}.")));
        assert!(!prompt.contains("hidden"));
    }

    #[test]
    fn first_line_ends_at_any_unicode_line_boundary() {
        for text in [
            "Question: cut\rAnswer",
            "Question: cut\r\nAnswer",
            "Question: cut\x0bAnswer",
            "Question: cut\x0cAnswer",
            "Question: cut\u{85}Answer",
            "Question: cut\u{2028}Answer",
            "Question: cut\u{2029}Answer",
        ] {
            let prompt = image_prompt(text);
            assert!(prompt.contains("for Question: cut. Minimalist"), "{text:?}");
            assert!(!prompt.contains("Answer"), "{text:?}");
        }
    }

    #[test]
    fn prompt_never_exceeds_template_plus_topic() {
        let template_len = IMAGE_PROMPT_PREFIX.chars().count() + IMAGE_PROMPT_SUFFIX.chars().count();
        let long = "x".repeat(500);
        for text in ["", "short", long.as_str()] {
            assert!(image_prompt(text).chars().count() <= template_len + TOPIC_MAX_CHARS);
        }
    }
}
