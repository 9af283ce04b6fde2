mod content;
mod image;

pub use content::{ContentGenerator, GeneratedContent, TEXT_PROMPT, image_prompt};
pub use image::ImageGenerator;

#[derive(Debug, Clone)]
pub struct BinaryArtifact {
    pub data: Vec<u8>,
    pub media_type: String,
}

impl BinaryArtifact {
    pub fn new(data: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            data,
            media_type: media_type.into(),
        }
    }
}
